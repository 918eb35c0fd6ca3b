pub mod domain;
pub mod ports;
pub mod templates;

pub use domain::{
    ChatMessage, ChatSession, Document, DocumentPatch, DocumentStatus, DocumentType, Sender,
    User, UserCredentials, UserProfilePatch,
};
pub use ports::{ensure_owner, ChatGenerationService, DatabaseService, PortError, PortResult};
pub use templates::{render_document_text, TemplateFields};
