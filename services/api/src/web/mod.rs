//! services/api/src/web/mod.rs
//!
//! The HTTP layer: handlers, the auth middleware, bearer-token helpers, and
//! the master OpenAPI definition.

pub mod auth;
pub mod chat;
pub mod documents;
pub mod error;
pub mod middleware;
pub mod profile;
pub mod state;
pub mod token;

pub use middleware::require_auth;

use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        profile::upload_avatar_handler,
        documents::generate_document_handler,
        documents::list_documents_handler,
        documents::get_document_handler,
        documents::update_document_handler,
        documents::delete_document_handler,
        documents::download_document_handler,
        chat::start_chat_handler,
        chat::chat_handler,
        chat::save_message_handler,
        chat::chat_history_handler,
        chat::get_messages_handler,
        chat::delete_chat_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::UserResponse,
            profile::UpdateProfileRequest,
            documents::GenerateDocumentRequest,
            documents::UpdateDocumentRequest,
            documents::DocumentResponse,
            chat::ChatRequest,
            chat::SaveMessageRequest,
            chat::ChatSessionResponse,
            chat::ChatMessageResponse,
        )
    ),
    tags(
        (name = "LexiMate API", description = "Authentication, profiles, legal document drafting, and AI chat.")
    )
)]
pub struct ApiDoc;
