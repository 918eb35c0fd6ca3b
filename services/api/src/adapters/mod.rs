pub mod chat_llm;
pub mod db;
pub mod google;
pub mod pdf;

pub use chat_llm::OpenAiChatAdapter;
pub use db::DbAdapter;
pub use google::GoogleOAuth;
