//! crates/leximate_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ChatMessage, ChatSession, Document, Sender, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network)
/// and doubles as the request-level taxonomy: each variant has one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    Invalid(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not authorized")]
    Forbidden,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The single ownership predicate applied before any disclosure or mutation
/// of a user-owned record.
pub fn ensure_owner(record_owner: Uuid, caller: Uuid) -> PortResult<()> {
    if record_owner == caller {
        Ok(())
    } else {
        Err(PortError::Forbidden)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// Writes the mutable profile columns back and stamps `updated_at`.
    async fn update_user(&self, user: &User) -> PortResult<()>;

    // --- Federated Login ---
    async fn get_user_by_google_id(&self, google_id: &str) -> PortResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    async fn create_google_user(
        &self,
        username: &str,
        email: &str,
        google_id: &str,
    ) -> PortResult<User>;

    async fn link_google_id(&self, user_id: Uuid, google_id: &str) -> PortResult<()>;

    async fn store_oauth_state(
        &self,
        state: &str,
        pkce_verifier: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Consumes a pending OAuth state row, returning its PKCE verifier.
    /// Expired or unknown states return `None`.
    async fn take_oauth_state(&self, state: &str) -> PortResult<Option<String>>;

    // --- Document Management ---
    async fn insert_document(&self, document: &Document) -> PortResult<()>;

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document>;

    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<Document>>;

    /// Writes all mutable document columns back and stamps `updated_at`.
    async fn update_document(&self, document: &Document) -> PortResult<()>;

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()>;

    // --- Chat Management ---
    async fn create_chat_session(&self, user_id: Uuid) -> PortResult<ChatSession>;

    async fn get_chat_session(&self, session_id: Uuid) -> PortResult<ChatSession>;

    async fn list_chat_sessions(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>>;

    async fn insert_chat_message(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        sender: Sender,
        message: &str,
    ) -> PortResult<()>;

    async fn list_chat_messages(&self, session_id: Uuid) -> PortResult<Vec<ChatMessage>>;

    /// Refreshes a session's `updated_at` without altering its other fields.
    async fn touch_chat_session(&self, session_id: Uuid) -> PortResult<()>;

    /// Deletes a session and its messages where both the session id and the
    /// owning user id match. An owner mismatch deletes nothing and is not an
    /// error.
    async fn delete_chat_session(&self, session_id: Uuid, user_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait ChatGenerationService: Send + Sync {
    /// Produces an assistant reply for a single user message. Each call is
    /// stateless: no conversation history is assembled.
    async fn generate_reply(&self, message: &str) -> PortResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_owner_accepts_matching_ids() {
        let id = Uuid::new_v4();
        assert!(ensure_owner(id, id).is_ok());
    }

    #[test]
    fn ensure_owner_rejects_foreign_caller() {
        let err = ensure_owner(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, PortError::Forbidden));
    }
}
