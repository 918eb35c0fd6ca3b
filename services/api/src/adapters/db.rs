//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leximate_core::domain::{ChatMessage, ChatSession, Document, Sender, User, UserCredentials};
use leximate_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, google_id, first_name, \
     last_name, role, phone, company, bio, jurisdiction, language, timezone, avatar_url, \
     created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, user_id, doc_type, company_name, counterparty_name, \
     effective_date, duration, governing_law, confidentiality_level, purpose, \
     additional_terms, generated_text, status, created_at, updated_at";

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: Option<String>,
    google_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    bio: Option<String>,
    jurisdiction: Option<String>,
    language: Option<String>,
    timezone: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            google_id: self.google_id,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            phone: self.phone,
            company: self.company,
            bio: self.bio,
            jurisdiction: self.jurisdiction,
            language: self.language,
            timezone: self.timezone,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn to_credentials(mut self) -> UserCredentials {
        let password_hash = self.password_hash.take();
        UserCredentials {
            user: self.to_domain(),
            password_hash,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    doc_type: String,
    company_name: Option<String>,
    counterparty_name: Option<String>,
    effective_date: Option<String>,
    duration: Option<String>,
    governing_law: Option<String>,
    confidentiality_level: Option<String>,
    purpose: Option<String>,
    additional_terms: Option<String>,
    generated_text: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            doc_type: self.doc_type,
            company_name: self.company_name,
            counterparty_name: self.counterparty_name,
            effective_date: self.effective_date,
            duration: self.duration,
            governing_law: self.governing_law,
            confidentiality_level: self.confidentiality_level,
            purpose: self.purpose,
            additional_terms: self.additional_terms,
            generated_text: self.generated_text,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ChatSessionRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatSessionRecord {
    fn to_domain(self) -> ChatSession {
        ChatSession {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ChatMessageRecord {
    id: Uuid,
    session_id: Uuid,
    user_id: Uuid,
    sender: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl ChatMessageRecord {
    fn to_domain(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            session_id: self.session_id,
            user_id: self.user_id,
            sender: self.sender,
            message: self.message,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PortError::Invalid("Email already registered".to_string())
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User with email {} not found", email))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_credentials())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User {} not found", user_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn update_user(&self, user: &User) -> PortResult<()> {
        sqlx::query(
            "UPDATE users SET first_name = $2, last_name = $3, role = $4, phone = $5, \
             company = $6, bio = $7, jurisdiction = $8, language = $9, timezone = $10, \
             avatar_url = $11, updated_at = NOW() WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.role)
        .bind(&user.phone)
        .bind(&user.company)
        .bind(&user.bio)
        .bind(&user.jurisdiction)
        .bind(&user.language)
        .bind(&user.timezone)
        .bind(&user.avatar_url)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_user_by_google_id(&self, google_id: &str) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_google_user(
        &self,
        username: &str,
        email: &str,
        google_id: &str,
    ) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, google_id) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(email)
            .bind(google_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn link_google_id(&self, user_id: Uuid, google_id: &str) -> PortResult<()> {
        sqlx::query("UPDATE users SET google_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(google_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn store_oauth_state(
        &self,
        state: &str,
        pkce_verifier: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO oauth_states (state, pkce_verifier, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(state)
        .bind(pkce_verifier)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn take_oauth_state(&self, state: &str) -> PortResult<Option<String>> {
        // Retrieval and deletion in one statement validates CSRF state and
        // expiry atomically.
        let row: Option<(String,)> = sqlx::query_as(
            "DELETE FROM oauth_states WHERE state = $1 AND expires_at > NOW() \
             RETURNING pkce_verifier",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.map(|(verifier,)| verifier))
    }

    async fn insert_document(&self, document: &Document) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO documents (id, user_id, doc_type, company_name, counterparty_name, \
             effective_date, duration, governing_law, confidentiality_level, purpose, \
             additional_terms, generated_text, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(document.id)
        .bind(document.user_id)
        .bind(&document.doc_type)
        .bind(&document.company_name)
        .bind(&document.counterparty_name)
        .bind(&document.effective_date)
        .bind(&document.duration)
        .bind(&document.governing_law)
        .bind(&document.confidentiality_level)
        .bind(&document.purpose)
        .bind(&document.additional_terms)
        .bind(&document.generated_text)
        .bind(&document.status)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_document(&self, document_id: Uuid) -> PortResult<Document> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1");
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(document_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Document {} not found", document_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 \
             ORDER BY updated_at DESC"
        );
        let records = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(DocumentRecord::to_domain).collect())
    }

    async fn update_document(&self, document: &Document) -> PortResult<()> {
        sqlx::query(
            "UPDATE documents SET doc_type = $2, company_name = $3, counterparty_name = $4, \
             effective_date = $5, duration = $6, governing_law = $7, \
             confidentiality_level = $8, purpose = $9, additional_terms = $10, \
             generated_text = $11, status = $12, updated_at = NOW() WHERE id = $1",
        )
        .bind(document.id)
        .bind(&document.doc_type)
        .bind(&document.company_name)
        .bind(&document.counterparty_name)
        .bind(&document.effective_date)
        .bind(&document.duration)
        .bind(&document.governing_law)
        .bind(&document.confidentiality_level)
        .bind(&document.purpose)
        .bind(&document.additional_terms)
        .bind(&document.generated_text)
        .bind(&document.status)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_chat_session(&self, user_id: Uuid) -> PortResult<ChatSession> {
        let record = sqlx::query_as::<_, ChatSessionRecord>(
            "INSERT INTO chat_sessions (id, user_id) VALUES ($1, $2) \
             RETURNING id, user_id, title, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_chat_session(&self, session_id: Uuid) -> PortResult<ChatSession> {
        let record = sqlx::query_as::<_, ChatSessionRecord>(
            "SELECT id, user_id, title, created_at, updated_at FROM chat_sessions \
             WHERE id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Chat session {} not found", session_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_chat_sessions(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>> {
        let records = sqlx::query_as::<_, ChatSessionRecord>(
            "SELECT id, user_id, title, created_at, updated_at FROM chat_sessions \
             WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records
            .into_iter()
            .map(ChatSessionRecord::to_domain)
            .collect())
    }

    async fn insert_chat_message(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        sender: Sender,
        message: &str,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, user_id, sender, message) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(user_id)
        .bind(sender.as_str())
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_chat_messages(&self, session_id: Uuid) -> PortResult<Vec<ChatMessage>> {
        let records = sqlx::query_as::<_, ChatMessageRecord>(
            "SELECT id, session_id, user_id, sender, message, created_at FROM chat_messages \
             WHERE session_id = $1 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records
            .into_iter()
            .map(ChatMessageRecord::to_domain)
            .collect())
    }

    async fn touch_chat_session(&self, session_id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_chat_session(&self, session_id: Uuid, user_id: Uuid) -> PortResult<()> {
        // Both deletes are keyed on owner as well as id; a mismatch removes
        // nothing, matching the silent no-op contract.
        sqlx::query("DELETE FROM chat_messages WHERE session_id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
