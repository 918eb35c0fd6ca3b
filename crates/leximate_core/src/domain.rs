//! crates/leximate_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Users
//=========================================================================================

/// Represents a user account, secrets excluded. Every field beyond `username`
/// and `email` is an optional profile field.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub google_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub jurisdiction: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    /// Absent for accounts created through Google login.
    pub password_hash: Option<String>,
}

/// An allow-listed patch of mutable profile fields. `None` leaves the stored
/// value untouched; empty strings are filtered out before they reach here.
#[derive(Debug, Clone, Default)]
pub struct UserProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub jurisdiction: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub avatar_url: Option<String>,
}

impl User {
    /// Applies a profile patch in place and returns how many fields changed.
    /// A count of zero means there is nothing worth writing back.
    pub fn apply_profile_patch(&mut self, patch: UserProfilePatch) -> usize {
        let mut applied = 0;
        let mut set = |slot: &mut Option<String>, value: Option<String>| {
            if let Some(v) = value {
                if !v.trim().is_empty() {
                    *slot = Some(v);
                    applied += 1;
                }
            }
        };
        set(&mut self.first_name, patch.first_name);
        set(&mut self.last_name, patch.last_name);
        set(&mut self.role, patch.role);
        set(&mut self.phone, patch.phone);
        set(&mut self.company, patch.company);
        set(&mut self.bio, patch.bio);
        set(&mut self.jurisdiction, patch.jurisdiction);
        set(&mut self.language, patch.language);
        set(&mut self.timezone, patch.timezone);
        set(&mut self.avatar_url, patch.avatar_url);
        applied
    }
}

//=========================================================================================
// Documents
//=========================================================================================

/// The three supported legal document templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Nda,
    Contract,
    Service,
}

impl DocumentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "nda" => Some(Self::Nda),
            "contract" => Some(Self::Contract),
            "service" => Some(Self::Service),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nda => "nda",
            Self::Contract => "contract",
            Self::Service => "service",
        }
    }
}

/// Lifecycle status of a document draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Draft,
    Pending,
    Completed,
}

impl DocumentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// A stored legal document draft. `doc_type` stays a free string in storage;
/// it is only parsed into [`DocumentType`] at the template boundary.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doc_type: String,
    pub company_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub effective_date: Option<String>,
    pub duration: Option<String>,
    pub governing_law: Option<String>,
    pub confidentiality_level: Option<String>,
    pub purpose: Option<String>,
    pub additional_terms: Option<String>,
    pub generated_text: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allow-listed patch for the generic document update path. Fields absent
/// from the request stay `None` and leave the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub doc_type: Option<String>,
    pub company_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub effective_date: Option<String>,
    pub duration: Option<String>,
    pub governing_law: Option<String>,
    pub confidentiality_level: Option<String>,
    pub purpose: Option<String>,
    pub additional_terms: Option<String>,
    pub generated_text: Option<String>,
    pub status: Option<String>,
}

impl Document {
    /// Applies an allow-listed patch in place, returning the number of fields
    /// that were set. Zero means the caller supplied no updatable fields.
    pub fn apply_patch(&mut self, patch: DocumentPatch) -> usize {
        let mut applied = 0;
        if let Some(v) = patch.doc_type {
            self.doc_type = v;
            applied += 1;
        }
        if let Some(v) = patch.status {
            self.status = v;
            applied += 1;
        }
        if let Some(v) = patch.generated_text {
            self.generated_text = Some(v);
            applied += 1;
        }
        let mut set = |slot: &mut Option<String>, value: Option<String>| {
            if let Some(v) = value {
                *slot = Some(v);
                applied += 1;
            }
        };
        set(&mut self.company_name, patch.company_name);
        set(&mut self.counterparty_name, patch.counterparty_name);
        set(&mut self.effective_date, patch.effective_date);
        set(&mut self.duration, patch.duration);
        set(&mut self.governing_law, patch.governing_law);
        set(&mut self.confidentiality_level, patch.confidentiality_level);
        set(&mut self.purpose, patch.purpose);
        set(&mut self.additional_terms, patch.additional_terms);
        applied
    }
}

//=========================================================================================
// Chat
//=========================================================================================

/// A chat session owned by one user. `updated_at` is refreshed ("touched")
/// on every message append.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message inside a chat session. Append-only; removed only when
/// the parent session is deleted.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub sender: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_document() -> Document {
        Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            doc_type: "nda".to_string(),
            company_name: None,
            counterparty_name: None,
            effective_date: None,
            duration: None,
            governing_law: None,
            confidentiality_level: None,
            purpose: None,
            additional_terms: None,
            generated_text: None,
            status: "draft".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            google_id: None,
            first_name: None,
            last_name: None,
            role: None,
            phone: None,
            company: None,
            bio: None,
            jurisdiction: None,
            language: None,
            timezone: None,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn document_patch_applies_only_present_fields() {
        let mut doc = sample_document();
        let applied = doc.apply_patch(DocumentPatch {
            purpose: Some("Consulting".to_string()),
            status: Some("completed".to_string()),
            ..Default::default()
        });
        assert_eq!(applied, 2);
        assert_eq!(doc.purpose.as_deref(), Some("Consulting"));
        assert_eq!(doc.status, "completed");
        assert_eq!(doc.doc_type, "nda");
        assert!(doc.company_name.is_none());
    }

    #[test]
    fn empty_document_patch_applies_nothing() {
        let mut doc = sample_document();
        assert_eq!(doc.apply_patch(DocumentPatch::default()), 0);
        assert_eq!(doc.status, "draft");
    }

    #[test]
    fn profile_patch_skips_blank_values() {
        let mut user = sample_user();
        let applied = user.apply_profile_patch(UserProfilePatch {
            first_name: Some("Ada".to_string()),
            company: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(applied, 1);
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert!(user.company.is_none());
    }

    #[test]
    fn document_type_round_trips() {
        for s in ["nda", "contract", "service"] {
            assert_eq!(DocumentType::parse(s).unwrap().as_str(), s);
        }
        assert!(DocumentType::parse("lease").is_none());
    }

    #[test]
    fn sender_rejects_unknown_roles() {
        assert_eq!(Sender::parse("user"), Some(Sender::User));
        assert_eq!(Sender::parse("assistant"), Some(Sender::Assistant));
        assert!(Sender::parse("system").is_none());
    }
}
