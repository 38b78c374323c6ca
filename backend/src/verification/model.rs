//! Verification document models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Object storage bucket holding uploaded verification files
pub const VERIFICATION_BUCKET: &str = "verification-documents";

/// What a document is meant to prove
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "document_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Identity, // Proof of identity
    Skill,    // Credential backing a listed skill
}

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct VerificationDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_id: Option<Uuid>,
    pub kind: DocumentKind,
    pub name: String,
    pub file_path: String,
    pub status: VerificationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
}

impl VerificationDocument {
    /// A new pending document stored under its own id, so a later upload
    /// with the same name never replaces reviewed bytes
    pub fn pending(
        user_id: Uuid,
        skill_id: Option<Uuid>,
        kind: DocumentKind,
        name: String,
    ) -> Self {
        let id = Uuid::new_v4();
        let file_path = document_path(user_id, skill_id, id, &name);
        Self {
            id,
            user_id,
            skill_id,
            kind,
            name,
            file_path,
            status: VerificationStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            admin_notes: None,
        }
    }
}

/// One file of a verification submission
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Reject names that could escape the owner's folder in the bucket or
    /// change meaning inside an object URL
    pub fn validated_name(&self) -> ApiResult<&str> {
        let name = self.name.trim();
        if name.is_empty()
            || name.contains("..")
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        {
            return Err(ApiError::ValidationError(format!(
                "Invalid file name: '{}'",
                self.name
            )));
        }
        Ok(name)
    }
}

/// Object storage path for an uploaded document
pub fn document_path(
    user_id: Uuid,
    skill_id: Option<Uuid>,
    document_id: Uuid,
    file_name: &str,
) -> String {
    match skill_id {
        Some(skill_id) => format!("{}/{}/{}/{}", user_id, skill_id, document_id, file_name),
        None => format!("{}/{}/{}", user_id, document_id, file_name),
    }
}
