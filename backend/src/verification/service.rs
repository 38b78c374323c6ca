use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::store::{ObjectStorage, RecordStore};
use crate::verification::model::{
    DocumentKind, UploadedFile, VerificationDocument, VERIFICATION_BUCKET,
};

#[derive(Clone)]
pub struct VerificationService {
    store: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStorage>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        Self { store, objects }
    }

    pub async fn submit_identity(
        &self,
        session: &Session,
        files: Vec<UploadedFile>,
    ) -> ApiResult<Vec<VerificationDocument>> {
        self.submit(session, None, DocumentKind::Identity, files).await
    }

    pub async fn submit_skill(
        &self,
        session: &Session,
        skill_id: Uuid,
        files: Vec<UploadedFile>,
    ) -> ApiResult<Vec<VerificationDocument>> {
        let skill = self
            .store
            .get_skill(skill_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Skill not found".to_string()))?;
        if skill.user_id != session.user_id {
            return Err(ApiError::Forbidden(
                "Only the skill owner can submit documents for it".to_string(),
            ));
        }

        self.submit(session, Some(skill_id), DocumentKind::Skill, files)
            .await
    }

    /// Upload every file, then record one pending document per file in a
    /// single store write. A failed upload leaves no rows behind.
    async fn submit(
        &self,
        session: &Session,
        skill_id: Option<Uuid>,
        kind: DocumentKind,
        files: Vec<UploadedFile>,
    ) -> ApiResult<Vec<VerificationDocument>> {
        if files.is_empty() {
            return Err(ApiError::ValidationError(
                "At least one document is required".to_string(),
            ));
        }
        // Check every name before anything reaches storage
        let mut names = HashSet::with_capacity(files.len());
        let mut pending = Vec::with_capacity(files.len());
        for file in files {
            let name = file.validated_name()?.to_string();
            if !names.insert(name.clone()) {
                return Err(ApiError::ValidationError(format!(
                    "Duplicate file name in submission: '{}'",
                    name
                )));
            }
            let document = VerificationDocument::pending(session.user_id, skill_id, kind, name);
            pending.push((document, file.bytes));
        }

        let mut documents = Vec::with_capacity(pending.len());
        for (document, bytes) in pending {
            self.objects
                .upload(VERIFICATION_BUCKET, &document.file_path, bytes)
                .await?;
            documents.push(document);
        }

        let documents = self.store.insert_verification_documents(&documents).await?;

        tracing::info!(
            user_id = %session.user_id,
            kind = ?kind,
            documents = documents.len(),
            "Verification documents submitted"
        );

        Ok(documents)
    }

    pub async fn list_mine(&self, session: &Session) -> ApiResult<Vec<VerificationDocument>> {
        self.store
            .list_verification_documents_for_user(session.user_id)
            .await
    }

    /// A document's review state, visible to its owner and to admins
    pub async fn document_status(
        &self,
        session: &Session,
        document_id: Uuid,
    ) -> ApiResult<VerificationDocument> {
        let document = self
            .store
            .get_verification_document(document_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Verification document not found".to_string()))?;

        if document.user_id != session.user_id && !session.is_admin {
            return Err(ApiError::Forbidden(
                "Not the owner of this document".to_string(),
            ));
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::skill::{CreateSkillRequest, ExperienceLevel};
    use crate::store::{InMemoryObjectStorage, InMemoryRecordStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::verification::VerificationStatus;

    struct Fixture {
        store: Arc<InMemoryRecordStore>,
        objects: Arc<InMemoryObjectStorage>,
        service: VerificationService,
        user: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryRecordStore::new());
        let objects = Arc::new(InMemoryObjectStorage::new());
        let user = User::new(Uuid::new_v4(), "A".to_string(), "a@example.com".to_string());
        store.insert_user(&user).await.unwrap();

        Fixture {
            service: VerificationService::new(store.clone(), objects.clone()),
            store,
            objects,
            user,
        }
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            bytes: name.as_bytes().to_vec(),
        }
    }

    /// Accepts `allowed` uploads, then fails every later one
    struct FlakyStorage {
        allowed: usize,
        uploads: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStorage for FlakyStorage {
        async fn upload(&self, _bucket: &str, _path: &str, _bytes: Vec<u8>) -> ApiResult<()> {
            if self.uploads.fetch_add(1, Ordering::SeqCst) < self.allowed {
                Ok(())
            } else {
                Err(ApiError::ExternalServiceError("bucket unavailable".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_identity_submission() {
        let f = fixture().await;
        let session = Session::user(f.user.id);

        let documents = f
            .service
            .submit_identity(&session, vec![file("passport.pdf"), file("selfie.jpg")])
            .await
            .unwrap();

        assert_eq!(documents.len(), 2);
        assert!(documents
            .iter()
            .all(|d| d.status == VerificationStatus::Pending && d.kind == DocumentKind::Identity));
        assert_eq!(
            documents[0].file_path,
            format!("{}/{}/passport.pdf", f.user.id, documents[0].id)
        );
        assert_eq!(
            f.objects
                .get(VERIFICATION_BUCKET, &documents[0].file_path)
                .await,
            Some(b"passport.pdf".to_vec())
        );
        assert_eq!(f.service.list_mine(&session).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_skill_submission_checks_owner() {
        let f = fixture().await;
        let skill = CreateSkillRequest {
            name: "Piano".to_string(),
            category: "Music".to_string(),
            description: String::new(),
            experience_level: ExperienceLevel::Expert,
            tags: vec![],
        }
        .into_skill(f.user.id);
        f.store.insert_skill(&skill).await.unwrap();

        let err = f
            .service
            .submit_skill(&Session::user(Uuid::new_v4()), skill.id, vec![file("cert.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let documents = f
            .service
            .submit_skill(&Session::user(f.user.id), skill.id, vec![file("cert.pdf")])
            .await
            .unwrap();
        assert_eq!(
            documents[0].file_path,
            format!("{}/{}/{}/cert.pdf", f.user.id, skill.id, documents[0].id)
        );
    }

    #[tokio::test]
    async fn test_bad_name_uploads_nothing() {
        let f = fixture().await;
        let err = f
            .service
            .submit_identity(
                &Session::user(f.user.id),
                vec![file("ok.pdf"), file("../escape.pdf")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(f.objects.len().await, 0);
    }

    #[tokio::test]
    async fn test_resubmission_keeps_approved_bytes() {
        let f = fixture().await;
        let session = Session::user(f.user.id);
        let real = UploadedFile {
            name: "passport.pdf".to_string(),
            bytes: b"REAL".to_vec(),
        };
        let approved = f.service.submit_identity(&session, vec![real]).await.unwrap();
        f.store
            .decide_verification_document(
                approved[0].id,
                VerificationStatus::Approved,
                Utc::now(),
                None,
            )
            .await
            .unwrap()
            .unwrap();

        let forged = UploadedFile {
            name: "passport.pdf".to_string(),
            bytes: b"FORGED".to_vec(),
        };
        let second = f.service.submit_identity(&session, vec![forged]).await.unwrap();

        assert_ne!(second[0].file_path, approved[0].file_path);
        assert_eq!(
            f.objects
                .get(VERIFICATION_BUCKET, &approved[0].file_path)
                .await,
            Some(b"REAL".to_vec())
        );
        assert_eq!(
            f.objects.get(VERIFICATION_BUCKET, &second[0].file_path).await,
            Some(b"FORGED".to_vec())
        );
    }

    #[tokio::test]
    async fn test_duplicate_names_in_batch_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .submit_identity(
                &Session::user(f.user.id),
                vec![file("passport.pdf"), file("passport.pdf")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(f.objects.len().await, 0);
        assert!(f.store.list_verification_documents_for_user(f.user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_upload_records_nothing() {
        let f = fixture().await;
        let storage = Arc::new(FlakyStorage {
            allowed: 1,
            uploads: AtomicUsize::new(0),
        });
        let service = VerificationService::new(f.store.clone(), storage.clone());

        let result = service
            .submit_identity(
                &Session::user(f.user.id),
                vec![file("passport.pdf"), file("selfie.jpg")],
            )
            .await;

        assert!(matches!(result, Err(ApiError::ExternalServiceError(_))));
        assert_eq!(storage.uploads.load(Ordering::SeqCst), 2);
        assert!(f.store.list_verification_documents_for_user(f.user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_submission() {
        let f = fixture().await;
        let err = f
            .service
            .submit_identity(&Session::user(f.user.id), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_status_visibility() {
        let f = fixture().await;
        let documents = f
            .service
            .submit_identity(&Session::user(f.user.id), vec![file("id.png")])
            .await
            .unwrap();
        let id = documents[0].id;

        assert!(f
            .service
            .document_status(&Session::user(f.user.id), id)
            .await
            .is_ok());
        assert!(f
            .service
            .document_status(&Session::admin(Uuid::new_v4()), id)
            .await
            .is_ok());
        let err = f
            .service
            .document_status(&Session::user(Uuid::new_v4()), id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
