//! PostgreSQL record store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RecordStore;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::message::{Message, MessageRow};
use crate::models::User;
use crate::profile::ProfileUpdate;
use crate::review::{Review, ReviewRow, ReviewStatus};
use crate::skill::{Skill, SkillFilter};
use crate::swap::{DisputeStatus, SkillSwapRequest, SwapRequestRow, SwapStatus};
use crate::verification::{DocumentKind, VerificationDocument, VerificationStatus};

/// Makes `%`, `_` and `\` match literally inside an `ILIKE ... ESCAPE '\'` pattern
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
pub struct PgRecordStore {
    db_pool: PgPool,
}

impl PgRecordStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn health_check(&self) -> ApiResult<()> {
        db::check_health(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    // ===== Users =====

    async fn insert_user(&self, user: &User) -> ApiResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, name, email, bio, profile_image, rating, review_count,
                is_verified, is_admin, identity_verified, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.bio)
        .bind(&user.profile_image)
        .bind(user.rating)
        .bind(user.review_count)
        .bind(user.is_verified)
        .bind(user.is_admin)
        .bind(user.identity_verified)
        .bind(user.created_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(user)
    }

    async fn get_users(&self, ids: &[Uuid]) -> ApiResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await?;

        Ok(users)
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, bio = $2, email = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.bio)
        .bind(&update.email)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn promote_to_admin(&self, id: Uuid) -> ApiResult<bool> {
        let (found,) = sqlx::query_as::<_, (bool,)>("SELECT promote_to_admin($1)")
            .bind(id)
            .fetch_one(&self.db_pool)
            .await?;

        Ok(found)
    }

    // ===== Skills =====

    async fn insert_skill(&self, skill: &Skill) -> ApiResult<Skill> {
        let skill = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (
                id, user_id, name, category, description, experience_level,
                tags, rating, review_count, is_verified, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(skill.id)
        .bind(skill.user_id)
        .bind(&skill.name)
        .bind(&skill.category)
        .bind(&skill.description)
        .bind(skill.experience_level)
        .bind(&skill.tags)
        .bind(skill.rating)
        .bind(skill.review_count)
        .bind(skill.is_verified)
        .bind(skill.created_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(skill)
    }

    async fn get_skill(&self, id: Uuid) -> ApiResult<Option<Skill>> {
        let skill = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(skill)
    }

    async fn get_skills(&self, ids: &[Uuid]) -> ApiResult<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await?;

        Ok(skills)
    }

    async fn list_skills(&self, filter: &SkillFilter) -> ApiResult<Vec<Skill>> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM skills WHERE 1=1");

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query_builder.push(" AND category = ");
            query_builder.push_bind(category.to_string());
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{}%", escape_like(search));
            query_builder.push(" AND (name ILIKE ");
            query_builder.push_bind(pattern.clone());
            query_builder.push(r" ESCAPE '\' OR description ILIKE ");
            query_builder.push_bind(pattern.clone());
            query_builder.push(
                r" ESCAPE '\' OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ",
            );
            query_builder.push_bind(pattern);
            query_builder.push(r" ESCAPE '\'))");
        }

        query_builder.push(" ORDER BY created_at");

        let skills = query_builder
            .build_query_as::<Skill>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(skills)
    }

    async fn list_skills_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT * FROM skills WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(skills)
    }

    async fn list_categories(&self) -> ApiResult<Vec<String>> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT category FROM skills ORDER BY category",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    // ===== Swap requests =====

    async fn insert_swap_request(
        &self,
        request: &SkillSwapRequest,
    ) -> ApiResult<SkillSwapRequest> {
        let row = sqlx::query_as::<_, SwapRequestRow>(
            r#"
            INSERT INTO skill_swap_requests (
                id, requester_id, provider_id, requested_skill_id, offered_skill_id,
                message, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.requester_id)
        .bind(request.provider_id)
        .bind(request.requested_skill_id)
        .bind(request.offered_skill_id)
        .bind(&request.message)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(row.into())
    }

    async fn get_swap_request(&self, id: Uuid) -> ApiResult<Option<SkillSwapRequest>> {
        let row = sqlx::query_as::<_, SwapRequestRow>(
            "SELECT * FROM skill_swap_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_swap_requests_for_user(
        &self,
        user_id: Uuid,
    ) -> ApiResult<Vec<SkillSwapRequest>> {
        let rows = sqlx::query_as::<_, SwapRequestRow>(
            r#"
            SELECT * FROM skill_swap_requests
            WHERE requester_id = $1 OR provider_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn has_accepted_swap(&self, a: Uuid, b: Uuid, skill_id: Uuid) -> ApiResult<bool> {
        let (exists,) = sqlx::query_as::<_, (bool,)>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM skill_swap_requests
                WHERE status = $1
                  AND ((requester_id = $2 AND provider_id = $3)
                    OR (requester_id = $3 AND provider_id = $2))
                  AND (requested_skill_id = $4 OR offered_skill_id = $4)
            )
            "#,
        )
        .bind(SwapStatus::Accepted)
        .bind(a)
        .bind(b)
        .bind(skill_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(exists)
    }

    async fn transition_swap_status(
        &self,
        id: Uuid,
        from: SwapStatus,
        to: SwapStatus,
    ) -> ApiResult<Option<SkillSwapRequest>> {
        let row = sqlx::query_as::<_, SwapRequestRow>(
            r#"
            UPDATE skill_swap_requests
            SET status = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            RETURNING *
            "#,
        )
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn open_swap_dispute(
        &self,
        id: Uuid,
        from: SwapStatus,
        reason: &str,
    ) -> ApiResult<Option<SkillSwapRequest>> {
        let row = sqlx::query_as::<_, SwapRequestRow>(
            r#"
            UPDATE skill_swap_requests
            SET status = $1, dispute_reason = $2, dispute_status = $3,
                dispute_resolution = NULL, admin_notes = NULL, updated_at = $4
            WHERE id = $5 AND status = $6
            RETURNING *
            "#,
        )
        .bind(SwapStatus::Disputed)
        .bind(reason)
        .bind(DisputeStatus::Pending)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn resolve_swap_dispute(
        &self,
        id: Uuid,
        resolution: &str,
        notes: Option<&str>,
    ) -> ApiResult<Option<SkillSwapRequest>> {
        let row = sqlx::query_as::<_, SwapRequestRow>(
            r#"
            UPDATE skill_swap_requests
            SET dispute_status = $1, dispute_resolution = $2, admin_notes = $3, updated_at = $4
            WHERE id = $5 AND dispute_status IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(DisputeStatus::Resolved)
        .bind(resolution)
        .bind(notes)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_swap_requests_by_dispute_status(
        &self,
        status: DisputeStatus,
    ) -> ApiResult<Vec<SkillSwapRequest>> {
        let rows = sqlx::query_as::<_, SwapRequestRow>(
            "SELECT * FROM skill_swap_requests WHERE dispute_status = $1 ORDER BY updated_at",
        )
        .bind(status)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_swap_requests_by_dispute_status(
        &self,
        status: DisputeStatus,
    ) -> ApiResult<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM skill_swap_requests WHERE dispute_status = $1",
        )
        .bind(status)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(count)
    }

    // ===== Verification documents =====

    async fn insert_verification_documents(
        &self,
        documents: &[VerificationDocument],
    ) -> ApiResult<Vec<VerificationDocument>> {
        let mut tx = self.db_pool.begin().await?;
        let mut inserted = Vec::with_capacity(documents.len());

        for document in documents {
            let document = sqlx::query_as::<_, VerificationDocument>(
                r#"
                INSERT INTO verification_documents (
                    id, user_id, skill_id, kind, name, file_path, status,
                    submitted_at, reviewed_at, admin_notes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
                "#,
            )
            .bind(document.id)
            .bind(document.user_id)
            .bind(document.skill_id)
            .bind(document.kind)
            .bind(&document.name)
            .bind(&document.file_path)
            .bind(document.status)
            .bind(document.submitted_at)
            .bind(document.reviewed_at)
            .bind(&document.admin_notes)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(document);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_verification_document(
        &self,
        id: Uuid,
    ) -> ApiResult<Option<VerificationDocument>> {
        let document = sqlx::query_as::<_, VerificationDocument>(
            "SELECT * FROM verification_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(document)
    }

    async fn list_verification_documents_for_user(
        &self,
        user_id: Uuid,
    ) -> ApiResult<Vec<VerificationDocument>> {
        let documents = sqlx::query_as::<_, VerificationDocument>(
            "SELECT * FROM verification_documents WHERE user_id = $1 ORDER BY submitted_at",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(documents)
    }

    async fn list_verification_documents_by_status(
        &self,
        status: VerificationStatus,
    ) -> ApiResult<Vec<VerificationDocument>> {
        let documents = sqlx::query_as::<_, VerificationDocument>(
            "SELECT * FROM verification_documents WHERE status = $1 ORDER BY submitted_at",
        )
        .bind(status)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(documents)
    }

    async fn count_verification_documents_by_status(
        &self,
        status: VerificationStatus,
    ) -> ApiResult<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM verification_documents WHERE status = $1",
        )
        .bind(status)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(count)
    }

    async fn decide_verification_document(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reviewed_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> ApiResult<Option<VerificationDocument>> {
        let mut tx = self.db_pool.begin().await?;

        let document = sqlx::query_as::<_, VerificationDocument>(
            r#"
            UPDATE verification_documents
            SET status = $1, reviewed_at = $2, admin_notes = $3
            WHERE id = $4 AND status = $5
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(reviewed_at)
        .bind(notes)
        .bind(id)
        .bind(VerificationStatus::Pending)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(document) = document else {
            return Ok(None);
        };

        if document.status == VerificationStatus::Approved {
            let flagged = match (document.kind, document.skill_id) {
                (DocumentKind::Identity, _) => {
                    sqlx::query("UPDATE users SET identity_verified = TRUE WHERE id = $1")
                        .bind(document.user_id)
                        .execute(&mut *tx)
                        .await?
                }
                (DocumentKind::Skill, Some(skill_id)) => {
                    sqlx::query("UPDATE skills SET is_verified = TRUE WHERE id = $1")
                        .bind(skill_id)
                        .execute(&mut *tx)
                        .await?
                }
                (DocumentKind::Skill, None) => {
                    return Err(ApiError::DatabaseError(format!(
                        "skill document {} has no skill",
                        document.id
                    )));
                }
            };

            // Dropping the transaction rolls the decision back
            if flagged.rows_affected() == 0 {
                return Err(ApiError::DatabaseError(format!(
                    "verified flag target missing for document {}",
                    document.id
                )));
            }
        }

        tx.commit().await?;
        Ok(Some(document))
    }

    // ===== Reviews =====

    async fn insert_review(&self, review: &Review) -> ApiResult<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (
                id, user_id, skill_id, reviewer_id, reviewer_name, reviewer_image,
                rating, comment, status, admin_notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.skill_id)
        .bind(review.reviewer.id)
        .bind(&review.reviewer.name)
        .bind(&review.reviewer.profile_image)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.status)
        .bind(&review.admin_notes)
        .bind(review.created_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(row.into())
    }

    async fn get_review(&self, id: Uuid) -> ApiResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_reviews_for_skill(&self, skill_id: Uuid) -> ApiResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews WHERE skill_id = $1 ORDER BY created_at DESC",
        )
        .bind(skill_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_reviews_by_status(&self, status: ReviewStatus) -> ApiResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews WHERE status = $1 ORDER BY created_at",
        )
        .bind(status)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_reviews_by_status(&self, status: ReviewStatus) -> ApiResult<i64> {
        let (count,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM reviews WHERE status = $1")
                .bind(status)
                .fetch_one(&self.db_pool)
                .await?;

        Ok(count)
    }

    async fn update_review_status(
        &self,
        id: Uuid,
        from: ReviewStatus,
        to: ReviewStatus,
        notes: Option<&str>,
    ) -> ApiResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews
            SET status = $1, admin_notes = $2
            WHERE id = $3 AND status = $4
            RETURNING *
            "#,
        )
        .bind(to)
        .bind(notes)
        .bind(id)
        .bind(from)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // ===== Messages =====

    async fn insert_message(&self, message: &Message) -> ApiResult<Message> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, content, is_flagged, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(message.is_flagged)
        .bind(message.created_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(row.into())
    }

    async fn get_message(&self, id: Uuid) -> ApiResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_messages_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT * FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_flagged_messages(&self) -> ApiResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT * FROM messages
            WHERE is_flagged = TRUE AND admin_review_status = $1
            ORDER BY created_at
            "#,
        )
        .bind(crate::message::MessageReviewStatus::Pending)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_flagged_messages(&self) -> ApiResult<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM messages WHERE is_flagged = TRUE AND admin_review_status = $1",
        )
        .bind(crate::message::MessageReviewStatus::Pending)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(count)
    }

    async fn flag_message(&self, id: Uuid) -> ApiResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            UPDATE messages
            SET is_flagged = TRUE,
                admin_review_status = COALESCE(admin_review_status, $1)
            WHERE id = $2 AND admin_review_status IS DISTINCT FROM $3
            RETURNING *
            "#,
        )
        .bind(crate::message::MessageReviewStatus::Pending)
        .bind(id)
        .bind(crate::message::MessageReviewStatus::Reviewed)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn review_message(
        &self,
        id: Uuid,
        keep_flag: bool,
        notes: Option<&str>,
    ) -> ApiResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            UPDATE messages
            SET admin_review_status = $1, is_flagged = $2, admin_notes = $3
            WHERE id = $4 AND is_flagged = TRUE AND admin_review_status = $5
            RETURNING *
            "#,
        )
        .bind(crate::message::MessageReviewStatus::Reviewed)
        .bind(keep_flag)
        .bind(notes)
        .bind(id)
        .bind(crate::message::MessageReviewStatus::Pending)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("rust"), "rust");
        assert_eq!(escape_like("_"), "\\_");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
    }
}
