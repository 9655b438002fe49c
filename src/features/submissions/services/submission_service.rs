use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{Entity, Operation, StoreError, StoreErrorKind};
use crate::features::submissions::models::{Submission, SubmissionWithContext};

const SUBMISSION_COLUMNS: &str =
    "id, user_id, category_id, image_link, title, description, location, created_at, is_winner";

const CONTEXT_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.category_id, s.image_link, s.title, s.description,
           s.location, s.created_at, s.is_winner,
           u.first_name AS author_first_name, u.last_name AS author_last_name,
           c.name AS category_name
    FROM submissions s
    JOIN users u ON u.id = s.user_id
    JOIN categories c ON c.id = s.category_id
"#;

/// Fields an owner (or admin) may edit after upload.
#[derive(Debug, Default)]
pub struct SubmissionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
}

/// Data access for submissions.
pub struct SubmissionService {
    pool: PgPool,
}

impl SubmissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All submissions, newest first, with author and category context.
    pub async fn list_all(&self) -> Result<Vec<SubmissionWithContext>, StoreError> {
        sqlx::query_as::<_, SubmissionWithContext>(&format!(
            "{} ORDER BY s.created_at DESC",
            CONTEXT_SELECT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list submissions: {:?}", e);
            StoreError::from_sqlx(Entity::Submission, Operation::List, &e)
        })
    }

    /// Submissions created at or after the given cutoff, newest first.
    pub async fn list_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<SubmissionWithContext>, StoreError> {
        sqlx::query_as::<_, SubmissionWithContext>(&format!(
            "{} WHERE s.created_at >= $1 ORDER BY s.created_at DESC",
            CONTEXT_SELECT
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list submissions since {}: {:?}", cutoff, e);
            StoreError::from_sqlx(Entity::Submission, Operation::List, &e)
        })
    }

    /// One member's submissions, newest first.
    pub async fn list_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<SubmissionWithContext>, StoreError> {
        sqlx::query_as::<_, SubmissionWithContext>(&format!(
            "{} WHERE s.user_id = $1 ORDER BY s.created_at DESC",
            CONTEXT_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list submissions for user {}: {:?}", user_id, e);
            StoreError::from_sqlx(Entity::Submission, Operation::List, &e)
        })
    }

    pub async fn get_by_id(&self, submission_id: i64) -> Result<Submission, StoreError> {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {} FROM submissions WHERE id = $1",
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get submission: {:?}", e);
            StoreError::from_sqlx(Entity::Submission, Operation::Get, &e)
        })?;

        submission.ok_or_else(|| StoreError::not_found(Entity::Submission, Operation::Get))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: i64,
        category_id: i64,
        image_link: &str,
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
    ) -> Result<Submission, StoreError> {
        sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO submissions (user_id, category_id, image_link, title, description, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(user_id)
        .bind(category_id)
        .bind(image_link)
        .bind(title)
        .bind(description)
        .bind(location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create submission: {:?}", e);
            StoreError::from_sqlx(Entity::Submission, Operation::Create, &e)
        })
    }

    /// Update a submission's metadata and return the post-update
    /// projection. The photo link never changes here.
    pub async fn update(
        &self,
        submission_id: i64,
        changes: SubmissionChanges,
    ) -> Result<Submission, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                category_id = COALESCE($5, category_id)
            WHERE id = $1
            "#,
        )
        .bind(submission_id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.location)
        .bind(changes.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update submission: {:?}", e);
            StoreError::from_sqlx(Entity::Submission, Operation::Update, &e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Submission, Operation::Update));
        }

        // Reread so the caller gets the stored projection, not our inputs.
        self.get_by_id(submission_id).await.map_err(|e| {
            StoreError::new(
                Entity::Submission,
                Operation::Update,
                StoreErrorKind::Unexpected,
                format!("failed to reread updated submission: {}", e),
            )
        })
    }

    /// Delete a submission, returning the deleted row so the caller can
    /// clean up the stored photo.
    pub async fn delete(&self, submission_id: i64) -> Result<Submission, StoreError> {
        let deleted = sqlx::query_as::<_, Submission>(&format!(
            "DELETE FROM submissions WHERE id = $1 RETURNING {}",
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete submission: {:?}", e);
            StoreError::from_sqlx(Entity::Submission, Operation::Delete, &e)
        })?;

        deleted.ok_or_else(|| StoreError::not_found(Entity::Submission, Operation::Delete))
    }

    /// Delete several submissions at once, returning the deleted rows.
    /// Ids with no matching row are skipped, not errors.
    pub async fn batch_delete(&self, ids: &[i64]) -> Result<Vec<Submission>, StoreError> {
        sqlx::query_as::<_, Submission>(&format!(
            "DELETE FROM submissions WHERE id = ANY($1) RETURNING {}",
            SUBMISSION_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to batch delete submissions: {:?}", e);
            StoreError::from_sqlx(Entity::Submission, Operation::Delete, &e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::services::CategoryService;
    use crate::features::users::models::UserRole;
    use crate::features::users::services::UserService;

    async fn seed_owner_and_category(pool: &PgPool) -> (i64, i64) {
        let user = UserService::new(pool.clone())
            .create("ada@example.com", "Ada", "Lovelace", None, UserRole::User)
            .await
            .unwrap();
        let category = CategoryService::new(pool.clone())
            .create("Landscape")
            .await
            .unwrap();
        (user.id, category.id)
    }

    async fn submit(
        service: &SubmissionService,
        user_id: i64,
        category_id: i64,
        title: &str,
    ) -> Submission {
        service
            .create(
                user_id,
                category_id,
                "http://localhost:9000/photo-contest/submissions/1_1.jpg",
                title,
                None,
                None,
            )
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn batch_delete_counts_only_rows_that_existed(pool: PgPool) {
        let (user_id, category_id) = seed_owner_and_category(&pool).await;
        let service = SubmissionService::new(pool);

        let a = submit(&service, user_id, category_id, "Sunrise").await;
        let b = submit(&service, user_id, category_id, "Harbor").await;
        let c = submit(&service, user_id, category_id, "Forest").await;

        // Two of the five ids do not exist; the batch must still remove
        // the other three.
        let missing = c.id + 1000;
        let deleted = service
            .batch_delete(&[a.id, b.id, c.id, missing, missing + 1])
            .await
            .unwrap();

        assert_eq!(deleted.len(), 3);
        for submission in [&a, &b, &c] {
            let err = service.get_by_id(submission.id).await.unwrap_err();
            assert_eq!(err.kind, StoreErrorKind::NotFound);
        }
    }

    #[sqlx::test]
    async fn repeated_deletes_of_the_same_id_stay_not_found(pool: PgPool) {
        let (user_id, category_id) = seed_owner_and_category(&pool).await;
        let service = SubmissionService::new(pool);

        let submission = submit(&service, user_id, category_id, "Sunrise").await;
        service.delete(submission.id).await.unwrap();

        let err = service.delete(submission.id).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.code(), "submission/delete/not_found");

        let err = service.delete(submission.id).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }
}
