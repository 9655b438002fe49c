use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A contest entry as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    /// Public URL of the stored photo.
    pub image_link: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_winner: bool,
}

/// A submission joined with its author and category, as list views
/// render it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionWithContext {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub image_link: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_winner: bool,
    pub author_first_name: String,
    pub author_last_name: String,
    pub category_name: String,
}
