use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A contest category submissions are filed under.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
