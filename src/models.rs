use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of the post listing. The full body is only loaded on the detail
/// page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub view_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Null until the post is edited for the first time.
    pub updated_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A chick record left-joined against its production result. Chicks without a
/// measured result carry a null weight and date.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductionRow {
    pub chick_no: i64,
    pub breeds: String,
    pub gender: String,
    pub farm: String,
    pub raw_weight: Option<f64>,
    pub prod_date: Option<NaiveDate>,
}

impl ProductionRow {
    /// Weight with missing measurements treated as zero, the convention used
    /// by every aggregation in the dashboard.
    pub fn weight(&self) -> f64 {
        self.raw_weight.unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub author: Option<String>,
    pub content: Option<String>,
}
