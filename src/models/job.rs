use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting. `tags` holds the required skills as a comma-separated list,
/// `salary` is free text entered by the poster (formatted on the way out by
/// `utils::salary::format_salary`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub description: String,
    pub tags: Option<String>,
    pub salary: Option<String>,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub education: Option<String>,
    pub experience_level: Option<String>,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
}
