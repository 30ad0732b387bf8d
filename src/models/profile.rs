use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: Uuid,
    pub summary: Option<String>,
}

/// Candidate-authored education record. Dates are stored as free text
/// ("2019", "Jun 2021") since they come straight from the profile form.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Education {
    pub id: i64,
    pub profile_id: i64,
    pub degree: String,
    pub institution: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experience {
    pub id: i64,
    pub profile_id: i64,
    pub title: String,
    pub company: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
