use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillTest {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub category: String,
    pub programming_language: String,
    pub experience_level: String,
    pub difficulty: String,
    pub test_type: String,
    /// Minutes.
    pub time_limit: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl SkillTest {
    pub fn time_limit_seconds(&self) -> u32 {
        u32::try_from(self.time_limit).unwrap_or(0).saturating_mul(60)
    }
}
