use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::skill_test::SkillTest;

pub const MAX_TIME_LIMIT_MINUTES: i32 = 240;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSkillTestPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub programming_language: String,
    #[validate(length(min = 1))]
    pub experience_level: String,
    #[validate(length(min = 1))]
    pub difficulty: String,
    #[validate(length(min = 1))]
    pub test_type: String,
    /// Minutes.
    #[validate(range(min = 1, max = 240))]
    pub time_limit: i32,
    /// Becomes the starting content of the applicant's answer.
    #[validate(length(min = 1))]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTestResponse {
    #[serde(flatten)]
    pub test: SkillTest,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTestPayload {
    pub applicant_id: Uuid,
}
