use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResponse {
    pub id: Uuid,
    pub test_applicant_id: Uuid,
    pub applicant_id: Uuid,
    pub test_id: Uuid,
    pub answer: String,
    pub code_quality: i32,
    pub maintainability: i32,
    pub algorithm: i32,
    pub readability: i32,
    pub performance: i32,
    pub score: i32,
    pub review_comments: String,
    pub created_at: DateTime<Utc>,
}

/// Row about to be written for a graded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestResponse {
    pub test_id: Uuid,
    pub answer: String,
    pub code_quality: i32,
    pub maintainability: i32,
    pub algorithm: i32,
    pub readability: i32,
    pub performance: i32,
    pub score: i32,
    pub review_comments: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResultRow {
    pub id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub category: String,
    pub programming_language: String,
    pub code_quality: i32,
    pub maintainability: i32,
    pub algorithm: i32,
    pub readability: i32,
    pub performance: i32,
    pub score: i32,
    pub review_comments: String,
    pub created_at: DateTime<Utc>,
}
