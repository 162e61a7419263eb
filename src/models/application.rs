use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub status: String,
    pub interview_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Application joined with its job, for the applicant's tracking list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationWithJob {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub status: String,
    pub interview_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Application joined with the applicant's profile, for recruiter review.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantForJob {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub interview_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}
