use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::job::Job;
use crate::services::job_service::JobList;

pub const JOB_STATUSES: [&str; 3] = ["draft", "open", "closed"];

fn validate_job_status(status: &str) -> Result<(), ValidationError> {
    if JOB_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ValidationError::new("job_status"))
    }
}

fn validate_salary_range(min: Option<i32>, max: Option<i32>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("salary_range")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_salary"))]
pub struct CreateJobPayload {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    #[validate(range(min = 0))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0))]
    pub salary_max: Option<i32>,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(custom(function = "validate_job_status"))]
    pub status: Option<String>,
}

fn validate_create_salary(payload: &CreateJobPayload) -> Result<(), ValidationError> {
    validate_salary_range(payload.salary_min, payload.salary_max)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[validate(schema(function = "validate_update_salary"))]
pub struct UpdateJobPayload {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    #[validate(range(min = 0))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0))]
    pub salary_max: Option<i32>,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(custom(function = "validate_job_status"))]
    pub status: Option<String>,
}

fn validate_update_salary(payload: &UpdateJobPayload) -> Result<(), ValidationError> {
    validate_salary_range(payload.salary_min, payload.salary_max)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<JobList> for JobListResponse {
    fn from(list: JobList) -> Self {
        Self {
            items: list.items,
            total: list.total,
            page: list.page,
            per_page: list.per_page,
            total_pages: list.total_pages,
        }
    }
}
