use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{ApplyPayload, UpdateApplicationStatusPayload};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicantForJob, ApplicationWithJob};
use crate::services::job_service::JobService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Reviewing,
    Interview,
    Offered,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interview time to store with a status change. Scheduling an interview
/// needs a time; any other status clears it.
pub fn resolve_interview_at(
    status: ApplicationStatus,
    interview_at: Option<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>> {
    match (status, interview_at) {
        (ApplicationStatus::Interview, None) => Err(Error::BadRequest(
            "interview_at is required when scheduling an interview".into(),
        )),
        (ApplicationStatus::Interview, Some(at)) => Ok(Some(at)),
        _ => Ok(None),
    }
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    jobs: JobService,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        let jobs = JobService::new(pool.clone());
        Self { pool, jobs }
    }

    pub async fn apply(&self, applicant_id: Uuid, payload: ApplyPayload) -> Result<Application> {
        let job = self.jobs.get_by_id(payload.job_id).await?;
        if job.status != "open" {
            return Err(Error::Conflict("This job is not accepting applications".into()));
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (job_id, applicant_id, cover_letter, status)
            VALUES ($1, $2, $3, 'applied')
            ON CONFLICT (job_id, applicant_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(payload.job_id)
        .bind(applicant_id)
        .bind(payload.cover_letter)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Conflict("You have already applied to this job".into()))?;

        tracing::info!(application_id = %application.id, job_id = %payload.job_id, "application submitted");
        Ok(application)
    }

    pub async fn list_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<ApplicationWithJob>> {
        let items = sqlx::query_as::<_, ApplicationWithJob>(
            r#"
            SELECT a.id, a.job_id, j.title AS job_title, a.status, a.interview_at, a.created_at
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.applicant_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_for_job(&self, job_id: Uuid, recruiter_id: Uuid) -> Result<Vec<ApplicantForJob>> {
        self.jobs.get_owned(job_id, recruiter_id).await?;
        let items = sqlx::query_as::<_, ApplicantForJob>(
            r#"
            SELECT a.id, a.applicant_id, p.name AS applicant_name, p.email AS applicant_email,
                   a.cover_letter, a.status, a.interview_at, a.created_at
            FROM applications a
            LEFT JOIN applicant_profiles p ON p.id = a.applicant_id
            WHERE a.job_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn update_status(
        &self,
        application_id: Uuid,
        recruiter_id: Uuid,
        payload: UpdateApplicationStatusPayload,
    ) -> Result<Application> {
        let interview_at = resolve_interview_at(payload.status, payload.interview_at)?;

        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications a
            SET status = $3, interview_at = $4, updated_at = NOW()
            FROM jobs j
            WHERE a.id = $1 AND j.id = a.job_id AND j.recruiter_id = $2
            RETURNING a.*
            "#,
        )
        .bind(application_id)
        .bind(recruiter_id)
        .bind(payload.status.as_str())
        .bind(interview_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))?;

        tracing::info!(
            application_id = %application_id,
            status = %payload.status,
            "application status changed"
        );
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interview_requires_a_time() {
        assert!(matches!(
            resolve_interview_at(ApplicationStatus::Interview, None),
            Err(Error::BadRequest(_))
        ));
        let at = Utc::now();
        assert_eq!(resolve_interview_at(ApplicationStatus::Interview, Some(at)).unwrap(), Some(at));
    }

    #[test]
    fn other_statuses_clear_the_interview_time() {
        let at = Utc::now();
        assert_eq!(resolve_interview_at(ApplicationStatus::Rejected, Some(at)).unwrap(), None);
        assert_eq!(resolve_interview_at(ApplicationStatus::Reviewing, None).unwrap(), None);
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let status: ApplicationStatus = serde_json::from_str("\"hired\"").unwrap();
        assert_eq!(status, ApplicationStatus::Hired);
        assert!(serde_json::from_str::<ApplicationStatus>("\"ghosted\"").is_err());
        assert_eq!(ApplicationStatus::Offered.to_string(), "offered");
    }
}
