use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::profile_dto::{
    CreateCompanyPayload, UpsertApplicantProfilePayload, UpsertRecruiterProfilePayload,
};
use crate::error::{Error, Result};
use crate::models::applicant_profile::ApplicantProfile;
use crate::models::company::Company;
use crate::models::recruiter_profile::RecruiterProfile;

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_applicant(&self, applicant_id: Uuid) -> Result<ApplicantProfile> {
        sqlx::query_as::<_, ApplicantProfile>("SELECT * FROM applicant_profiles WHERE id = $1")
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Applicant profile not found".into()))
    }

    pub async fn upsert_applicant(
        &self,
        applicant_id: Uuid,
        payload: UpsertApplicantProfilePayload,
    ) -> Result<ApplicantProfile> {
        let skills = payload.normalized_skills();
        let profile = sqlx::query_as::<_, ApplicantProfile>(
            r#"
            INSERT INTO applicant_profiles (
                id, name, email, phone, location, skills, experience_years, resume_url
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                skills = EXCLUDED.skills,
                experience_years = EXCLUDED.experience_years,
                resume_url = EXCLUDED.resume_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(applicant_id)
        .bind(payload.name.trim())
        .bind(payload.email.trim())
        .bind(payload.phone)
        .bind(payload.location)
        .bind(skills)
        .bind(payload.experience_years)
        .bind(payload.resume_url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(applicant_id = %applicant_id, "applicant profile saved");
        Ok(profile)
    }

    pub async fn get_recruiter(&self, recruiter_id: Uuid) -> Result<RecruiterProfile> {
        sqlx::query_as::<_, RecruiterProfile>("SELECT * FROM recruiter_profiles WHERE id = $1")
            .bind(recruiter_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Recruiter profile not found".into()))
    }

    pub async fn upsert_recruiter(
        &self,
        recruiter_id: Uuid,
        payload: UpsertRecruiterProfilePayload,
    ) -> Result<RecruiterProfile> {
        if let Some(company_id) = payload.company_id {
            self.get_company(company_id).await?;
        }

        let profile = sqlx::query_as::<_, RecruiterProfile>(
            r#"
            INSERT INTO recruiter_profiles (id, name, email, position, company_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                position = EXCLUDED.position,
                company_id = EXCLUDED.company_id,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(recruiter_id)
        .bind(payload.name.trim())
        .bind(payload.email.trim())
        .bind(payload.position)
        .bind(payload.company_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(recruiter_id = %recruiter_id, "recruiter profile saved");
        Ok(profile)
    }

    pub async fn create_company(&self, created_by: Uuid, payload: CreateCompanyPayload) -> Result<Company> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, website, description, location, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.website)
        .bind(payload.description)
        .bind(payload.location)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(company_id = %company.id, created_by = %created_by, "company created");
        Ok(company)
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Company not found".into()))
    }
}
