use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::skill_test_dto::{CreateSkillTestPayload, SkillTestResponse};
use crate::error::{conflict_on_unique, Error, Result};
use crate::models::skill_test::SkillTest;
use crate::models::test_applicant::{AssignmentStatus, TestApplicant};
use crate::models::test_question::TestQuestion;
use crate::models::test_response::TestResponse;

const ALREADY_PENDING: &str = "This applicant already has this test pending";

#[derive(Clone)]
pub struct SkillTestService {
    pool: PgPool,
}

impl SkillTestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the test and its question together.
    pub async fn create(&self, recruiter_id: Uuid, payload: CreateSkillTestPayload) -> Result<SkillTestResponse> {
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, SkillTest>(
            r#"
            INSERT INTO skill_tests (
                recruiter_id, title, category, programming_language,
                experience_level, difficulty, test_type, time_limit
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(recruiter_id)
        .bind(payload.title.trim())
        .bind(&payload.category)
        .bind(&payload.programming_language)
        .bind(&payload.experience_level)
        .bind(&payload.difficulty)
        .bind(&payload.test_type)
        .bind(payload.time_limit)
        .fetch_one(&mut *tx)
        .await?;

        let question = sqlx::query_as::<_, TestQuestion>(
            "INSERT INTO test_questions (test_id, question) VALUES ($1, $2) RETURNING *",
        )
        .bind(test.id)
        .bind(&payload.question)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(test_id = %test.id, recruiter_id = %recruiter_id, "skill test created");
        Ok(SkillTestResponse {
            test,
            question: question.question,
        })
    }

    pub async fn list_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<SkillTest>> {
        let items = sqlx::query_as::<_, SkillTest>(
            "SELECT * FROM skill_tests WHERE recruiter_id = $1 ORDER BY created_at DESC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_owned(&self, test_id: Uuid, recruiter_id: Uuid) -> Result<SkillTest> {
        let test = sqlx::query_as::<_, SkillTest>("SELECT * FROM skill_tests WHERE id = $1")
            .bind(test_id)
            .fetch_one(&self.pool)
            .await?;
        if test.recruiter_id != recruiter_id {
            return Err(Error::Forbidden("You do not own this skill test".into()));
        }
        Ok(test)
    }

    /// At most one pending assignment per applicant and test. A concurrent
    /// duplicate that slips past `NOT EXISTS` hits the partial unique index.
    pub async fn assign(&self, test_id: Uuid, recruiter_id: Uuid, applicant_id: Uuid) -> Result<TestApplicant> {
        self.get_owned(test_id, recruiter_id).await?;

        let assignment = sqlx::query_as::<_, TestApplicant>(
            r#"
            INSERT INTO test_applicants (applicant_id, test_id, status)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (
                SELECT 1 FROM test_applicants
                WHERE applicant_id = $1 AND test_id = $2 AND status = $3
            )
            RETURNING *
            "#,
        )
        .bind(applicant_id)
        .bind(test_id)
        .bind(AssignmentStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique(ALREADY_PENDING))?
        .ok_or_else(|| Error::Conflict(ALREADY_PENDING.into()))?;

        tracing::info!(
            assignment_id = %assignment.id,
            test_id = %test_id,
            applicant_id = %applicant_id,
            "skill test assigned"
        );
        Ok(assignment)
    }

    pub async fn cancel_assignment(&self, assignment_id: Uuid, recruiter_id: Uuid) -> Result<TestApplicant> {
        let assignment = sqlx::query_as::<_, TestApplicant>(
            r#"
            UPDATE test_applicants ta
            SET status = $3
            FROM skill_tests t
            WHERE ta.id = $1 AND t.id = ta.test_id AND t.recruiter_id = $2 AND ta.status = $4
            RETURNING ta.*
            "#,
        )
        .bind(assignment_id)
        .bind(recruiter_id)
        .bind(AssignmentStatus::Cancelled.as_str())
        .bind(AssignmentStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Conflict("Only pending assignments can be cancelled".into()))?;

        tracing::info!(assignment_id = %assignment_id, "assignment cancelled");
        Ok(assignment)
    }

    pub async fn list_responses(&self, test_id: Uuid, recruiter_id: Uuid) -> Result<Vec<TestResponse>> {
        self.get_owned(test_id, recruiter_id).await?;
        let items = sqlx::query_as::<_, TestResponse>(
            "SELECT * FROM test_responses WHERE test_id = $1 ORDER BY created_at DESC",
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
