use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::{Error, Result};
use crate::models::skill_test::SkillTest;
use crate::models::test_applicant::{AssignmentStatus, PendingAssignment, TestApplicant};
use crate::models::test_question::TestQuestion;
use crate::models::test_response::{NewTestResponse, TestResponse};

/// Backend row operations used by the exam flow. Every call is scoped to the
/// applicant in `ctx`.
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn list_pending_assignments(&self, ctx: &SessionContext) -> Result<Vec<PendingAssignment>>;

    async fn fetch_skill_test(&self, ctx: &SessionContext, test_id: Uuid) -> Result<SkillTest>;

    async fn fetch_question(&self, ctx: &SessionContext, test_id: Uuid) -> Result<TestQuestion>;

    async fn find_pending_assignment(
        &self,
        ctx: &SessionContext,
        test_id: Uuid,
    ) -> Result<Option<TestApplicant>>;

    /// Inserts the response and marks the assignment completed as one unit.
    /// Fails with `Conflict` if the assignment is no longer pending.
    async fn record_submission(
        &self,
        ctx: &SessionContext,
        assignment_id: Uuid,
        response: NewTestResponse,
    ) -> Result<TestResponse>;
}

#[derive(Clone)]
pub struct PgExamStore {
    pool: PgPool,
}

impl PgExamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamStore for PgExamStore {
    async fn list_pending_assignments(&self, ctx: &SessionContext) -> Result<Vec<PendingAssignment>> {
        let rows = sqlx::query_as::<_, PendingAssignment>(
            r#"
            SELECT ta.id AS assignment_id, st.id AS test_id, st.title,
                   st.programming_language, st.difficulty, st.time_limit
            FROM test_applicants ta
            JOIN skill_tests st ON st.id = ta.test_id
            WHERE ta.applicant_id = $1 AND ta.status = 'pending'
            ORDER BY ta.assigned_at ASC
            "#,
        )
        .bind(ctx.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_skill_test(&self, _ctx: &SessionContext, test_id: Uuid) -> Result<SkillTest> {
        let test = sqlx::query_as::<_, SkillTest>(r#"SELECT * FROM skill_tests WHERE id = $1"#)
            .bind(test_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(test)
    }

    async fn fetch_question(&self, _ctx: &SessionContext, test_id: Uuid) -> Result<TestQuestion> {
        let question = sqlx::query_as::<_, TestQuestion>(
            r#"SELECT * FROM test_questions WHERE test_id = $1 ORDER BY created_at ASC LIMIT 1"#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("This test has no question yet".into()))?;
        Ok(question)
    }

    async fn find_pending_assignment(
        &self,
        ctx: &SessionContext,
        test_id: Uuid,
    ) -> Result<Option<TestApplicant>> {
        let row = sqlx::query_as::<_, TestApplicant>(
            r#"
            SELECT * FROM test_applicants
            WHERE applicant_id = $1 AND test_id = $2 AND status = 'pending'
            ORDER BY assigned_at ASC
            LIMIT 1
            "#,
        )
        .bind(ctx.user_id)
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn record_submission(
        &self,
        ctx: &SessionContext,
        assignment_id: Uuid,
        response: NewTestResponse,
    ) -> Result<TestResponse> {
        let mut tx = self.pool.begin().await?;

        let consumed: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE test_applicants
            SET status = 'completed'
            WHERE id = $1 AND applicant_id = $2 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(assignment_id)
        .bind(ctx.user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if consumed.is_none() {
            return Err(Error::Conflict(
                "This test has already been submitted".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, TestResponse>(
            r#"
            INSERT INTO test_responses (
                test_applicant_id, applicant_id, test_id, answer,
                code_quality, maintainability, algorithm, readability, performance,
                score, review_comments, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(ctx.user_id)
        .bind(response.test_id)
        .bind(&response.answer)
        .bind(response.code_quality)
        .bind(response.maintainability)
        .bind(response.algorithm)
        .bind(response.readability)
        .bind(response.performance)
        .bind(response.score)
        .bind(&response.review_comments)
        .bind(response.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}

#[derive(Default)]
struct MemoryTables {
    tests: HashMap<Uuid, SkillTest>,
    questions: HashMap<Uuid, TestQuestion>,
    assignments: Vec<TestApplicant>,
    responses: Vec<TestResponse>,
    fail_next_write: bool,
}

/// In-memory store for tests and local runs without Postgres.
#[derive(Clone, Default)]
pub struct InMemoryExamStore {
    inner: Arc<Mutex<MemoryTables>>,
}

impl InMemoryExamStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, MemoryTables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_test(&self, test: SkillTest, question: &str) {
        let mut tables = self.tables();
        tables.questions.insert(
            test.id,
            TestQuestion {
                id: Uuid::new_v4(),
                test_id: test.id,
                question: question.to_string(),
                created_at: Some(chrono::Utc::now()),
            },
        );
        tables.tests.insert(test.id, test);
    }

    pub fn assign(&self, applicant_id: Uuid, test_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.tables().assignments.push(TestApplicant {
            id,
            applicant_id,
            test_id,
            status: AssignmentStatus::Pending.as_str().to_string(),
            assigned_at: Some(chrono::Utc::now()),
        });
        id
    }

    pub fn set_assignment_status(&self, assignment_id: Uuid, status: AssignmentStatus) {
        if let Some(a) = self
            .tables()
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
        {
            a.status = status.as_str().to_string();
        }
    }

    pub fn assignment_status(&self, assignment_id: Uuid) -> Option<String> {
        self.tables()
            .assignments
            .iter()
            .find(|a| a.id == assignment_id)
            .map(|a| a.status.clone())
    }

    pub fn responses(&self) -> Vec<TestResponse> {
        self.tables().responses.clone()
    }

    /// Makes the next `record_submission` fail as a database error would.
    pub fn fail_next_write(&self) {
        self.tables().fail_next_write = true;
    }
}

#[async_trait]
impl ExamStore for InMemoryExamStore {
    async fn list_pending_assignments(&self, ctx: &SessionContext) -> Result<Vec<PendingAssignment>> {
        let tables = self.tables();
        let rows = tables
            .assignments
            .iter()
            .filter(|a| a.applicant_id == ctx.user_id && a.status == AssignmentStatus::Pending.as_str())
            .filter_map(|a| {
                tables.tests.get(&a.test_id).map(|t| PendingAssignment {
                    assignment_id: a.id,
                    test_id: t.id,
                    title: t.title.clone(),
                    programming_language: t.programming_language.clone(),
                    difficulty: t.difficulty.clone(),
                    time_limit: t.time_limit,
                })
            })
            .collect();
        Ok(rows)
    }

    async fn fetch_skill_test(&self, _ctx: &SessionContext, test_id: Uuid) -> Result<SkillTest> {
        self.tables()
            .tests
            .get(&test_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Resource not found".into()))
    }

    async fn fetch_question(&self, _ctx: &SessionContext, test_id: Uuid) -> Result<TestQuestion> {
        self.tables()
            .questions
            .get(&test_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("This test has no question yet".into()))
    }

    async fn find_pending_assignment(
        &self,
        ctx: &SessionContext,
        test_id: Uuid,
    ) -> Result<Option<TestApplicant>> {
        Ok(self
            .tables()
            .assignments
            .iter()
            .find(|a| {
                a.applicant_id == ctx.user_id
                    && a.test_id == test_id
                    && a.status == AssignmentStatus::Pending.as_str()
            })
            .cloned())
    }

    async fn record_submission(
        &self,
        ctx: &SessionContext,
        assignment_id: Uuid,
        response: NewTestResponse,
    ) -> Result<TestResponse> {
        let mut tables = self.tables();
        if std::mem::take(&mut tables.fail_next_write) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }

        let assignment = tables
            .assignments
            .iter_mut()
            .find(|a| {
                a.id == assignment_id
                    && a.applicant_id == ctx.user_id
                    && a.status == AssignmentStatus::Pending.as_str()
            })
            .ok_or_else(|| Error::Conflict("This test has already been submitted".into()))?;
        assignment.status = AssignmentStatus::Completed.as_str().to_string();

        let row = TestResponse {
            id: Uuid::new_v4(),
            test_applicant_id: assignment_id,
            applicant_id: ctx.user_id,
            test_id: response.test_id,
            answer: response.answer,
            code_quality: response.code_quality,
            maintainability: response.maintainability,
            algorithm: response.algorithm,
            readability: response.readability,
            performance: response.performance,
            score: response.score,
            review_comments: response.review_comments,
            created_at: response.created_at,
        };
        tables.responses.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Role;
    use chrono::Utc;

    fn new_response(test_id: Uuid) -> NewTestResponse {
        NewTestResponse {
            test_id,
            answer: "answer".into(),
            code_quality: 10,
            maintainability: 10,
            algorithm: 10,
            readability: 10,
            performance: 10,
            score: 50,
            review_comments: "fine".into(),
            created_at: Utc::now(),
        }
    }

    fn skill_test() -> SkillTest {
        SkillTest {
            id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            title: "SQL joins".into(),
            category: "data".into(),
            programming_language: "sql".into(),
            experience_level: "mid".into(),
            difficulty: "medium".into(),
            test_type: "coding".into(),
            time_limit: 30,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn second_submission_for_same_assignment_conflicts() {
        let store = InMemoryExamStore::new();
        let ctx = SessionContext::new(Uuid::new_v4(), Role::Applicant, "t");
        let test = skill_test();
        let test_id = test.id;
        store.add_test(test, "SELECT ...");
        let assignment = store.assign(ctx.user_id, test_id);

        store
            .record_submission(&ctx, assignment, new_response(test_id))
            .await
            .unwrap();
        let second = store.record_submission(&ctx, assignment, new_response(test_id)).await;

        assert!(matches!(second, Err(Error::Conflict(_))));
        assert_eq!(store.responses().len(), 1);
        assert_eq!(store.assignment_status(assignment).as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn pending_list_is_scoped_to_the_applicant() {
        let store = InMemoryExamStore::new();
        let me = SessionContext::new(Uuid::new_v4(), Role::Applicant, "t");
        let test = skill_test();
        let test_id = test.id;
        store.add_test(test, "q");
        store.assign(me.user_id, test_id);
        store.assign(Uuid::new_v4(), test_id);
        let cancelled = store.assign(me.user_id, test_id);
        store.set_assignment_status(cancelled, AssignmentStatus::Cancelled);

        let pending = store.list_pending_assignments(&me).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "SQL joins");
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_effects() {
        let store = InMemoryExamStore::new();
        let ctx = SessionContext::new(Uuid::new_v4(), Role::Applicant, "t");
        let test = skill_test();
        let test_id = test.id;
        store.add_test(test, "q");
        let assignment = store.assign(ctx.user_id, test_id);

        store.fail_next_write();
        let result = store.record_submission(&ctx, assignment, new_response(test_id)).await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(store.responses().is_empty());
        assert_eq!(store.assignment_status(assignment).as_deref(), Some("pending"));
    }
}
