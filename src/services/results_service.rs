use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::results_dto::{CriteriaAverages, ResultsSummary};
use crate::error::Result;
use crate::models::test_response::TestResultRow;

#[derive(Clone)]
pub struct ResultsService {
    pool: PgPool,
}

impl ResultsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, applicant_id: Uuid) -> Result<Vec<TestResultRow>> {
        let rows = sqlx::query_as::<_, TestResultRow>(
            r#"
            SELECT r.id, r.test_id, t.title AS test_title, t.category, t.programming_language,
                   r.code_quality, r.maintainability, r.algorithm, r.readability, r.performance,
                   r.score, r.review_comments, r.created_at
            FROM test_responses r
            JOIN skill_tests t ON t.id = r.test_id
            WHERE r.applicant_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn summary(&self, applicant_id: Uuid) -> Result<ResultsSummary> {
        let rows = self.list(applicant_id).await?;
        Ok(summarize(&rows))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn summarize(rows: &[TestResultRow]) -> ResultsSummary {
    if rows.is_empty() {
        return ResultsSummary::default();
    }
    let n = rows.len() as f64;
    let avg = |f: fn(&TestResultRow) -> i32| round2(rows.iter().map(|r| f(r) as f64).sum::<f64>() / n);

    ResultsSummary {
        count: rows.len(),
        average_score: avg(|r| r.score),
        criteria: CriteriaAverages {
            code_quality: avg(|r| r.code_quality),
            maintainability: avg(|r| r.maintainability),
            algorithm: avg(|r| r.algorithm),
            readability: avg(|r| r.readability),
            performance: avg(|r| r.performance),
        },
    }
}
