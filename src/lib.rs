pub mod config;
pub mod context;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::services::{
    application_service::ApplicationService,
    exam_service::{ExamService, SessionLimits},
    exam_store::{ExamStore, PgExamStore},
    grading_client::{GradingClient, HttpGradingClient},
    job_service::JobService,
    profile_service::ProfileService,
    results_service::ResultsService,
    skill_test_service::SkillTestService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: Arc<str>,
    pub exam_service: ExamService,
    pub profile_service: ProfileService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub skill_test_service: SkillTestService,
    pub results_service: ResultsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let timeout = Duration::from_secs(config.grading_timeout_secs);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let grader = HttpGradingClient::new(http_client, config.grading_endpoint_url.clone(), timeout);
        let store = PgExamStore::new(pool.clone());
        let limits = SessionLimits {
            idle_ttl: Duration::from_secs(config.exam_idle_ttl_secs),
            submitted_ttl: Duration::from_secs(config.exam_submitted_ttl_secs),
            max_per_applicant: config.exam_max_sessions_per_applicant,
        };
        let exam_service = ExamService::with_limits(Arc::new(store), Arc::new(grader), limits);

        Ok(Self::assemble(pool, &config.jwt_secret, exam_service))
    }

    /// Wires the exam flow to the given store and grader.
    pub fn with_exam_backends(
        pool: PgPool,
        jwt_secret: &str,
        store: Arc<dyn ExamStore>,
        grader: Arc<dyn GradingClient>,
    ) -> Self {
        Self::assemble(pool, jwt_secret, ExamService::new(store, grader))
    }

    fn assemble(pool: PgPool, jwt_secret: &str, exam_service: ExamService) -> Self {
        Self {
            exam_service,
            profile_service: ProfileService::new(pool.clone()),
            job_service: JobService::new(pool.clone()),
            application_service: ApplicationService::new(pool.clone()),
            skill_test_service: SkillTestService::new(pool.clone()),
            results_service: ResultsService::new(pool.clone()),
            jwt_secret: Arc::from(jwt_secret),
            pool,
        }
    }
}
