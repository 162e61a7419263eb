pub mod applications;
pub mod docs;
pub mod exam;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod results;
pub mod skill_tests;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::{require_applicant, require_authenticated, require_recruiter};
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Every surface gets its own one-second request budget.
pub fn app_router(state: AppState, api_rps: u32) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let exam_api = Router::new()
        .route("/api/exam/sessions", post(exam::open_session))
        .route(
            "/api/exam/sessions/:id",
            get(exam::get_session).delete(exam::close_session),
        )
        .route(
            "/api/exam/sessions/:id/assignments",
            post(exam::load_assignments),
        )
        .route("/api/exam/sessions/:id/select", post(exam::select_test))
        .route("/api/exam/sessions/:id/start", post(exam::start_exam))
        .route("/api/exam/sessions/:id/answer", put(exam::update_answer))
        .route("/api/exam/sessions/:id/submit", post(exam::submit_exam))
        .route_layer(from_fn_with_state(state.clone(), require_applicant))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware));

    let applicant_api = Router::new()
        .route(
            "/api/applicant/profile",
            get(profile::get_applicant_profile).put(profile::upsert_applicant_profile),
        )
        .route(
            "/api/applicant/applications",
            get(applications::list_my_applications).post(applications::apply),
        )
        .route("/api/applicant/results", get(results::list_results))
        .route(
            "/api/applicant/results/summary",
            get(results::results_summary),
        )
        .route_layer(from_fn_with_state(state.clone(), require_applicant))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware));

    let recruiter_api = Router::new()
        .route(
            "/api/recruiter/profile",
            get(profile::get_recruiter_profile).put(profile::upsert_recruiter_profile),
        )
        .route("/api/recruiter/companies", post(profile::create_company))
        .route("/api/recruiter/jobs", post(jobs::create_job))
        .route(
            "/api/recruiter/jobs/:id",
            patch(jobs::update_job).delete(jobs::delete_job),
        )
        .route(
            "/api/recruiter/jobs/:id/applications",
            get(applications::list_job_applications),
        )
        .route(
            "/api/recruiter/applications/:id/status",
            patch(applications::update_application_status),
        )
        .route(
            "/api/recruiter/skill-tests",
            get(skill_tests::list_skill_tests).post(skill_tests::create_skill_test),
        )
        .route(
            "/api/recruiter/skill-tests/:id/assignments",
            post(skill_tests::assign_skill_test),
        )
        .route(
            "/api/recruiter/skill-tests/:id/responses",
            get(skill_tests::list_skill_test_responses),
        )
        .route(
            "/api/recruiter/assignments/:id/cancel",
            post(skill_tests::cancel_assignment),
        )
        .route_layer(from_fn_with_state(state.clone(), require_recruiter))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware));

    let shared_api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/companies/:id", get(profile::get_company))
        .route_layer(from_fn_with_state(state.clone(), require_authenticated))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware));

    base_routes
        .merge(exam_api)
        .merge(applicant_api)
        .merge(recruiter_api)
        .merge(shared_api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
