use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::routes::{applications, exam, health, jobs, profile, results, skill_tests};

#[derive(OpenApi)]
#[openapi(
    info(title = "Recruiting platform API"),
    paths(
        health::health,
        exam::open_session,
        exam::get_session,
        exam::load_assignments,
        exam::select_test,
        exam::start_exam,
        exam::update_answer,
        exam::submit_exam,
        exam::close_session,
        profile::get_applicant_profile,
        profile::upsert_applicant_profile,
        profile::get_recruiter_profile,
        profile::upsert_recruiter_profile,
        profile::create_company,
        profile::get_company,
        jobs::create_job,
        jobs::update_job,
        jobs::delete_job,
        jobs::list_jobs,
        jobs::get_job,
        applications::apply,
        applications::list_my_applications,
        applications::list_job_applications,
        applications::update_application_status,
        skill_tests::create_skill_test,
        skill_tests::list_skill_tests,
        skill_tests::assign_skill_test,
        skill_tests::cancel_assignment,
        skill_tests::list_skill_test_responses,
        results::list_results,
        results::results_summary,
    )
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
