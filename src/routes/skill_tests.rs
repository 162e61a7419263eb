use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    context::SessionContext,
    dto::skill_test_dto::{AssignTestPayload, CreateSkillTestPayload, SkillTestResponse},
    error::Result,
    models::{skill_test::SkillTest, test_applicant::TestApplicant, test_response::TestResponse},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/recruiter/skill-tests",
    request_body = CreateSkillTestPayload,
    responses(
        (status = 201, description = "Skill test created", body = Json<SkillTestResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_skill_test(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<CreateSkillTestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created = state.skill_test_service.create(ctx.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/skill-tests",
    responses(
        (status = 200, description = "Own skill tests", body = [SkillTest])
    )
)]
#[axum::debug_handler]
pub async fn list_skill_tests(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    let items = state.skill_test_service.list_for_recruiter(ctx.user_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/recruiter/skill-tests/{id}/assignments",
    params(
        ("id" = Uuid, Path, description = "Skill test ID")
    ),
    request_body = AssignTestPayload,
    responses(
        (status = 201, description = "Test assigned", body = Json<TestApplicant>),
        (status = 403, description = "Not the test owner"),
        (status = 409, description = "Already pending for this applicant")
    )
)]
#[axum::debug_handler]
pub async fn assign_skill_test(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignTestPayload>,
) -> Result<impl IntoResponse> {
    let assignment = state
        .skill_test_service
        .assign(id, ctx.user_id, payload.applicant_id)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    post,
    path = "/api/recruiter/assignments/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment cancelled", body = Json<TestApplicant>),
        (status = 409, description = "Assignment is not pending")
    )
)]
#[axum::debug_handler]
pub async fn cancel_assignment(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let assignment = state.skill_test_service.cancel_assignment(id, ctx.user_id).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/skill-tests/{id}/responses",
    params(
        ("id" = Uuid, Path, description = "Skill test ID")
    ),
    responses(
        (status = 200, description = "Graded responses", body = [TestResponse]),
        (status = 403, description = "Not the test owner")
    )
)]
#[axum::debug_handler]
pub async fn list_skill_test_responses(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let items = state.skill_test_service.list_responses(id, ctx.user_id).await?;
    Ok(Json(items))
}
