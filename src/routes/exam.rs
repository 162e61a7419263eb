use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    context::SessionContext,
    dto::exam_dto::{
        ConfirmRequest, ExamSessionView, OpenSessionRequest, SelectTestRequest, SubmissionResponse,
        UpdateAnswerRequest,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/exam/sessions",
    request_body = OpenSessionRequest,
    responses(
        (status = 201, description = "Exam session opened", body = Json<ExamSessionView>),
        (status = 400, description = "Name or email missing"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
#[axum::debug_handler]
pub async fn open_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<OpenSessionRequest>,
) -> Result<impl IntoResponse> {
    let view = state.exam_service.open_session(&ctx, payload)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/exam/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    responses(
        (status = 200, description = "Current exam state", body = Json<ExamSessionView>),
        (status = 404, description = "Exam session not found")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state.exam_service.view(&ctx, id)?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/exam/sessions/{id}/assignments",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    responses(
        (status = 200, description = "Single test loaded or selection offered", body = Json<ExamSessionView>),
        (status = 404, description = "No pending skill tests"),
        (status = 409, description = "A test is already loaded")
    )
)]
#[axum::debug_handler]
pub async fn load_assignments(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state.exam_service.load_assignments(&ctx, id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/exam/sessions/{id}/select",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    request_body = SelectTestRequest,
    responses(
        (status = 200, description = "Selected test loaded", body = Json<ExamSessionView>),
        (status = 409, description = "Test was not offered")
    )
)]
#[axum::debug_handler]
pub async fn select_test(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectTestRequest>,
) -> Result<impl IntoResponse> {
    let view = state.exam_service.select_test(&ctx, id, payload.test_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/exam/sessions/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Countdown started", body = Json<ExamSessionView>),
        (status = 409, description = "Not confirmed or not startable")
    )
)]
#[axum::debug_handler]
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<impl IntoResponse> {
    let view = state.exam_service.start(&ctx, id, payload.confirmed)?;
    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/api/exam/sessions/{id}/answer",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    request_body = UpdateAnswerRequest,
    responses(
        (status = 200, description = "Answer saved in the session", body = Json<ExamSessionView>),
        (status = 409, description = "Answer is not editable")
    )
)]
#[axum::debug_handler]
pub async fn update_answer(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnswerRequest>,
) -> Result<impl IntoResponse> {
    let view = state.exam_service.update_answer(&ctx, id, payload.answer)?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/exam/sessions/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Answer graded and saved", body = Json<SubmissionResponse>),
        (status = 400, description = "Name, email or answer missing"),
        (status = 409, description = "Not confirmed, already submitted or no pending assignment"),
        (status = 500, description = "Saving failed"),
        (status = 502, description = "Grading failed")
    )
)]
#[axum::debug_handler]
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state.exam_service.submit(&ctx, id, payload.confirmed).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    delete,
    path = "/api/exam/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam session ID")
    ),
    responses(
        (status = 204, description = "Session closed and timer released"),
        (status = 404, description = "Exam session not found")
    )
)]
#[axum::debug_handler]
pub async fn close_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.exam_service.close_session(&ctx, id)?;
    Ok(StatusCode::NO_CONTENT)
}
