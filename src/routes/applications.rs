use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    context::SessionContext,
    dto::application_dto::{ApplyPayload, UpdateApplicationStatusPayload},
    error::Result,
    models::application::{Application, ApplicantForJob, ApplicationWithJob},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applicant/applications",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<Application>),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already applied or job closed")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state.application_service.apply(ctx.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/applicant/applications",
    responses(
        (status = 200, description = "Own applications with status", body = [ApplicationWithJob])
    )
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    let items = state.application_service.list_for_applicant(ctx.user_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/jobs/{id}/applications",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Applicants for the job", body = [ApplicantForJob]),
        (status = 403, description = "Not the job owner")
    )
)]
#[axum::debug_handler]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let items = state.application_service.list_for_job(id, ctx.user_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    patch,
    path = "/api/recruiter/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = Json<Application>),
        (status = 400, description = "Interview time missing"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .update_status(id, ctx.user_id, payload)
        .await?;
    Ok(Json(application))
}
