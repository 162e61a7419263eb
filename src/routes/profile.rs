use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    context::SessionContext,
    dto::profile_dto::{
        CreateCompanyPayload, UpsertApplicantProfilePayload, UpsertRecruiterProfilePayload,
    },
    error::Result,
    models::{applicant_profile::ApplicantProfile, company::Company, recruiter_profile::RecruiterProfile},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/applicant/profile",
    responses(
        (status = 200, description = "Own applicant profile", body = Json<ApplicantProfile>),
        (status = 404, description = "Profile not created yet")
    )
)]
#[axum::debug_handler]
pub async fn get_applicant_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service.get_applicant(ctx.user_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/applicant/profile",
    request_body = UpsertApplicantProfilePayload,
    responses(
        (status = 200, description = "Profile saved", body = Json<ApplicantProfile>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn upsert_applicant_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<UpsertApplicantProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state.profile_service.upsert_applicant(ctx.user_id, payload).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/profile",
    responses(
        (status = 200, description = "Own recruiter profile", body = Json<RecruiterProfile>),
        (status = 404, description = "Profile not created yet")
    )
)]
#[axum::debug_handler]
pub async fn get_recruiter_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service.get_recruiter(ctx.user_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/recruiter/profile",
    request_body = UpsertRecruiterProfilePayload,
    responses(
        (status = 200, description = "Profile saved", body = Json<RecruiterProfile>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn upsert_recruiter_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<UpsertRecruiterProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state.profile_service.upsert_recruiter(ctx.user_id, payload).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    post,
    path = "/api/recruiter/companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Company created", body = Json<Company>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_company(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state.profile_service.create_company(ctx.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company found", body = Json<Company>),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let company = state.profile_service.get_company(id).await?;
    Ok(Json(company))
}
