use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Json},
};

use crate::{
    context::SessionContext,
    dto::results_dto::ResultsSummary,
    error::Result,
    models::test_response::TestResultRow,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/applicant/results",
    responses(
        (status = 200, description = "Own graded results, newest first", body = [TestResultRow])
    )
)]
#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    let rows = state.results_service.list(ctx.user_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/applicant/results/summary",
    responses(
        (status = 200, description = "Average score and per-criterion averages", body = Json<ResultsSummary>)
    )
)]
#[axum::debug_handler]
pub async fn results_summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    let summary = state.results_service.summary(ctx.user_id).await?;
    Ok(Json(summary))
}
