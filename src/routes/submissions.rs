use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::submission_dto::{HistoryResponse, SubmitAnswerRequest, SubmitAnswerResponse},
    error::Result,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/submit-answer/",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 201, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 400, description = "Invalid payload or question already answered"),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse> {
    let is_correct = state.submission_service.submit(user.id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitAnswerResponse {
            msg: "Solution submitted successfully.".to_string(),
            is_correct,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user_history/",
    responses(
        (status = 200, description = "Caller's practice history", body = HistoryResponse),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn user_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryResponse>> {
    let history = state.submission_service.history(user.id).await?;
    Ok(Json(history))
}
