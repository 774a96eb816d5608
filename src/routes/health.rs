use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
    });
    (StatusCode::OK, Json(body))
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service description and endpoint directory"))
)]
#[axum::debug_handler]
pub async fn home() -> impl IntoResponse {
    Json(json!({
        "msg": "This is QuizBit, a MCQ Simulation API!",
        "endpoints": {
            "register": "/api/register/",
            "verify otp": "/api/verify-otp/",
            "login": "/api/login/",
            "refresh token": "/api/token/refresh/",
            "question lists": "/api/questionlist/",
            "question detail": "/api/question-detail/<int:pk>/",
            "submit answer": "/api/submit-answer/",
            "user histories": "/api/user_history/",
            "openapi": "/api/openapi.json",
        }
    }))
}
