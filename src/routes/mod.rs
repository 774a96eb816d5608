pub mod auth;
pub mod health;
pub mod questions;
pub mod submissions;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::middleware::{auth::require_bearer_auth, cors::cors_layer, rate_limit};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::home,
        health::health,
        auth::register,
        auth::verify_otp,
        auth::login,
        auth::refresh_token,
        questions::list_questions,
        questions::question_detail,
        submissions::submit_answer,
        submissions::user_history,
    ),
    components(schemas(
        crate::dto::auth_dto::RegisterRequest,
        crate::dto::auth_dto::VerifyOtpRequest,
        crate::dto::auth_dto::LoginRequest,
        crate::dto::auth_dto::RefreshRequest,
        crate::dto::auth_dto::MessageResponse,
        crate::dto::auth_dto::CodeSentResponse,
        crate::dto::auth_dto::LoginResponse,
        crate::dto::auth_dto::RefreshResponse,
        crate::services::token_service::TokenPair,
        crate::dto::question_dto::QuestionListResponse,
        crate::dto::question_dto::QuestionView,
        crate::dto::question_dto::AnswerView,
        crate::models::question::Category,
        crate::models::question::Difficulty,
        crate::dto::submission_dto::SubmitAnswerRequest,
        crate::dto::submission_dto::SubmitAnswerResponse,
        crate::dto::submission_dto::HistoryResponse,
        crate::dto::submission_dto::HistoryItem,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router. `main` serves it; the HTTP tests drive it with `oneshot`.
pub fn build_router(state: AppState, auth_rps: u32, cors_origins: &[String]) -> Router {
    let base_routes = Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json));

    let auth_api = Router::new()
        .route("/api/register/", post(auth::register))
        .route("/api/verify-otp/", post(auth::verify_otp))
        .route("/api/login/", post(auth::login))
        .route("/api/token/refresh/", post(auth::refresh_token))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(auth_rps),
            rate_limit::rps_middleware,
        ));

    let catalog_api = Router::new()
        .route("/api/questionlist/", get(questions::list_questions))
        .route("/api/question-detail/:id/", get(questions::question_detail));

    let practice_api = Router::new()
        .route("/api/submit-answer/", post(submissions::submit_answer))
        .route("/api/user_history/", get(submissions::user_history))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer_auth,
        ));

    base_routes
        .merge(auth_api)
        .merge(catalog_api)
        .merge(practice_api)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
