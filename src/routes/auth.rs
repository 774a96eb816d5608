use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::{
    dto::auth_dto::{
        CodeSentResponse, LoginRequest, LoginResponse, MessageResponse, RefreshRequest,
        RefreshResponse, RegisterRequest, VerifyOtpRequest,
    },
    error::Result,
    extract::ValidatedJson,
    services::auth_service::{LoginOutcome, RegisterOutcome},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/register/",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Verification code sent", body = CodeSentResponse),
        (status = 400, description = "Invalid payload or email already in use"),
        (status = 403, description = "Account is blocked")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Response> {
    let body = match state.auth_service.register(payload).await? {
        RegisterOutcome::Created(delivery) => CodeSentResponse {
            msg: "An OTP has been sent to your email. Please check your inbox or spam folder."
                .to_string(),
            email_sent: delivery.is_sent(),
        },
        RegisterOutcome::Reissued(delivery) => CodeSentResponse {
            msg: "The user is already registered but not verified. A new OTP has been sent to your mail"
                .to_string(),
            email_sent: delivery.is_sent(),
        },
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/verify-otp/",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account verified", body = MessageResponse),
        (status = 400, description = "Invalid OTP or already verified"),
        (status = 403, description = "Account is blocked"),
        (status = 404, description = "Email not registered")
    )
)]
#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyOtpRequest>,
) -> Result<Response> {
    state.auth_service.verify_otp(payload).await?;
    Ok(Json(MessageResponse {
        msg: "Successfully verified".to_string(),
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued, or a new verification code sent", body = LoginResponse),
        (status = 401, description = "Incorrect credentials"),
        (status = 403, description = "Account is blocked")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Response> {
    let response = match state.auth_service.login(payload).await? {
        LoginOutcome::Authenticated { tokens, email } => Json(LoginResponse {
            token: tokens,
            msg: "Login Success".to_string(),
            email,
        })
        .into_response(),
        LoginOutcome::VerificationResent(delivery) => Json(CodeSentResponse {
            msg: "The user is already registered but not verified yet. A new OTP has been sent to your mail"
                .to_string(),
            email_sent: delivery.is_sent(),
        })
        .into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Refresh token invalid or expired")
    )
)]
#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let access = state.auth_service.refresh(&payload.refresh)?;
    Ok(Json(RefreshResponse { access }))
}
