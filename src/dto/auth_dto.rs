use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::token_service::TokenPair;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "crate::utils::validation::deserialize_email")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(
        length(min = 8, max = 128, message = "Password must be between 8 and 128 characters."),
        custom(function = "crate::utils::validation::password_not_blank")
    )]
    pub password: String,
    #[validate(length(max = 150))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[serde(deserialize_with = "crate::utils::validation::deserialize_email")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(range(min = 1000, max = 9999, message = "The OTP is a 4 digit number."))]
    pub otp: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "crate::utils::validation::deserialize_email")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

/// Reply of the endpoints that (re)send a verification code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CodeSentResponse {
    pub msg: String,
    pub email_sent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: TokenPair,
    pub msg: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}
