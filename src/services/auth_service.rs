use std::borrow::Cow;
use std::sync::Arc;

use validator::{ValidationError, ValidationErrors};

use crate::config::BlockedVerifyResponse;
use crate::database::store::UserStore;
use crate::dto::auth_dto::{LoginRequest, RegisterRequest, VerifyOtpRequest};
use crate::error::{Error, Result};
use crate::models::user::{AccountStatus, NewUser, User};
use crate::services::otp_service::{Delivery, OtpService};
use crate::services::token_service::{TokenPair, TokenService};
use crate::utils::crypto::{codes_match, hash_password, verify_password};
use crate::utils::validation::normalize_email;

pub const MSG_NOT_REGISTERED: &str =
    "The user is not registered yet. Please register first to get a OTP";
pub const MSG_ALREADY_VERIFIED: &str = "The user is already verified. Please log in";
pub const MSG_INVALID_OTP: &str = "Invalid OTP";
pub const MSG_BLOCKED: &str = "The user is blocked. Please contact the authority";
pub const MSG_BAD_CREDENTIALS: &str = "email or password is incorrect";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new account was stored and a code issued.
    Created(Delivery),
    /// The email belonged to an account still awaiting verification; a new code was issued.
    Reissued(Delivery),
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated { tokens: TokenPair, email: String },
    /// Correct credentials on an account that never completed verification.
    VerificationResent(Delivery),
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    otp: OtpService,
    tokens: TokenService,
    blocked_verify_response: BlockedVerifyResponse,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        otp: OtpService,
        tokens: TokenService,
        blocked_verify_response: BlockedVerifyResponse,
    ) -> Self {
        Self {
            users,
            otp,
            tokens,
            blocked_verify_response,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterOutcome> {
        let email = normalize_email(&req.email);

        if let Some(existing) = self.users.find_by_email(&email).await? {
            return self.register_existing(existing).await;
        }

        let password_hash = hash_password(&req.password)?;
        let name = req
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let created = self
            .users
            .create(NewUser {
                email: email.clone(),
                name,
                password_hash,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account registered");
                let delivery = self.otp.issue(&user.email).await?;
                Ok(RegisterOutcome::Created(delivery))
            }
            // Lost a race against a concurrent registration of the same email.
            Err(Error::Conflict(_)) => {
                let existing = self.users.find_by_email(&email).await?.ok_or_else(|| {
                    Error::Internal(format!("account {} vanished after conflict", email))
                })?;
                self.register_existing(existing).await
            }
            Err(err) => Err(err),
        }
    }

    async fn register_existing(&self, user: User) -> Result<RegisterOutcome> {
        match user.status {
            AccountStatus::Unverified | AccountStatus::Pending => {
                let delivery = self.otp.issue(&user.email).await?;
                Ok(RegisterOutcome::Reissued(delivery))
            }
            AccountStatus::Active => Err(duplicate_email()),
            AccountStatus::Blocked => Err(Error::Forbidden(MSG_BLOCKED.to_string())),
        }
    }

    pub async fn verify_otp(&self, req: VerifyOtpRequest) -> Result<()> {
        let email = normalize_email(&req.email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(Error::NotFound(MSG_NOT_REGISTERED.to_string()));
        };

        match user.status {
            AccountStatus::Active => Err(Error::BadRequest(MSG_ALREADY_VERIFIED.to_string())),
            AccountStatus::Blocked => match self.blocked_verify_response {
                BlockedVerifyResponse::Blocked => Err(Error::Forbidden(MSG_BLOCKED.to_string())),
                BlockedVerifyResponse::NotRegistered => {
                    Err(Error::NotFound(MSG_NOT_REGISTERED.to_string()))
                }
            },
            AccountStatus::Unverified | AccountStatus::Pending => {
                let matches = user
                    .otp
                    .map(|challenge| codes_match(req.otp, challenge.code))
                    .unwrap_or(false);
                if !matches || !self.users.activate(user.id, req.otp).await? {
                    tracing::info!(user_id = %user.id, "verification code rejected");
                    return Err(Error::BadRequest(MSG_INVALID_OTP.to_string()));
                }
                tracing::info!(user_id = %user.id, "account verified");
                Ok(())
            }
        }
    }

    /// Every credential failure yields the same `Unauthorized` message, whether
    /// or not the email is known.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome> {
        let email = normalize_email(&req.email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(Error::Unauthorized(MSG_BAD_CREDENTIALS.to_string()));
        };
        if !verify_password(&req.password, &user.password_hash)? {
            return Err(Error::Unauthorized(MSG_BAD_CREDENTIALS.to_string()));
        }

        match user.status {
            AccountStatus::Active => {
                let tokens = self.tokens.issue_pair(user.id)?;
                tracing::info!(user_id = %user.id, "login succeeded");
                Ok(LoginOutcome::Authenticated {
                    tokens,
                    email: user.email,
                })
            }
            AccountStatus::Unverified | AccountStatus::Pending => {
                let delivery = self.otp.issue(&user.email).await?;
                Ok(LoginOutcome::VerificationResent(delivery))
            }
            AccountStatus::Blocked => Err(Error::Forbidden(MSG_BLOCKED.to_string())),
        }
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        self.tokens.refresh_access(refresh_token)
    }
}

fn duplicate_email() -> Error {
    let mut err = ValidationError::new("unique");
    err.message = Some(Cow::from("user with this email already exists."));
    let mut errors = ValidationErrors::new();
    errors.add("email", err);
    Error::Validation(errors)
}
