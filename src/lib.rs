pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::config::Config;
use crate::database::postgres::PgStore;
use crate::database::store::{QuestionStore, SubmissionStore, UserStore};
use crate::error::Result;
use crate::services::{
    auth_service::AuthService,
    mail_service::{HttpMailer, LogMailer, Mailer},
    otp_service::OtpService,
    question_service::QuestionService,
    submission_service::SubmissionService,
    token_service::TokenService,
};
use crate::utils::otp::{CodeGenerator, RandomCodeGenerator};

/// External collaborators the services are wired to.
#[derive(Clone)]
pub struct Backends {
    pub users: Arc<dyn UserStore>,
    pub questions: Arc<dyn QuestionStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub mailer: Arc<dyn Mailer>,
    pub codes: Arc<dyn CodeGenerator>,
}

impl Backends {
    pub fn postgres(pool: PgPool, config: &Config) -> Result<Self> {
        let store = Arc::new(PgStore::new(pool));
        let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
            Some(url) => Arc::new(HttpMailer::new(url.clone())?),
            None => {
                tracing::warn!("MAIL_RELAY_URL not set, verification mails will not be delivered");
                Arc::new(LogMailer)
            }
        };
        Ok(Self {
            users: store.clone(),
            questions: store.clone(),
            submissions: store,
            mailer,
            codes: Arc::new(RandomCodeGenerator),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub auth_service: AuthService,
    pub token_service: TokenService,
    pub question_service: QuestionService,
    pub submission_service: SubmissionService,
}

impl AppState {
    pub fn new(config: &Config, backends: Backends) -> Self {
        let token_service = TokenService::new(
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::hours(config.refresh_token_ttl_hours),
        );
        let otp_service = OtpService::new(
            backends.users.clone(),
            backends.mailer,
            backends.codes,
            config.mail_from.clone(),
        );
        let auth_service = AuthService::new(
            backends.users.clone(),
            otp_service,
            token_service.clone(),
            config.blocked_verify_response,
        );
        let question_service = QuestionService::new(backends.questions.clone());
        let submission_service = SubmissionService::new(backends.questions, backends.submissions);

        Self {
            users: backends.users,
            auth_service,
            token_service,
            question_service,
            submission_service,
        }
    }
}
