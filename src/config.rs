use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_hours: i64,
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
    pub auth_rps: u32,
    pub cors_allowed_origins: Vec<String>,
    pub blocked_verify_response: BlockedVerifyResponse,
}

/// What `/api/verify-otp/` answers for an account an administrator has blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedVerifyResponse {
    Blocked,
    NotRegistered,
}

impl FromStr for BlockedVerifyResponse {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocked" => Ok(Self::Blocked),
            "not_registered" => Ok(Self::NotRegistered),
            other => Err(format!(
                "expected 'blocked' or 'not_registered', got '{}'",
                other
            )),
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            access_token_ttl_minutes: get_env_parse_or("ACCESS_TOKEN_TTL_MINUTES", 5)?,
            refresh_token_ttl_hours: get_env_parse_or("REFRESH_TOKEN_TTL_HOURS", 24)?,
            mail_relay_url: env::var("MAIL_RELAY_URL").ok().filter(|v| !v.is_empty()),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@quizbit.local".to_string()),
            auth_rps: get_env_parse_or("AUTH_RPS", 20)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            blocked_verify_response: get_env_parse_or(
                "BLOCKED_VERIFY_RESPONSE",
                BlockedVerifyResponse::Blocked,
            )?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
