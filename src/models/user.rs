use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Verification lifecycle of an account.
///
/// `Unverified` rows have never had a code stored, `Pending` rows hold an
/// outstanding [`OtpChallenge`], `Active` rows may authenticate and `Blocked`
/// rows were verified once but have been disabled by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Unverified,
    Pending,
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Unverified => "unverified",
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, AccountStatus::Active | AccountStatus::Blocked)
    }

    /// Status after a fresh code has been stored on the account.
    pub fn with_challenge(self) -> Self {
        match self {
            AccountStatus::Unverified => AccountStatus::Pending,
            other => other,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(AccountStatus::Unverified),
            "pending" => Ok(AccountStatus::Pending),
            "active" => Ok(AccountStatus::Active),
            "blocked" => Ok(AccountStatus::Blocked),
            other => Err(Error::Internal(format!("unknown account status '{}'", other))),
        }
    }
}

/// The single outstanding one-time code of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpChallenge {
    pub code: i32,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub status: AccountStatus,
    pub otp: Option<OtpChallenge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub status: String,
    pub otp_code: Option<i32>,
    pub otp_issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let otp = match (row.otp_code, row.otp_issued_at) {
            (Some(code), Some(issued_at)) => Some(OtpChallenge { code, issued_at }),
            (Some(code), None) => Some(OtpChallenge {
                code,
                issued_at: row.updated_at,
            }),
            _ => None,
        };
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            status: row.status.parse()?,
            otp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
