use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::utils::time::{now, unix_seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub token_type: TokenKind,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| Error::Unauthorized("invalid_token".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        let issued_at = now();
        let refresh_claims = Claims {
            sub: user_id.to_string(),
            token_type: TokenKind::Refresh,
            jti: Uuid::new_v4().to_string(),
            iat: unix_seconds(issued_at),
            exp: unix_seconds(issued_at + self.refresh_ttl),
        };
        let refresh = self.sign(&refresh_claims)?;
        let access = self.sign(&self.access_claims(&refresh_claims))?;
        Ok(TokenPair { refresh, access })
    }

    /// Mints a new access token from a still-valid refresh token.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        self.sign(&self.access_claims(&claims))
    }

    /// Checks signature, expiry and kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.token_type != expected {
            return Err(Error::Unauthorized("wrong_token_type".to_string()));
        }
        Ok(data.claims)
    }

    fn access_claims(&self, refresh: &Claims) -> Claims {
        let issued_at = now();
        let exp = unix_seconds(issued_at + self.access_ttl).min(refresh.exp);
        Claims {
            sub: refresh.sub.clone(),
            token_type: TokenKind::Access,
            jti: Uuid::new_v4().to_string(),
            iat: unix_seconds(issued_at),
            exp,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }
}
