//! HS256 access and refresh tokens.
//!
//! Access tokens carry the subject's public identity so clients can render
//! it without a round trip; refresh tokens carry only the subject. The two
//! kinds are signed with different secrets, so one can never stand in for
//! the other.

use std::{fmt, time::Duration};

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use vidora_core::domain::User;

use crate::infra::config::Config;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Refresh token is expired or used")]
    TokenMismatch,
    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl SigningKey {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }

    fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<C>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }

    fn window(&self) -> (i64, i64) {
        let now = Utc::now().timestamp();
        (now, now.saturating_add(self.ttl_secs))
    }
}

pub struct TokenCodec {
    access: SigningKey,
    refresh: SigningKey,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl_secs", &self.access.ttl_secs)
            .field("refresh_ttl_secs", &self.refresh.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(
        access_secret: &str,
        access_ttl: Duration,
        refresh_secret: &str,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: SigningKey::new(access_secret, access_ttl),
            refresh: SigningKey::new(refresh_secret, refresh_ttl),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.access_token_secret,
            config.access_token_expiry,
            &config.refresh_token_secret,
            config.refresh_token_expiry,
        )
    }

    pub fn issue_access(&self, user: &User) -> Result<String, TokenError> {
        let (iat, exp) = self.access.window();
        self.access.sign(&AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            iat,
            exp,
            jti: Uuid::new_v4(),
        })
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        let (iat, exp) = self.refresh.window();
        self.refresh.sign(&RefreshClaims {
            sub: user_id,
            iat,
            exp,
            jti: Uuid::new_v4(),
        })
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(user)?,
            refresh_token: self.issue_refresh(user.id)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.refresh.verify(token)
    }
}
