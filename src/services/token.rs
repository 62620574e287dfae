//! Signed bearer tokens (access + refresh).
//!
//! HS256 with a shared secret from configuration. Every token carries
//! `sub`, `exp`, `iat`, and a fresh `jti`; revocation is by jti, and a
//! revoked jti fails verification even while cryptographically valid.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::services::{RevocationStore, ServiceError};

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
    revocation: Arc<dyn RevocationStore>,
}

/// Claims carried by both token flavors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id the token was issued for.
    pub sub: String,
    /// Expiry (epoch seconds).
    pub exp: i64,
    /// Issued at (epoch seconds).
    pub iat: i64,
    /// Unique token id, the unit of revocation.
    pub jti: String,
}

impl Claims {
    /// Seconds until expiry; never negative.
    pub fn remaining_seconds(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig, revocation: Arc<dyn RevocationStore>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            revocation,
        }
    }

    fn sign(&self, subject: Uuid, lifetime: Duration) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    pub fn issue_access(&self, subject: Uuid) -> Result<String, ServiceError> {
        self.sign(subject, Duration::minutes(self.access_token_expiry_minutes))
    }

    pub fn issue_refresh(&self, subject: Uuid) -> Result<String, ServiceError> {
        self.sign(subject, Duration::days(self.refresh_token_expiry_days))
    }

    /// Fresh access + refresh pair for a login or registration.
    pub fn issue_pair(&self, subject: Uuid) -> Result<(String, String), ServiceError> {
        Ok((self.issue_access(subject)?, self.issue_refresh(subject)?))
    }

    /// Signature and expiry check only. Malformed, mis-signed, and expired
    /// tokens all collapse to `InvalidToken`.
    pub fn decode(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| ServiceError::InvalidToken)
    }

    /// Full verification: cryptographic validity plus the revocation store.
    /// Revocation takes precedence over an otherwise valid signature. A
    /// revocation-store fault fails closed.
    pub async fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        let claims = self.decode(token)?;

        let revoked = self.revocation.is_revoked(&claims.jti).await.map_err(|e| {
            tracing::error!(error = %e, "Revocation store unavailable during verification");
            ServiceError::InvalidToken
        })?;

        if revoked {
            return Err(ServiceError::InvalidToken);
        }

        Ok(claims)
    }

    /// Verify a refresh token and mint a new access token for its subject.
    /// Refresh tokens are never rotated here.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ServiceError> {
        let claims = self.verify(refresh_token).await?;

        let subject: Uuid = claims.sub.parse().map_err(|_| ServiceError::InvalidToken)?;
        self.issue_access(subject)
    }

    /// Revoke a verified token for the remainder of its lifetime.
    pub async fn revoke(&self, claims: &Claims) -> Result<(), ServiceError> {
        self.revocation
            .revoke(&claims.jti, claims.remaining_seconds())
            .await
            .map_err(ServiceError::Internal)
    }
}
