use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::{Principal, Role};
use crate::tenant::TenantId;

/// Claims embedded in access and refresh tokens.
///
/// Access tokens carry the full identity snapshot; refresh tokens carry only
/// the subject, the tenant, and the `type = "refresh"` discriminator that
/// keeps the two shapes non-interchangeable.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorities: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn access(principal: &Principal, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: principal.id.to_string(),
            user_id: Some(principal.id),
            username: Some(principal.username.clone()),
            email: Some(principal.email.clone()),
            tenant_id: principal.tenant_id,
            tenant_code: principal.tenant_code.clone(),
            role: Some(principal.role),
            authorities: Some(principal.authorities()),
            token_type: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    fn refresh(principal: &Principal, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: principal.id.to_string(),
            user_id: None,
            username: None,
            email: None,
            tenant_id: principal.tenant_id,
            tenant_code: None,
            role: None,
            authorities: None,
            token_type: Some("refresh".to_string()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some("refresh")
    }

    /// Subject parsed back to the numeric principal id.
    pub fn subject(&self) -> Result<i64, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::BadSubject(self.sub.clone()))
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token uses an unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("non-numeric token subject: {0}")]
    BadSubject(String),
    #[error("token generation failed: {0}")]
    Encoding(String),
}

/// Stateless mint/verify for bearer tokens. Validity is signature + expiry
/// only; there is no server-side revocation list.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    secret_present: bool,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            secret_present: !secret.is_empty(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_access_token(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_access_token_at(principal, Utc::now())
    }

    pub fn issue_refresh_token(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_refresh_token_at(principal, Utc::now())
    }

    fn issue_access_token_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.sign(Claims::access(principal, now, self.access_ttl))
    }

    fn issue_refresh_token_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.sign(Claims::refresh(principal, now, self.refresh_ttl))
    }

    fn sign(&self, claims: Claims) -> Result<String, TokenError> {
        if !self.secret_present {
            return Err(TokenError::MissingSecret);
        }
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature and expiry. Total: every failure mode comes back as
    /// a typed error, so callers degrade to "not authenticated" instead of
    /// aborting the request.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if !self.secret_present {
            return Err(TokenError::MissingSecret);
        }
        if token.trim().is_empty() {
            return Err(TokenError::Malformed("empty token".to_string()));
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        TokenError::UnsupportedAlgorithm
                    }
                    _ => TokenError::Malformed(e.to_string()),
                }
            })
    }

    /// Access-token lifetime in seconds, for `expires_in` response fields.
    pub fn expires_in_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}
