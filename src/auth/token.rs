//! Bearer token verification.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::schema::AuthConfig;

/// Claims carried by a gateway access token.
///
/// `userId` is the historical subject claim issued by the user service;
/// `sub` is accepted as a fallback for standards-shaped tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    pub exp: i64,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Verified identity attached to a request.
///
/// Owned by the request that produced it; never shared or cached.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub claims: HashMap<String, serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid or expired token: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// Stateless verifier for HS256 bearer tokens against the shared secret.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw token string and derive its AuthContext.
    pub fn verify(&self, token: &str) -> Result<AuthContext, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(AuthContext::from_claims(data.claims))
    }
}

impl AuthContext {
    fn from_claims(claims: Claims) -> Self {
        Self {
            subject: claims.user_id.or(claims.sub),
            issued_at: claims.iat.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            expires_at: DateTime::from_timestamp(claims.exp, 0),
            claims: claims.extra,
        }
    }
}
