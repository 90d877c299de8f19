//! HS256 access-token validation

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tubely_core::AppError;
use uuid::Uuid;

/// Claims carried by access tokens. `sub` is the caller's user ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Resolves a bearer token to the identity of the caller.
#[async_trait]
pub trait IdentityValidator: Send + Sync {
    /// Return the caller's user ID, or `Unauthorized` if the token is not acceptable.
    async fn validate(&self, token: &str) -> Result<Uuid, AppError>;
}

/// Validates HS256-signed tokens against a shared secret.
pub struct JwtIdentityValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityValidator for JwtIdentityValidator {
    async fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            AppError::Unauthorized("Couldn't validate JWT".to_string())
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid subject in JWT".to_string()))
    }
}
