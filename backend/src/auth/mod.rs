pub mod password;

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{DateTime, Utc};
use emocare::domain::{
    repositories::users::UserRepository, value_objects::enums::user_roles::UserRole,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("failed to issue token: {0}")]
    Issue(#[from] jsonwebtoken::errors::Error),
}

/// HS256 signing material shared by the token issuer and the request extractor.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = now.timestamp().max(0) as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iat,
            exp: iat + self.ttl_seconds as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

/// Account store the extractor checks every token against.
pub type SharedUserRepository = Arc<dyn UserRepository + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn require(&self, role: UserRole) -> Result<(), AppError> {
        self.require_any(&[role])
    }

    pub fn require_any(&self, roles: &[UserRole]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} accounts cannot perform this action",
                self.role
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<Arc<JwtKeys>>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("JWT keys are not installed")))?;

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = keys
            .validate(bearer.token())
            .map_err(|_| AppError::Unauthorized)?;

        let users = parts
            .extensions
            .get::<SharedUserRepository>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user repository is not installed")))?;

        authorize(&claims, users.as_ref()).await
    }
}

/// Resolves the caller from the stored account rather than the token, so deactivation and
/// role changes apply to tokens that are already issued.
pub async fn authorize(
    claims: &Claims,
    users: &(dyn UserRepository + Send + Sync),
) -> Result<AuthUser, AppError> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !user.is_active {
        return Err(AppError::Forbidden("account is deactivated".to_string()));
    }

    let role = UserRole::from_str(&user.role).ok_or(AppError::Unauthorized)?;
    if role.as_str() != claims.role {
        debug!(%user_id, token_role = %claims.role, %role, "auth: role changed since token was issued");
    }

    Ok(AuthUser { user_id, role })
}
