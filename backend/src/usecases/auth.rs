use std::sync::Arc;

use chrono::Utc;
use emocare::domain::{
    entities::users::InsertUserEntity,
    repositories::users::UserRepository,
    value_objects::{
        enums::{user_roles::UserRole, user_tiers::UserTier},
        users::{AuthTokenModel, LoginModel, RegisterUserModel, UserModel, normalize_email},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        JwtKeys,
        password::{hash_password, verify_password},
    },
    axum_http::error_responses::AppError,
};

#[derive(Debug, Error)]
pub enum AuthUseCaseError {
    #[error("{0}")]
    Invalid(String),
    #[error("email is already registered")]
    EmailTaken,
    #[error("email or password is incorrect")]
    InvalidCredentials,
    #[error("account is disabled")]
    Inactive,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthUseCaseError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AuthUseCaseError::Invalid(_) => StatusCode::BAD_REQUEST,
            AuthUseCaseError::EmailTaken => StatusCode::CONFLICT,
            AuthUseCaseError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthUseCaseError::Inactive => StatusCode::FORBIDDEN,
            AuthUseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthUseCaseError> for AppError {
    fn from(err: AuthUseCaseError) -> Self {
        match err {
            AuthUseCaseError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AuthUseCaseError>;

pub struct AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    jwt_keys: Arc<JwtKeys>,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, jwt_keys: Arc<JwtKeys>) -> Self {
        Self {
            user_repo,
            jwt_keys,
        }
    }

    pub async fn register(&self, model: RegisterUserModel) -> UseCaseResult<AuthTokenModel> {
        model.check().map_err(AuthUseCaseError::Invalid)?;

        let email = normalize_email(&model.email);
        if self.user_repo.find_by_email(email.clone()).await?.is_some() {
            return Err(AuthUseCaseError::EmailTaken);
        }

        let now = Utc::now();
        let entity = InsertUserEntity {
            id: Uuid::new_v4(),
            email,
            password_hash: hash_password(&model.password)?,
            display_name: model.display_name.trim().to_string(),
            phone: model
                .phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            role: UserRole::User.to_string(),
            tier: UserTier::Free.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let user_id = self.user_repo.create(entity.clone()).await.map_err(|err| {
            error!(error = ?err, "auth: failed to create user");
            AuthUseCaseError::Internal(err)
        })?;
        info!(%user_id, "auth: user registered");

        let user = UserModel {
            id: user_id,
            email: entity.email,
            display_name: entity.display_name,
            phone: entity.phone,
            avatar_url: None,
            role: UserRole::User,
            tier: UserTier::Free,
            gold_expires_at: None,
            is_active: true,
            created_at: now,
        };

        self.token_for(user)
    }

    pub async fn login(&self, model: LoginModel) -> UseCaseResult<AuthTokenModel> {
        let email = normalize_email(&model.email);
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            return Err(AuthUseCaseError::InvalidCredentials);
        };

        if !verify_password(&model.password, &user.password_hash)? {
            warn!(user_id = %user.id, "auth: wrong password");
            return Err(AuthUseCaseError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthUseCaseError::Inactive);
        }

        info!(user_id = %user.id, "auth: user logged in");
        self.token_for(UserModel::from_entity(user, Utc::now()))
    }

    fn token_for(&self, user: UserModel) -> UseCaseResult<AuthTokenModel> {
        let access_token = self
            .jwt_keys
            .issue(user.id, user.role, Utc::now())
            .map_err(|err| AuthUseCaseError::Internal(err.into()))?;

        Ok(AuthTokenModel {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_keys.ttl_seconds(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::sample_user;
    use emocare::domain::{entities::users::UserEntity, repositories::users::MockUserRepository};

    fn keys() -> Arc<JwtKeys> {
        Arc::new(JwtKeys::new("supersecretjwtsecretforunittesting123", 3600))
    }

    fn register_model() -> RegisterUserModel {
        RegisterUserModel {
            email: " An@Example.com ".to_string(),
            password: "matkhau123".to_string(),
            confirm_password: "matkhau123".to_string(),
            display_name: "An".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_creates_a_free_user_and_returns_a_token() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .withf(|email| email == "an@example.com")
            .returning(|_| Ok(None));
        user_repo
            .expect_create()
            .withf(|entity| {
                entity.role == "user" && entity.tier == "free" && entity.password_hash != "matkhau123"
            })
            .returning(|entity| Ok(entity.id));

        let usecase = AuthUseCase::new(Arc::new(user_repo), keys());
        let token = usecase.register(register_model()).await.unwrap();

        assert_eq!(token.user.email, "an@example.com");
        assert_eq!(token.user.tier, UserTier::Free);
        assert_eq!(token.token_type, "Bearer");
        assert!(keys().validate(&token.access_token).is_ok());
    }

    #[tokio::test]
    async fn register_rejects_mismatched_confirmation() {
        let user_repo = MockUserRepository::new();
        let usecase = AuthUseCase::new(Arc::new(user_repo), keys());

        let result = usecase
            .register(RegisterUserModel {
                confirm_password: "khac".to_string(),
                ..register_model()
            })
            .await;

        assert!(matches!(result, Err(AuthUseCaseError::Invalid(_))));
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(|_| Ok(Some(sample_user())));

        let usecase = AuthUseCase::new(Arc::new(user_repo), keys());
        let result = usecase.register(register_model()).await;

        assert!(matches!(result, Err(AuthUseCaseError::EmailTaken)));
    }

    #[tokio::test]
    async fn login_checks_password_and_activity() {
        let mut user = sample_user();
        user.password_hash = hash_password("matkhau123").unwrap();
        let inactive = UserEntity {
            is_active: false,
            ..user.clone()
        };

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));
        let usecase = AuthUseCase::new(Arc::new(user_repo), keys());

        let ok = usecase
            .login(LoginModel {
                email: "an@example.com".to_string(),
                password: "matkhau123".to_string(),
            })
            .await;
        assert!(ok.is_ok());

        let wrong = usecase
            .login(LoginModel {
                email: "an@example.com".to_string(),
                password: "sai".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AuthUseCaseError::InvalidCredentials)));

        let mut inactive_repo = MockUserRepository::new();
        inactive_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(inactive.clone())));
        let usecase = AuthUseCase::new(Arc::new(inactive_repo), keys());
        let disabled = usecase
            .login(LoginModel {
                email: "an@example.com".to_string(),
                password: "matkhau123".to_string(),
            })
            .await;
        assert!(matches!(disabled, Err(AuthUseCaseError::Inactive)));
    }

}
