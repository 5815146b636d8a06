use std::sync::Arc;

use chrono::Utc;
use emocare::domain::{
    repositories::{image_storage::ImageStorageClient, users::UserRepository},
    value_objects::{
        enums::user_roles::UserRole,
        images::{ImageRejection, ImageUploadModel},
        users::{ListUsersFilter, UpdateProfileModel, UserModel},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Image(#[from] ImageRejection),
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProfileError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ProfileError::Invalid(_) | ProfileError::Image(_) => StatusCode::BAD_REQUEST,
            ProfileError::NotFound => StatusCode::NOT_FOUND,
            ProfileError::Forbidden(_) => StatusCode::FORBIDDEN,
            ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ProfileError>;

pub struct ProfileUseCase<U, I>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    image_storage: Arc<I>,
}

impl<U, I> ProfileUseCase<U, I>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, image_storage: Arc<I>) -> Self {
        Self {
            user_repo,
            image_storage,
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> UseCaseResult<UserModel> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;

        Ok(UserModel::from_entity(user, Utc::now()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        model: UpdateProfileModel,
    ) -> UseCaseResult<UserModel> {
        if model.display_name.is_none() && model.phone.is_none() {
            return Err(ProfileError::Invalid("nothing to update".to_string()));
        }
        model.check().map_err(ProfileError::Invalid)?;

        let user = self
            .user_repo
            .update_profile(user_id, model.to_entity())
            .await?;
        info!(%user_id, "profiles: profile updated");

        Ok(UserModel::from_entity(user, Utc::now()))
    }

    pub async fn upload_avatar(
        &self,
        user_id: Uuid,
        upload: ImageUploadModel,
    ) -> UseCaseResult<UserModel> {
        let bytes = upload.decode()?;
        let file_name = format!("avatar-{}-{}", user_id, upload.file_name);

        let url = self
            .image_storage
            .upload_image(file_name, bytes)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "profiles: avatar upload failed");
                ProfileError::Internal(err)
            })?;

        self.user_repo.update_avatar(user_id, url).await?;
        info!(%user_id, "profiles: avatar updated");

        self.get_profile(user_id).await
    }

    pub async fn list_users(&self, filter: ListUsersFilter) -> UseCaseResult<Vec<UserModel>> {
        let now = Utc::now();
        let users = self.user_repo.list(filter).await?;

        Ok(users
            .into_iter()
            .map(|user| UserModel::from_entity(user, now))
            .collect())
    }

    pub async fn update_role(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> UseCaseResult<UserModel> {
        if admin_id == user_id {
            return Err(ProfileError::Forbidden(
                "admins cannot change their own role".to_string(),
            ));
        }
        if role == UserRole::Psychologist {
            return Err(ProfileError::Invalid(
                "psychologist accounts are created with a profile".to_string(),
            ));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;
        if UserRole::from_str(&user.role) == Some(UserRole::Psychologist) {
            return Err(ProfileError::Invalid(
                "psychologist accounts keep their role".to_string(),
            ));
        }

        self.user_repo.update_role(user_id, role).await?;
        info!(%admin_id, %user_id, %role, "profiles: role changed");

        self.get_profile(user_id).await
    }

    pub async fn set_active(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        is_active: bool,
    ) -> UseCaseResult<UserModel> {
        if admin_id == user_id && !is_active {
            return Err(ProfileError::Forbidden(
                "admins cannot disable themselves".to_string(),
            ));
        }

        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(ProfileError::NotFound);
        }

        self.user_repo.set_active(user_id, is_active).await?;
        info!(%admin_id, %user_id, is_active, "profiles: activity changed");

        self.get_profile(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::sample_user;
    use base64::{Engine as _, engine::general_purpose};
    use emocare::domain::{
        entities::users::UserEntity,
        repositories::{image_storage::MockImageStorageClient, users::MockUserRepository},
    };
    use mockall::predicate::eq;

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let usecase = ProfileUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockImageStorageClient::new()),
        );

        let result = usecase
            .update_profile(Uuid::new_v4(), UpdateProfileModel::default())
            .await;

        assert!(matches!(result, Err(ProfileError::Invalid(_))));
    }

    #[tokio::test]
    async fn avatar_is_uploaded_then_stored() {
        let user = sample_user();
        let user_id = user.id;

        let mut image_storage = MockImageStorageClient::new();
        image_storage
            .expect_upload_image()
            .withf(|name, bytes| name.starts_with("avatar-") && bytes == b"\x89PNG")
            .times(1)
            .returning(|_, _| Ok("https://i.ibb.co/abc/avatar.png".to_string()));

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_update_avatar()
            .with(eq(user_id), eq("https://i.ibb.co/abc/avatar.png".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));
        let stored = UserEntity {
            avatar_url: Some("https://i.ibb.co/abc/avatar.png".to_string()),
            ..user
        };
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let usecase = ProfileUseCase::new(Arc::new(user_repo), Arc::new(image_storage));
        let profile = usecase
            .upload_avatar(
                user_id,
                ImageUploadModel {
                    file_name: "me.png".to_string(),
                    content_type: "image/png".to_string(),
                    data_base64: general_purpose::STANDARD.encode(b"\x89PNG"),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://i.ibb.co/abc/avatar.png")
        );
    }

    #[tokio::test]
    async fn unsupported_avatar_type_never_reaches_storage() {
        let usecase = ProfileUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockImageStorageClient::new()),
        );

        let result = usecase
            .upload_avatar(
                Uuid::new_v4(),
                ImageUploadModel {
                    file_name: "cv.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    data_base64: general_purpose::STANDARD.encode(b"%PDF"),
                },
            )
            .await;

        assert!(matches!(result, Err(ProfileError::Image(_))));
    }

    #[tokio::test]
    async fn admin_cannot_change_own_role_or_grant_psychologist() {
        let usecase = ProfileUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockImageStorageClient::new()),
        );
        let admin_id = Uuid::new_v4();

        let own = usecase.update_role(admin_id, admin_id, UserRole::User).await;
        assert!(matches!(own, Err(ProfileError::Forbidden(_))));

        let psychologist = usecase
            .update_role(admin_id, Uuid::new_v4(), UserRole::Psychologist)
            .await;
        assert!(matches!(psychologist, Err(ProfileError::Invalid(_))));
    }

    #[tokio::test]
    async fn admin_promotes_user() {
        let user = sample_user();
        let user_id = user.id;
        let promoted = UserEntity {
            role: "admin".to_string(),
            ..user.clone()
        };

        let mut user_repo = MockUserRepository::new();
        let mut calls = 0;
        user_repo.expect_find_by_id().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(user.clone()))
            } else {
                Ok(Some(promoted.clone()))
            }
        });
        user_repo
            .expect_update_role()
            .with(eq(user_id), eq(UserRole::Admin))
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = ProfileUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockImageStorageClient::new()),
        );
        let model = usecase
            .update_role(Uuid::new_v4(), user_id, UserRole::Admin)
            .await
            .unwrap();

        assert_eq!(model.role, UserRole::Admin);
    }
}
