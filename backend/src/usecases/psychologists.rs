use std::sync::Arc;

use chrono::Utc;
use emocare::domain::{
    entities::{psychologists::InsertPsychologistEntity, users::InsertUserEntity},
    repositories::{psychologists::PsychologistRepository, users::UserRepository},
    value_objects::{
        enums::{user_roles::UserRole, user_tiers::UserTier},
        psychologists::{
            CreatePsychologistModel, ListPsychologistsFilter, PsychologistModel,
            UpdatePsychologistModel,
        },
        users::normalize_email,
    },
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{auth::password::hash_password, axum_http::error_responses::AppError};

#[derive(Debug, Error)]
pub enum PsychologistError {
    #[error("{0}")]
    Invalid(String),
    #[error("email is already registered")]
    EmailTaken,
    #[error("psychologist not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PsychologistError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PsychologistError::Invalid(_) => StatusCode::BAD_REQUEST,
            PsychologistError::EmailTaken => StatusCode::CONFLICT,
            PsychologistError::NotFound => StatusCode::NOT_FOUND,
            PsychologistError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PsychologistError> for AppError {
    fn from(err: PsychologistError) -> Self {
        match err {
            PsychologistError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PsychologistError>;

pub struct PsychologistUseCase<P, U>
where
    P: PsychologistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    psychologist_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P, U> PsychologistUseCase<P, U>
where
    P: PsychologistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(psychologist_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            psychologist_repo,
            user_repo,
        }
    }

    pub async fn list(
        &self,
        filter: ListPsychologistsFilter,
    ) -> UseCaseResult<Vec<PsychologistModel>> {
        let rows = self.psychologist_repo.list(filter).await?;

        Ok(rows
            .into_iter()
            .map(|(profile, user)| PsychologistModel::from_entities(profile, user))
            .collect())
    }

    pub async fn get(&self, psychologist_id: Uuid) -> UseCaseResult<PsychologistModel> {
        let (profile, user) = self
            .psychologist_repo
            .find_by_user_id(psychologist_id)
            .await?
            .ok_or(PsychologistError::NotFound)?;

        Ok(PsychologistModel::from_entities(profile, user))
    }

    pub async fn create(
        &self,
        admin_id: Uuid,
        model: CreatePsychologistModel,
    ) -> UseCaseResult<PsychologistModel> {
        model.check().map_err(PsychologistError::Invalid)?;

        let email = normalize_email(&model.email);
        if self.user_repo.find_by_email(email.clone()).await?.is_some() {
            return Err(PsychologistError::EmailTaken);
        }

        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let user = InsertUserEntity {
            id: user_id,
            email,
            password_hash: hash_password(&model.password)?,
            display_name: model.display_name.trim().to_string(),
            phone: model
                .phone
                .as_ref()
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            role: UserRole::Psychologist.to_string(),
            tier: UserTier::Free.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let profile = InsertPsychologistEntity {
            user_id,
            specialization: model.specialization.trim().to_string(),
            bio: model.bio.clone(),
            experience_years: model.experience_years,
            rating_avg: 0.0,
            rating_count: 0,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        let psychologist_id = self
            .psychologist_repo
            .create_with_user(user, profile)
            .await?;
        info!(%admin_id, %psychologist_id, "psychologists: account created");

        self.get(psychologist_id).await
    }

    pub async fn update_own(
        &self,
        psychologist_id: Uuid,
        model: UpdatePsychologistModel,
    ) -> UseCaseResult<PsychologistModel> {
        if model.is_empty() {
            return Err(PsychologistError::Invalid("nothing to update".to_string()));
        }
        model.check().map_err(PsychologistError::Invalid)?;

        if self
            .psychologist_repo
            .find_by_user_id(psychologist_id)
            .await?
            .is_none()
        {
            return Err(PsychologistError::NotFound);
        }

        self.psychologist_repo
            .update_profile(psychologist_id, model.to_entity())
            .await?;
        info!(%psychologist_id, "psychologists: profile updated");

        self.get(psychologist_id).await
    }
}
