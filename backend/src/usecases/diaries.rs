use std::sync::Arc;

use emocare::domain::{
    entities::diary_entries::DiaryEntryEntity,
    repositories::diary_entries::DiaryEntryRepository,
    value_objects::diaries::{CreateDiaryEntryModel, DiaryEntryModel, UpdateDiaryEntryModel},
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("{0}")]
    Invalid(String),
    #[error("diary entry not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiaryError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            DiaryError::Invalid(_) => StatusCode::BAD_REQUEST,
            DiaryError::NotFound => StatusCode::NOT_FOUND,
            DiaryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DiaryError> for AppError {
    fn from(err: DiaryError) -> Self {
        match err {
            DiaryError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, DiaryError>;

pub struct DiaryUseCase<D>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    diary_repo: Arc<D>,
}

impl<D> DiaryUseCase<D>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    pub fn new(diary_repo: Arc<D>) -> Self {
        Self { diary_repo }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        model: CreateDiaryEntryModel,
    ) -> UseCaseResult<DiaryEntryModel> {
        model.check().map_err(DiaryError::Invalid)?;

        let entry = self.diary_repo.insert(model.to_entity(user_id)).await?;
        info!(%user_id, entry_id = %entry.id, "diaries: entry created");

        Ok(DiaryEntryModel::from(entry))
    }

    pub async fn list(&self, user_id: Uuid) -> UseCaseResult<Vec<DiaryEntryModel>> {
        let entries = self
            .diary_repo
            .list_by_user(user_id, DEFAULT_LIST_LIMIT)
            .await?;

        Ok(entries.into_iter().map(DiaryEntryModel::from).collect())
    }

    pub async fn get(&self, user_id: Uuid, entry_id: Uuid) -> UseCaseResult<DiaryEntryModel> {
        let entry = self.owned_entry(user_id, entry_id).await?;
        Ok(DiaryEntryModel::from(entry))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        model: UpdateDiaryEntryModel,
    ) -> UseCaseResult<DiaryEntryModel> {
        if model == UpdateDiaryEntryModel::default() {
            return Err(DiaryError::Invalid("nothing to update".to_string()));
        }
        model.check().map_err(DiaryError::Invalid)?;
        self.owned_entry(user_id, entry_id).await?;

        let entry = self.diary_repo.update(entry_id, model.to_entity()).await?;
        info!(%user_id, %entry_id, "diaries: entry updated");

        Ok(DiaryEntryModel::from(entry))
    }

    pub async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> UseCaseResult<()> {
        self.owned_entry(user_id, entry_id).await?;

        self.diary_repo.delete(entry_id).await?;
        info!(%user_id, %entry_id, "diaries: entry deleted");

        Ok(())
    }

    /// Entries of other users are reported as missing.
    async fn owned_entry(&self, user_id: Uuid, entry_id: Uuid) -> UseCaseResult<DiaryEntryEntity> {
        match self.diary_repo.find_by_id(entry_id).await? {
            Some(entry) if entry.user_id == user_id => Ok(entry),
            _ => Err(DiaryError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use emocare::domain::repositories::diary_entries::MockDiaryEntryRepository;

    fn stored_entry(user_id: Uuid) -> DiaryEntryEntity {
        let now = Utc::now();
        DiaryEntryEntity {
            id: Uuid::new_v4(),
            user_id,
            title: "Một ngày dài".to_string(),
            content: "Hôm nay mình thấy ổn hơn.".to_string(),
            mood: Some("calm".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn other_users_entries_are_not_found() {
        let entry = stored_entry(Uuid::new_v4());
        let entry_id = entry.id;

        let mut diary_repo = MockDiaryEntryRepository::new();
        diary_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(entry.clone())));
        diary_repo.expect_delete().never();

        let usecase = DiaryUseCase::new(Arc::new(diary_repo));

        assert!(matches!(
            usecase.get(Uuid::new_v4(), entry_id).await,
            Err(DiaryError::NotFound)
        ));
        assert!(matches!(
            usecase.delete(Uuid::new_v4(), entry_id).await,
            Err(DiaryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn owner_updates_entry() {
        let user_id = Uuid::new_v4();
        let entry = stored_entry(user_id);
        let entry_id = entry.id;
        let updated = DiaryEntryEntity {
            title: "Tiêu đề mới".to_string(),
            ..entry.clone()
        };

        let mut diary_repo = MockDiaryEntryRepository::new();
        diary_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(entry.clone())));
        diary_repo
            .expect_update()
            .withf(|_, changes| changes.title.as_deref() == Some("Tiêu đề mới"))
            .times(1)
            .returning(move |_, _| Ok(updated.clone()));

        let usecase = DiaryUseCase::new(Arc::new(diary_repo));
        let model = usecase
            .update(
                user_id,
                entry_id,
                UpdateDiaryEntryModel {
                    title: Some("  Tiêu đề mới ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(model.title, "Tiêu đề mới");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let usecase = DiaryUseCase::new(Arc::new(MockDiaryEntryRepository::new()));

        let result = usecase
            .create(
                Uuid::new_v4(),
                CreateDiaryEntryModel {
                    title: "   ".to_string(),
                    content: "nội dung".to_string(),
                    mood: None,
                },
            )
            .await;

        assert!(matches!(result, Err(DiaryError::Invalid(_))));
    }
}
