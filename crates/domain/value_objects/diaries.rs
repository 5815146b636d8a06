use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::diary_entries::{
    DiaryEntryEntity, InsertDiaryEntryEntity, UpdateDiaryEntryEntity,
};

const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntryModel {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DiaryEntryEntity> for DiaryEntryModel {
    fn from(entity: DiaryEntryEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            content: entity.content,
            mood: entity.mood,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateDiaryEntryModel {
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
}

impl CreateDiaryEntryModel {
    pub fn check(&self) -> Result<(), String> {
        check_title(&self.title)?;
        check_content(&self.content)
    }

    pub fn to_entity(&self, user_id: Uuid) -> InsertDiaryEntryEntity {
        let now = Utc::now();
        InsertDiaryEntryEntity {
            id: Uuid::new_v4(),
            user_id,
            title: self.title.trim().to_string(),
            content: self.content.clone(),
            mood: self.mood.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateDiaryEntryModel {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
}

impl UpdateDiaryEntryModel {
    pub fn check(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(content) = &self.content {
            check_content(content)?;
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpdateDiaryEntryEntity {
        UpdateDiaryEntryEntity {
            title: self.title.as_ref().map(|title| title.trim().to_string()),
            content: self.content.clone(),
            mood: self.mood.clone(),
            updated_at: Some(Utc::now()),
        }
    }
}

fn check_title(title: &str) -> Result<(), String> {
    let count = title.trim().chars().count();
    if count == 0 {
        return Err("title is required".to_string());
    }
    if count > MAX_TITLE_CHARS {
        return Err(format!("title must be at most {} characters", MAX_TITLE_CHARS));
    }
    Ok(())
}

fn check_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("content is required".to_string());
    }
    Ok(())
}
