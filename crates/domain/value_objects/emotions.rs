use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::emotion_entries::{EmotionEntryEntity, InsertEmotionEntryEntity},
    value_objects::analytics::LevelShare,
};

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 5;
const MAX_NOTE_CHARS: usize = 500;

pub fn level_label(level: i32) -> &'static str {
    match level {
        1 => "Rất tệ",
        2 => "Tệ",
        3 => "Bình thường",
        4 => "Tốt",
        5 => "Rất tốt",
        _ => "Không rõ",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionEntryModel {
    pub id: Uuid,
    pub level: i32,
    pub label: String,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<EmotionEntryEntity> for EmotionEntryModel {
    fn from(entity: EmotionEntryEntity) -> Self {
        Self {
            id: entity.id,
            level: entity.level,
            label: level_label(entity.level).to_string(),
            note: entity.note,
            entry_date: entity.entry_date,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEmotionModel {
    pub level: i32,
    pub note: Option<String>,
}

impl LogEmotionModel {
    pub fn check(&self) -> Result<(), String> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.level) {
            return Err(format!(
                "level must be between {} and {}",
                MIN_LEVEL, MAX_LEVEL
            ));
        }
        if let Some(note) = &self.note {
            if note.chars().count() > MAX_NOTE_CHARS {
                return Err(format!("note must be at most {} characters", MAX_NOTE_CHARS));
            }
        }
        Ok(())
    }

    pub fn to_entity(&self, user_id: Uuid, entry_date: NaiveDate) -> InsertEmotionEntryEntity {
        InsertEmotionEntryEntity {
            id: Uuid::new_v4(),
            user_id,
            level: self.level,
            note: self
                .note
                .as_ref()
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
            entry_date,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmotionRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionSummaryModel {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub logged_today: bool,
    pub total_entries: usize,
    pub average_7_days: Option<f64>,
    pub average_30_days: Option<f64>,
    pub distribution: Vec<LevelShare>,
}

/// Mean level of entries dated within the last `days` days (today included), two decimals.
pub fn average_level(entries: &[EmotionEntryEntity], today: NaiveDate, days: i64) -> Option<f64> {
    let since = today - Duration::days(days - 1);
    let levels: Vec<i32> = entries
        .iter()
        .filter(|entry| entry.entry_date >= since && entry.entry_date <= today)
        .map(|entry| entry.level)
        .collect();

    if levels.is_empty() {
        return None;
    }
    let mean = f64::from(levels.iter().sum::<i32>()) / levels.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: i32, entry_date: NaiveDate) -> EmotionEntryEntity {
        EmotionEntryEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            level,
            note: None,
            entry_date,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn level_must_be_one_to_five() {
        for level in [0, 6, -1] {
            let model = LogEmotionModel { level, note: None };
            assert!(model.check().is_err(), "level {level}");
        }
        assert!(LogEmotionModel { level: 3, note: None }.check().is_ok());
    }

    #[test]
    fn blank_notes_are_dropped() {
        let model = LogEmotionModel {
            level: 4,
            note: Some("   ".to_string()),
        };
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(model.to_entity(Uuid::nil(), today).note, None);
    }

    #[test]
    fn average_only_counts_the_window() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let entries = vec![
            entry(5, today),
            entry(2, today - Duration::days(6)),
            entry(1, today - Duration::days(7)),
        ];
        assert_eq!(average_level(&entries, today, 7), Some(3.5));
        assert_eq!(average_level(&entries, today, 30), Some(2.67));
        assert_eq!(average_level(&[], today, 7), None);
    }
}
