use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::emotions::{MAX_LEVEL, MIN_LEVEL, level_label};

/// Shares of `counts` in percent with one decimal. An empty total yields zeros.
pub fn percentages(counts: &[i64]) -> Vec<f64> {
    let total: i64 = counts.iter().sum();
    counts
        .iter()
        .map(|count| {
            if total <= 0 {
                0.0
            } else {
                ((*count as f64) * 1000.0 / total as f64).round() / 10.0
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountShare {
    pub key: String,
    pub count: i64,
    pub percent: f64,
}

pub fn count_shares(counts: Vec<(String, i64)>) -> Vec<CountShare> {
    let shares = percentages(&counts.iter().map(|(_, count)| *count).collect::<Vec<_>>());
    counts
        .into_iter()
        .zip(shares)
        .map(|((key, count), percent)| CountShare {
            key,
            count,
            percent,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelShare {
    pub level: i32,
    pub label: String,
    pub count: i64,
    pub percent: f64,
}

/// One row per level 1..=5, filling levels without entries with zero.
pub fn level_distribution(counts: &[(i32, i64)]) -> Vec<LevelShare> {
    let per_level: Vec<i64> = (MIN_LEVEL..=MAX_LEVEL)
        .map(|level| {
            counts
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, count)| *count)
                .sum()
        })
        .collect();
    let shares = percentages(&per_level);

    (MIN_LEVEL..=MAX_LEVEL)
        .zip(per_level.into_iter().zip(shares))
        .map(|(level, (count, percent))| LevelShare {
            level,
            label: level_label(level).to_string(),
            count,
            percent,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Continuous day series from `from` to `to` inclusive.
pub fn daily_series(counts: &[(NaiveDate, i64)], from: NaiveDate, to: NaiveDate) -> Vec<DailyCount> {
    let mut series = Vec::new();
    let mut day = from;
    while day <= to {
        let count = counts
            .iter()
            .filter(|(date, _)| *date == day)
            .map(|(_, count)| *count)
            .sum();
        series.push(DailyCount { date: day, count });
        day += Duration::days(1);
    }
    series
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminOverviewModel {
    pub total_users: i64,
    pub users_by_role: Vec<CountShare>,
    pub users_by_tier: Vec<CountShare>,
    pub bookings_by_status: Vec<CountShare>,
    pub revenue: i64,
    pub pending_transactions: i64,
    pub emotion_distribution: Vec<LevelShare>,
    pub new_users_daily: Vec<DailyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PsychologistStatsModel {
    pub total_bookings: i64,
    pub pending: i64,
    pub upcoming: i64,
    pub completed: i64,
    pub rating_avg: f64,
    pub rating_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_round_to_one_decimal() {
        assert_eq!(percentages(&[1, 2]), vec![33.3, 66.7]);
        assert_eq!(percentages(&[0, 0]), vec![0.0, 0.0]);
        assert!(percentages(&[]).is_empty());
    }

    #[test]
    fn level_distribution_covers_every_level() {
        let distribution = level_distribution(&[(5, 3), (1, 1)]);
        assert_eq!(distribution.len(), 5);
        assert_eq!(distribution[0].count, 1);
        assert_eq!(distribution[0].percent, 25.0);
        assert_eq!(distribution[2].count, 0);
        assert_eq!(distribution[4].percent, 75.0);
        assert_eq!(distribution[4].label, "Rất tốt");
    }

    #[test]
    fn daily_series_fills_gaps() {
        let from = NaiveDate::from_ymd_opt(2025, 2, 27).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let series = daily_series(&[(from, 2), (to, 5)], from, to);

        assert_eq!(series.len(), 4);
        assert_eq!(series[0].count, 2);
        assert_eq!(series[1].count, 0);
        assert_eq!(series[3].count, 5);
    }

    #[test]
    fn count_shares_keep_keys_in_order() {
        let shares = count_shares(vec![("free".into(), 3), ("gold".into(), 1)]);
        assert_eq!(shares[0].key, "free");
        assert_eq!(shares[0].percent, 75.0);
        assert_eq!(shares[1].percent, 25.0);
    }
}
