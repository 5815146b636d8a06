use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

/// Upper bound on how far back a streak is walked.
pub const MAX_STREAK_LOOKBACK_DAYS: i64 = 365;

/// Consecutive days with at least one emotion entry, ending today or, when today has not been
/// logged yet, ending yesterday.
pub fn current_streak(dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);
    let mut cursor = if dates.contains(&today) {
        today
    } else if dates.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    for _ in 0..MAX_STREAK_LOOKBACK_DAYS {
        if !dates.contains(&cursor) {
            break;
        }
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

pub fn longest_streak(dates: &HashSet<NaiveDate>) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.iter().copied().collect();
    sorted.sort_unstable();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in sorted {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

pub fn has_logged_today(dates: &HashSet<NaiveDate>, today: NaiveDate) -> bool {
    dates.contains(&today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn days_ago(offsets: &[i64]) -> HashSet<NaiveDate> {
        offsets
            .iter()
            .map(|offset| today() - Duration::days(*offset))
            .collect()
    }

    #[test]
    fn counts_three_consecutive_days_ending_today() {
        assert_eq!(current_streak(&days_ago(&[0, 1, 2]), today()), 3);
    }

    #[test]
    fn gap_at_today_and_yesterday_resets_to_zero() {
        assert_eq!(current_streak(&days_ago(&[2, 3]), today()), 0);
    }

    #[test]
    fn missing_today_counts_from_yesterday() {
        assert_eq!(current_streak(&days_ago(&[1, 2]), today()), 2);
    }

    #[test]
    fn skipped_day_breaks_the_streak_after_today() {
        assert_eq!(current_streak(&days_ago(&[0, 2]), today()), 1);
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(current_streak(&HashSet::new(), today()), 0);
    }

    #[test]
    fn lookback_is_capped() {
        let offsets: Vec<i64> = (0..500).collect();
        assert_eq!(
            current_streak(&days_ago(&offsets), today()),
            MAX_STREAK_LOOKBACK_DAYS as u32
        );
    }

    #[test]
    fn longest_streak_finds_the_best_run() {
        assert_eq!(longest_streak(&days_ago(&[0, 1, 5, 6, 7, 8, 20])), 4);
        assert_eq!(longest_streak(&HashSet::new()), 0);
    }

    #[test]
    fn logged_today_checks_only_today() {
        assert!(has_logged_today(&days_ago(&[0]), today()));
        assert!(!has_logged_today(&days_ago(&[1]), today()));
    }
}
