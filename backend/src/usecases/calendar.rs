use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Maps instants onto the users' local calendar days.
#[derive(Debug, Clone, Copy)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl LocalCalendar {
    pub fn from_offset_hours(hours: i32) -> Result<Self> {
        FixedOffset::east_opt(hours * 3600)
            .map(|offset| Self { offset })
            .ok_or_else(|| anyhow!("invalid UTC offset: {hours} hours"))
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn late_evening_utc_is_next_day_in_vietnam() {
        let calendar = LocalCalendar::from_offset_hours(7).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 20, 0, 0).unwrap();

        assert_eq!(calendar.today(now), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(LocalCalendar::utc().today(now), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn rejects_impossible_offsets() {
        assert!(LocalCalendar::from_offset_hours(30).is_err());
    }
}
