use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest stretch of skipped wall-clock time searched when a midnight
/// falls inside a DST jump.
const MAX_GAP_MINUTES: u32 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("window start {start_ms} is after window end {end_ms}")]
    Inverted { start_ms: i64, end_ms: i64 },

    #[error("{0} is outside the supported time range")]
    OutOfRange(String),
}

/// Reporting interval as inclusive epoch-millisecond bounds.
///
/// Bounds are passed straight through to the time-entry query; nothing is
/// filtered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, WindowError> {
        for ms in [start_ms, end_ms] {
            if DateTime::<Utc>::from_timestamp_millis(ms).is_none() {
                return Err(WindowError::OutOfRange(ms.to_string()));
            }
        }
        if start_ms > end_ms {
            return Err(WindowError::Inverted { start_ms, end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// The most recently completed Sunday to Saturday week before `now`.
    ///
    /// Weeks are taken in `now`'s own calendar: the window starts at Sunday
    /// 00:00:00 and ends one second before the following Sunday. The week in
    /// progress is never included, even when `now` is a Sunday.
    pub fn previous_week<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let since_sunday = u64::from(today.weekday().num_days_from_sunday());
        let start_day = today - Days::new(since_sunday + 7);

        Self::spanning(&now.timezone(), start_day, start_day + Days::new(7))
    }

    /// [`TimeWindow::previous_week`] in the machine's local calendar.
    pub fn previous_week_local() -> Self {
        Self::previous_week(&Local::now())
    }

    /// Whole calendar days `since..=until` in `tz`.
    pub fn between_dates<Tz: TimeZone>(
        tz: &Tz,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Self, WindowError> {
        let next = until
            .checked_add_days(Days::new(1))
            .ok_or_else(|| WindowError::OutOfRange(until.to_string()))?;
        let window = Self::spanning(tz, since, next);
        Self::new(window.start_ms, window.end_ms)
    }

    /// From the start of `first` to one second before the start of `next`.
    fn spanning<Tz: TimeZone>(tz: &Tz, first: NaiveDate, next: NaiveDate) -> Self {
        let start = start_of_day(tz, first);
        let end = start_of_day(tz, next) - chrono::Duration::seconds(1);

        Self {
            start_ms: start.timestamp_millis(),
            end_ms: end.timestamp_millis(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.start_ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn end(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.end_ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// First instant of `day` in `tz`.
///
/// An ambiguous midnight takes the earlier instant. A midnight skipped by a
/// DST jump resolves to the first wall-clock time after the gap, so the day
/// still starts on its own date.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Tz> {
    let midnight = day.and_time(NaiveTime::MIN);
    let mut local = midnight;
    for _ in 0..MAX_GAP_MINUTES {
        if let Some(t) = tz.from_local_datetime(&local).earliest() {
            return t;
        }
        local += chrono::Duration::minutes(1);
    }
    tz.from_utc_datetime(&midnight)
}
