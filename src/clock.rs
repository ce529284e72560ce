// Time source used by quota windows and analytics periods

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Supplies "now" to code that derives calendar windows from wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Inclusive UTC instant range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Expand two calendar days to `from 00:00:00.000` .. `to 23:59:59.999` UTC
    pub fn from_days(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: start_of_day(from),
            to: end_of_day(to),
        }
    }

    /// Build a range from optional bounds; a single bound is used for both ends
    pub fn from_optional_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<Self> {
        match (from, to) {
            (Some(f), Some(t)) => Some(Self::from_days(f, t)),
            (Some(d), None) | (None, Some(d)) => Some(Self::from_days(d, d)),
            (None, None) => None,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant <= self.to
    }
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

/// Last millisecond of `day`; valid for every representable date
pub fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    let last = day
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| day.and_time(NaiveTime::default()));
    Utc.from_utc_datetime(&last)
}

/// First and last calendar day of the month containing `instant`
pub fn month_bounds(instant: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    month_bounds_for(instant.year(), instant.month()).unwrap_or_else(|| {
        let day = instant.date_naive();
        (day, day)
    })
}

/// First and last calendar day of `year`-`month`, `None` for an invalid month
pub fn month_bounds_for(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first - Duration::days(1)))
}

/// The current calendar month as an instant range
pub fn current_month(clock: &dyn Clock) -> DateRange {
    let (first, last) = month_bounds(clock.now());
    DateRange::from_days(first, last)
}
