use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Past,
    Today,
    Future,
}

/// A single "now" sample paired with the restaurant's timezone.
///
/// Every top-level query builds exactly one clock and threads it through, so all
/// decisions inside one query agree on the time. "Today" is always the calendar
/// date in `tz`, never the process-local date.
#[derive(Debug, Clone, Copy)]
pub struct RestaurantClock {
    tz: Tz,
    now: DateTime<Utc>,
}

impl RestaurantClock {
    pub fn new(tz: Tz, now: DateTime<Utc>) -> Self {
        Self { tz, now }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn now_local(&self) -> DateTime<Tz> {
        self.now.with_timezone(&self.tz)
    }

    pub fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }

    pub fn classify(&self, date: NaiveDate) -> DateKind {
        let today = self.today();
        if date < today {
            DateKind::Past
        } else if date == today {
            DateKind::Today
        } else {
            DateKind::Future
        }
    }

    /// Earliest instant at which a booking for `date` at `time` may still be made.
    pub fn minimum_bookable(&self, advance_minutes: u32) -> DateTime<Utc> {
        self.now + Duration::minutes(i64::from(advance_minutes))
    }

    /// Resolves a local wall-clock time to an instant. Ambiguous times (DST fall
    /// back) take the earlier offset; times skipped by a spring-forward jump move
    /// forward by the size of the gap.
    pub fn instant_of(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = NaiveDateTime::new(date, time);
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                let shifted = naive + Duration::hours(1);
                self.tz
                    .from_local_datetime(&shifted)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
            }
        }
    }
}
