use chrono::{NaiveDate, Utc};

/// Source of "today" for age checks
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current date in UTC.
///
/// Ages are judged on the UTC calendar day, so near midnight the result can
/// differ from the caller's local date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
