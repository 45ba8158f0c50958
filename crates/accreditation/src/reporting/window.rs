use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use super::ReportingError;

/// Length of the default evolution window, ending with the current month.
pub const TRAILING_MONTHS: u32 = 12;

/// Inclusive calendar-day bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, ReportingError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ReportingError::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportingError> {
        Self::new(Some(start), Some(end))
    }

    /// Parse optional `YYYY-MM-DD` query values. Blank values count as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, ReportingError> {
        let start = start.map(parse_date).transpose()?.flatten();
        let end = end.map(parse_date).transpose()?.flatten();
        if start.is_none() && end.is_none() {
            return Ok(None);
        }
        Self::new(start, end).map(Some)
    }

    /// The end date is included through its last instant.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, ReportingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ReportingError::InvalidDate(raw.to_string()))
}

pub(crate) fn filter_range(range: Option<&DateRange>, at: DateTime<Utc>) -> bool {
    range.map_or(true, |range| range.contains(at))
}

/// One calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// `YYYY-MM`.
    pub fn key(self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// `Mon YYYY`, e.g. `Mar 2024`.
    pub fn label(self) -> String {
        match self.first_day() {
            Some(day) => day.format("%b %Y").to_string(),
            None => self.key(),
        }
    }
}

/// Contiguous run of months a time series is bucketed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    months: Vec<MonthKey>,
}

impl MonthWindow {
    /// `first..=last`, both inclusive.
    pub fn spanning(first: MonthKey, last: MonthKey) -> Self {
        let mut months = Vec::new();
        let mut current = first;
        while current <= last {
            months.push(current);
            current = current.next();
        }
        Self { months }
    }

    /// The current month and the eleven before it.
    pub fn trailing(today: NaiveDate) -> Self {
        let last = MonthKey::of(today);
        let first = today
            .with_day(1)
            .and_then(|day| day.checked_sub_months(Months::new(TRAILING_MONTHS - 1)))
            .map(MonthKey::of)
            .unwrap_or(last);
        Self::spanning(first, last)
    }

    /// Window for an optional range. An open start yields the trailing window
    /// ending at the range's end month; an open end runs to `today`, or to
    /// the start month when the start lies in the future.
    pub fn for_range(range: Option<&DateRange>, today: NaiveDate) -> Result<Self, ReportingError> {
        let Some(range) = range else {
            return Ok(Self::trailing(today));
        };

        let (start, end) = match (range.start, range.end) {
            (None, None) => return Ok(Self::trailing(today)),
            (None, Some(end)) => return Ok(Self::trailing(end)),
            (Some(start), None) => (start, today.max(start)),
            (Some(start), Some(end)) => (start, end),
        };
        if start > end {
            return Err(ReportingError::InvalidRange { start, end });
        }
        Ok(Self::spanning(MonthKey::of(start), MonthKey::of(end)))
    }

    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn position(&self, at: DateTime<Utc>) -> Option<usize> {
        let key = MonthKey::of(at.date_naive());
        self.months.binary_search(&key).ok()
    }
}
