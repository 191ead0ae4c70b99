//! Converts recurring income and expense records into yearly or monthly figures.
//!
//! Malformed records never fail an evaluation: they contribute `0.0` and are logged.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::domain::{previous_year, Expense, Frequency, Income};

/// Days in the proration year. Leap days are absorbed by the clamp.
pub const DAYS_PER_YEAR: i64 = 365;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Accepts ISO dates, US-style dates, and ISO timestamps.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Inclusive calendar window an income is intersected with before proration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ActiveWindow {
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// January 1 through December 31 of the year before `as_of`.
    pub fn previous_year(as_of: NaiveDate) -> Option<Self> {
        Self::calendar_year(previous_year(as_of))
    }
}

/// Anything with an amount that recurs over an active date range.
pub trait Recurring {
    fn record_id(&self) -> &str;
    fn amount(&self) -> Option<f64>;
    fn frequency(&self) -> &Frequency;
    fn start_date(&self) -> &str;
    fn end_date(&self) -> Option<&str>;
}

impl Recurring for Income {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn frequency(&self) -> &Frequency {
        &self.frequency
    }

    fn start_date(&self) -> &str {
        &self.start_date
    }

    fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }
}

impl Recurring for Expense {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn frequency(&self) -> &Frequency {
        &self.frequency
    }

    fn start_date(&self) -> &str {
        &self.start_date
    }

    fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }
}

/// Prorated yearly figure for `amount` recurring at `frequency` between the two dates.
///
/// A missing `end_date` means ongoing through `today`. The active span is clamped to a
/// year, so the result never exceeds `amount * multiplier`.
pub fn yearly_amount(
    amount: f64,
    frequency: &Frequency,
    start_date: &str,
    end_date: Option<&str>,
    today: NaiveDate,
) -> f64 {
    prorate(amount, frequency, start_date, end_date, today, None)
}

/// Like [`yearly_amount`], but only the part of the active span inside `window` counts.
pub fn yearly_amount_within(
    amount: f64,
    frequency: &Frequency,
    start_date: &str,
    end_date: Option<&str>,
    today: NaiveDate,
    window: ActiveWindow,
) -> f64 {
    prorate(amount, frequency, start_date, end_date, today, Some(window))
}

pub fn yearly<R: Recurring>(record: &R, today: NaiveDate) -> f64 {
    record_yearly(record, today, None)
}

pub fn yearly_in<R: Recurring>(record: &R, today: NaiveDate, window: ActiveWindow) -> f64 {
    record_yearly(record, today, Some(window))
}

pub fn monthly<R: Recurring>(record: &R, today: NaiveDate) -> f64 {
    yearly(record, today) / 12.0
}

fn record_yearly<R: Recurring>(record: &R, today: NaiveDate, window: Option<ActiveWindow>) -> f64 {
    let Some(amount) = record.amount() else {
        warn!(record = record.record_id(), "record has no amount; counting as zero");
        return 0.0;
    };
    let value = prorate(
        amount,
        record.frequency(),
        record.start_date(),
        record.end_date(),
        today,
        window,
    );
    if value == 0.0 && amount != 0.0 {
        debug!(record = record.record_id(), "record contributes nothing in window");
    }
    value
}

fn prorate(
    amount: f64,
    frequency: &Frequency,
    start_date: &str,
    end_date: Option<&str>,
    today: NaiveDate,
    window: Option<ActiveWindow>,
) -> f64 {
    let Some(multiplier) = frequency.yearly_multiplier() else {
        warn!(frequency = frequency.label(), "unknown frequency; counting as zero");
        return 0.0;
    };

    let Some(start) = parse_record_date(start_date) else {
        warn!(start_date, "unparseable start date; counting as zero");
        return 0.0;
    };
    let end = match end_date.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => match parse_record_date(raw) {
            Some(end) => end,
            None => {
                warn!(end_date = raw, "unparseable end date; counting as zero");
                return 0.0;
            }
        },
        None => today,
    };

    let (start, end) = match window {
        Some(window) => (start.max(window.start), end.min(window.end)),
        None => (start, end),
    };

    let active_days = ((end - start).num_days() + 1).clamp(0, DAYS_PER_YEAR);
    let prorated_multiplier = active_days as f64 / DAYS_PER_YEAR as f64;

    amount * multiplier * prorated_multiplier
}
