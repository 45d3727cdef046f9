//! Calendar periods and the instant ranges they cover.
//!
//! A period is resolved against a reference date in the configured timezone,
//! and the resulting range is expressed as UTC instants with an inclusive
//! start and an exclusive end.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{
    Date, Duration, Month, OffsetDateTime,
    macros::{date, format_description},
};
use time_tz::Tz;

use crate::{
    Error, ValidationErrors,
    timezone::{local_date, local_midnight},
    validation::FieldResult,
};

/// The calendar unit that transactions are summarised over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// A single calendar day.
    Daily,
    /// Monday through Sunday.
    Weekly,
    /// The first through the last day of a month.
    #[default]
    Monthly,
    /// January 1st through December 31st.
    Yearly,
}

impl Period {
    /// All periods in ascending order of length.
    pub const ALL: [Period; 4] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::Yearly,
    ];

    /// The value used for this period in query strings and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// A capitalised name for display.
    pub fn label(self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Yearly => "Yearly",
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(Error::InvalidPeriod(other.to_owned())),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A half-open range of UTC instants, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first instant in the range.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// The first instant after the range.
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl DateRange {
    /// Whether `instant` falls within the range.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The local calendar dates covered by a period, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CalendarRange {
    pub start: Date,
    pub end: Date,
}

/// The earliest local date that a period can be resolved for.
pub const MIN_DATE: Date = date!(0001 - 01 - 01);

/// The latest local date that a period can be resolved for.
///
/// A yearly period ends on the first day of the next year, which must still
/// be a representable date.
pub const MAX_DATE: Date = date!(9998 - 12 - 31);

const UNSUPPORTED_DATE_MESSAGE: &str = "must be between 0001-01-01 and 9998-12-31";

/// The error for an anchor date that periods cannot be resolved for.
pub(crate) fn unsupported_anchor() -> Error {
    Error::Validation(ValidationErrors::single("anchor", UNSUPPORTED_DATE_MESSAGE))
}

fn is_supported(date: Date) -> bool {
    (MIN_DATE..=MAX_DATE).contains(&date)
}

/// The range covering the calendar unit that contains `reference` in `timezone`.
///
/// # Errors
/// Returns an [Error::Validation] on the field `anchor` if the local date of
/// `reference` is outside [MIN_DATE] and [MAX_DATE].
pub fn period_range(
    period: Period,
    reference: OffsetDateTime,
    timezone: &Tz,
) -> Result<DateRange, Error> {
    period_range_for_date(period, local_date(timezone, reference), timezone)
}

/// The range covering the calendar unit that contains the local `date`.
///
/// The UTC offset is looked up separately for each boundary so ranges that
/// span a daylight saving transition stay aligned to local midnight.
///
/// # Errors
/// Returns an [Error::Validation] on the field `anchor` if `date` is outside
/// [MIN_DATE] and [MAX_DATE].
pub fn period_range_for_date(
    period: Period,
    date: Date,
    timezone: &Tz,
) -> Result<DateRange, Error> {
    if !is_supported(date) {
        return Err(unsupported_anchor());
    }

    let CalendarRange { start, end } =
        calendar_range(period, date).ok_or_else(unsupported_anchor)?;

    Ok(DateRange {
        start: local_midnight(timezone, start),
        end: local_midnight(timezone, end),
    })
}

/// The local dates of the period containing `date`, or `None` if a boundary
/// is not a representable date.
pub(crate) fn calendar_range(period: Period, date: Date) -> Option<CalendarRange> {
    match period {
        Period::Daily => date.next_day().map(|end| CalendarRange { start: date, end }),
        Period::Weekly => week_bounds(date),
        Period::Monthly => month_bounds(date),
        Period::Yearly => year_bounds(date),
    }
}

/// A date inside the period immediately before the one containing `date`.
///
/// `None` if that period starts before [MIN_DATE].
pub(crate) fn previous_anchor(period: Period, date: Date) -> Option<Date> {
    calendar_range(period, date)?
        .start
        .previous_day()
        .filter(|anchor| is_supported(*anchor))
}

/// A date inside the period immediately after the one containing `date`.
///
/// `None` if that period ends after [MAX_DATE].
pub(crate) fn next_anchor(period: Period, date: Date) -> Option<Date> {
    calendar_range(period, date)
        .map(|range| range.end)
        .filter(|anchor| is_supported(*anchor))
}

/// A short description of the period containing `date`, e.g. "March 2025".
pub(crate) fn range_label(period: Period, date: Date) -> Option<String> {
    let CalendarRange { start, end } = calendar_range(period, date)?;
    let last_day = end.previous_day()?;

    let label = match period {
        Period::Daily => format_date_label(start),
        Period::Weekly => format!(
            "{} - {}",
            format_date_label(start),
            format_date_label(last_day)
        ),
        Period::Monthly => format!("{} {}", start.month(), start.year()),
        Period::Yearly => start.year().to_string(),
    };

    Some(label)
}

/// Parse an anchor date in the form YYYY-MM-DD.
///
/// # Errors
/// Returns an [Error::Validation] on the field `anchor` if the text is not a
/// valid date or the date is outside [MIN_DATE] and [MAX_DATE].
pub(crate) fn parse_anchor(text: &str) -> Result<Date, Error> {
    parse_local_date(text)
        .map_err(|message| Error::Validation(ValidationErrors::single("anchor", message)))
}

/// Parse a calendar date in the form YYYY-MM-DD, between [MIN_DATE] and [MAX_DATE].
pub(crate) fn parse_local_date(text: &str) -> FieldResult<Date> {
    let date = Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|_| "must be a date in the form YYYY-MM-DD".to_owned())?;

    if is_supported(date) {
        Ok(date)
    } else {
        Err(UNSUPPORTED_DATE_MESSAGE.to_owned())
    }
}

fn format_date_label(date: Date) -> String {
    format!("{} {} {}", date.day(), short_month_name(date.month()), date.year())
}

fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn week_bounds(date: Date) -> Option<CalendarRange> {
    let weekday_number = date.weekday().number_from_monday() as i64;
    let start = date.checked_sub(Duration::days(weekday_number - 1))?;

    Some(CalendarRange {
        start,
        end: start.checked_add(Duration::days(7))?,
    })
}

fn month_bounds(date: Date) -> Option<CalendarRange> {
    let start = date.checked_sub(Duration::days(date.day() as i64 - 1))?;
    let length = last_day_of_month(date.year(), date.month()) as i64;

    Some(CalendarRange {
        start,
        end: start.checked_add(Duration::days(length))?,
    })
}

fn year_bounds(date: Date) -> Option<CalendarRange> {
    let start = date.checked_sub(Duration::days(date.ordinal() as i64 - 1))?;
    let length = if is_leap_year(date.year()) { 366 } else { 365 };

    Some(CalendarRange {
        start,
        end: start.checked_add(Duration::days(length))?,
    })
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
