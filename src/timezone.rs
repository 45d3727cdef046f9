//! Conversions between UTC instants and the calendar of the configured timezone.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns an [Error::InvalidTimezone] if the name is not a known IANA timezone.
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {canonical_timezone}");
        Error::InvalidTimezone(canonical_timezone.to_owned())
    })
}

/// The UTC offset observed in `timezone` at `instant`.
pub fn offset_at(timezone: &Tz, instant: OffsetDateTime) -> UtcOffset {
    timezone.get_offset_utc(&instant).to_utc()
}

/// The calendar date in `timezone` at `instant`.
pub fn local_date(timezone: &Tz, instant: OffsetDateTime) -> Date {
    instant.to_offset(offset_at(timezone, instant)).date()
}

/// The UTC instant of the start of `date` in `timezone`.
///
/// The offset is looked up twice since the offset at local midnight may
/// differ from the offset at UTC midnight when a DST transition falls between
/// the two.
pub fn local_midnight(timezone: &Tz, date: Date) -> OffsetDateTime {
    let midnight = date.midnight();
    let first_guess = midnight.assume_offset(offset_at(timezone, midnight.assume_utc()));
    let offset = offset_at(timezone, first_guess);

    midnight.assume_offset(offset).to_offset(UtcOffset::UTC)
}
