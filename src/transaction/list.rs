//! Listing transactions by date range, period and kind.

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use time_tz::Tz;

use crate::{
    AppState, Error, Period, ValidationErrors,
    db::Database,
    period::{parse_local_date, period_range_for_date},
    timezone::{get_timezone, local_date, local_midnight},
    transaction::{TransactionFilter, TransactionKind, TransactionView, query_transactions},
    validation::FieldResult,
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub database: Database,
    pub local_timezone: String,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for listing transactions.
///
/// Explicit `startDate`/`endDate` bounds take precedence over `period`.
/// Without either, every transaction is listed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    /// The first instant to include, an RFC 3339 date-time or a YYYY-MM-DD local date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// The first instant to exclude, an RFC 3339 date-time or a YYYY-MM-DD local date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Only list "expense" or "income" transactions.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// List the transactions in the daily, weekly, monthly or yearly period containing `anchor`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// A YYYY-MM-DD local date inside the period, today if not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl TransactionListQuery {
    /// Resolve the query parameters into a filter over UTC instants.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] for an unknown period, otherwise an
    /// [Error::Validation] listing every invalid parameter.
    pub(crate) fn into_filter(
        self,
        timezone: &Tz,
        now: OffsetDateTime,
    ) -> Result<TransactionFilter, Error> {
        let period = self
            .period
            .as_deref()
            .map(str::parse::<Period>)
            .transpose()?;

        let mut errors = ValidationErrors::default();

        let kind = self.kind.as_deref().and_then(|kind| {
            kind.parse::<TransactionKind>()
                .inspect_err(|_| errors.push("type", "must be one of expense or income"))
                .ok()
        });
        let start = self
            .start_date
            .as_deref()
            .and_then(|text| check(&mut errors, "startDate", parse_bound(text, timezone)));
        let end = self
            .end_date
            .as_deref()
            .and_then(|text| check(&mut errors, "endDate", parse_bound(text, timezone)));
        let anchor = self
            .anchor
            .as_deref()
            .and_then(|text| check(&mut errors, "anchor", parse_local_date(text)));

        if self.anchor.is_some() && period.is_none() {
            errors.push("anchor", "can only be used together with period");
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let range = match (start, end, period) {
            (None, None, Some(period)) => {
                let date = anchor.unwrap_or_else(|| local_date(timezone, now));
                let range = period_range_for_date(period, date, timezone)?;

                (Some(range.start), Some(range.end))
            }
            _ => (start, end),
        };

        Ok(TransactionFilter {
            start: range.0,
            end: range.1,
            kind,
        })
    }
}

fn check<T>(errors: &mut ValidationErrors, field: &str, result: FieldResult<T>) -> Option<T> {
    result.inspect_err(|message| errors.push(field, message)).ok()
}

/// Parse a range bound given either as an instant or as a local date, which
/// means the start of that day.
fn parse_bound(text: &str, timezone: &Tz) -> FieldResult<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(instant);
    }

    parse_local_date(text)
        .map(|date| local_midnight(timezone, date))
        .map_err(|_| "must be an RFC 3339 date-time or a date in the form YYYY-MM-DD".to_owned())
}

/// List transactions with their categories, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let filter = query.into_filter(timezone, OffsetDateTime::now_utc())?;

    let connection = state.database.lock()?;

    let transactions = query_transactions(&filter, &connection)
        .inspect_err(|error| tracing::error!("Could not query transactions: {error}"))?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod transaction_list_query_tests {
    use time::macros::datetime;

    use crate::{
        Error, TransactionKind, TransactionListQuery, timezone::get_timezone,
        transaction::TransactionFilter,
    };

    fn resolve(query: TransactionListQuery) -> Result<TransactionFilter, Error> {
        let timezone = get_timezone("Etc/UTC").unwrap();

        query.into_filter(timezone, datetime!(2025-03-15 14:30 UTC))
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(
            resolve(TransactionListQuery::default()),
            Ok(TransactionFilter::default())
        );
    }

    #[test]
    fn period_defaults_to_today() {
        let got = resolve(TransactionListQuery {
            period: Some("monthly".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            got,
            Ok(TransactionFilter {
                start: Some(datetime!(2025-03-01 00:00 UTC)),
                end: Some(datetime!(2025-04-01 00:00 UTC)),
                kind: None,
            })
        );
    }

    #[test]
    fn period_with_anchor() {
        let got = resolve(TransactionListQuery {
            period: Some("weekly".to_owned()),
            anchor: Some("2025-01-01".to_owned()),
            kind: Some("expense".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            got,
            Ok(TransactionFilter {
                start: Some(datetime!(2024-12-30 00:00 UTC)),
                end: Some(datetime!(2025-01-06 00:00 UTC)),
                kind: Some(TransactionKind::Expense),
            })
        );
    }

    #[test]
    fn explicit_dates_take_precedence() {
        let got = resolve(TransactionListQuery {
            start_date: Some("2025-02-01T00:00:00Z".to_owned()),
            end_date: Some("2025-02-10".to_owned()),
            period: Some("yearly".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            got,
            Ok(TransactionFilter {
                start: Some(datetime!(2025-02-01 00:00 UTC)),
                end: Some(datetime!(2025-02-10 00:00 UTC)),
                kind: None,
            })
        );
    }

    #[test]
    fn unknown_period_is_invalid() {
        let got = resolve(TransactionListQuery {
            period: Some("hourly".to_owned()),
            ..Default::default()
        });

        assert_eq!(got, Err(Error::InvalidPeriod("hourly".to_owned())));
    }

    #[test]
    fn anchor_past_last_supported_year_is_invalid() {
        let got = resolve(TransactionListQuery {
            period: Some("yearly".to_owned()),
            anchor: Some("9999-06-15".to_owned()),
            ..Default::default()
        });

        let Err(Error::Validation(errors)) = got else {
            panic!("expected a validation error, got {got:?}");
        };
        assert_eq!(errors.violations()[0].field, "anchor");
    }

    #[test]
    fn local_end_date_past_last_supported_year_is_invalid() {
        let got = resolve(TransactionListQuery {
            end_date: Some("9999-12-31".to_owned()),
            ..Default::default()
        });

        let Err(Error::Validation(errors)) = got else {
            panic!("expected a validation error, got {got:?}");
        };
        assert_eq!(errors.violations()[0].field, "endDate");
    }

    #[test]
    fn reports_every_invalid_parameter() {
        let got = resolve(TransactionListQuery {
            start_date: Some("last week".to_owned()),
            end_date: Some("2025-13-01".to_owned()),
            kind: Some("transfer".to_owned()),
            anchor: Some("2025-03-01".to_owned()),
            period: None,
        });

        let Err(Error::Validation(errors)) = got else {
            panic!("expected a validation error, got {got:?}");
        };
        let fields: Vec<_> = errors
            .violations()
            .iter()
            .map(|violation| violation.field.as_str())
            .collect();
        assert_eq!(fields, ["type", "startDate", "endDate", "anchor"]);
    }
}
