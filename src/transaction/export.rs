//! Exporting the transactions of a period as CSV.

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Deserialize;
use time::{Date, OffsetDateTime};
use time_tz::Tz;

use crate::{
    AppState, Error, Period, TransactionListQuery,
    db::Database,
    settings::get_or_create_settings,
    timezone::{get_timezone, local_date},
    transaction::{TransactionView, query_transactions},
};

/// The state needed for exporting transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    pub database: Database,
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for exporting transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// The period to export, the default period from the settings if not set.
    pub period: Option<String>,
    /// A YYYY-MM-DD local date inside the period, today if not set.
    pub anchor: Option<String>,
    /// Only export "expense" or "income" transactions.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

const CSV_HEADER: [&str; 5] = ["Date", "Type", "Category", "Description", "Amount"];

/// The name of the file for transactions of `period` exported on `date`.
pub fn export_file_name(period: Period, date: Date) -> String {
    format!("expenseshub-transactions-{period}-{date}.csv")
}

/// Write transactions as CSV with every field quoted.
///
/// Dates are written as local calendar dates in `timezone` and amounts with
/// two decimal places. Transactions whose category no longer exists have an
/// empty category.
pub fn write_csv(transactions: &[TransactionView], timezone: &Tz) -> Result<String, Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for TransactionView {
        transaction,
        category,
    } in transactions
    {
        let category_name = category
            .as_ref()
            .map(|category| category.name.to_string())
            .unwrap_or_default();

        writer
            .write_record([
                local_date(timezone, transaction.date).to_string(),
                transaction.kind.to_string(),
                category_name,
                transaction.description.clone(),
                format!("{:.2}", transaction.amount),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::Csv(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::Csv(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    tracing::error!("Could not write CSV record: {error}");
    Error::Csv(error.to_string())
}

/// Download the transactions of a period as a CSV attachment.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let now = OffsetDateTime::now_utc();

    let connection = state.database.lock()?;

    let period = match query.period {
        Some(period) => period.parse()?,
        None => get_or_create_settings(now, &connection)?.default_period,
    };

    let filter = TransactionListQuery {
        kind: query.kind,
        period: Some(period.as_str().to_owned()),
        anchor: query.anchor,
        ..Default::default()
    }
    .into_filter(timezone, now)?;

    let transactions = query_transactions(&filter, &connection)
        .inspect_err(|error| tracing::error!("Could not query transactions: {error}"))?;
    let csv = write_csv(&transactions, timezone)?;
    let file_name = export_file_name(period, local_date(timezone, now));

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
