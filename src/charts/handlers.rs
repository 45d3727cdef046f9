//! The breakdown API and the charts page.

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, ChartType, Currency, DataView, DateRange, Error, Period,
    category::get_all_categories,
    charts::{
        ChartDataPoint, ChartSeries, breakdown,
        options::{chart_options, chart_script},
        total,
    },
    db::Database,
    endpoints,
    html::{
        ECHARTS_SCRIPT_URL, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, SELECTOR_ACTIVE_STYLE,
        SELECTOR_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, format_percentage, link,
    },
    period::{
        next_anchor, parse_anchor, period_range_for_date, previous_anchor, range_label,
        unsupported_anchor,
    },
    settings::get_or_create_settings,
    timezone::{get_timezone, local_date},
    transaction::{TransactionFilter, query_transactions},
};

/// The state needed for the breakdown API and the charts page.
#[derive(Debug, Clone)]
pub struct ChartsState {
    pub database: Database,
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for a breakdown, the settings provide the defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BreakdownQuery {
    /// One of daily, weekly, monthly or yearly.
    pub period: Option<String>,
    /// A YYYY-MM-DD local date inside the period, today if not set.
    pub anchor: Option<String>,
    /// Either expenses or incomes.
    pub view: Option<String>,
    /// One of bar, pie, doughnut or line. Only used by the charts page.
    pub chart: Option<String>,
}

/// The category breakdown of one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownResponse {
    /// The kind of period summarised.
    pub period: Period,
    /// Which transactions were summarised.
    pub view: DataView,
    /// The local date the period was chosen by, as YYYY-MM-DD.
    pub anchor: String,
    /// The instants the period covers.
    pub range: DateRange,
    /// A short description of the period, e.g. "March 2025".
    pub label: String,
    /// The sum of all points.
    pub total: f64,
    /// The per-category totals, largest first.
    pub points: Vec<ChartDataPoint>,
}

/// The resolved selection for a breakdown.
struct Selection {
    period: Period,
    view: DataView,
    chart_type: ChartType,
    anchor: Date,
    currency: Currency,
}

/// Fill in the parts of `query` that were not given from the settings.
fn resolve_selection(
    query: BreakdownQuery,
    today: Date,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Selection, Error> {
    let settings = get_or_create_settings(now, connection)?;

    let period = match query.period {
        Some(period) => period.parse()?,
        None => settings.default_period,
    };
    let view = match query.view {
        Some(view) => view.parse()?,
        None => settings.default_data_view,
    };
    let chart_type = match query.chart {
        Some(chart) => chart.parse()?,
        None => settings.default_chart_type,
    };
    let anchor = match query.anchor {
        Some(anchor) => parse_anchor(&anchor)?,
        None => today,
    };

    Ok(Selection {
        period,
        view,
        chart_type,
        anchor,
        currency: settings.currency,
    })
}

fn compute_breakdown(
    query: BreakdownQuery,
    state: &ChartsState,
) -> Result<(Selection, BreakdownResponse), Error> {
    let timezone = get_timezone(&state.local_timezone)?;
    let now = OffsetDateTime::now_utc();

    let connection = state.database.lock()?;
    let selection = resolve_selection(query, local_date(timezone, now), now, &connection)?;
    let range = period_range_for_date(selection.period, selection.anchor, timezone)?;
    let label = range_label(selection.period, selection.anchor).ok_or_else(unsupported_anchor)?;

    let filter = TransactionFilter {
        start: Some(range.start),
        end: Some(range.end),
        kind: Some(selection.view.kind()),
    };
    let transactions: Vec<_> = query_transactions(&filter, &connection)
        .inspect_err(|error| tracing::error!("Could not query transactions: {error}"))?
        .into_iter()
        .map(|view| view.transaction)
        .collect();
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?;

    let points = breakdown(&transactions, &categories);
    let response = BreakdownResponse {
        period: selection.period,
        view: selection.view,
        anchor: selection.anchor.to_string(),
        range,
        label,
        total: total(&points),
        points,
    };

    Ok((selection, response))
}

/// Summarise the transactions of a period by category.
pub async fn get_breakdown_endpoint(
    State(state): State<ChartsState>,
    Query(query): Query<BreakdownQuery>,
) -> Result<Json<BreakdownResponse>, Error> {
    let (_, response) = compute_breakdown(query, &state)?;

    Ok(Json(response))
}

/// Display the category breakdown of a period as a chart and a table.
pub async fn get_charts_page(
    State(state): State<ChartsState>,
    Query(query): Query<BreakdownQuery>,
) -> Result<Markup, Error> {
    let (selection, response) = compute_breakdown(query, &state)?;

    let series = ChartSeries::from(response.points.as_slice());
    let title = format!("{} by category", selection.view.label());
    let head_elements = if series.is_empty() {
        Vec::new()
    } else {
        let options = chart_options(selection.chart_type, &series, &title, &response.label);

        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
            chart_script(CHART_ID, &options),
        ]
    };

    Ok(base(
        "Charts",
        &head_elements,
        &charts_view(&selection, &response, &title),
    ))
}

const CHART_ID: &str = "breakdown-chart";

fn charts_page_url(period: Period, view: DataView, chart_type: ChartType, anchor: Date) -> String {
    format!(
        "{}?period={period}&view={view}&chart={chart_type}&anchor={anchor}",
        endpoints::CHARTS_VIEW
    )
}

fn selector_class(is_active: bool) -> &'static str {
    if is_active {
        SELECTOR_ACTIVE_STYLE
    } else {
        SELECTOR_STYLE
    }
}

fn charts_view(selection: &Selection, response: &BreakdownResponse, title: &str) -> Markup {
    let period = selection.period;
    let view = selection.view;
    let chart_type = selection.chart_type;
    let anchor = selection.anchor;
    let currency = &selection.currency;

    let export_url = format!(
        "{}?period={period}&anchor={anchor}&type={}",
        endpoints::TRANSACTIONS_EXPORT,
        view.kind()
    );

    html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { (title) }

            nav id="period-selector" class="flex flex-wrap gap-2 mb-2"
            {
                @for option in Period::ALL {
                    a
                        href=(charts_page_url(option, view, chart_type, anchor))
                        class=(selector_class(option == period))
                    { (option.label()) }
                }
            }

            nav id="view-selector" class="flex flex-wrap gap-2 mb-2"
            {
                @for option in DataView::ALL {
                    a
                        href=(charts_page_url(period, option, chart_type, anchor))
                        class=(selector_class(option == view))
                    { (option.label()) }
                }
            }

            nav id="chart-selector" class="flex flex-wrap gap-2 mb-4"
            {
                @for option in ChartType::ALL {
                    a
                        href=(charts_page_url(period, view, option, anchor))
                        class=(selector_class(option == chart_type))
                    { (option.label()) }
                }
            }

            div class="flex items-center gap-4 mb-4"
            {
                @if let Some(previous) = previous_anchor(period, anchor) {
                    a
                        id="previous-period"
                        href=(charts_page_url(period, view, chart_type, previous))
                        class=(LINK_STYLE)
                    { "Previous" }
                }

                span id="period-label" class="font-semibold" { (response.label) }

                @if let Some(next) = next_anchor(period, anchor) {
                    a
                        id="next-period"
                        href=(charts_page_url(period, view, chart_type, next))
                        class=(LINK_STYLE)
                    { "Next" }
                }
            }

            @if response.points.is_empty() {
                p id="no-data" class="my-8 text-gray-500"
                {
                    "No " (view.label().to_lowercase()) " in this period."
                }
            } @else {
                div id=(CHART_ID) class="w-full max-w-3xl min-h-[380px] rounded dark:bg-gray-100" {}

                table class="w-full max-w-3xl my-4 text-sm text-left \
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                        }
                    }

                    tbody
                    {
                        @for point in &response.points {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    span
                                        class="inline-block w-3 h-3 mr-2 rounded-full"
                                        style={"background-color: " (point.color)}
                                    {}
                                    (point.label)
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format_currency(point.value, currency))
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format_percentage(point.percentage))
                                }
                            }
                        }
                    }

                    tfoot
                    {
                        tr class="font-semibold text-gray-900 dark:text-white"
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                            td id="breakdown-total" class=(TABLE_CELL_STYLE)
                            {
                                (format_currency(response.total, currency))
                            }
                            td class=(TABLE_CELL_STYLE) {}
                        }
                    }
                }
            }

            p { (link(&export_url, "Export transactions as CSV")) }
        }
    )
}
