//! Category breakdowns of transactions and the charts that display them.

mod aggregation;
mod handlers;
mod options;

pub use aggregation::{ChartDataPoint, ChartSeries, breakdown, total};
pub use handlers::{BreakdownResponse, get_breakdown_endpoint, get_charts_page};
