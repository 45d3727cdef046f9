//! Settings domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, Period, TransactionKind,
    validation::{FieldResult, Payload, as_str, as_variant},
};

/// The kind of chart used to display a breakdown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Vertical bars, one per category.
    #[default]
    Bar,
    /// A pie chart.
    Pie,
    /// A pie chart with a hole in the middle.
    Doughnut,
    /// A line through the category totals.
    Line,
}

impl ChartType {
    /// All chart types in the order they are offered.
    pub const ALL: [ChartType; 4] = [
        ChartType::Bar,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Line,
    ];

    /// The value used for this chart type in query strings and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Line => "line",
        }
    }

    /// A capitalised name for display.
    pub fn label(self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Pie => "Pie",
            ChartType::Doughnut => "Doughnut",
            ChartType::Line => "Line",
        }
    }
}

impl FromStr for ChartType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "doughnut" => Ok(ChartType::Doughnut),
            "line" => Ok(ChartType::Line),
            other => Err(Error::Validation(crate::ValidationErrors::single(
                "chart",
                format!("\"{other}\" is not one of bar, pie, doughnut or line"),
            ))),
        }
    }
}

impl Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which kind of transactions a breakdown summarises.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataView {
    /// Expense transactions.
    #[default]
    Expenses,
    /// Income transactions.
    Incomes,
}

impl DataView {
    /// Both views in the order they are offered.
    pub const ALL: [DataView; 2] = [DataView::Expenses, DataView::Incomes];

    /// The kind of transactions shown in this view.
    pub fn kind(self) -> TransactionKind {
        match self {
            DataView::Expenses => TransactionKind::Expense,
            DataView::Incomes => TransactionKind::Income,
        }
    }

    /// The value used for this view in query strings and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            DataView::Expenses => "expenses",
            DataView::Incomes => "incomes",
        }
    }

    /// A capitalised name for display.
    pub fn label(self) -> &'static str {
        match self {
            DataView::Expenses => "Expenses",
            DataView::Incomes => "Incomes",
        }
    }
}

impl FromStr for DataView {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expenses" => Ok(DataView::Expenses),
            "incomes" => Ok(DataView::Incomes),
            other => Err(Error::Validation(crate::ValidationErrors::single(
                "view",
                format!("\"{other}\" is not one of expenses or incomes"),
            ))),
        }
    }
}

impl Display for DataView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A three letter currency code such as "EUR".
///
/// Amounts are displayed with the code, no conversion between currencies is done.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Currency(String);

impl Currency {
    /// Create a currency code.
    ///
    /// # Errors
    /// Returns a message describing the problem if `code` is not exactly three
    /// uppercase ASCII letters.
    pub fn new(code: &str) -> FieldResult<Self> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code.to_owned()))
        } else {
            Err("must be three uppercase letters, e.g. EUR".to_owned())
        }
    }

    /// Create a currency code without validation.
    pub fn new_unchecked(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new_unchecked("EUR")
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The display preferences, there is exactly one settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// The period shown when none is selected.
    pub default_period: Period,
    /// The chart shown when none is selected.
    pub default_chart_type: ChartType,
    /// The transactions shown when no view is selected.
    pub default_data_view: DataView,
    /// The currency amounts are displayed in.
    pub currency: Currency,
    /// When the settings were created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the settings were last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A partial update to the settings, fields left as `None` are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// The new default period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_period: Option<Period>,
    /// The new default chart type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_chart_type: Option<ChartType>,
    /// The new default data view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_data_view: Option<DataView>,
    /// The new currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl SettingsPatch {
    const FIELDS: [&str; 4] = [
        "defaultPeriod",
        "defaultChartType",
        "defaultDataView",
        "currency",
    ];

    /// Validate a settings update request body.
    ///
    /// Fields other than the four settings are rejected.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every invalid or unknown field.
    pub(crate) fn from_payload(mut payload: Payload) -> Result<Self, Error> {
        payload.reject_unknown_fields(&Self::FIELDS);

        let default_period = payload.optional("defaultPeriod", |value| {
            as_variant::<Period>(value, "daily, weekly, monthly or yearly")
        });
        let default_chart_type = payload.optional("defaultChartType", |value| {
            as_variant::<ChartType>(value, "bar, pie, doughnut or line")
        });
        let default_data_view = payload.optional("defaultDataView", |value| {
            as_variant::<DataView>(value, "expenses or incomes")
        });
        let currency = payload.optional("currency", |value| Currency::new(as_str(value)?));
        let errors = payload.into_errors();

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(Self {
            default_period,
            default_chart_type,
            default_data_view,
            currency,
        })
    }
}

#[cfg(test)]
mod settings_patch_tests {
    use serde_json::json;

    use crate::{
        ChartType, Currency, Error, Period, SettingsPatch, validation::Payload,
    };

    fn parse(value: serde_json::Value) -> Result<SettingsPatch, Error> {
        SettingsPatch::from_payload(Payload::from_value(value).unwrap())
    }

    #[test]
    fn parses_partial_patch() {
        let got = parse(json!({"defaultPeriod": "weekly", "currency": "NZD"}));

        assert_eq!(
            got,
            Ok(SettingsPatch {
                default_period: Some(Period::Weekly),
                currency: Some(Currency::new_unchecked("NZD")),
                ..Default::default()
            })
        );
    }

    #[test]
    fn empty_patch_is_valid() {
        assert_eq!(parse(json!({})), Ok(SettingsPatch::default()));
    }

    #[test]
    fn rejects_invalid_values_and_unknown_fields() {
        let got = parse(json!({
            "defaultPeriod": "hourly",
            "defaultChartType": "radar",
            "currency": "eur",
            "theme": "dark"
        }));

        let Err(Error::Validation(errors)) = got else {
            panic!("expected a validation error, got {got:?}");
        };
        let fields: Vec<_> = errors
            .violations()
            .iter()
            .map(|violation| violation.field.as_str())
            .collect();
        assert_eq!(
            fields,
            ["theme", "defaultPeriod", "defaultChartType", "currency"]
        );
    }

    #[test]
    fn chart_type_round_trips_through_str() {
        for chart_type in ChartType::ALL {
            assert_eq!(chart_type.as_str().parse(), Ok(chart_type));
        }
    }

    #[test]
    fn currency_must_be_three_uppercase_letters() {
        assert!(Currency::new("EUR").is_ok());
        assert!(Currency::new("EU").is_err());
        assert!(Currency::new("EURO").is_err());
        assert!(Currency::new("€UR").is_err());
    }
}
