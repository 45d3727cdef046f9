use maud::{DOCTYPE, Markup, PreEscaped, html};

use numfmt::{Formatter, Precision};

use crate::Currency;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Selector styles, for the period, view and chart type choices
pub const SELECTOR_STYLE: &str = "px-3 py-1.5 text-sm font-medium rounded border \
    border-gray-300 dark:border-gray-600 text-gray-700 dark:text-white \
    hover:bg-gray-100 hover:dark:bg-gray-600";
pub const SELECTOR_ACTIVE_STYLE: &str = "px-3 py-1.5 text-sm font-medium rounded border \
    border-blue-600 bg-blue-50 text-blue-700 dark:border-blue-500 \
    dark:bg-blue-600/20 dark:text-blue-200";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Where the ECharts library is loaded from.
pub const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - ExpensesHub" }
                script src="https://cdn.tailwindcss.com" {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

/// Format `number` with two decimal places and thousands separators, prefixed
/// by the currency code, e.g. "EUR 1,234.50".
pub fn format_currency(number: f64, currency: &Currency) -> String {
    let sign = if number < 0.0 { "-" } else { "" };
    let code = currency.as_ref();

    // Zero is hardcoded as "0", so we must specify the formatted string for zero
    if number == 0.0 {
        return format!("{code} 0.00");
    }

    let prefix = format!("{sign}{code} ");
    let formatted = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(2))
            .fmt_string(number.abs()),
        Err(error) => {
            tracing::warn!("Could not create currency formatter for {code}: {error:?}");
            format!("{prefix}{:.2}", number.abs())
        }
    };

    pad_decimals(formatted)
}

/// numfmt omits trailing zeros, so "12.30" is rendered as "12.3" and "12.00"
/// as "12". Pad the fraction back out to two digits.
fn pad_decimals(formatted: String) -> String {
    match formatted.split_once('.') {
        Some((_, fraction)) if fraction.len() >= 2 => formatted,
        Some((_, fraction)) => format!("{formatted}{}", "0".repeat(2 - fraction.len())),
        None => format!("{formatted}.00"),
    }
}

/// Format a percentage with one decimal place, e.g. "42.5%".
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}

/// A link with blue text.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE)
        {
          (text)
        }
    )
}
