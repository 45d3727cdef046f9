//! ECharts configuration for breakdown charts.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Line, Pie, bar},
};
use maud::PreEscaped;
use serde_json::Value;

use crate::{ChartType, charts::ChartSeries, html::HeadElement};

/// Build the ECharts options for plotting `series` as `chart_type`, as JSON.
///
/// Every category is drawn in its own color.
pub(crate) fn chart_options(
    chart_type: ChartType,
    series: &ChartSeries,
    title: &str,
    subtitle: &str,
) -> String {
    let chart = match chart_type {
        ChartType::Bar | ChartType::Line => axis_chart(chart_type, series, title, subtitle),
        ChartType::Pie | ChartType::Doughnut => pie_chart(chart_type, series, title, subtitle),
    };

    with_category_colors(&chart.to_string(), &series.colors)
}

fn axis_chart(chart_type: ChartType, series: &ChartSeries, title: &str, subtitle: &str) -> Chart {
    let chart = Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(Axis::new().type_(AxisType::Value));

    if chart_type == ChartType::Line {
        chart.series(Line::new().name(title).data(series.values.clone()))
    } else {
        chart.series(bar::Bar::new().name(title).data(series.values.clone()))
    }
}

fn pie_chart(chart_type: ChartType, series: &ChartSeries, title: &str, subtitle: &str) -> Chart {
    let data: Vec<(f64, &str)> = series
        .values
        .iter()
        .zip(&series.labels)
        .map(|(value, label)| (*value, label.as_str()))
        .collect();

    let pie = Pie::new().name(title).data(data);
    let pie = if chart_type == ChartType::Doughnut {
        pie.radius(vec!["40%", "70%"])
    } else {
        pie.radius("60%")
    };

    Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().left("center").top("bottom"))
        .series(pie)
}

/// Set the chart palette to the category colors and color each data item
/// rather than each series.
fn with_category_colors(options: &str, colors: &[String]) -> String {
    let mut value: Value = match serde_json::from_str(options) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!("Could not parse chart options, using the default palette: {error}");
            return options.to_owned();
        }
    };

    let Some(object) = value.as_object_mut() else {
        return options.to_owned();
    };

    object.insert(
        "color".to_owned(),
        Value::from(colors.iter().map(String::as_str).collect::<Vec<_>>()),
    );

    if let Some(Value::Array(series)) = object.get_mut("series") {
        for item in series.iter_mut().filter_map(Value::as_object_mut) {
            item.insert("colorBy".to_owned(), Value::from("data"));
        }
    }

    value.to_string()
}

/// JavaScript that draws the chart with `options` into the element `id` once
/// the page has loaded.
pub(crate) fn chart_script(id: &str, options: &str) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{id}");
            const chart = echarts.init(chartDom);
            const option = {options};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}
