//! Chart generation and rendering for the dashboard.
//!
//! Two ECharts visualizations are built for the selected month:
//! - **Price range chart**: a bar chart of how many items fall in each price bucket
//! - **Category chart**: a pie chart of how many items there are per category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with a corresponding HTML container and initialization script.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    Month,
    transaction::{CategoryCount, PriceRangeCount},
};

/// The ECharts build loaded by the dashboard page.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the chart containers followed by the script that draws into them.
///
/// The script runs inline instead of waiting for `DOMContentLoaded` so that
/// the charts are also drawn when the dashboard content is swapped in by htmx.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }

        script { (charts_script(charts)) }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Any chart already drawn in a container is disposed first, since the
/// containers are replaced every time the month changes.
fn charts_script(charts: &[DashboardChart]) -> PreEscaped<String> {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const previous = echarts.getInstanceByDom(chartDom);
                    if (previous) {{
                        previous.dispose();
                    }}
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.dashboardCharts = window.dashboardCharts || {{}};
                    window.dashboardCharts[chartDom.id] = chart;

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                escape_script_json(&chart.options)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let resize_handler = r#"if (!window.dashboardResizeHandler) {
        window.dashboardResizeHandler = () => {
            Object.values(window.dashboardCharts || {}).forEach((chart) => chart.resize());
        };
        window.addEventListener('resize', window.dashboardResizeHandler);
    }"#;

    PreEscaped(format!("{script_content}\n{resize_handler}"))
}

/// Escape the characters that could end the surrounding `<script>` element.
///
/// The options are JSON, so the `\u` escapes decode to the same strings.
fn escape_script_json(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

/// The bar chart and pie chart for `month`.
pub(super) fn build_dashboard_charts(
    bar_chart_data: &[PriceRangeCount],
    pie_chart_data: &[CategoryCount],
    month: Month,
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "bar-chart",
            options: price_range_chart(bar_chart_data, month).to_string(),
        },
        DashboardChart {
            id: "pie-chart",
            options: category_chart(pie_chart_data, month).to_string(),
        },
    ]
}

/// A bar per price bucket, in bucket order.
pub(super) fn price_range_chart(counts: &[PriceRangeCount], month: Month) -> Chart {
    let labels: Vec<String> = counts.iter().map(|bucket| bucket.range.clone()).collect();
    let values: Vec<f64> = counts.iter().map(|bucket| bucket.count as f64).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Items by Price Range")
                .subtext(month.name()),
        )
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
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("Items").data(values))
}

/// A pie slice per category, in the order the categories were returned.
pub(super) fn category_chart(counts: &[CategoryCount], month: Month) -> Chart {
    let data: Vec<(f64, &str)> = counts
        .iter()
        .map(|category| (category.count as f64, category.category.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Items by Category")
                .subtext(month.name()),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Items")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}
