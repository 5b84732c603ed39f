//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and changing the month
//! - HTML view functions for rendering the dashboard UI
//! - The router that serves the dashboard

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::Form;
use axum_htmx::HxRequest;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Month,
    dashboard::{
        DataSource,
        charts::{ECHARTS_SCRIPT_URL, build_dashboard_charts, charts_view},
        state::{Dashboard, DashboardSnapshot},
    },
    endpoints,
    html::{
        CARD_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base,
        format_currency,
    },
    transaction::Transaction,
};

/// Form data for changing the selected month.
#[derive(Debug, Deserialize, Serialize)]
pub struct MonthForm {
    /// The two-digit month, e.g. "03".
    pub month: String,
}

/// Create the router for the dashboard pages.
///
/// Every client shares `dashboard`, so a month selected by one browser is
/// the month every other browser sees on its next page load.
pub fn build_dashboard_router<S>(dashboard: Arc<Dashboard<S>>) -> Router
where
    S: DataSource + 'static,
{
    Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page::<S>))
        .route(endpoints::DASHBOARD_MONTH, post(select_month_endpoint::<S>))
        .with_state(dashboard)
}

/// Reload the data for the currently selected month and display the dashboard.
///
/// If the reads fail, the page shows the data from the last successful load.
async fn get_dashboard_page<S: DataSource>(
    State(dashboard): State<Arc<Dashboard<S>>>,
) -> Markup {
    let month = dashboard.snapshot().month;

    dashboard_view(&dashboard.select_month(month).await)
}

/// Change the selected month and return the refreshed dashboard.
///
/// htmx requests get just the dashboard content to swap in, other requests
/// are redirected back to the full page.
async fn select_month_endpoint<S: DataSource>(
    State(dashboard): State<Arc<Dashboard<S>>>,
    HxRequest(is_htmx_request): HxRequest,
    Form(form): Form<MonthForm>,
) -> Result<Response, Error> {
    let month: Month = form
        .month
        .parse()
        .inspect_err(|error| tracing::warn!("Rejected month selection: {error}"))?;

    let snapshot = dashboard.select_month(month).await;

    if is_htmx_request {
        Ok(dashboard_content(&snapshot).into_response())
    } else {
        Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response())
    }
}

fn dashboard_view(snapshot: &DashboardSnapshot) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold my-6" { "Transactions Dashboard" }

            (dashboard_content(snapshot))
        }
    );

    let scripts = [HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned())];

    base("Dashboard", &scripts, &content)
}

/// The part of the page that is replaced when the month changes.
fn dashboard_content(snapshot: &DashboardSnapshot) -> Markup {
    let charts = build_dashboard_charts(&snapshot.bar_chart, &snapshot.pie_chart, snapshot.month);

    html!(
        div id="dashboard-content" class="w-full"
        {
            (month_select(snapshot.month))
            (statistics_cards(snapshot))
            (charts_view(&charts))
            (transaction_list(&snapshot.transactions, snapshot.month))
        }
    )
}

fn month_select(selected: Month) -> Markup {
    html!(
        form
            method="post"
            action=(endpoints::DASHBOARD_MONTH)
            hx-post=(endpoints::DASHBOARD_MONTH)
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-trigger="change"
            class="mb-6 max-w-xs"
        {
            label for="month" class=(FORM_LABEL_STYLE) { "Month" }

            select id="month" name="month" class=(FORM_SELECT_STYLE)
            {
                @for month in Month::all() {
                    option value=(month.as_str()) selected[month == selected]
                    {
                        (month.name())
                    }
                }
            }
        }
    )
}

fn statistics_cards(snapshot: &DashboardSnapshot) -> Markup {
    let statistics = &snapshot.statistics;
    let cards = [
        ("Total sale amount", format_currency(statistics.total_sale_amount)),
        ("Total sold items", statistics.total_sold_items.to_string()),
        ("Total not sold items", statistics.total_not_sold_items.to_string()),
    ];

    html!(
        section id="statistics" class="w-full mb-6"
        {
            h2 class="text-xl font-semibold mb-4" { "Statistics for " (snapshot.month.name()) }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4"
            {
                @for (label, value) in cards {
                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                        p class="text-2xl font-bold" { (value) }
                    }
                }
            }
        }
    )
}

fn transaction_list(transactions: &[Transaction], month: Month) -> Markup {
    html!(
        section id="transactions" class="w-full mb-8"
        {
            h2 class="text-xl font-semibold mb-4" { "Transactions" }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions for " (month.name()) "."
                }
            } @else {
                ul class=(format!("{CARD_STYLE} divide-y divide-gray-200 dark:divide-gray-700"))
                {
                    @for transaction in transactions {
                        li class="py-2" { (transaction.title) }
                    }
                }
            }
        }
    )
}
