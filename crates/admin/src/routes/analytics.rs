//! Analytics page: revenue and volume aggregates.
//!
//! Everything here is recomputed from the full order and user lists on every
//! load. O(n) scans are fine at this shop's volume; there is no cached or
//! incremental state to get out of sync.

use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::instrument;

use timeless_strokes_core::{Order, UserProfile};
use timeless_strokes_firebase::{OrdersStore, UsersStore};

use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireAdmin;
use crate::routes::setup_guide;
use crate::state::AppState;

use super::dashboard::UserView;

/// How many trailing months the revenue chart shows.
const MONTHS_SHOWN: usize = 6;

/// One month of revenue and order volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRevenue {
    /// Display label, e.g. "Mar 2026".
    pub month: String,
    pub revenue: u32,
    pub orders: usize,
}

/// One slice of the status or size distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSlice {
    pub label: String,
    pub count: usize,
}

/// Aggregates computed from the full order and user lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analytics {
    pub total_revenue: u32,
    pub total_orders: usize,
    pub total_users: usize,
    /// Formatted to cents, e.g. "41.67".
    pub average_order_value: String,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub orders_by_status: Vec<CountSlice>,
    pub orders_by_size: Vec<CountSlice>,
}

impl Analytics {
    /// Compute all aggregates in a handful of O(n) scans.
    #[must_use]
    pub fn compute(orders: &[Order], users: &[UserProfile]) -> Self {
        let total_revenue: u32 = orders.iter().map(|o| o.pricing.total).sum();
        let total_orders = orders.len();

        let average_order_value = if total_orders == 0 {
            "0.00".to_owned()
        } else {
            let average = Decimal::from(total_revenue) / Decimal::from(total_orders);
            format!("{:.2}", average.round_dp(2))
        };

        Self {
            total_revenue,
            total_orders,
            total_users: users.len(),
            average_order_value,
            monthly_revenue: monthly_revenue(orders),
            orders_by_status: orders_by_status(orders),
            orders_by_size: orders_by_size(orders),
        }
    }
}

/// Revenue and order volume per month, chronological, last six months with
/// any orders.
fn monthly_revenue(orders: &[Order]) -> Vec<MonthlyRevenue> {
    // Key by (year, month) so sorting is chronological, not lexical.
    let mut by_month: HashMap<(i32, u32), (u32, usize)> = HashMap::new();
    for order in orders {
        let key = (order.created_at.year(), order.created_at.month());
        let entry = by_month.entry(key).or_default();
        entry.0 += order.pricing.total;
        entry.1 += 1;
    }

    let mut months: Vec<_> = by_month.into_iter().collect();
    months.sort_by_key(|((year, month), _)| (*year, *month));

    months
        .into_iter()
        .rev()
        .take(MONTHS_SHOWN)
        .rev()
        .map(|((year, month), (revenue, orders))| MonthlyRevenue {
            month: format!("{} {year}", month_name(month)),
            revenue,
            orders,
        })
        .collect()
}

fn orders_by_status(orders: &[Order]) -> Vec<CountSlice> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for order in orders {
        *counts.entry(order.status.label()).or_default() += 1;
    }

    let mut slices: Vec<CountSlice> = counts
        .into_iter()
        .map(|(label, count)| CountSlice {
            label: label.to_owned(),
            count,
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
    slices
}

fn orders_by_size(orders: &[Order]) -> Vec<CountSlice> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for order in orders {
        *counts.entry(order.order_details.size.clone()).or_default() += 1;
    }

    let mut slices: Vec<CountSlice> = counts
        .into_iter()
        .map(|(label, count)| CountSlice { label, count })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
    slices
}

const fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

/// Analytics page template.
#[derive(Template)]
#[template(path = "analytics/index.html")]
pub struct AnalyticsTemplate {
    pub user: UserView,
    pub current_path: String,
    pub analytics: Analytics,
}

/// Analytics page handler.
///
/// GET /analytics
#[instrument(skip(user, state))]
pub async fn index(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Response> {
    let orders_store = OrdersStore::with_session(state.firebase(), &user.id_token);
    let users_store = UsersStore::with_session(state.firebase(), &user.id_token);

    let orders = match orders_store.list().await {
        Ok(orders) => orders,
        Err(e) if e.needs_setup_guide() => return Ok(setup_guide(&e.to_string()).into_response()),
        Err(e) => return Err(e.into()),
    };
    let users = users_store.list().await?;

    let template = AnalyticsTemplate {
        user: UserView::from(&user),
        current_path: "/analytics".to_owned(),
        analytics: Analytics::compute(&orders, &users),
    };
    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
    .into_response())
}
