//! Orders table, detail, and status-change handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use timeless_strokes_core::{Order, OrderId, OrderStatus};
use timeless_strokes_firebase::OrdersStore;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::RequireAdmin;
use crate::routes::setup_guide;
use crate::state::AppState;

use super::dashboard::{StatusCounts, UserView};

/// Orders list query parameters: search term and status filter.
///
/// Filtering is applied to the already-fetched list; it never changes what
/// is fetched.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// Case-insensitive search over customer name, email, and occasion.
    #[serde(default)]
    pub q: Option<String>,
    /// Exact status match; absent or "all" means no filter.
    #[serde(default)]
    pub status: Option<String>,
}

/// Filter a fetched order list down to the query.
#[must_use]
pub fn apply_filters(orders: &[Order], query: &OrdersQuery) -> Vec<Order> {
    let status_filter: Option<OrderStatus> = query
        .status
        .as_deref()
        .filter(|s| *s != "all")
        .and_then(|s| s.parse().ok());

    orders
        .iter()
        .filter(|order| {
            let matches_search = query
                .q
                .as_deref()
                .is_none_or(|term| term.is_empty() || order.matches_search(term));
            let matches_status =
                status_filter.is_none_or(|status| order.status == status);
            matches_search && matches_status
        })
        .cloned()
        .collect()
}

/// One choice in a status-change select. Every status is offered from every
/// status; the select is purely a field writer.
pub struct StatusOption {
    pub value: OrderStatus,
    pub label: &'static str,
    pub selected: bool,
}

/// All statuses as select options, with the order's current one selected.
#[must_use]
pub fn status_options(current: OrderStatus) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status,
            label: status.label(),
            selected: status == current,
        })
        .collect()
}

/// One row of the orders table.
pub struct OrderRow {
    pub id: String,
    pub customer: String,
    pub email: String,
    pub occasion: String,
    pub size: String,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub date: String,
    pub total: u32,
    pub statuses: Vec<StatusOption>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer: order.customer_info.name.clone(),
            email: order.customer_info.email.clone(),
            occasion: order.order_details.occasion.clone(),
            size: order.order_details.size.clone(),
            status: order.status,
            status_label: order.status.label(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            total: order.pricing.total,
            statuses: status_options(order.status),
        }
    }
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub user: UserView,
    pub current_path: String,
    pub counts: StatusCounts,
    pub rows: Vec<OrderRow>,
    pub search_value: String,
    pub status_value: String,
}

/// Orders list page handler.
///
/// GET /orders
#[instrument(skip(user, state))]
pub async fn index(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Response> {
    let store = OrdersStore::with_session(state.firebase(), &user.id_token);

    let orders = match store.list().await {
        Ok(orders) => orders,
        Err(e) if e.needs_setup_guide() => return Ok(setup_guide(&e.to_string()).into_response()),
        Err(e) => return Err(e.into()),
    };

    // Stats reflect the whole collection; the filter only narrows the table.
    let counts = StatusCounts::tally(&orders);
    let rows = apply_filters(&orders, &query).iter().map(OrderRow::from).collect();

    let template = OrdersIndexTemplate {
        user: UserView::from(&user),
        current_path: "/orders".to_owned(),
        counts,
        rows,
        search_value: query.q.unwrap_or_default(),
        status_value: query.status.unwrap_or_else(|| "all".to_owned()),
    };
    Ok(render(template))
}

/// Order detail page template.
#[derive(Template)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub user: UserView,
    pub current_path: String,
    pub order: Order,
    pub status_label: &'static str,
    pub statuses: Vec<StatusOption>,
}

/// Order detail page handler.
///
/// GET /orders/{id}
#[instrument(skip(user, state))]
pub async fn show(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let store = OrdersStore::with_session(state.firebase(), &user.id_token);
    let order_id = OrderId::new(id);

    let Some(order) = store.get(&order_id).await? else {
        return Err(AppError::BadRequest(format!("no such order: {order_id}")));
    };

    let template = OrderDetailTemplate {
        user: UserView::from(&user),
        current_path: "/orders".to_owned(),
        status_label: order.status.label(),
        statuses: status_options(order.status),
        order,
    };
    Ok(render(template))
}

/// Status-change form fields.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Move an order to a new status, then reload the table (a full re-fetch).
///
/// POST /orders/{id}/status
#[instrument(skip(user, state))]
pub async fn update_status(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let next: OrderStatus = form
        .status
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    let store = OrdersStore::with_session(state.firebase(), &user.id_token);
    store.update_status(&OrderId::new(id), next).await?;

    Ok(Redirect::to("/orders"))
}

fn render<T: Template>(template: T) -> Response {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use timeless_strokes_core::{
        CustomerInfo, OrderDetails, OrderOptions, PriceBreakdown,
    };

    use super::*;

    fn order(name: &str, occasion: &str, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(name.to_lowercase()),
            customer_info: CustomerInfo {
                name: name.to_owned(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: String::new(),
            },
            order_details: OrderDetails {
                occasion: occasion.to_owned(),
                size: "mini".to_owned(),
                color_scheme: String::new(),
                exact_wording: String::new(),
                date_needed: String::new(),
                special_requests: None,
            },
            shipping_info: None,
            shipping_location: String::new(),
            pricing: PriceBreakdown {
                base_price: 20,
                extras: 0,
                shipping: 0,
                total: 20,
            },
            options: OrderOptions::default(),
            inspiration_pic_urls: vec![],
            created_at: Utc::now(),
            status,
        }
    }

    #[test]
    fn test_search_filters_by_name_email_occasion() {
        let orders = vec![
            order("June", "Graduation", OrderStatus::Pending),
            order("Roy", "Retirement", OrderStatus::Pending),
        ];

        let query = OrdersQuery {
            q: Some("gradu".to_owned()),
            status: None,
        };
        let filtered = apply_filters(&orders, &query);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.first().map(|o| o.customer_info.name.as_str()), Some("June"));
    }

    #[test]
    fn test_status_filter_and_all_sentinel() {
        let orders = vec![
            order("June", "Graduation", OrderStatus::Pending),
            order("Roy", "Retirement", OrderStatus::Completed),
        ];

        let query = OrdersQuery {
            q: None,
            status: Some("completed".to_owned()),
        };
        assert_eq!(apply_filters(&orders, &query).len(), 1);

        let query = OrdersQuery {
            q: None,
            status: Some("all".to_owned()),
        };
        assert_eq!(apply_filters(&orders, &query).len(), 2);
    }

    #[test]
    fn test_unknown_status_filter_matches_everything() {
        let orders = vec![order("June", "Graduation", OrderStatus::Pending)];
        let query = OrdersQuery {
            q: None,
            status: Some("confirmed".to_owned()),
        };
        // Unparseable filter values are ignored rather than erroring.
        assert_eq!(apply_filters(&orders, &query).len(), 1);
    }
}
