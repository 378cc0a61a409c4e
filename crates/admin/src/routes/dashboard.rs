//! Dashboard overview page handler.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use timeless_strokes_core::{Order, OrderStatus};
use timeless_strokes_firebase::OrdersStore;

use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireAdmin;
use crate::models::CurrentUser;
use crate::routes::setup_guide;
use crate::state::AppState;

/// Signed-in identity as shown in the page chrome.
#[derive(Debug, Clone)]
pub struct UserView {
    pub display_name: String,
    pub email: String,
    pub role: String,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
        }
    }
}

/// Per-status order counts for the overview cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    /// Tally orders by status. One O(n) scan.
    #[must_use]
    pub fn tally(orders: &[Order]) -> Self {
        let mut counts = Self {
            total: orders.len(),
            ..Self::default()
        };
        for order in orders {
            match order.status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::InProgress => counts.in_progress += 1,
                OrderStatus::Completed => counts.completed += 1,
                OrderStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

/// Overview page template.
#[derive(Template)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub user: UserView,
    pub current_path: String,
    pub counts: StatusCounts,
    pub recent: Vec<RecentOrderRow>,
}

/// One row of the recent-orders list.
pub struct RecentOrderRow {
    pub id: String,
    pub customer: String,
    pub occasion: String,
    pub total: u32,
    pub status: &'static str,
}

/// Overview page handler.
///
/// GET /
#[instrument(skip(user, state))]
pub async fn index(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Response> {
    let store = OrdersStore::with_session(state.firebase(), &user.id_token);

    let orders = match store.list().await {
        Ok(orders) => orders,
        Err(e) if e.needs_setup_guide() => return Ok(setup_guide(&e.to_string()).into_response()),
        Err(e) => return Err(e.into()),
    };

    let counts = StatusCounts::tally(&orders);
    let recent = orders
        .iter()
        .take(5)
        .map(|order| RecentOrderRow {
            id: order.id.to_string(),
            customer: order.customer_info.name.clone(),
            occasion: order.order_details.occasion.clone(),
            total: order.pricing.total,
            status: order.status.label(),
        })
        .collect();

    let template = DashboardTemplate {
        user: UserView::from(&user),
        current_path: "/".to_owned(),
        counts,
        recent,
    };
    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use timeless_strokes_core::{
        CustomerInfo, OrderDetails, OrderId, OrderOptions, PriceBreakdown,
    };

    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new("o"),
            customer_info: CustomerInfo {
                name: "A".to_owned(),
                email: "a@x.com".to_owned(),
                phone: String::new(),
            },
            order_details: OrderDetails {
                occasion: "Birthday".to_owned(),
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
    fn test_tally_counts_each_status() {
        let orders = vec![
            order(OrderStatus::Pending),
            order(OrderStatus::Pending),
            order(OrderStatus::InProgress),
            order(OrderStatus::Completed),
            order(OrderStatus::Cancelled),
        ];
        let counts = StatusCounts::tally(&orders);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.cancelled, 1);
    }

    #[test]
    fn test_tally_empty() {
        assert_eq!(StatusCounts::tally(&[]), StatusCounts::default());
    }
}
