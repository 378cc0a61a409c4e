//! Order domain types.
//!
//! An [`Order`] is the canonical, normalized shape. The backend holds two
//! historical document layouts (a flat legacy one and the current nested
//! one); both are mapped into this shape by the backend access crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::status::OrderStatus;
use crate::pricing::PriceBreakdown;

/// Contact details collected on the order form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// What the customer wants painted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Free-text occasion, e.g. "graduation party".
    pub occasion: String,
    /// Banner size key (mini / square / standard / large). Kept as a plain
    /// string: historical documents contain sizes outside the current table.
    pub size: String,
    pub color_scheme: String,
    pub exact_wording: String,
    /// Date the banner is needed by, as entered on the form.
    pub date_needed: String,
    pub special_requests: Option<String>,
}

/// Shipping details, present only when the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub method: String,
}

/// Paid add-ons selected on the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderOptions {
    pub characters: bool,
    pub characters_count: u32,
    pub high_detail: bool,
    pub high_detail_count: u32,
    pub scalloped_edge: bool,
    pub gingham_border: bool,
}

/// A customer's custom-banner request, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_info: CustomerInfo,
    pub order_details: OrderDetails,
    pub shipping_info: Option<ShippingInfo>,
    /// Delivery location key used for the shipping line of the price.
    pub shipping_location: String,
    pub pricing: PriceBreakdown,
    pub options: OrderOptions,
    /// Resolved URLs of uploaded inspiration images.
    pub inspiration_pic_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    /// Case-insensitive substring match over the fields the dashboard
    /// searches: customer name, email, and occasion.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.customer_info.name.to_lowercase().contains(&term)
            || self.customer_info.email.to_lowercase().contains(&term)
            || self.order_details.occasion.to_lowercase().contains(&term)
    }
}
