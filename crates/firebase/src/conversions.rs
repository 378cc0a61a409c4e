//! Wire ⇄ domain conversions for stored documents.
//!
//! Two historical layouts exist for order documents: the current nested
//! shape and a flat legacy shape written by the first version of the order
//! form. Both are modeled here as named variants of [`StoredOrder`] and
//! normalized through one mapping into the canonical [`Order`]; nothing
//! outside this module knows two shapes exist.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use timeless_strokes_core::{
    CustomerInfo, Order, OrderDetails, OrderId, OrderOptions, OrderStatus, PendingUser,
    PendingUserId, PriceBreakdown, Role, ShippingInfo, UserId, UserProfile,
};

use crate::error::FirebaseError;
use crate::firestore::Document;
use crate::orders::NewOrderForm;
use crate::value::{
    boolean_value, integer_value, map_value, string_array_value, string_value, timestamp_value,
};

// =============================================================================
// Stored order shapes
// =============================================================================

/// A stored order document in one of its two historical layouts.
///
/// Untagged: the nested shape is tried first because its required maps
/// (`customerInfo`, `orderDetails`, `pricing`) never appear on legacy
/// documents, so a flat document can only match [`StoredOrder::Legacy`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredOrder {
    Current(CurrentOrderDoc),
    Legacy(LegacyOrderDoc),
}

/// The current nested layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrderDoc {
    customer_info: CustomerInfoDoc,
    order_details: OrderDetailsDoc,
    #[serde(default)]
    shipping_info: Option<ShippingInfoDoc>,
    #[serde(default)]
    shipping_location: String,
    pricing: PricingDoc,
    #[serde(default)]
    characters: bool,
    #[serde(default)]
    characters_count: u32,
    #[serde(default)]
    high_detail: bool,
    #[serde(default)]
    high_detail_count: u32,
    #[serde(default)]
    scalloped_edge: bool,
    #[serde(default)]
    gingham_border: bool,
    #[serde(default)]
    inspiration_pic_urls: Vec<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<String>,
}

/// The flat legacy layout written by the first order form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyOrderDoc {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    occasion: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    color_scheme: String,
    #[serde(default)]
    exact_wording: String,
    #[serde(default)]
    date_needed: String,
    #[serde(default)]
    special_instructions: Option<String>,
    #[serde(default)]
    characters: bool,
    #[serde(default)]
    characters_count: u32,
    #[serde(default)]
    high_detail: bool,
    #[serde(default)]
    high_detail_count: u32,
    #[serde(default)]
    scalloped_edge: bool,
    #[serde(default)]
    gingham_border: bool,
    #[serde(default)]
    shipping_location: String,
    #[serde(default)]
    inspiration_pic_urls: Vec<String>,
    /// Single stored total; the legacy form never broke the price down.
    #[serde(default)]
    total_price: u32,
    #[serde(default)]
    order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerInfoDoc {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDetailsDoc {
    #[serde(default)]
    occasion: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    color_scheme: String,
    #[serde(default)]
    exact_wording: String,
    #[serde(default)]
    date_needed: String,
    #[serde(default)]
    special_requests: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShippingInfoDoc {
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    zip_code: String,
    #[serde(default)]
    method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingDoc {
    #[serde(default)]
    base_price: u32,
    #[serde(default)]
    extras: u32,
    #[serde(default)]
    shipping: u32,
    #[serde(default)]
    total: u32,
}

impl StoredOrder {
    /// Normalize either layout into the canonical order shape.
    ///
    /// Legacy documents carry only a total, so the breakdown becomes
    /// `{base: total, extras: 0, shipping: 0}`. A missing or unrecognized
    /// stored status (old data contains values like "confirmed") normalizes
    /// to pending; a missing timestamp falls back to the time of the read.
    #[must_use]
    pub fn into_order(self, id: OrderId) -> Order {
        match self {
            Self::Current(doc) => Order {
                id,
                customer_info: CustomerInfo {
                    name: doc.customer_info.name,
                    email: doc.customer_info.email,
                    phone: doc.customer_info.phone,
                },
                order_details: OrderDetails {
                    occasion: doc.order_details.occasion,
                    size: doc.order_details.size,
                    color_scheme: doc.order_details.color_scheme,
                    exact_wording: doc.order_details.exact_wording,
                    date_needed: doc.order_details.date_needed,
                    special_requests: doc.order_details.special_requests,
                },
                shipping_info: doc.shipping_info.map(|shipping| ShippingInfo {
                    address: shipping.address,
                    city: shipping.city,
                    state: shipping.state,
                    zip_code: shipping.zip_code,
                    method: shipping.method,
                }),
                shipping_location: doc.shipping_location,
                pricing: PriceBreakdown {
                    base_price: doc.pricing.base_price,
                    extras: doc.pricing.extras,
                    shipping: doc.pricing.shipping,
                    total: doc.pricing.total,
                },
                options: OrderOptions {
                    characters: doc.characters,
                    characters_count: doc.characters_count,
                    high_detail: doc.high_detail,
                    high_detail_count: doc.high_detail_count,
                    scalloped_edge: doc.scalloped_edge,
                    gingham_border: doc.gingham_border,
                },
                inspiration_pic_urls: doc.inspiration_pic_urls,
                created_at: doc.created_at.unwrap_or_else(Utc::now),
                status: parse_status(doc.status.as_deref()),
            },
            Self::Legacy(doc) => Order {
                id,
                customer_info: CustomerInfo {
                    name: doc.name,
                    email: doc.email,
                    phone: doc.phone,
                },
                order_details: OrderDetails {
                    occasion: doc.occasion,
                    size: doc.size,
                    color_scheme: doc.color_scheme,
                    exact_wording: doc.exact_wording,
                    date_needed: doc.date_needed,
                    special_requests: doc.special_instructions,
                },
                shipping_info: None,
                shipping_location: doc.shipping_location,
                pricing: PriceBreakdown {
                    base_price: doc.total_price,
                    extras: 0,
                    shipping: 0,
                    total: doc.total_price,
                },
                options: OrderOptions {
                    characters: doc.characters,
                    characters_count: doc.characters_count,
                    high_detail: doc.high_detail,
                    high_detail_count: doc.high_detail_count,
                    scalloped_edge: doc.scalloped_edge,
                    gingham_border: doc.gingham_border,
                },
                inspiration_pic_urls: doc.inspiration_pic_urls,
                created_at: doc.order_date.unwrap_or_else(Utc::now),
                status: parse_status(doc.status.as_deref()),
            },
        }
    }
}

fn parse_status(raw: Option<&str>) -> OrderStatus {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Decode and normalize one stored order document.
///
/// # Errors
///
/// Returns [`FirebaseError::CorruptDocument`] when the data matches neither
/// layout.
pub fn order_from_document(document: Document) -> Result<Order, FirebaseError> {
    let stored: StoredOrder =
        serde_json::from_value(document.data).map_err(|e| FirebaseError::CorruptDocument {
            id: document.id.clone(),
            detail: e.to_string(),
        })?;
    Ok(stored.into_order(OrderId::new(document.id)))
}

/// Build the field map for a brand-new order document (current shape).
#[must_use]
pub fn new_order_fields(
    form: &NewOrderForm,
    inspiration_pic_urls: &[String],
    pricing: &PriceBreakdown,
    created_at: DateTime<Utc>,
) -> Map<String, Value> {
    let mut customer_info = Map::new();
    customer_info.insert("name".to_owned(), string_value(&form.name));
    customer_info.insert("email".to_owned(), string_value(&form.email));
    customer_info.insert("phone".to_owned(), string_value(&form.phone));

    let mut order_details = Map::new();
    order_details.insert("occasion".to_owned(), string_value(&form.occasion));
    order_details.insert("size".to_owned(), string_value(&form.size));
    order_details.insert("colorScheme".to_owned(), string_value(&form.color_scheme));
    order_details.insert("exactWording".to_owned(), string_value(&form.exact_wording));
    order_details.insert("dateNeeded".to_owned(), string_value(&form.date_needed));
    if let Some(requests) = &form.special_requests {
        order_details.insert("specialRequests".to_owned(), string_value(requests));
    }

    let mut pricing_fields = Map::new();
    pricing_fields.insert(
        "basePrice".to_owned(),
        integer_value(i64::from(pricing.base_price)),
    );
    pricing_fields.insert("extras".to_owned(), integer_value(i64::from(pricing.extras)));
    pricing_fields.insert(
        "shipping".to_owned(),
        integer_value(i64::from(pricing.shipping)),
    );
    pricing_fields.insert("total".to_owned(), integer_value(i64::from(pricing.total)));

    let mut fields = Map::new();
    fields.insert("customerInfo".to_owned(), map_value(customer_info));
    fields.insert("orderDetails".to_owned(), map_value(order_details));
    if let Some(shipping) = &form.shipping_info {
        let mut shipping_fields = Map::new();
        shipping_fields.insert("address".to_owned(), string_value(&shipping.address));
        shipping_fields.insert("city".to_owned(), string_value(&shipping.city));
        shipping_fields.insert("state".to_owned(), string_value(&shipping.state));
        shipping_fields.insert("zipCode".to_owned(), string_value(&shipping.zip_code));
        shipping_fields.insert("method".to_owned(), string_value(&shipping.method));
        fields.insert("shippingInfo".to_owned(), map_value(shipping_fields));
    }
    fields.insert(
        "shippingLocation".to_owned(),
        string_value(&form.shipping_location),
    );
    fields.insert("pricing".to_owned(), map_value(pricing_fields));
    fields.insert("characters".to_owned(), boolean_value(form.options.characters));
    fields.insert(
        "charactersCount".to_owned(),
        integer_value(i64::from(form.options.characters_count)),
    );
    fields.insert("highDetail".to_owned(), boolean_value(form.options.high_detail));
    fields.insert(
        "highDetailCount".to_owned(),
        integer_value(i64::from(form.options.high_detail_count)),
    );
    fields.insert(
        "scallopedEdge".to_owned(),
        boolean_value(form.options.scalloped_edge),
    );
    fields.insert(
        "ginghamBorder".to_owned(),
        boolean_value(form.options.gingham_border),
    );
    fields.insert(
        "inspirationPicUrls".to_owned(),
        string_array_value(inspiration_pic_urls),
    );
    fields.insert("createdAt".to_owned(), timestamp_value(created_at));
    fields.insert("status".to_owned(), string_value(&OrderStatus::Pending.to_string()));
    fields
}

// =============================================================================
// User profiles
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileDoc {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_login: Option<DateTime<Utc>>,
}

/// Decode a stored user profile. The document id is the uid; a stored `uid`
/// field, when present, is ignored in favor of the id.
///
/// # Errors
///
/// Returns [`FirebaseError::CorruptDocument`] when the data cannot be
/// decoded.
pub fn profile_from_document(document: Document) -> Result<UserProfile, FirebaseError> {
    let doc: UserProfileDoc =
        serde_json::from_value(document.data).map_err(|e| FirebaseError::CorruptDocument {
            id: document.id.clone(),
            detail: e.to_string(),
        })?;
    let now = Utc::now();
    Ok(UserProfile {
        uid: UserId::new(document.id),
        email: doc.email,
        display_name: doc.display_name,
        role: doc.role.as_deref().and_then(|r| r.parse().ok()).unwrap_or(Role::User),
        created_at: doc.created_at.unwrap_or(now),
        last_login: doc.last_login.unwrap_or(now),
    })
}

/// Build the field map for a new user profile document.
#[must_use]
pub fn new_profile_fields(
    uid: &str,
    email: &str,
    display_name: &str,
    role: Role,
    at: DateTime<Utc>,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("uid".to_owned(), string_value(uid));
    fields.insert("email".to_owned(), string_value(email));
    fields.insert("displayName".to_owned(), string_value(display_name));
    fields.insert("role".to_owned(), string_value(&role.to_string()));
    fields.insert("createdAt".to_owned(), timestamp_value(at));
    fields.insert("lastLogin".to_owned(), timestamp_value(at));
    fields
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingUserDoc {
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Decode a stored pending-user document.
///
/// # Errors
///
/// Returns [`FirebaseError::CorruptDocument`] when the data cannot be
/// decoded.
pub fn pending_user_from_document(document: Document) -> Result<PendingUser, FirebaseError> {
    let doc: PendingUserDoc =
        serde_json::from_value(document.data).map_err(|e| FirebaseError::CorruptDocument {
            id: document.id.clone(),
            detail: e.to_string(),
        })?;
    Ok(PendingUser {
        id: PendingUserId::new(document.id),
        email: doc.email,
        role: doc.role.as_deref().and_then(|r| r.parse().ok()).unwrap_or(Role::User),
        created_at: doc.created_at.unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(id: &str, data: Value) -> Document {
        Document {
            id: id.to_owned(),
            data,
        }
    }

    #[test]
    fn test_current_shape_normalizes() {
        let data = json!({
            "customerInfo": { "name": "June Calloway", "email": "june@example.com", "phone": "307-555-0142" },
            "orderDetails": {
                "occasion": "Graduation Party",
                "size": "standard",
                "colorScheme": "navy and gold",
                "exactWording": "Congrats June!",
                "dateNeeded": "2026-05-20",
                "specialRequests": "extra glitter",
            },
            "shippingLocation": "lander",
            "pricing": { "basePrice": 35, "extras": 15, "shipping": 5, "total": 55 },
            "characters": true,
            "charactersCount": 2,
            "scallopedEdge": true,
            "inspirationPicUrls": ["https://example.com/a.jpg"],
            "createdAt": "2026-03-01T12:00:00Z",
            "status": "in-progress",
        });

        let order = order_from_document(document("order-1", data)).unwrap();
        assert_eq!(order.customer_info.name, "June Calloway");
        assert_eq!(order.order_details.size, "standard");
        assert_eq!(order.order_details.special_requests.as_deref(), Some("extra glitter"));
        assert_eq!(order.pricing.total, 55);
        assert_eq!(order.options.characters_count, 2);
        assert!(!order.options.gingham_border);
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.inspiration_pic_urls.len(), 1);
    }

    #[test]
    fn test_legacy_shape_normalizes() {
        let data = json!({
            "name": "Roy Teller",
            "email": "roy@example.com",
            "phone": "307-555-0199",
            "occasion": "Retirement",
            "size": "large",
            "colorScheme": "green",
            "exactWording": "Happy Trails Roy",
            "dateNeeded": "2025-11-01",
            "specialInstructions": "hang-ready",
            "characters": false,
            "shippingLocation": "riverton",
            "totalPrice": 53,
            "orderDate": "2025-10-02T09:30:00Z",
            "status": "completed",
        });

        let order = order_from_document(document("order-legacy", data)).unwrap();
        assert_eq!(order.customer_info.name, "Roy Teller");
        assert_eq!(order.order_details.special_requests.as_deref(), Some("hang-ready"));
        // Legacy documents only stored a total.
        assert_eq!(order.pricing.base_price, 53);
        assert_eq!(order.pricing.extras, 0);
        assert_eq!(order.pricing.shipping, 0);
        assert_eq!(order.pricing.total, 53);
        assert!(order.shipping_info.is_none());
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(
            order.created_at,
            "2025-10-02T09:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_both_shapes_normalize_to_equivalent_fields() {
        let current = order_from_document(document(
            "a",
            json!({
                "customerInfo": { "name": "A", "email": "a@x.com", "phone": "1" },
                "orderDetails": { "occasion": "Birthday", "size": "mini", "colorScheme": "red",
                                   "exactWording": "Hi", "dateNeeded": "2026-01-01" },
                "pricing": { "basePrice": 20, "extras": 0, "shipping": 3, "total": 23 },
                "createdAt": "2026-01-01T00:00:00Z",
                "status": "pending",
            }),
        ))
        .unwrap();
        let legacy = order_from_document(document(
            "b",
            json!({
                "name": "B", "email": "b@x.com", "phone": "2",
                "occasion": "Birthday", "size": "mini", "colorScheme": "red",
                "exactWording": "Hi", "dateNeeded": "2026-01-01",
                "totalPrice": 23,
                "orderDate": "2026-01-02T00:00:00Z",
            }),
        ))
        .unwrap();

        // Same canonical shape either way.
        assert_eq!(current.order_details, legacy.order_details);
        assert_eq!(current.pricing.total, legacy.pricing.total);
        assert_eq!(current.status, legacy.status);
    }

    #[test]
    fn test_unknown_status_normalizes_to_pending() {
        let order = order_from_document(document(
            "c",
            json!({
                "name": "C", "email": "c@x.com", "phone": "3",
                "totalPrice": 10,
                "status": "confirmed",
            }),
        ))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_new_order_fields_write_current_shape() {
        let form = NewOrderForm {
            name: "June Calloway".to_owned(),
            email: "june@example.com".to_owned(),
            phone: "307-555-0142".to_owned(),
            occasion: "Graduation Party".to_owned(),
            size: "standard".to_owned(),
            color_scheme: "navy and gold".to_owned(),
            exact_wording: "Congrats June!".to_owned(),
            date_needed: "2026-05-20".to_owned(),
            special_requests: None,
            options: OrderOptions {
                characters: true,
                characters_count: 2,
                scalloped_edge: true,
                ..OrderOptions::default()
            },
            shipping_location: "lander".to_owned(),
            shipping_info: None,
            inspiration_pics: vec![],
        };
        let pricing = timeless_strokes_core::quote(&form.size, &form.options, &form.shipping_location);
        let at = "2026-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let fields = new_order_fields(&form, &["https://example.com/a.jpg".to_owned()], &pricing, at);

        assert_eq!(fields["status"], json!({ "stringValue": "pending" }));
        assert_eq!(fields["charactersCount"], json!({ "integerValue": "2" }));
        assert!(fields["customerInfo"]["mapValue"]["fields"]["name"]["stringValue"]
            .as_str()
            .is_some());

        // What we write must decode back through the current-shape variant.
        let decoded = crate::value::decode_fields(&fields);
        let order = order_from_document(document("round", decoded)).unwrap();
        assert_eq!(order.pricing.total, 55);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, at);
    }

    #[test]
    fn test_profile_round_trip() {
        let fields = new_profile_fields(
            "uid-1",
            "painter@timelessstrokes.com",
            "Shop Owner",
            Role::Admin,
            Utc::now(),
        );
        let decoded = crate::value::decode_fields(&fields);
        let profile = profile_from_document(document("uid-1", decoded)).unwrap();
        assert_eq!(profile.uid.as_str(), "uid-1");
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.display_name, "Shop Owner");
    }

    #[test]
    fn test_pending_user_defaults() {
        let pending = pending_user_from_document(document(
            "invite-1",
            json!({ "email": "new@example.com" }),
        ))
        .unwrap();
        assert_eq!(pending.role, Role::User);
        assert_eq!(pending.email, "new@example.com");
    }
}
