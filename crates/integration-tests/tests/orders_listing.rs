//! Listing and status updates over a store holding both historical
//! document shapes.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use timeless_strokes_core::{OrderId, OrderStatus};
use timeless_strokes_firebase::{Firebase, FirebaseError, OrdersStore};
use timeless_strokes_integration_tests::MockBackend;

/// Typed fields for a current-shape document.
fn current_fields(created_at: &str, status: &str) -> serde_json::Value {
    json!({
        "customerInfo": { "mapValue": { "fields": {
            "name": { "stringValue": "June Calloway" },
            "email": { "stringValue": "june@example.com" },
            "phone": { "stringValue": "307-555-0142" },
        }}},
        "orderDetails": { "mapValue": { "fields": {
            "occasion": { "stringValue": "Graduation Party" },
            "size": { "stringValue": "standard" },
            "colorScheme": { "stringValue": "navy and gold" },
            "exactWording": { "stringValue": "Congrats June!" },
            "dateNeeded": { "stringValue": "2026-05-20" },
        }}},
        "shippingLocation": { "stringValue": "lander" },
        "pricing": { "mapValue": { "fields": {
            "basePrice": { "integerValue": "35" },
            "extras": { "integerValue": "15" },
            "shipping": { "integerValue": "5" },
            "total": { "integerValue": "55" },
        }}},
        "characters": { "booleanValue": true },
        "charactersCount": { "integerValue": "2" },
        "inspirationPicUrls": { "arrayValue": { "values": [] } },
        "createdAt": { "timestampValue": created_at },
        "status": { "stringValue": status },
    })
}

/// Typed fields for a flat legacy document, as the first order form wrote
/// them (note the double-typed price and `orderDate`).
fn legacy_fields(order_date: &str) -> serde_json::Value {
    json!({
        "name": { "stringValue": "Roy Teller" },
        "email": { "stringValue": "roy@example.com" },
        "phone": { "stringValue": "307-555-0199" },
        "occasion": { "stringValue": "Retirement" },
        "size": { "stringValue": "large" },
        "colorScheme": { "stringValue": "green" },
        "exactWording": { "stringValue": "Happy Trails Roy" },
        "dateNeeded": { "stringValue": "2025-11-01" },
        "specialInstructions": { "stringValue": "hang-ready" },
        "shippingLocation": { "stringValue": "riverton" },
        "totalPrice": { "doubleValue": 53.0 },
        "orderDate": { "timestampValue": order_date },
        "status": { "stringValue": "pending" },
    })
}

#[tokio::test]
async fn listing_normalizes_both_shapes_newest_first() {
    let backend = MockBackend::spawn().await;
    backend
        .state
        .seed("orders", "legacy-1", legacy_fields("2025-10-02T09:30:00Z"));
    backend.state.seed(
        "orders",
        "current-1",
        current_fields("2026-03-01T12:00:00Z", "in-progress"),
    );

    let firebase = Firebase::new(&backend.firebase_config());
    let orders = OrdersStore::new(&firebase).list().await.unwrap();

    assert_eq!(orders.len(), 2);

    // Newest first, regardless of which shape carried the timestamp.
    let newest = orders.first().unwrap();
    let oldest = orders.last().unwrap();
    assert_eq!(newest.id, OrderId::new("current-1"));
    assert_eq!(oldest.id, OrderId::new("legacy-1"));

    // Both came back in the one canonical shape.
    assert_eq!(newest.pricing.total, 55);
    assert_eq!(newest.status, OrderStatus::InProgress);
    assert_eq!(oldest.customer_info.name, "Roy Teller");
    assert_eq!(oldest.pricing.total, 53);
    assert_eq!(oldest.pricing.extras, 0);
    assert_eq!(oldest.order_details.special_requests.as_deref(), Some("hang-ready"));
}

#[tokio::test]
async fn status_update_patches_the_stored_field() {
    let backend = MockBackend::spawn().await;
    backend.state.seed(
        "orders",
        "order-1",
        current_fields("2026-03-01T12:00:00Z", "pending"),
    );

    let firebase = Firebase::new(&backend.firebase_config());
    let store = OrdersStore::new(&firebase);

    store
        .update_status(&OrderId::new("order-1"), OrderStatus::InProgress)
        .await
        .unwrap();

    let fields = backend.state.documents("orders")["order-1"].clone();
    assert_eq!(fields["status"]["stringValue"], "in-progress");
    assert!(fields["updatedAt"]["timestampValue"].is_string());
}

#[tokio::test]
async fn any_status_is_reachable_from_any_other() {
    let backend = MockBackend::spawn().await;
    backend.state.seed(
        "orders",
        "order-1",
        current_fields("2026-03-01T12:00:00Z", "completed"),
    );

    let firebase = Firebase::new(&backend.firebase_config());
    let store = OrdersStore::new(&firebase);

    // Reopen a completed order, then cancel it, then set it back.
    for status in [
        OrderStatus::Pending,
        OrderStatus::Cancelled,
        OrderStatus::Completed,
    ] {
        store
            .update_status(&OrderId::new("order-1"), status)
            .await
            .unwrap();
        let fields = backend.state.documents("orders")["order-1"].clone();
        assert_eq!(fields["status"]["stringValue"], status.to_string());
    }
}

#[tokio::test]
async fn missing_order_reports_not_found() {
    let backend = MockBackend::spawn().await;
    let firebase = Firebase::new(&backend.firebase_config());
    let store = OrdersStore::new(&firebase);

    let result = store
        .update_status(&OrderId::new("ghost"), OrderStatus::Cancelled)
        .await;
    assert!(matches!(result, Err(FirebaseError::NotFound(_))));
}
