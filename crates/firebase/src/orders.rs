//! Order repository over the remote document and object stores.

use chrono::Utc;
use futures::future::try_join_all;
use serde_json::Map;
use tracing::{instrument, warn};
use uuid::Uuid;

use timeless_strokes_core::{Order, OrderId, OrderOptions, OrderStatus, ShippingInfo, quote};

use crate::Firebase;
use crate::conversions;
use crate::error::FirebaseError;
use crate::value::{string_value, timestamp_value};

/// Firestore collection holding order documents.
const ORDERS_COLLECTION: &str = "orders";

/// One attached inspiration image, as received from the order form.
#[derive(Debug, Clone)]
pub struct InspirationUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Validated input for a new order.
#[derive(Debug, Clone)]
pub struct NewOrderForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub occasion: String,
    pub size: String,
    pub color_scheme: String,
    pub exact_wording: String,
    pub date_needed: String,
    pub special_requests: Option<String>,
    pub options: OrderOptions,
    pub shipping_location: String,
    pub shipping_info: Option<ShippingInfo>,
    pub inspiration_pics: Vec<InspirationUpload>,
}

/// Repository for order operations.
///
/// Borrows the protocol clients plus the caller's session token (public
/// submissions pass `None`; dashboard mutations pass the signed-in admin's
/// ID token).
pub struct OrdersStore<'a> {
    firebase: &'a Firebase,
    session_token: Option<&'a str>,
}

impl<'a> OrdersStore<'a> {
    /// Repository acting without a caller identity (the public order form).
    #[must_use]
    pub const fn new(firebase: &'a Firebase) -> Self {
        Self {
            firebase,
            session_token: None,
        }
    }

    /// Repository acting on behalf of a signed-in identity.
    #[must_use]
    pub const fn with_session(firebase: &'a Firebase, session_token: &'a str) -> Self {
        Self {
            firebase,
            session_token: Some(session_token),
        }
    }

    /// Submit a new order: upload any attached images, price the selections,
    /// and write one pending order document. Returns the generated id.
    ///
    /// Uploads run concurrently and join all-or-nothing: if any upload
    /// fails, the submission fails and no document is written. Images that
    /// finished uploading before the failure are not cleaned up.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] from the first failing upload
    /// or from the document write.
    #[instrument(skip(self, form), fields(images = form.inspiration_pics.len()))]
    pub async fn submit(&self, form: NewOrderForm) -> Result<OrderId, FirebaseError> {
        // Uploads are keyed by a temporary id; the document id does not
        // exist until after the write.
        let temp_order_id = format!("temp-{}", Uuid::new_v4());

        let inspiration_pic_urls = if form.inspiration_pics.is_empty() {
            Vec::new()
        } else {
            self.upload_inspiration_images(&form.inspiration_pics, &temp_order_id)
                .await?
        };

        let pricing = quote(&form.size, &form.options, &form.shipping_location);
        let fields = conversions::new_order_fields(&form, &inspiration_pic_urls, &pricing, Utc::now());

        let document = self
            .firebase
            .firestore()
            .create(ORDERS_COLLECTION, fields, self.session_token)
            .await?;

        Ok(OrderId::new(document.id))
    }

    /// Fetch all orders, normalized and newest-first.
    ///
    /// Both historical document shapes are accepted; documents matching
    /// neither are skipped with a warning rather than failing the whole
    /// listing. Sorting happens after normalization because the two shapes
    /// keep their timestamp under different field names.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the listing request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, FirebaseError> {
        let documents = self
            .firebase
            .firestore()
            .list_all(ORDERS_COLLECTION, self.session_token)
            .await?;

        let mut orders: Vec<Order> = documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id.clone();
                match conversions::order_from_document(document) {
                    Ok(order) => Some(order),
                    Err(e) => {
                        warn!(order_id = %id, error = %e, "skipping undecodable order document");
                        None
                    }
                }
            })
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Fetch one order by id, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] on request failure or a
    /// document matching neither shape.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, FirebaseError> {
        let document = self
            .firebase
            .firestore()
            .get(ORDERS_COLLECTION, id.as_str(), self.session_token)
            .await?;

        document.map(conversions::order_from_document).transpose()
    }

    /// Move an order to a new status.
    ///
    /// A plain field-level update: any status can be written over any
    /// other, so the dashboard can reopen a completed order or correct a
    /// mis-set one. An `updatedAt` timestamp rides along.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the update is rejected,
    /// including [`FirebaseError::NotFound`] for a missing order.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), FirebaseError> {
        let mut fields = Map::new();
        fields.insert("status".to_owned(), string_value(&status.to_string()));
        fields.insert("updatedAt".to_owned(), timestamp_value(Utc::now()));

        self.firebase
            .firestore()
            .update_fields(ORDERS_COLLECTION, id.as_str(), fields, self.session_token)
            .await
    }

    /// Upload every attached image concurrently; the result order matches
    /// the input order. Any failure aborts the join.
    async fn upload_inspiration_images(
        &self,
        files: &[InspirationUpload],
        temp_order_id: &str,
    ) -> Result<Vec<String>, FirebaseError> {
        let uploads = files.iter().enumerate().map(|(index, file)| {
            let path = format!(
                "orders/{temp_order_id}/inspiration-{index}-{}",
                file.file_name
            );
            let storage = self.firebase.storage();
            let content_type = file.content_type.clone();
            let bytes = file.bytes.clone();
            async move { storage.upload(&path, &content_type, bytes).await }
        });

        try_join_all(uploads).await
    }
}
