//! Order form handlers: render, live quote, and submission.

use askama::Template;
use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use timeless_strokes_core::{OrderOptions, PriceBreakdown, ShippingInfo, quote};
use timeless_strokes_firebase::{InspirationUpload, NewOrderForm, OrdersStore};

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Order form page template.
#[derive(Template)]
#[template(path = "order/form.html")]
pub struct OrderFormTemplate;

/// Confirmation page template.
#[derive(Template)]
#[template(path = "order/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_id: String,
    pub total: u32,
}

/// Render the order form.
///
/// GET /order
pub async fn form() -> Html<String> {
    Html(OrderFormTemplate.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
}

/// Current form selections, as sent by the quote script.
///
/// Checkboxes arrive as "on" when ticked and are absent otherwise; counts
/// that fail to parse count as zero, matching how the form treats them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    #[serde(default)]
    size: String,
    #[serde(default)]
    characters: Option<String>,
    #[serde(default)]
    characters_count: Option<String>,
    #[serde(default)]
    high_detail: Option<String>,
    #[serde(default)]
    high_detail_count: Option<String>,
    #[serde(default)]
    scalloped_edge: Option<String>,
    #[serde(default)]
    gingham_border: Option<String>,
    #[serde(default)]
    shipping_location: String,
}

impl QuoteParams {
    fn options(&self) -> OrderOptions {
        OrderOptions {
            characters: checkbox(self.characters.as_deref()),
            characters_count: count(self.characters_count.as_deref()),
            high_detail: checkbox(self.high_detail.as_deref()),
            high_detail_count: count(self.high_detail_count.as_deref()),
            scalloped_edge: checkbox(self.scalloped_edge.as_deref()),
            gingham_border: checkbox(self.gingham_border.as_deref()),
        }
    }
}

/// Price the current selections.
///
/// GET /order/quote
pub async fn quote_endpoint(Query(params): Query<QuoteParams>) -> Json<PriceBreakdown> {
    Json(quote(&params.size, &params.options(), &params.shipping_location))
}

/// Submit an order.
///
/// POST /order (multipart: text fields plus any number of `inspirationPics`
/// file parts). On success renders the confirmation page with the new
/// order's id and total.
#[instrument(skip(state, multipart))]
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>> {
    let form = read_order_form(multipart).await?;

    if form.name.is_empty() || form.email.is_empty() || form.occasion.is_empty() {
        return Err(AppError::BadRequest(
            "name, email, and occasion are required".to_owned(),
        ));
    }
    if form.size.is_empty() {
        return Err(AppError::BadRequest("please select a banner size".to_owned()));
    }

    // The same quote the submission writes; shown on the confirmation page.
    let pricing = quote(&form.size, &form.options, &form.shipping_location);

    let orders = OrdersStore::new(state.firebase());
    let order_id = orders.submit(form).await?;

    let template = ConfirmationTemplate {
        order_id: order_id.into_inner(),
        total: pricing.total,
    };
    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    })))
}

/// Collect the multipart stream into a [`NewOrderForm`].
async fn read_order_form(mut multipart: Multipart) -> Result<NewOrderForm> {
    let mut fields = FormFields::default();
    let mut inspiration_pics = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid form data: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "inspirationPics" {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
            // An empty file input still submits one empty part; skip it.
            if !bytes.is_empty() {
                inspiration_pics.push(InspirationUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid form data: {e}")))?;
        fields.set(&name, value);
    }

    Ok(fields.into_form(inspiration_pics))
}

/// Text fields accumulated from the multipart stream.
#[derive(Default)]
struct FormFields {
    name: String,
    email: String,
    phone: String,
    occasion: String,
    size: String,
    color_scheme: String,
    exact_wording: String,
    date_needed: String,
    special_instructions: String,
    characters: Option<String>,
    characters_count: Option<String>,
    high_detail: Option<String>,
    high_detail_count: Option<String>,
    scalloped_edge: Option<String>,
    gingham_border: Option<String>,
    shipping_location: String,
    ship_address: String,
    ship_city: String,
    ship_state: String,
    ship_zip: String,
    ship_method: String,
}

impl FormFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "email" => self.email = value,
            "phone" => self.phone = value,
            "occasion" => self.occasion = value,
            "size" => self.size = value,
            "colorScheme" => self.color_scheme = value,
            "exactWording" => self.exact_wording = value,
            "dateNeeded" => self.date_needed = value,
            "specialInstructions" => self.special_instructions = value,
            "characters" => self.characters = Some(value),
            "charactersCount" => self.characters_count = Some(value),
            "highDetail" => self.high_detail = Some(value),
            "highDetailCount" => self.high_detail_count = Some(value),
            "scallopedEdge" => self.scalloped_edge = Some(value),
            "ginghamBorder" => self.gingham_border = Some(value),
            "shippingLocation" => self.shipping_location = value,
            "shipAddress" => self.ship_address = value,
            "shipCity" => self.ship_city = value,
            "shipState" => self.ship_state = value,
            "shipZip" => self.ship_zip = value,
            "shipMethod" => self.ship_method = value,
            _ => {}
        }
    }

    fn into_form(self, inspiration_pics: Vec<InspirationUpload>) -> NewOrderForm {
        let options = OrderOptions {
            characters: checkbox(self.characters.as_deref()),
            characters_count: count(self.characters_count.as_deref()),
            high_detail: checkbox(self.high_detail.as_deref()),
            high_detail_count: count(self.high_detail_count.as_deref()),
            scalloped_edge: checkbox(self.scalloped_edge.as_deref()),
            gingham_border: checkbox(self.gingham_border.as_deref()),
        };

        // The address block is optional; an order without one is picked up
        // or delivered locally.
        let shipping_info = if self.ship_address.is_empty() {
            None
        } else {
            Some(ShippingInfo {
                address: self.ship_address,
                city: self.ship_city,
                state: self.ship_state,
                zip_code: self.ship_zip,
                method: self.ship_method,
            })
        };

        NewOrderForm {
            name: self.name,
            email: self.email,
            phone: self.phone,
            occasion: self.occasion,
            size: self.size,
            color_scheme: self.color_scheme,
            exact_wording: self.exact_wording,
            date_needed: self.date_needed,
            special_requests: if self.special_instructions.is_empty() {
                None
            } else {
                Some(self.special_instructions)
            },
            options,
            shipping_location: self.shipping_location,
            shipping_info,
            inspiration_pics,
        }
    }
}

/// HTML checkboxes submit "on" when ticked; tolerate explicit booleans too.
fn checkbox(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1"))
}

/// Counts that fail to parse count as zero.
fn count(value: Option<&str>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_values() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(None));
    }

    #[test]
    fn test_count_fallback() {
        assert_eq!(count(Some("3")), 3);
        assert_eq!(count(Some("three")), 0);
        assert_eq!(count(None), 0);
    }

    #[test]
    fn test_form_fields_build_shipping_info_only_with_address() {
        let mut fields = FormFields::default();
        fields.set("name", "June".to_owned());
        fields.set("shippingLocation", "lander".to_owned());
        let form = fields.into_form(vec![]);
        assert!(form.shipping_info.is_none());

        let mut fields = FormFields::default();
        fields.set("shipAddress", "12 Main St".to_owned());
        fields.set("shipCity", "Lander".to_owned());
        fields.set("shipState", "WY".to_owned());
        fields.set("shipZip", "82520".to_owned());
        fields.set("shipMethod", "ground".to_owned());
        let form = fields.into_form(vec![]);
        let shipping = form.shipping_info.expect("address present");
        assert_eq!(shipping.city, "Lander");
    }

    #[test]
    fn test_lingering_count_with_cleared_checkbox_prices_as_zero() {
        let mut fields = FormFields::default();
        fields.set("size", "standard".to_owned());
        fields.set("charactersCount", "4".to_owned());
        let form = fields.into_form(vec![]);
        assert!(!form.options.characters);
        let breakdown = quote(&form.size, &form.options, &form.shipping_location);
        assert_eq!(breakdown.total, 35);
    }
}
