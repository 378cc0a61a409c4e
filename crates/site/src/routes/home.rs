//! Marketing and pricing page handler.

use askama::Template;
use axum::response::Html;

use crate::filters;

/// One card on the sizing & pricing grid.
pub struct SizeCard {
    pub name: &'static str,
    pub dimensions: &'static str,
    pub price: u32,
}

/// One row of the delivery price list.
pub struct DeliveryRow {
    pub location: &'static str,
    pub price: u32,
}

/// Home page template.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub sizes: Vec<SizeCard>,
    pub deliveries: Vec<DeliveryRow>,
}

/// Render the marketing and pricing page.
///
/// GET /
pub async fn index() -> Html<String> {
    let template = HomeTemplate {
        sizes: vec![
            SizeCard { name: "MINI", dimensions: "2'x3'", price: 20 },
            SizeCard { name: "SQUARE", dimensions: "3'x3'", price: 25 },
            SizeCard { name: "STANDARD", dimensions: "5'x3'", price: 35 },
            SizeCard { name: "LARGE", dimensions: "6'x3'", price: 50 },
        ],
        deliveries: vec![
            DeliveryRow { location: "Riverton", price: 3 },
            DeliveryRow { location: "Lander", price: 5 },
            DeliveryRow { location: "Thermopolis", price: 7 },
        ],
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_home_renders_published_prices() {
        let rendered = HomeTemplate {
            sizes: vec![SizeCard {
                name: "STANDARD",
                dimensions: "5'x3'",
                price: 35,
            }],
            deliveries: vec![DeliveryRow {
                location: "Lander",
                price: 5,
            }],
        }
        .render()
        .unwrap();

        assert!(rendered.contains("Timeless Strokes"));
        assert!(rendered.contains("$35"));
        assert!(rendered.contains("Lander"));
        assert!(rendered.contains("everywhere else"));
    }
}
