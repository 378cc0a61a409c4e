//! The banner price calculator.
//!
//! Prices are whole dollars. The published tables:
//!
//! | Size     | Dimensions | Price |
//! |----------|------------|-------|
//! | mini     | 2'x3'      | $20   |
//! | square   | 3'x3'      | $25   |
//! | standard | 5'x3'      | $35   |
//! | large    | 6'x3'      | $50   |
//!
//! Extras: characters $5 each, high detail $10 each, scalloped edge $5,
//! gingham border $10. Delivery: Riverton $3, Lander $5, Thermopolis $7,
//! everywhere else $10.
//!
//! Unknown size or location keys price as $0 rather than erroring. Historical
//! order documents contain keys outside these tables, and the stored totals
//! were computed with this fallback; reproducing it keeps re-derived totals
//! consistent with what customers were quoted.

use serde::{Deserialize, Serialize};

use crate::types::order::OrderOptions;

/// Per-character add-on price.
const CHARACTER_PRICE: u32 = 5;
/// Per-figure high-detail add-on price.
const HIGH_DETAIL_PRICE: u32 = 10;
/// Flat scalloped-edge price.
const SCALLOPED_EDGE_PRICE: u32 = 5;
/// Flat gingham/checkered-border price.
const GINGHAM_BORDER_PRICE: u32 = 10;

/// Base price for a banner size key. Unknown keys price as 0.
#[must_use]
pub fn base_price(size: &str) -> u32 {
    match size {
        "mini" => 20,
        "square" => 25,
        "standard" => 35,
        "large" => 50,
        _ => 0,
    }
}

/// Delivery cost for a location key. Unknown keys price as 0.
///
/// Note the asymmetry: the form offers an explicit "other" choice at $10,
/// while a key outside the table entirely (including an unselected location)
/// contributes nothing.
#[must_use]
pub fn shipping_cost(location: &str) -> u32 {
    match location {
        "riverton" => 3,
        "lander" => 5,
        "thermopolis" => 7,
        "other" => 10,
        _ => 0,
    }
}

/// Extras subtotal for the selected add-ons.
#[must_use]
pub fn extras_cost(options: &OrderOptions) -> u32 {
    let mut extras = 0;
    if options.characters {
        extras += options.characters_count * CHARACTER_PRICE;
    }
    if options.high_detail {
        extras += options.high_detail_count * HIGH_DETAIL_PRICE;
    }
    if options.scalloped_edge {
        extras += SCALLOPED_EDGE_PRICE;
    }
    if options.gingham_border {
        extras += GINGHAM_BORDER_PRICE;
    }
    extras
}

/// The priced-out lines of an order, in whole dollars.
///
/// Invariant: `total == base_price + extras + shipping`. Construct through
/// [`quote`] to keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: u32,
    pub extras: u32,
    pub shipping: u32,
    pub total: u32,
}

/// Price an order from its selected options.
#[must_use]
pub fn quote(size: &str, options: &OrderOptions, shipping_location: &str) -> PriceBreakdown {
    let base_price = base_price(size);
    let extras = extras_cost(options);
    let shipping = shipping_cost(shipping_location);

    PriceBreakdown {
        base_price,
        extras,
        shipping,
        total: base_price + extras + shipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_price_table() {
        assert_eq!(base_price("mini"), 20);
        assert_eq!(base_price("square"), 25);
        assert_eq!(base_price("standard"), 35);
        assert_eq!(base_price("large"), 50);
    }

    #[test]
    fn test_shipping_cost_table() {
        assert_eq!(shipping_cost("riverton"), 3);
        assert_eq!(shipping_cost("lander"), 5);
        assert_eq!(shipping_cost("thermopolis"), 7);
        assert_eq!(shipping_cost("other"), 10);
    }

    #[test]
    fn test_unknown_keys_price_as_zero() {
        assert_eq!(base_price("jumbo"), 0);
        assert_eq!(base_price(""), 0);
        assert_eq!(shipping_cost("casper"), 0);
        assert_eq!(shipping_cost(""), 0);
    }

    #[test]
    fn test_quote_standard_with_characters_and_scalloped_edge() {
        // standard ($35) + 2 characters ($10) + scalloped edge ($5) + lander ($5)
        let options = OrderOptions {
            characters: true,
            characters_count: 2,
            scalloped_edge: true,
            ..OrderOptions::default()
        };
        let breakdown = quote("standard", &options, "lander");
        assert_eq!(breakdown.base_price, 35);
        assert_eq!(breakdown.extras, 15);
        assert_eq!(breakdown.shipping, 5);
        assert_eq!(breakdown.total, 55);
    }

    #[test]
    fn test_counts_ignored_when_flag_unset() {
        // A lingering count with the checkbox cleared costs nothing.
        let options = OrderOptions {
            characters: false,
            characters_count: 4,
            high_detail: false,
            high_detail_count: 2,
            ..OrderOptions::default()
        };
        assert_eq!(extras_cost(&options), 0);
    }

    #[test]
    fn test_quote_every_size_and_location() {
        let sizes = [("mini", 20), ("square", 25), ("standard", 35), ("large", 50)];
        let locations = [
            ("riverton", 3),
            ("lander", 5),
            ("thermopolis", 7),
            ("other", 10),
            ("unknown", 0),
        ];
        for (size, base) in sizes {
            for (location, shipping) in locations {
                let breakdown = quote(size, &OrderOptions::default(), location);
                assert_eq!(breakdown.total, base + shipping, "{size}/{location}");
            }
        }
    }

    #[test]
    fn test_quote_all_extras() {
        let options = OrderOptions {
            characters: true,
            characters_count: 3,
            high_detail: true,
            high_detail_count: 2,
            scalloped_edge: true,
            gingham_border: true,
        };
        // 3*5 + 2*10 + 5 + 10 = 50
        assert_eq!(extras_cost(&options), 50);
        let breakdown = quote("large", &options, "thermopolis");
        assert_eq!(breakdown.total, 50 + 50 + 7);
    }

    #[test]
    fn test_breakdown_invariant() {
        let breakdown = quote("square", &OrderOptions::default(), "riverton");
        assert_eq!(
            breakdown.total,
            breakdown.base_price + breakdown.extras + breakdown.shipping
        );
    }
}
