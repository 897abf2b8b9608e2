//! Price composition: metal rate plus product attributes into a breakdown.

use crate::core::config::ProductConfig;
use crate::core::rate::{Metal, Provenance, RateSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPricingInput {
    pub rate_per_gram: f64,
    pub weight: f64,
    pub making_cost: f64,
    pub wastage_cost: f64,
    pub gst_percent: f64,
    pub stored_total_override: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub material_value: f64,
    pub making_cost: f64,
    pub wastage_cost: f64,
    pub gst_amount: f64,
    pub total: f64,
    /// False when nothing about the product's price has been configured.
    pub has_pricing_data: bool,
}

/// Clamps missing, negative and non-finite amounts to zero.
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Builds the price breakdown for a product.
///
/// Never fails: malformed inputs contribute zero. A stored total override, when
/// valid, is reported as the total while the components are still computed.
pub fn compute_breakdown(input: &ProductPricingInput) -> PriceBreakdown {
    let rate_per_gram = non_negative(input.rate_per_gram);
    let weight = non_negative(input.weight);
    let making_cost = non_negative(input.making_cost);
    let wastage_cost = non_negative(input.wastage_cost);
    let gst_percent = non_negative(input.gst_percent).min(100.0);

    let material_value = rate_per_gram * weight;
    let taxable = material_value + making_cost + wastage_cost;
    let gst_amount = taxable * gst_percent / 100.0;

    let total = match input.stored_total_override {
        Some(stored) if stored.is_finite() && stored >= 0.0 => stored,
        _ => taxable + gst_amount,
    };

    PriceBreakdown {
        material_value,
        making_cost,
        wastage_cost,
        gst_amount,
        total,
        has_pricing_data: material_value != 0.0
            || making_cost != 0.0
            || wastage_cost != 0.0
            || gst_percent != 0.0,
    }
}

/// Trust signal shown beside a product price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceBadge {
    Live,
    StoredRate,
    Default(String),
    Unavailable,
}

impl Display for PriceBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceBadge::Live => write!(f, "Live Price"),
            PriceBadge::StoredRate => write!(f, "Stored Rate"),
            PriceBadge::Default(label) => write!(f, "{label}"),
            PriceBadge::Unavailable => write!(f, "Price Unavailable"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductPrice {
    pub name: String,
    pub metal: Metal,
    pub input: ProductPricingInput,
    pub breakdown: PriceBreakdown,
    pub badge: PriceBadge,
}

impl ProductPricingInput {
    /// Pricing input for a stored product. The product's own rate snapshot wins
    /// over the market rate in `snapshot`.
    pub fn for_product(product: &ProductConfig, snapshot: &RateSnapshot) -> Self {
        let rate_per_gram = product
            .rate_per_gram
            .unwrap_or_else(|| snapshot.rates.quote(product.metal).price_per_gram());
        Self {
            rate_per_gram,
            weight: product.weight.unwrap_or_default(),
            making_cost: product.making_cost.unwrap_or_default(),
            wastage_cost: product.wastage_cost.unwrap_or_default(),
            gst_percent: product.gst_percent.unwrap_or_default(),
            stored_total_override: product.stored_total,
        }
    }
}

/// Prices a stored product against the current rate snapshot.
pub fn price_product(product: &ProductConfig, snapshot: &RateSnapshot) -> ProductPrice {
    let input = ProductPricingInput::for_product(product, snapshot);
    let breakdown = compute_breakdown(&input);

    let badge = if !breakdown.has_pricing_data {
        PriceBadge::Unavailable
    } else if product.rate_per_gram.is_some() {
        PriceBadge::StoredRate
    } else {
        match &snapshot.provenance {
            Provenance::Live { .. } => PriceBadge::Live,
            Provenance::Default { label } => PriceBadge::Default(label.clone()),
        }
    };

    ProductPrice {
        name: product.name.clone(),
        metal: product.metal,
        input,
        breakdown,
        badge,
    }
}
