use super::ui;
use crate::core::config::{AppConfig, ProductConfig};
use crate::core::pricing::{PriceBadge, ProductPrice, price_product};
use crate::core::rate::RateSnapshot;
use crate::core::store::{RateStore, latest_or_default};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

/// Renders price breakdowns for `products` priced against `snapshot`.
pub fn display_prices(products: &[ProductConfig], snapshot: &RateSnapshot) -> String {
    let prices: Vec<ProductPrice> = products
        .iter()
        .map(|product| price_product(product, snapshot))
        .collect();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Product"),
        ui::header_cell("Metal"),
        ui::header_cell("Rate (₹/g)"),
        ui::header_cell("Weight"),
        ui::header_cell("Material"),
        ui::header_cell("Making"),
        ui::header_cell("Wastage"),
        ui::header_cell("GST"),
        ui::header_cell("Total"),
        ui::header_cell("Status"),
    ]);

    for price in &prices {
        let badge = price.badge.to_string();
        let live = price.badge == PriceBadge::Live;

        if !price.breakdown.has_pricing_data {
            table.add_row(vec![
                Cell::new(&price.name),
                Cell::new(price.metal.to_string()),
                ui::na_cell(),
                ui::na_cell(),
                ui::na_cell(),
                ui::na_cell(),
                ui::na_cell(),
                ui::na_cell(),
                Cell::new("Breakup not configured"),
                ui::badge_cell(&badge, live),
            ]);
            continue;
        }

        let b = &price.breakdown;
        table.add_row(vec![
            Cell::new(&price.name),
            Cell::new(price.metal.to_string()),
            ui::money_cell(price.input.rate_per_gram),
            Cell::new(format!("{:.3} g", price.input.weight)).set_alignment(CellAlignment::Right),
            ui::money_cell(b.material_value),
            ui::money_cell(b.making_cost),
            ui::money_cell(b.wastage_cost),
            ui::money_cell(b.gst_amount),
            ui::money_cell(b.total),
            ui::badge_cell(&badge, live),
        ]);
    }

    let mut output = format!(
        "Product prices: {}\n\n",
        ui::style_text(&snapshot.provenance.badge(), ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output
}

pub async fn run(config: &AppConfig, store: &(dyn RateStore + Send + Sync)) -> Result<()> {
    if config.products.is_empty() {
        println!("No products configured.");
        return Ok(());
    }

    let snapshot = latest_or_default(store, &config.default_rate_set()?).await;
    println!("{}", display_prices(&config.products, &snapshot));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::{DefaultRateSet, Metal};
    use chrono::Utc;

    fn product(name: &str, weight: Option<f64>) -> ProductConfig {
        ProductConfig {
            name: name.to_string(),
            metal: Metal::Gold,
            weight,
            making_cost: Some(500.0),
            wastage_cost: Some(100.0),
            gst_percent: Some(3.0),
            rate_per_gram: Some(100.0),
            stored_total: None,
        }
    }

    #[test]
    fn test_display_prices() {
        let snapshot = DefaultRateSet::default().snapshot(Utc::now());
        let output = display_prices(&[product("Stud Earrings", Some(2.0))], &snapshot);

        assert!(output.contains("Stud Earrings"));
        // (200 + 500 + 100) * 3% = 24, total 824
        assert!(output.contains("₹24.00"));
        assert!(output.contains("₹824.00"));
        assert!(output.contains("Stored Rate"));
    }

    #[test]
    fn test_display_unconfigured_product() {
        let snapshot = DefaultRateSet::default().snapshot(Utc::now());
        let blank = ProductConfig {
            name: "Mystery Box".to_string(),
            metal: Metal::Silver,
            weight: None,
            making_cost: None,
            wastage_cost: None,
            gst_percent: None,
            rate_per_gram: None,
            stored_total: None,
        };
        let output = display_prices(&[blank], &snapshot);

        assert!(output.contains("Breakup not configured"));
        assert!(output.contains("Price Unavailable"));
    }
}
