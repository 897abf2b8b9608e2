use super::ui;
use crate::core::config::AppConfig;
use crate::core::rate::{Metal, RateSnapshot};
use crate::core::store::{RateStore, latest_or_default};
use anyhow::Result;
use comfy_table::Cell;

impl RateSnapshot {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Metal"),
            ui::header_cell("Rate (₹/g)"),
            ui::header_cell("Change"),
            ui::header_cell("Change (%)"),
            ui::header_cell("Observed"),
        ]);

        for metal in [Metal::Gold, Metal::Silver] {
            let quote = self.rates.quote(metal);
            table.add_row(vec![
                Cell::new(metal.to_string()),
                ui::money_cell(quote.price_per_gram()),
                ui::change_cell(
                    format!("{:+.0}", quote.change_absolute()),
                    quote.change_absolute(),
                ),
                ui::change_cell(
                    format!("{:+.2}%", quote.change_percent()),
                    quote.change_percent(),
                ),
                Cell::new(quote.observed_at().format("%Y-%m-%d %H:%M UTC").to_string()),
            ]);
        }

        let badge_style = if self.provenance.is_live() {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };

        let mut output = format!(
            "Metal rates: {}\n\n",
            ui::style_text(&self.provenance.badge(), badge_style)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {} {}",
            ui::style_text("Source:", ui::StyleType::TotalLabel),
            self.provenance,
            ui::style_text(
                &format!("(fetched {})", self.fetched_at.format("%Y-%m-%d %H:%M UTC")),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

/// Shows the stored rates, or the default set when nothing was stored yet.
pub async fn run(config: &AppConfig, store: &(dyn RateStore + Send + Sync)) -> Result<()> {
    let snapshot = latest_or_default(store, &config.default_rate_set()?).await;
    println!("{}", snapshot.display_as_table());
    Ok(())
}
