use super::ui;
use crate::core::chit::{ChitPlan, ChitStatus, compute_progress};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, CellAlignment};

fn status_label(status: ChitStatus) -> &'static str {
    match status {
        ChitStatus::Active => "Active",
        ChitStatus::Completed => "Completed",
        ChitStatus::Cancelled => "Cancelled",
    }
}

/// Renders progress of every plan as of `as_of`.
pub fn display_progress(plans: &[ChitPlan], as_of: DateTime<Utc>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Plan"),
        ui::header_cell("Status"),
        ui::header_cell("Monthly"),
        ui::header_cell("Months Paid"),
        ui::header_cell("Months Pending"),
        ui::header_cell("Amount Paid"),
        ui::header_cell("Amount Pending"),
        ui::header_cell("Matures"),
    ]);

    let mut total_paid = 0.0;
    for plan in plans {
        let progress = compute_progress(plan, as_of);
        total_paid += progress.amount_paid;

        let matures = plan
            .maturity_date()
            .map_or(ui::na_cell(), |d| Cell::new(d.format("%Y-%m-%d").to_string()));

        table.add_row(vec![
            Cell::new(&plan.plan_id),
            Cell::new(status_label(plan.status)),
            ui::money_cell(plan.monthly_amount),
            Cell::new(format!("{}/{}", progress.months_completed, plan.duration_months))
                .set_alignment(CellAlignment::Right),
            Cell::new(progress.months_pending).set_alignment(CellAlignment::Right),
            ui::money_cell(progress.amount_paid),
            ui::money_cell(progress.amount_pending),
            matures,
        ]);
    }

    let mut output = format!(
        "Chit plans as of {}\n\n",
        ui::style_text(&as_of.format("%Y-%m-%d").to_string(), ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{} {}",
        ui::style_text("Total Paid:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_inr(total_paid), ui::StyleType::TotalValue)
    ));
    output
}

pub fn run(plans: &[ChitPlan]) -> Result<()> {
    if plans.is_empty() {
        println!("No chit plans configured.");
        return Ok(());
    }
    println!("{}", display_progress(plans, Utc::now()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chit::parse_start_date;

    #[test]
    fn test_display_progress() {
        let as_of = parse_start_date("2025-04-10").unwrap();
        let mut cancelled = ChitPlan::new("CHIT-B", 2000.0, parse_start_date("2024-01-01").ok());
        cancelled.status = ChitStatus::Cancelled;
        let plans = vec![
            ChitPlan::new("CHIT-A", 5000.0, parse_start_date("2025-01-05").ok()),
            cancelled,
            ChitPlan::new("CHIT-C", 1000.0, None),
        ];

        let output = display_progress(&plans, as_of);
        // CHIT-A: 95 days elapsed, 3 periods
        assert!(output.contains("3/10"));
        assert!(output.contains("₹15000.00"));
        assert!(output.contains("Cancelled"));
        assert!(output.contains("0/10"));
        assert!(output.contains("Total Paid:"));
    }
}
