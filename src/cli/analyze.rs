use super::ui;
use crate::core::analysis::BudgetAnalysis;
use crate::core::planner::TripPlanner;
use anyhow::Result;
use comfy_table::Cell;

impl BudgetAnalysis {
    pub fn display_as_table(&self, title: &str) -> String {
        let currency = &self.currency;
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell(&format!("Value ({currency})")),
        ]);

        let rows = [
            ("Total budget", ui::amount_cell(self.total_budget)),
            ("Total expenses", ui::amount_cell(self.total_expenses)),
            ("Remaining budget", ui::signed_amount_cell(self.remaining_budget)),
            (
                "Budget used",
                Cell::new(format!("{:.1}%", self.percentage_used)),
            ),
            (
                "Days (elapsed / remaining / total)",
                Cell::new(format!(
                    "{} / {} / {}",
                    self.elapsed_days, self.remaining_days, self.total_days
                )),
            ),
            ("Budget per day", ui::amount_cell(self.budget_per_day)),
            ("Average spent per day", ui::amount_cell(self.avg_spent_per_day)),
            (
                "Remaining per day",
                ui::amount_cell(self.remaining_budget_per_day),
            ),
            (
                "Projected total spend",
                ui::amount_cell(self.projected_total_spend),
            ),
            (
                "Projected surplus",
                ui::signed_amount_cell(self.projected_surplus),
            ),
            ("Status", ui::status_cell(self.status)),
        ];
        for (label, value) in rows {
            table.add_row(vec![Cell::new(label), value]);
        }

        let mut output = format!("Vacation: {}\n\n", ui::style_text(title, ui::StyleType::Title));
        output.push_str(&table.to_string());
        if self.is_over_budget {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("Spending has exceeded the budget.", ui::StyleType::Error)
            ));
        }
        output
    }
}

pub async fn run(planner: &TripPlanner, id: &str, currency: Option<&str>) -> Result<()> {
    let analysis = planner.analyze_vacation(id, currency).await?;
    let title = planner
        .cache()
        .get(id)
        .await?
        .map_or_else(|| id.to_string(), |v| v.destination);
    println!("{}", analysis.display_as_table(&title));
    Ok(())
}
