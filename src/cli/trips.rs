use super::ui;
use crate::core::model::{Expense, NewExpense, Vacation, VacationInput};
use crate::core::planner::TripPlanner;
use anyhow::Result;
use comfy_table::Cell;

pub fn vacations_table(vacations: &[Vacation]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Destination"),
        ui::header_cell("Dates"),
        ui::header_cell("Budget"),
        ui::header_cell("Shown in"),
    ]);

    for vacation in vacations {
        let place = if vacation.country.is_empty() {
            vacation.destination.clone()
        } else {
            format!("{}, {}", vacation.destination, vacation.country)
        };
        let budget = ui::format_optional_cell(vacation.budget, |b| {
            format!("{b:.2} {}", vacation.budget_currency)
        });
        table.add_row(vec![
            Cell::new(&vacation.id),
            Cell::new(place),
            Cell::new(format!(
                "{} to {}",
                vacation.start_date.format("%Y-%m-%d"),
                vacation.end_date.format("%Y-%m-%d")
            )),
            budget,
            Cell::new(vacation.display_currency()),
        ]);
    }
    table.to_string()
}

pub fn expenses_table(expenses: &[Expense], base_currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
        ui::header_cell("Amount"),
        ui::header_cell(&format!("Amount ({base_currency})")),
    ]);
    for expense in expenses {
        table.add_row(vec![
            Cell::new(&expense.id),
            Cell::new(expense.date.format("%Y-%m-%d")),
            Cell::new(expense.category.to_string()),
            Cell::new(&expense.description),
            Cell::new(format!("{:.2} {}", expense.amount, expense.currency)),
            ui::amount_cell(expense.base_currency_amount),
        ]);
    }
    table.to_string()
}

pub async fn list(planner: &TripPlanner) -> Result<()> {
    let vacations = planner.vacations().await?;
    if vacations.is_empty() {
        println!("{}", ui::style_text("No vacations yet.", ui::StyleType::Subtle));
    } else {
        println!("{}", vacations_table(&vacations));
    }
    Ok(())
}

pub async fn add(planner: &TripPlanner, input: VacationInput) -> Result<()> {
    let vacation = planner.create_vacation(input).await?;
    println!("Created vacation {}", ui::style_text(&vacation.id, ui::StyleType::Title));
    Ok(())
}

pub async fn remove(planner: &TripPlanner, id: &str) -> Result<()> {
    if planner.delete_vacation(id).await? {
        println!("Deleted vacation {id}");
    } else {
        println!(
            "{}",
            ui::style_text(&format!("No vacation with id {id}"), ui::StyleType::Error)
        );
    }
    Ok(())
}

pub async fn remove_expense(planner: &TripPlanner, id: &str) -> Result<()> {
    if planner.delete_expense(id).await? {
        println!("Deleted expense {id}");
    } else {
        println!(
            "{}",
            ui::style_text(&format!("No expense with id {id}"), ui::StyleType::Error)
        );
    }
    Ok(())
}

pub async fn add_expense(planner: &TripPlanner, expense: NewExpense) -> Result<()> {
    let stored = planner.add_expense(expense).await?;
    println!(
        "Recorded {:.2} {} ({:.2} {})",
        stored.amount,
        stored.currency,
        stored.base_currency_amount,
        planner.converter().base_currency()
    );
    Ok(())
}

pub async fn expenses(planner: &TripPlanner, vacation_id: &str) -> Result<()> {
    let expenses = planner.expenses(vacation_id).await?;
    println!(
        "{}",
        expenses_table(&expenses, planner.converter().base_currency())
    );
    Ok(())
}
