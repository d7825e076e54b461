//! Budget metrics for a single vacation, normalized to one display currency.
use crate::core::converter::CurrencyConverter;
use crate::core::model::{Expense, Vacation};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

/// Share of the daily budget below which spending counts as under budget.
pub const DEFAULT_UNDER_BUDGET_RATIO: f64 = 0.8;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    FutureTrip,
    OnTrack,
    UnderBudget,
    OverBudget,
}

impl Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BudgetStatus::FutureTrip => "future-trip",
                BudgetStatus::OnTrack => "on-track",
                BudgetStatus::UnderBudget => "under-budget",
                BudgetStatus::OverBudget => "over-budget",
            }
        )
    }
}

/// Derived budget figures. Recomputed on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAnalysis {
    pub currency: String,
    pub total_budget: f64,
    pub total_expenses: f64,
    pub remaining_budget: f64,
    pub percentage_used: f64,
    pub total_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    pub budget_per_day: f64,
    pub avg_spent_per_day: f64,
    pub remaining_budget_per_day: f64,
    pub projected_total_spend: f64,
    pub projected_surplus: f64,
    pub is_over_budget: bool,
    pub status: BudgetStatus,
    /// Version of the rate data the figures were converted with.
    pub rates_version: u64,
}

/// Whole days between two instants, rounded up.
fn days_ceil(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    ((to - from).num_milliseconds() as f64 / MILLIS_PER_DAY).ceil() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripDays {
    pub total: i64,
    pub elapsed: i64,
    pub remaining: i64,
}

impl TripDays {
    /// Splits the trip into elapsed and remaining days as seen from `now`.
    /// The start day counts as day 1.
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (days_ceil(start, end) + 1).max(1);
        if now < start {
            Self {
                total,
                elapsed: 0,
                remaining: total,
            }
        } else if now <= end {
            Self {
                total,
                elapsed: days_ceil(start, now) + 1,
                remaining: days_ceil(now, end).max(0),
            }
        } else {
            Self {
                total,
                elapsed: total,
                remaining: 0,
            }
        }
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub struct BudgetAnalyzer<'a> {
    converter: &'a CurrencyConverter,
    under_budget_ratio: f64,
}

impl<'a> BudgetAnalyzer<'a> {
    pub fn new(converter: &'a CurrencyConverter) -> Self {
        Self {
            converter,
            under_budget_ratio: DEFAULT_UNDER_BUDGET_RATIO,
        }
    }

    pub fn with_under_budget_ratio(mut self, ratio: f64) -> Self {
        self.under_budget_ratio = ratio;
        self
    }

    pub async fn analyze(
        &self,
        vacation: &Vacation,
        expenses: &[Expense],
        target_currency: &str,
    ) -> BudgetAnalysis {
        self.analyze_at(vacation, expenses, target_currency, Utc::now())
            .await
    }

    /// Same as [`BudgetAnalyzer::analyze`] with an explicit clock.
    pub async fn analyze_at(
        &self,
        vacation: &Vacation,
        expenses: &[Expense],
        target_currency: &str,
        now: DateTime<Utc>,
    ) -> BudgetAnalysis {
        let target_currency = target_currency.trim().to_ascii_uppercase();
        let days = TripDays::at(vacation.start_date, vacation.end_date, now);

        let total_budget = self
            .converter
            .convert(
                vacation.budget.unwrap_or(0.0),
                &vacation.budget_currency,
                &target_currency,
            )
            .await;

        let base_currency = self.converter.base_currency();
        let converted = join_all(expenses.iter().map(|expense| {
            self.converter
                .convert(expense.base_currency_amount, base_currency, &target_currency)
        }))
        .await;
        // Starts from +0.0; `Sum` for f64 starts from -0.0.
        let total_expenses = converted.iter().fold(0.0, |acc, amount| acc + amount);

        let remaining_budget = total_budget - total_expenses;
        let percentage_used = ratio_or_zero(total_expenses, total_budget) * 100.0;
        let budget_per_day = total_budget / days.total as f64;
        let avg_spent_per_day = ratio_or_zero(total_expenses, days.elapsed as f64);
        let remaining_budget_per_day = ratio_or_zero(remaining_budget, days.remaining as f64);
        let projected_total_spend = avg_spent_per_day * days.total as f64;
        let projected_surplus = total_budget - projected_total_spend;
        let is_over_budget = total_expenses > total_budget;

        let status = if now < vacation.start_date {
            BudgetStatus::FutureTrip
        } else if is_over_budget || projected_surplus < 0.0 {
            BudgetStatus::OverBudget
        } else if avg_spent_per_day < budget_per_day * self.under_budget_ratio {
            BudgetStatus::UnderBudget
        } else {
            BudgetStatus::OnTrack
        };

        debug!(
            vacation = %vacation.id,
            %status,
            total_budget,
            total_expenses,
            "Analyzed budget in {target_currency}"
        );

        BudgetAnalysis {
            currency: target_currency,
            total_budget,
            total_expenses,
            remaining_budget,
            percentage_used,
            total_days: days.total,
            elapsed_days: days.elapsed,
            remaining_days: days.remaining,
            budget_per_day,
            avg_spent_per_day,
            remaining_budget_per_day,
            projected_total_spend,
            projected_surplus,
            is_over_budget,
            status,
            rates_version: self.converter.rates_version(),
        }
    }
}
