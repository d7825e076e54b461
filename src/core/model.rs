//! Vacation and expense records as stored by the repository.

use crate::core::currency::normalize_code;
use crate::core::error::TripError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacation {
    pub id: String,
    pub destination: String,
    pub country: String,
    pub hotel_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget: Option<f64>,
    pub budget_currency: String,
    pub currency: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vacation {
    /// Builds a new record from validated input. Timestamps are set to `now`.
    pub fn from_input(id: String, input: VacationInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            destination: input.destination,
            country: input.country,
            hotel_name: input.hotel_name,
            start_date: input.start_date,
            end_date: input.end_date,
            budget: input.budget,
            budget_currency: input.budget_currency,
            currency: input.currency,
            image: input.image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field. Identity and creation time are kept.
    pub fn apply(&mut self, input: VacationInput, now: DateTime<Utc>) {
        self.destination = input.destination;
        self.country = input.country;
        self.hotel_name = input.hotel_name;
        self.start_date = input.start_date;
        self.end_date = input.end_date;
        self.budget = input.budget;
        self.budget_currency = input.budget_currency;
        self.currency = input.currency;
        self.image = input.image;
        self.updated_at = now;
    }

    /// Currency the vacation prefers for display, falling back to the budget currency.
    pub fn display_currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(&self.budget_currency)
    }
}

/// The editable fields of a vacation, used for both create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationInput {
    pub destination: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub hotel_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub budget: Option<f64>,
    pub budget_currency: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl VacationInput {
    /// Checks the record invariants and upper-cases the currency codes.
    pub fn validate(mut self) -> Result<Self, TripError> {
        if self.destination.trim().is_empty() {
            return Err(TripError::InvalidInput(
                "destination must not be empty".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(TripError::InvalidInput(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(TripError::InvalidInput(format!(
                    "budget must be a non-negative number, got {budget}"
                )));
            }
        }
        self.budget_currency = normalize_code(&self.budget_currency)?;
        self.currency = self.currency.as_deref().map(normalize_code).transpose()?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Transport,
    Accommodation,
    Food,
    Entertainment,
    Shopping,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Transport,
        ExpenseCategory::Accommodation,
        ExpenseCategory::Food,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Other,
    ];
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ExpenseCategory::Transport => "transport",
                ExpenseCategory::Accommodation => "accommodation",
                ExpenseCategory::Food => "food",
                ExpenseCategory::Entertainment => "entertainment",
                ExpenseCategory::Shopping => "shopping",
                ExpenseCategory::Other => "other",
            }
        )
    }
}

impl FromStr for ExpenseCategory {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| TripError::InvalidInput(format!("Unknown expense category: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub vacation_id: String,
    pub amount: f64,
    pub currency: String,
    /// `amount` converted into the base currency when the expense was recorded.
    pub base_currency_amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub vacation_id: String,
    pub amount: f64,
    pub currency: String,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
}

impl NewExpense {
    pub fn validate(mut self) -> Result<Self, TripError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(TripError::InvalidInput(format!(
                "expense amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        self.currency = normalize_code(&self.currency)?;
        Ok(self)
    }

    /// Completes the record with its identity and the write-time base amount.
    pub fn into_expense(
        self,
        id: String,
        base_currency_amount: f64,
        now: DateTime<Utc>,
    ) -> Expense {
        Expense {
            id,
            vacation_id: self.vacation_id,
            amount: self.amount,
            currency: self.currency,
            base_currency_amount,
            category: self.category,
            description: self.description,
            date: self.date,
            created_at: now,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_input() -> VacationInput {
        VacationInput {
            destination: "Lisbon".to_string(),
            country: "Portugal".to_string(),
            hotel_name: "Hotel Avenida".to_string(),
            start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap(),
            budget: Some(1000.0),
            budget_currency: "eur".to_string(),
            currency: None,
            image: None,
        }
    }

    #[test]
    fn test_validate_normalizes_codes() {
        let input = sample_input().validate().unwrap();
        assert_eq!(input.budget_currency, "EUR");
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut input = sample_input();
        input.end_date = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        assert!(matches!(input.validate(), Err(TripError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_allows_same_day_trip() {
        let mut input = sample_input();
        input.end_date = input.start_date;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_budget() {
        let mut input = sample_input();
        input.budget = Some(-1.0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_currency() {
        let mut input = sample_input();
        input.budget_currency = "E1".to_string();
        assert_eq!(
            input.validate(),
            Err(TripError::InvalidCurrencyCode("E1".to_string()))
        );
    }

    #[test]
    fn test_expense_validation() {
        let expense = NewExpense {
            vacation_id: "v1".to_string(),
            amount: -5.0,
            currency: "USD".to_string(),
            category: ExpenseCategory::Food,
            description: String::new(),
            date: Utc::now(),
        };
        assert!(expense.validate().is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "Food".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::Food
        );
        assert!("souvenirs".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_apply_replaces_editable_fields() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut vacation = Vacation::from_input("v1".to_string(), sample_input(), created);
        let mut input = sample_input();
        input.destination = "Porto".to_string();
        input.budget = None;
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        vacation.apply(input, later);

        assert_eq!(vacation.id, "v1");
        assert_eq!(vacation.destination, "Porto");
        assert_eq!(vacation.budget, None);
        assert_eq!(vacation.created_at, created);
        assert_eq!(vacation.updated_at, later);
    }
}
