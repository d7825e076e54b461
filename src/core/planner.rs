//! Entry point for callers: vacation CRUD through the cache, expense entry and analysis.
use crate::core::analysis::{BudgetAnalysis, BudgetAnalyzer, DEFAULT_UNDER_BUDGET_RATIO};
use crate::core::converter::CurrencyConverter;
use crate::core::currency::normalize_code;
use crate::core::error::TripError;
use crate::core::model::{Expense, NewExpense, Vacation, VacationInput};
use crate::core::vacation_cache::VacationCache;
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

pub struct TripPlanner {
    cache: VacationCache,
    converter: CurrencyConverter,
    under_budget_ratio: f64,
    default_currency: Option<String>,
}

impl TripPlanner {
    pub fn new(cache: VacationCache, converter: CurrencyConverter) -> Self {
        Self {
            cache,
            converter,
            under_budget_ratio: DEFAULT_UNDER_BUDGET_RATIO,
            default_currency: None,
        }
    }

    pub fn with_under_budget_ratio(mut self, ratio: f64) -> Self {
        self.under_budget_ratio = ratio;
        self
    }

    /// Analysis currency for vacations that do not set a display currency of their own.
    pub fn with_default_currency(mut self, currency: &str) -> Self {
        self.default_currency = Some(currency.to_string());
        self
    }

    pub fn cache(&self) -> &VacationCache {
        &self.cache
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    pub async fn vacations(&self) -> Result<Vec<Vacation>> {
        self.cache.list(false).await
    }

    pub async fn create_vacation(&self, input: VacationInput) -> Result<Vacation> {
        let vacation = self.cache.create(input).await?;
        info!("Created vacation {} to {}", vacation.id, vacation.destination);
        Ok(vacation)
    }

    pub async fn update_vacation(
        &self,
        id: &str,
        input: VacationInput,
    ) -> Result<Option<Vacation>> {
        self.cache.update(id, input).await
    }

    pub async fn delete_vacation(&self, id: &str) -> Result<bool> {
        let deleted = self.cache.delete(id).await?;
        if deleted {
            info!("Deleted vacation {id} and its expenses");
        }
        Ok(deleted)
    }

    /// Records an expense, converting its amount into the base currency once, here.
    pub async fn add_expense(&self, expense: NewExpense) -> Result<Expense> {
        let expense = expense.validate()?;
        if self.cache.get(&expense.vacation_id).await?.is_none() {
            return Err(TripError::VacationNotFound(expense.vacation_id).into());
        }

        let base_amount = self
            .converter
            .convert_to_base(expense.amount, &expense.currency)
            .await;
        let record = expense.into_expense(Uuid::new_v4().to_string(), base_amount, Utc::now());
        debug!(
            "Expense {} {} stored as {} {}",
            record.amount,
            record.currency,
            record.base_currency_amount,
            self.converter.base_currency()
        );
        self.cache.repository().create_expense(record).await
    }

    pub async fn expenses(&self, vacation_id: &str) -> Result<Vec<Expense>> {
        self.cache.repository().find_expenses(vacation_id).await
    }

    pub async fn delete_expense(&self, id: &str) -> Result<bool> {
        self.cache.repository().delete_expense(id).await
    }

    /// Analyzes a vacation in `currency`. Without one, the vacation's display currency is used,
    /// then the planner default, then the budget currency.
    pub async fn analyze_vacation(
        &self,
        id: &str,
        currency: Option<&str>,
    ) -> Result<BudgetAnalysis> {
        self.analyze_vacation_at(id, currency, Utc::now()).await
    }

    pub async fn analyze_vacation_at(
        &self,
        id: &str,
        currency: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BudgetAnalysis> {
        // Both reads come from one locked view; rate lookups run after the lock is released.
        let (vacation, expenses) = self
            .cache
            .get_with_expenses(id)
            .await?
            .ok_or_else(|| TripError::VacationNotFound(id.to_string()))?;

        let target = currency
            .or(vacation.currency.as_deref())
            .or(self.default_currency.as_deref())
            .unwrap_or(&vacation.budget_currency);
        let target = normalize_code(target)?;
        Ok(BudgetAnalyzer::new(&self.converter)
            .with_under_budget_ratio(self.under_budget_ratio)
            .analyze_at(&vacation, &expenses, &target, now)
            .await)
    }
}
