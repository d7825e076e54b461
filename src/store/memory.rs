use crate::core::error::TripError;
use crate::core::model::{Expense, Vacation, VacationInput};
use crate::core::repository::VacationRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    vacations: BTreeMap<String, Vacation>,
    expenses: BTreeMap<String, Expense>,
}

/// In-process vacation store. Vacations and expenses share one lock so a cascading delete
/// is never observed half done.
#[derive(Clone, Default)]
pub struct MemoryVacationStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryVacationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VacationRepository for MemoryVacationStore {
    async fn find_all(&self) -> Result<Vec<Vacation>> {
        let tables = self.inner.lock().await;
        let mut vacations: Vec<Vacation> = tables.vacations.values().cloned().collect();
        vacations.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(vacations)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Vacation>> {
        Ok(self.inner.lock().await.vacations.get(id).cloned())
    }

    async fn create(&self, input: VacationInput) -> Result<Vacation> {
        let vacation = Vacation::from_input(Uuid::new_v4().to_string(), input, Utc::now());
        let mut tables = self.inner.lock().await;
        tables
            .vacations
            .insert(vacation.id.clone(), vacation.clone());
        debug!("Store INSERT vacation {}", vacation.id);
        Ok(vacation)
    }

    async fn update(&self, id: &str, input: VacationInput) -> Result<Option<Vacation>> {
        let mut tables = self.inner.lock().await;
        Ok(tables.vacations.get_mut(id).map(|vacation| {
            vacation.apply(input, Utc::now());
            debug!("Store UPDATE vacation {id}");
            vacation.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut tables = self.inner.lock().await;
        if tables.vacations.remove(id).is_none() {
            return Ok(false);
        }
        let before = tables.expenses.len();
        tables.expenses.retain(|_, expense| expense.vacation_id != id);
        debug!(
            "Store DELETE vacation {id} with {} expenses",
            before - tables.expenses.len()
        );
        Ok(true)
    }

    async fn find_expenses(&self, vacation_id: &str) -> Result<Vec<Expense>> {
        let tables = self.inner.lock().await;
        let mut expenses: Vec<Expense> = tables
            .expenses
            .values()
            .filter(|expense| expense.vacation_id == vacation_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(expenses)
    }

    async fn create_expense(&self, expense: Expense) -> Result<Expense> {
        let mut tables = self.inner.lock().await;
        if !tables.vacations.contains_key(&expense.vacation_id) {
            return Err(TripError::VacationNotFound(expense.vacation_id).into());
        }
        tables.expenses.insert(expense.id.clone(), expense.clone());
        debug!("Store INSERT expense {}", expense.id);
        Ok(expense)
    }

    async fn delete_expense(&self, id: &str) -> Result<bool> {
        Ok(self.inner.lock().await.expenses.remove(id).is_some())
    }
}
