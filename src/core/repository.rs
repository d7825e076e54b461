//! Durable storage contract for vacations and their expenses

use crate::core::model::{Expense, Vacation, VacationInput};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VacationRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Vacation>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Vacation>>;

    async fn create(&self, input: VacationInput) -> Result<Vacation>;

    /// Replaces the editable fields. `Ok(None)` when `id` does not exist.
    async fn update(&self, id: &str, input: VacationInput) -> Result<Option<Vacation>>;

    /// Removes the vacation and every expense that references it in one operation.
    /// `Ok(false)` when `id` does not exist.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn find_expenses(&self, vacation_id: &str) -> Result<Vec<Expense>>;

    /// Stores a fully-formed expense. Fails with `TripError::VacationNotFound` when the
    /// owning vacation does not exist.
    async fn create_expense(&self, expense: Expense) -> Result<Expense>;

    async fn delete_expense(&self, id: &str) -> Result<bool>;
}
