use crate::core::error::TripError;
use crate::core::model::{Expense, Vacation, VacationInput};
use crate::core::repository::VacationRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Vacation store persisted in a fjall keyspace.
///
/// Layout: `vacations` and `expenses` hold JSON records keyed by id; `expense_index` holds
/// `{vacation_id}/{expense_id}` keys so a vacation's expenses can be found by prefix scan.
pub struct DiskVacationStore {
    keyspace: Keyspace,
    vacations: PartitionHandle,
    expenses: PartitionHandle,
    expense_index: PartitionHandle,
    // Serializes read-check-write sequences such as the cascading delete.
    write_lock: Mutex<()>,
}

fn index_key(vacation_id: &str, expense_id: &str) -> String {
    format!("{vacation_id}/{expense_id}")
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).context("Failed to decode stored record")
}

impl DiskVacationStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = Config::new(path.join("vacations_db"))
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let vacations = keyspace.open_partition("vacations", PartitionCreateOptions::default())?;
        let expenses = keyspace.open_partition("expenses", PartitionCreateOptions::default())?;
        let expense_index =
            keyspace.open_partition("expense_index", PartitionCreateOptions::default())?;
        debug!("Opened vacation store at {}", path.display());

        Ok(Self {
            keyspace,
            vacations,
            expenses,
            expense_index,
            write_lock: Mutex::new(()),
        })
    }

    fn read_vacation(&self, id: &str) -> Result<Option<Vacation>> {
        self.vacations
            .get(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn write_vacation(&self, vacation: &Vacation) -> Result<()> {
        self.vacations
            .insert(vacation.id.as_str(), serde_json::to_vec(vacation)?)?;
        self.flush()
    }

    /// Hands buffered journal writes to the OS so a reopened keyspace sees them.
    fn flush(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::Buffer)
            .context("Failed to persist vacation store")
    }

    fn expense_ids(&self, vacation_id: &str) -> Result<Vec<String>> {
        let prefix = format!("{vacation_id}/");
        self.expense_index
            .prefix(&prefix)
            .map(|item| {
                let (key, _) = item?;
                let key = String::from_utf8_lossy(&key);
                Ok(key[prefix.len()..].to_string())
            })
            .collect()
    }
}

#[async_trait]
impl VacationRepository for DiskVacationStore {
    async fn find_all(&self) -> Result<Vec<Vacation>> {
        let mut vacations = self
            .vacations
            .iter()
            .map(|item| {
                let (_, value) = item?;
                decode::<Vacation>(&value)
            })
            .collect::<Result<Vec<_>>>()?;
        vacations.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(vacations)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Vacation>> {
        self.read_vacation(id)
    }

    async fn create(&self, input: VacationInput) -> Result<Vacation> {
        let _guard = self.write_lock.lock().await;
        let vacation = Vacation::from_input(Uuid::new_v4().to_string(), input, Utc::now());
        self.write_vacation(&vacation)?;
        debug!("Store INSERT vacation {}", vacation.id);
        Ok(vacation)
    }

    async fn update(&self, id: &str, input: VacationInput) -> Result<Option<Vacation>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut vacation) = self.read_vacation(id)? else {
            return Ok(None);
        };
        vacation.apply(input, Utc::now());
        self.write_vacation(&vacation)?;
        debug!("Store UPDATE vacation {id}");
        Ok(Some(vacation))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.vacations.get(id)?.is_none() {
            return Ok(false);
        }

        let expense_ids = self.expense_ids(id)?;
        let mut batch = self.keyspace.batch();
        for expense_id in &expense_ids {
            batch.remove(&self.expenses, expense_id.as_str());
            batch.remove(&self.expense_index, index_key(id, expense_id));
        }
        batch.remove(&self.vacations, id);
        batch.commit().context("Failed to commit vacation delete")?;
        self.flush()?;

        debug!(
            "Store DELETE vacation {id} with {} expenses",
            expense_ids.len()
        );
        Ok(true)
    }

    async fn find_expenses(&self, vacation_id: &str) -> Result<Vec<Expense>> {
        let mut expenses = Vec::new();
        for expense_id in self.expense_ids(vacation_id)? {
            if let Some(bytes) = self.expenses.get(&expense_id)? {
                expenses.push(decode::<Expense>(&bytes)?);
            }
        }
        expenses.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(expenses)
    }

    async fn create_expense(&self, expense: Expense) -> Result<Expense> {
        let _guard = self.write_lock.lock().await;
        if self.vacations.get(&expense.vacation_id)?.is_none() {
            return Err(TripError::VacationNotFound(expense.vacation_id).into());
        }

        let mut batch = self.keyspace.batch();
        batch.insert(
            &self.expenses,
            expense.id.as_str(),
            serde_json::to_vec(&expense)?,
        );
        batch.insert(
            &self.expense_index,
            index_key(&expense.vacation_id, &expense.id),
            Vec::<u8>::new(),
        );
        batch.commit().context("Failed to commit expense insert")?;
        self.flush()?;
        debug!("Store INSERT expense {}", expense.id);
        Ok(expense)
    }

    async fn delete_expense(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(bytes) = self.expenses.get(id)? else {
            return Ok(false);
        };
        let expense: Expense = decode(&bytes)?;

        let mut batch = self.keyspace.batch();
        batch.remove(&self.expenses, id);
        batch.remove(&self.expense_index, index_key(&expense.vacation_id, id));
        batch.commit().context("Failed to commit expense delete")?;
        self.flush()?;
        Ok(true)
    }
}
