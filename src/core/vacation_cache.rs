//! Short-lived read-through cache over the vacation repository.
//!
//! The snapshot and its timestamp sit behind a single async mutex. Every operation, including
//! the forced refresh that follows a write, runs while holding it, so a reader never sees a
//! half-updated list and a writer's own follow-up read always sees its write.

use crate::core::model::{Expense, Vacation, VacationInput};
use crate::core::repository::VacationRepository;
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub const DEFAULT_TTL: Duration = Duration::from_millis(500);

struct Snapshot {
    vacations: Vec<Vacation>,
    fetched_at: Instant,
    invalidated: bool,
}

impl Snapshot {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < ttl
    }
}

pub struct VacationCache {
    repository: Arc<dyn VacationRepository>,
    ttl: Duration,
    state: Mutex<Option<Snapshot>>,
}

impl VacationCache {
    pub fn new(repository: Arc<dyn VacationRepository>, ttl: Duration) -> Self {
        Self {
            repository,
            ttl,
            state: Mutex::new(None),
        }
    }

    pub fn repository(&self) -> &Arc<dyn VacationRepository> {
        &self.repository
    }

    /// Returns the vacation list, from the snapshot when it is younger than the TTL.
    ///
    /// When the repository read fails the last known snapshot is served regardless of age.
    /// The error only reaches the caller if nothing was ever loaded.
    pub async fn list(&self, force_refresh: bool) -> Result<Vec<Vacation>> {
        let mut state = self.state.lock().await;
        self.current(&mut state, force_refresh).await
    }

    /// Looks a vacation up through [`VacationCache::list`].
    pub async fn get(&self, id: &str) -> Result<Option<Vacation>> {
        Ok(self.list(false).await?.into_iter().find(|v| v.id == id))
    }

    /// A vacation together with its expenses, read under the cache lock.
    ///
    /// A delete issued through this cache cannot land between the two reads, so a vacation is
    /// never paired with the empty expense list its cascade left behind.
    pub async fn get_with_expenses(&self, id: &str) -> Result<Option<(Vacation, Vec<Expense>)>> {
        let mut state = self.state.lock().await;
        let vacation = self
            .current(&mut state, false)
            .await?
            .into_iter()
            .find(|v| v.id == id);
        match vacation {
            Some(vacation) => {
                let expenses = self.repository.find_expenses(id).await?;
                Ok(Some((vacation, expenses)))
            }
            None => Ok(None),
        }
    }

    async fn current(
        &self,
        state: &mut MutexGuard<'_, Option<Snapshot>>,
        force_refresh: bool,
    ) -> Result<Vec<Vacation>> {
        if !force_refresh {
            if let Some(snapshot) = state.as_ref().filter(|s| s.is_fresh(self.ttl)) {
                debug!("Vacation cache HIT ({} entries)", snapshot.vacations.len());
                return Ok(snapshot.vacations.clone());
            }
        }
        debug!("Vacation cache MISS (forced: {force_refresh})");
        self.refresh(state).await
    }

    pub async fn create(&self, input: VacationInput) -> Result<Vacation> {
        let input = input.validate()?;
        let mut state = self.state.lock().await;
        let created = self.repository.create(input).await?;
        self.refresh_after_write(&mut state).await;
        Ok(created)
    }

    /// `Ok(None)` when no vacation with `id` exists.
    pub async fn update(&self, id: &str, input: VacationInput) -> Result<Option<Vacation>> {
        let input = input.validate()?;
        let mut state = self.state.lock().await;
        let updated = self.repository.update(id, input).await?;
        if updated.is_some() {
            self.refresh_after_write(&mut state).await;
        } else {
            debug!("Nothing to update for vacation {id}");
        }
        Ok(updated)
    }

    /// `Ok(false)` when no vacation with `id` exists.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let deleted = self.repository.delete(id).await?;
        if deleted {
            self.refresh_after_write(&mut state).await;
        } else {
            debug!("Nothing to delete for vacation {id}");
        }
        Ok(deleted)
    }

    /// Marks the snapshot stale so the next read goes to the repository.
    /// The snapshot itself is kept as a fallback for failed reads.
    pub async fn invalidate(&self) {
        if let Some(snapshot) = self.state.lock().await.as_mut() {
            snapshot.invalidated = true;
        }
    }

    async fn refresh(&self, state: &mut MutexGuard<'_, Option<Snapshot>>) -> Result<Vec<Vacation>> {
        match self.repository.find_all().await {
            Ok(vacations) => {
                **state = Some(Snapshot {
                    vacations: vacations.clone(),
                    fetched_at: Instant::now(),
                    invalidated: false,
                });
                debug!("Vacation cache PUT ({} entries)", vacations.len());
                Ok(vacations)
            }
            Err(e) => match state.as_ref() {
                Some(snapshot) => {
                    warn!("Vacation fetch failed, serving last snapshot: {e:#}");
                    Ok(snapshot.vacations.clone())
                }
                None => Err(e.context("Failed to load vacations")),
            },
        }
    }

    async fn refresh_after_write(&self, state: &mut MutexGuard<'_, Option<Snapshot>>) {
        match self.repository.find_all().await {
            Ok(vacations) => {
                **state = Some(Snapshot {
                    vacations,
                    fetched_at: Instant::now(),
                    invalidated: false,
                });
            }
            Err(e) => {
                // The write itself went through. Keep the old snapshot as fallback and send
                // the next read back to the repository.
                warn!("Refresh after write failed: {e:#}");
                if let Some(snapshot) = state.as_mut() {
                    snapshot.invalidated = true;
                }
            }
        }
    }
}
