//! In-process repository used by tests and local demos.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::errors::ConsoleError;
use crate::repository::{ListParams, Repository};
use crate::services::resource::{Resource, ResourceId};

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub change_status: usize,
}

/// Vector-backed repository with call counters and failure injection.
pub struct InMemoryRepository<T: Resource> {
    rows: RwLock<Vec<T>>,
    next_id: AtomicI64,
    calls: Mutex<CallCounts>,
    fail_next: Mutex<Option<String>>,
}

impl<T: Resource> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: Vec<T>) -> Self {
        let next_id = rows.iter().map(Resource::id).max().unwrap_or(0) + 1;
        Self {
            rows: RwLock::new(rows),
            next_id: AtomicI64::new(next_id),
            calls: Mutex::new(CallCounts::default()),
            fail_next: Mutex::new(None),
        }
    }

    /// Make the next call fail with `message`, as an upstream rejection would.
    pub fn fail_next(&self, message: impl Into<String>) {
        *lock(&self.fail_next) = Some(message.into());
    }

    pub fn calls(&self) -> CallCounts {
        *lock(&self.calls)
    }

    pub async fn rows(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    /// Insert a row directly, bypassing counters.
    pub async fn insert(&self, row: T) {
        self.next_id.fetch_max(row.id() + 1, Ordering::SeqCst);
        self.rows.write().await.push(row);
    }

    fn record(&self, op: impl FnOnce(&mut CallCounts)) -> Result<(), ConsoleError> {
        op(&mut lock(&self.calls));
        match lock(&self.fail_next).take() {
            Some(message) => Err(ConsoleError::Repository(message)),
            None => Ok(()),
        }
    }

    fn not_found(id: ResourceId) -> ConsoleError {
        ConsoleError::Repository(format!("{} #{id} does not exist", T::FAMILY.noun()))
    }
}

fn lock<V>(mutex: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl<T: Resource> Repository<T> for InMemoryRepository<T> {
    async fn get_list(&self, params: &ListParams) -> Result<Vec<T>, ConsoleError> {
        self.record(|c| c.get_list += 1)?;
        let rows = self.rows.read().await;
        let needle = params
            .search
            .as_deref()
            .map(|term| term.trim().to_lowercase())
            .unwrap_or_default();
        if needle.is_empty() {
            return Ok(rows.clone());
        }
        let descriptor = T::descriptor();
        Ok(rows
            .iter()
            .filter(|row| descriptor.matches_search(row, &needle))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: &T::Draft) -> Result<Option<T>, ConsoleError> {
        self.record(|c| c.create += 1)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = T::from_draft(id, draft, Utc::now());
        self.rows.write().await.push(row.clone());
        Ok(Some(row))
    }

    async fn update(&self, id: ResourceId, draft: &T::Draft) -> Result<Option<T>, ConsoleError> {
        self.record(|c| c.update += 1)?;
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        row.apply_draft(draft);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: ResourceId) -> Result<(), ConsoleError> {
        self.record(|c| c.delete += 1)?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn change_status(&self, id: ResourceId, status: i64) -> Result<(), ConsoleError> {
        self.record(|c| c.change_status += 1)?;
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        if row.set_persisted_status(status) {
            Ok(())
        } else {
            Err(ConsoleError::Repository(format!(
                "Status {status} is not valid for a {}",
                T::FAMILY.noun()
            )))
        }
    }
}
