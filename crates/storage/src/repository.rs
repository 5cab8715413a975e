use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::{ExamKey, Question, QuestionId, Scope, Snapshot};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for session snapshots, keyed by `ExamKey`.
///
/// The engine treats `save` as fire-and-forget: a failing adapter degrades
/// the run to in-memory-only, it never fails answer submission.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the stored snapshot for a key, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the adapter cannot be reached or the
    /// stored payload does not deserialize.
    async fn load(&self, key: &ExamKey) -> Result<Option<Snapshot>, StorageError>;

    /// Store or replace the snapshot for a key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, key: &ExamKey, snapshot: &Snapshot) -> Result<(), StorageError>;

    /// Remove the stored snapshot for a key. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the adapter cannot be reached.
    async fn clear(&self, key: &ExamKey) -> Result<(), StorageError>;

    /// All snapshots stored under a (category, subcategory) scope.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_for_scope(&self, scope: &Scope)
        -> Result<Vec<(ExamKey, Snapshot)>, StorageError>;
}

/// Persistence contract for per-scope bookmark and wrong-answer history.
///
/// Both lists keep collaborator order (insertion order); working sets built
/// from them are presented in exactly this order.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Bookmarked questions for a scope, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn saved_questions(&self, scope: &Scope) -> Result<Vec<Question>, StorageError>;

    /// Bookmark a question. Re-bookmarking an already-saved id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn add_saved(&self, scope: &Scope, question: &Question) -> Result<(), StorageError>;

    /// Remove a bookmark. Missing ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn remove_saved(&self, scope: &Scope, id: QuestionId) -> Result<(), StorageError>;

    /// Previously-missed questions for a scope, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn wrong_questions(&self, scope: &Scope) -> Result<Vec<Question>, StorageError>;

    /// Record a question answered incorrectly. Already-recorded ids keep
    /// their original position.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn record_wrong(&self, scope: &Scope, question: &Question) -> Result<(), StorageError>;

    /// Drop the wrong-answer history for a scope.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn clear_wrong(&self, scope: &Scope) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<ExamKey, Snapshot>>>,
    saved: Arc<Mutex<HashMap<Scope, Vec<Question>>>>,
    wrong: Arc<Mutex<HashMap<Scope, Vec<Question>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(err.to_string())
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load(&self, key: &ExamKey) -> Result<Option<Snapshot>, StorageError> {
        let guard = self.snapshots.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn save(&self, key: &ExamKey, snapshot: &Snapshot) -> Result<(), StorageError> {
        let mut guard = self.snapshots.lock().map_err(poisoned)?;
        guard.insert(key.clone(), snapshot.clone());
        Ok(())
    }

    async fn clear(&self, key: &ExamKey) -> Result<(), StorageError> {
        let mut guard = self.snapshots.lock().map_err(poisoned)?;
        guard.remove(key);
        Ok(())
    }

    async fn list_for_scope(
        &self,
        scope: &Scope,
    ) -> Result<Vec<(ExamKey, Snapshot)>, StorageError> {
        let guard = self.snapshots.lock().map_err(poisoned)?;
        let mut entries: Vec<(ExamKey, Snapshot)> = guard
            .iter()
            .filter(|(key, _)| key.scope() == *scope)
            .map(|(key, snapshot)| (key.clone(), snapshot.clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryRepository {
    async fn saved_questions(&self, scope: &Scope) -> Result<Vec<Question>, StorageError> {
        let guard = self.saved.lock().map_err(poisoned)?;
        Ok(guard.get(scope).cloned().unwrap_or_default())
    }

    async fn add_saved(&self, scope: &Scope, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.saved.lock().map_err(poisoned)?;
        let list = guard.entry(scope.clone()).or_default();
        if !list.iter().any(|q| q.id() == question.id()) {
            list.push(question.clone());
        }
        Ok(())
    }

    async fn remove_saved(&self, scope: &Scope, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self.saved.lock().map_err(poisoned)?;
        if let Some(list) = guard.get_mut(scope) {
            list.retain(|q| q.id() != id);
        }
        Ok(())
    }

    async fn wrong_questions(&self, scope: &Scope) -> Result<Vec<Question>, StorageError> {
        let guard = self.wrong.lock().map_err(poisoned)?;
        Ok(guard.get(scope).cloned().unwrap_or_default())
    }

    async fn record_wrong(&self, scope: &Scope, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.wrong.lock().map_err(poisoned)?;
        let list = guard.entry(scope.clone()).or_default();
        if !list.iter().any(|q| q.id() == question.id()) {
            list.push(question.clone());
        }
        Ok(())
    }

    async fn clear_wrong(&self, scope: &Scope) -> Result<(), StorageError> {
        let mut guard = self.wrong.lock().map_err(poisoned)?;
        guard.remove(scope);
        Ok(())
    }
}

/// Aggregates snapshot and history repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(repo.clone());
        let history: Arc<dyn HistoryRepository> = Arc::new(repo);
        Self { snapshots, history }
    }
}
