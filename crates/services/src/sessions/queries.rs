use chrono::{DateTime, Utc};
use rand::Rng;

use quiz_core::Corpus;
use quiz_core::model::{ExamKey, ExamSelector, Snapshot, WorkingQuestion};
use storage::repository::{HistoryRepository, SnapshotRepository};

use super::plan::{HistorySets, WorkingSetBuilder};
use super::progress::{is_progress_recent, is_progress_valid, staleness_threshold};
use super::service::QuizSession;
use crate::auth::TrainingAccess;
use crate::error::BuildError;

/// Storage-backed session construction.
pub(crate) struct SessionQueries;

impl SessionQueries {
    /// Fetch the history inputs the key's selector needs; other selectors
    /// skip the round-trip entirely.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Storage` when the history fetch fails.
    pub async fn history_inputs(
        key: &ExamKey,
        history: &dyn HistoryRepository,
    ) -> Result<HistorySets, BuildError> {
        let scope = key.scope();
        let sets = match key.selector {
            ExamSelector::Saved => HistorySets {
                saved: history.saved_questions(&scope).await?,
                wrong: Vec::new(),
            },
            ExamSelector::Wrong => HistorySets {
                saved: Vec::new(),
                wrong: history.wrong_questions(&scope).await?,
            },
            _ => HistorySets::default(),
        };
        Ok(sets)
    }

    /// Build the fresh working set for a key from pre-fetched history.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NotFound` / `BuildError::AuthRequired` from
    /// working-set construction.
    pub fn build_fresh<R: Rng + ?Sized>(
        key: &ExamKey,
        corpus: &Corpus,
        history_sets: &HistorySets,
        access: TrainingAccess,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<WorkingQuestion>, BuildError> {
        WorkingSetBuilder::new(corpus, key.scope())
            .with_access(access)
            .build(key.selector, history_sets, now, rng)
    }

    fn resume_or_fresh(
        key: &ExamKey,
        fresh: Vec<WorkingQuestion>,
        stored: Option<Snapshot>,
        now: DateTime<Utc>,
    ) -> QuizSession {
        if let Some(snapshot) = stored {
            let allow_partial = key.selector.is_derived_length();
            if is_progress_valid(Some(&snapshot), fresh.len(), allow_partial)
                && is_progress_recent(&snapshot, now, staleness_threshold())
            {
                log::debug!("resuming session for {key}");
                return QuizSession::resume(snapshot);
            }
        }
        QuizSession::new(fresh, now)
    }

    /// Resume the stored snapshot for `key` when both gates pass; otherwise
    /// start over the freshly built working set. Uses the thread-local rng
    /// for the `random` selector.
    ///
    /// A failing snapshot load degrades to "start fresh" with a warning; a
    /// stale or mismatched snapshot is replaced on the next persistence
    /// write.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NotFound` / `BuildError::AuthRequired` from
    /// working-set construction.
    pub async fn start_or_resume_prepared(
        key: &ExamKey,
        corpus: &Corpus,
        snapshots: &dyn SnapshotRepository,
        history_sets: HistorySets,
        access: TrainingAccess,
        now: DateTime<Utc>,
    ) -> Result<QuizSession, BuildError> {
        // Scoped so the thread-local rng is dropped before the await.
        let fresh = {
            let mut rng = rand::rng();
            Self::build_fresh(key, corpus, &history_sets, access, now, &mut rng)?
        };

        let stored = match snapshots.load(key).await {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("failed to load snapshot for {key}: {err}; starting fresh");
                None
            }
        };

        Ok(Self::resume_or_fresh(key, fresh, stored, now))
    }

    /// Deterministic variant for tests and callers that inject a seeded rng.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_or_resume_prepared`], plus
    /// `BuildError::Storage` from the history fetch.
    pub async fn start_or_resume<R: Rng + ?Sized>(
        key: &ExamKey,
        corpus: &Corpus,
        snapshots: &dyn SnapshotRepository,
        history: &dyn HistoryRepository,
        access: TrainingAccess,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<QuizSession, BuildError> {
        let history_sets = Self::history_inputs(key, history).await?;
        let fresh = Self::build_fresh(key, corpus, &history_sets, access, now, rng)?;

        let stored = match snapshots.load(key).await {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("failed to load snapshot for {key}: {err}; starting fresh");
                None
            }
        };

        Ok(Self::resume_or_fresh(key, fresh, stored, now))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
