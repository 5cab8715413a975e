use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::Corpus;
use quiz_core::model::{ExamKey, QuestionId, SessionSummary};
use storage::repository::{HistoryRepository, SnapshotRepository};

use super::progress::SessionProgress;
use super::queries::SessionQueries;
use super::service::QuizSession;
use crate::auth::TrainingAccess;
use crate::error::{BuildError, SessionError};

/// Result of answering a single question in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub correct: bool,
    pub progress: SessionProgress,
}

/// Orchestrates session start/resume, answering, navigation and finishing,
/// with best-effort persistence.
///
/// Persistence is fire-and-forget from the engine's perspective: a failing
/// snapshot or history write is logged and swallowed, the run degrades to
/// in-memory-only, and neither answer submission nor navigation ever fails
/// because storage is unavailable.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    corpus: Arc<Corpus>,
    snapshots: Arc<dyn SnapshotRepository>,
    history: Arc<dyn HistoryRepository>,
    access: TrainingAccess,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        corpus: Arc<Corpus>,
        snapshots: Arc<dyn SnapshotRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            clock,
            corpus,
            snapshots,
            history,
            access: TrainingAccess::denied(),
        }
    }

    /// Inject training-access state for gated categories.
    #[must_use]
    pub fn with_access(mut self, access: TrainingAccess) -> Self {
        self.access = access;
        self
    }

    /// Resume the persisted session for `key` when it is still valid and
    /// recent; construct a fresh working set otherwise.
    ///
    /// # Errors
    ///
    /// Returns `BuildError` for an unknown exam, a closed training gate, or
    /// a history fetch failure for the saved/wrong modes.
    pub async fn start(&self, key: &ExamKey) -> Result<QuizSession, BuildError> {
        let now = self.clock.now();
        let history_sets =
            SessionQueries::history_inputs(key, self.history.as_ref()).await?;
        SessionQueries::start_or_resume_prepared(
            key,
            &self.corpus,
            self.snapshots.as_ref(),
            history_sets,
            self.access,
            now,
        )
        .await
    }

    async fn persist(&self, key: &ExamKey, session: &QuizSession) {
        if let Err(err) = self.snapshots.save(key, &session.snapshot()).await {
            log::warn!("could not save progress for {key}: {err}; continuing without saving");
        }
    }

    /// Grade the current question and persist the updated snapshot.
    ///
    /// Incorrect answers are also recorded to the wrong-answer history,
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSelection` from grading. Persistence
    /// failures are logged, never returned.
    pub async fn answer(
        &self,
        session: &mut QuizSession,
        key: &ExamKey,
        selected: u8,
    ) -> Result<AnswerOutcome, SessionError> {
        let now = self.clock.now();
        let question = session
            .current()
            .map(|wq| wq.question.clone())
            .ok_or(SessionError::InvalidSelection { selected })?;

        let record = session.submit_answer(selected, now)?;

        if !record.correct {
            if let Err(err) = self.history.record_wrong(&key.scope(), &question).await {
                log::warn!("could not record wrong answer for {key}: {err}");
            }
        }

        self.persist(key, session).await;

        Ok(AnswerOutcome {
            question_id: question.id(),
            correct: record.correct,
            progress: session.progress(),
        })
    }

    /// Advance the cursor, persisting the new position. Returns `false` at
    /// the past-the-end boundary (the boundary error is non-fatal and
    /// swallowed here).
    pub async fn go_next(&self, session: &mut QuizSession, key: &ExamKey) -> bool {
        if session.advance(self.clock.now()).is_err() {
            return false;
        }
        self.persist(key, session).await;
        true
    }

    /// Move the cursor back, persisting the new position. Returns `false`
    /// at position zero.
    pub async fn go_previous(&self, session: &mut QuizSession, key: &ExamKey) -> bool {
        if session.retreat(self.clock.now()).is_err() {
            return false;
        }
        self.persist(key, session).await;
        true
    }

    /// Bookmark the question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Boundary` when the cursor is past the end,
    /// or `SessionError::Storage` when the history write fails (bookmarks
    /// are user-visible state, not best-effort progress).
    pub async fn bookmark_current(
        &self,
        session: &QuizSession,
        key: &ExamKey,
    ) -> Result<(), SessionError> {
        let question = session
            .current()
            .map(|wq| wq.question.clone())
            .ok_or(SessionError::Boundary)?;
        self.history.add_saved(&key.scope(), &question).await?;
        Ok(())
    }

    /// Produce the end-of-run summary and clear the stored snapshot so the
    /// next visit starts fresh.
    pub async fn finish(&self, session: &QuizSession, key: &ExamKey) -> SessionSummary {
        let summary = session.final_summary(self.clock.now());
        if let Err(err) = self.snapshots.clear(key).await {
            log::warn!("could not clear finished session for {key}: {err}");
        }
        summary
    }
}
