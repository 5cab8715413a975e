use rand::Rng;
use rand::seq::SliceRandom;

use chrono::{DateTime, Utc};
use quiz_core::Corpus;
use quiz_core::model::{ExamKey, ExamSelector, Question, Scope, WorkingQuestion};

use crate::auth::TrainingAccess;
use crate::error::BuildError;

/// Size cap of a `random` working set.
pub const RANDOM_SET_SIZE: usize = 30;

/// Pre-fetched bookmark / wrong-answer history, inputs to the `saved` and
/// `wrong` modes. Working sets keep the collaborator's order.
#[derive(Debug, Clone, Default)]
pub struct HistorySets {
    pub saved: Vec<Question>,
    pub wrong: Vec<Question>,
}

/// Builds the ordered working set for a new session.
///
/// Pure: a function of the corpus, the selector, the pre-fetched history and
/// the injected rng. The one policy it enforces beyond selection is the
/// training gate: `build` refuses to construct any working set for the
/// `training` category while the gate is closed.
pub struct WorkingSetBuilder<'a> {
    corpus: &'a Corpus,
    scope: Scope,
    access: TrainingAccess,
}

impl<'a> WorkingSetBuilder<'a> {
    #[must_use]
    pub fn new(corpus: &'a Corpus, scope: Scope) -> Self {
        Self {
            corpus,
            scope,
            access: TrainingAccess::denied(),
        }
    }

    /// Inject the training-access state. Without this the builder fails
    /// closed for the `training` category.
    #[must_use]
    pub fn with_access(mut self, access: TrainingAccess) -> Self {
        self.access = access;
        self
    }

    fn not_found(&self, selector: ExamSelector) -> BuildError {
        BuildError::NotFound(ExamKey::new(self.scope.clone(), selector))
    }

    fn ensure_access(&self, now: DateTime<Utc>) -> Result<(), BuildError> {
        if self.scope.category.is_training() && !self.access.is_open(now) {
            return Err(BuildError::AuthRequired);
        }
        Ok(())
    }

    /// Gated entry point: dispatch on the selector.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::AuthRequired` when the training gate is closed,
    /// or `BuildError::NotFound` per the individual modes.
    pub fn build<R: Rng + ?Sized>(
        &self,
        selector: ExamSelector,
        history: &HistorySets,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<WorkingQuestion>, BuildError> {
        self.ensure_access(now)?;
        match selector {
            ExamSelector::Number(number) => self.literal(number),
            ExamSelector::Comprehensive => self.comprehensive(),
            ExamSelector::Random => self.random(rng),
            ExamSelector::Saved => Ok(Self::from_history(&history.saved)),
            ExamSelector::Wrong => Ok(Self::from_history(&history.wrong)),
        }
    }

    /// The authored exam, verbatim and in authored order.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NotFound` when the exam number is absent from
    /// the scope. (Empty authored exams are dropped at corpus load, so an
    /// existing exam is never empty.)
    pub fn literal(&self, number: u32) -> Result<Vec<WorkingQuestion>, BuildError> {
        let questions = self
            .corpus
            .exam(&self.scope, number)
            .ok_or_else(|| self.not_found(ExamSelector::Number(number)))?;
        Ok(questions
            .iter()
            .cloned()
            .map(WorkingQuestion::untagged)
            .collect())
    }

    /// Every exam in the scope concatenated ascending by exam number, each
    /// question tagged with its originating exam and 1-based position. No
    /// shuffling, no deduplication, no cap.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NotFound` when the scope has no exams at all.
    pub fn comprehensive(&self) -> Result<Vec<WorkingQuestion>, BuildError> {
        let mut set = Vec::with_capacity(self.corpus.question_count(&self.scope));
        for (number, questions) in self.corpus.exams_in(&self.scope) {
            for (index, question) in questions.iter().enumerate() {
                let position = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
                set.push(WorkingQuestion::tagged(question.clone(), number, position));
            }
        }
        if set.is_empty() {
            return Err(self.not_found(ExamSelector::Comprehensive));
        }
        Ok(set)
    }

    /// An unbiased Fisher-Yates shuffle over the comprehensive concatenation,
    /// truncated to [`RANDOM_SET_SIZE`] (or the whole scope when smaller).
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NotFound` when the scope has no exams at all.
    pub fn random<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<WorkingQuestion>, BuildError> {
        let mut set = self.comprehensive()?;
        set.shuffle(rng);
        set.truncate(RANDOM_SET_SIZE);
        Ok(set)
    }

    /// Working set from collaborator-supplied history, in collaborator
    /// order. Empty history is a valid empty working set.
    #[must_use]
    pub fn from_history(questions: &[Question]) -> Vec<WorkingQuestion> {
        questions
            .iter()
            .cloned()
            .map(WorkingQuestion::untagged)
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
