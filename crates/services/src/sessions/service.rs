use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use quiz_core::model::{
    AnswerRecord, QuestionId, SessionSummary, Snapshot, WorkingQuestion,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory run of one working set.
///
/// The cursor ranges over `[0, len]`; `len` is the past-the-end position a
/// session sits at after answering the last question. Grading never moves the
/// cursor: navigation is a separate caller-driven action, so re-answering the
/// current question before navigating overwrites the prior answer.
///
/// Single-writer by design: one UI surface mutates a session at a time, so
/// there is no internal locking.
pub struct QuizSession {
    working_set: Vec<WorkingQuestion>,
    cursor: usize,
    answers: BTreeMap<QuestionId, AnswerRecord>,
    started_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
}

impl QuizSession {
    /// Start a fresh session over a working set. An empty working set is a
    /// valid (immediately exhausted) session; the saved/wrong modes produce
    /// those legitimately.
    #[must_use]
    pub fn new(working_set: Vec<WorkingQuestion>, started_at: DateTime<Utc>) -> Self {
        Self {
            working_set,
            cursor: 0,
            answers: BTreeMap::new(),
            started_at,
            last_updated_at: started_at,
        }
    }

    /// Rehydrate a session from a persisted snapshot that already passed the
    /// validity and staleness gates.
    #[must_use]
    pub fn resume(snapshot: Snapshot) -> Self {
        let cursor = snapshot.cursor.min(snapshot.working_set.len());
        Self {
            working_set: snapshot.working_set,
            cursor,
            answers: snapshot.answers,
            started_at: snapshot.started_at,
            last_updated_at: snapshot.last_updated_at,
        }
    }

    /// Serialize the current progress for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            working_set: self.working_set.clone(),
            cursor: self.cursor,
            answers: self.answers.clone(),
            started_at: self.started_at,
            last_updated_at: self.last_updated_at,
        }
    }

    #[must_use]
    pub fn working_set(&self) -> &[WorkingQuestion] {
        &self.working_set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.working_set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }

    /// The question under the cursor, or `None` at the past-the-end position.
    #[must_use]
    pub fn current(&self) -> Option<&WorkingQuestion> {
        self.working_set.get(self.cursor)
    }

    /// The recorded answer for a question, if any.
    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<AnswerRecord> {
        self.answers.get(&id).copied()
    }

    /// True once the cursor sits past the last question.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.working_set.len()
    }

    /// Record and grade a 1-based selection for the current question.
    ///
    /// Last-write-wins per question id; the cursor stays put.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSelection` when there is no current
    /// question or `selected` does not reference one of its options.
    pub fn submit_answer(
        &mut self,
        selected: u8,
        now: DateTime<Utc>,
    ) -> Result<AnswerRecord, SessionError> {
        let Some(current) = self.current() else {
            return Err(SessionError::InvalidSelection { selected });
        };
        if !current.question.accepts(selected) {
            return Err(SessionError::InvalidSelection { selected });
        }

        let record = AnswerRecord {
            selected,
            correct: current.question.is_correct(selected),
        };
        self.answers.insert(current.id(), record);
        self.last_updated_at = now;
        Ok(record)
    }

    /// Move the cursor forward by one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Boundary` at the past-the-end position;
    /// non-fatal, callers ignore it.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.cursor >= self.working_set.len() {
            return Err(SessionError::Boundary);
        }
        self.cursor += 1;
        self.last_updated_at = now;
        Ok(())
    }

    /// Move the cursor back by one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Boundary` at position zero; non-fatal,
    /// callers ignore it.
    pub fn retreat(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.cursor == 0 {
            return Err(SessionError::Boundary);
        }
        self.cursor -= 1;
        self.last_updated_at = now;
        Ok(())
    }

    /// Progress view over the current answers.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let correct = self.answers.values().filter(|a| a.correct).count();
        SessionProgress {
            total: self.working_set.len(),
            answered: self.answers.len(),
            correct,
            remaining: self.working_set.len().saturating_sub(self.answers.len()),
            is_complete: self.is_exhausted(),
        }
    }

    /// End-of-run summary; the denominator is the working-set length, so
    /// unanswered questions count against the final score.
    #[must_use]
    pub fn final_summary(&self, completed_at: DateTime<Utc>) -> SessionSummary {
        let correct = self.answers.values().filter(|a| a.correct).count();
        SessionSummary {
            total: self.working_set.len(),
            answered: self.answers.len(),
            correct,
            started_at: self.started_at,
            completed_at,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("working_set_len", &self.working_set.len())
            .field("cursor", &self.cursor)
            .field("answers_len", &self.answers.len())
            .field("started_at", &self.started_at)
            .field("last_updated_at", &self.last_updated_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::sessions::plan::WorkingSetBuilder;
    use chrono::Duration;
    use quiz_core::Corpus;
    use quiz_core::model::{Question, Scope};
    use quiz_core::time::fixed_now;

    fn two_option_question(id: u64, correct: u8) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["Yes".into(), "No".into()],
            correct,
        )
        .unwrap()
    }

    fn four_option_question(id: u64, correct: u8) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct,
        )
        .unwrap()
    }

    fn session(questions: Vec<Question>) -> QuizSession {
        QuizSession::new(
            questions.into_iter().map(WorkingQuestion::untagged).collect(),
            fixed_now(),
        )
    }

    #[test]
    fn submit_grades_without_advancing() {
        let mut session = session(vec![two_option_question(1, 2), two_option_question(2, 1)]);

        let record = session.submit_answer(2, fixed_now()).unwrap();
        assert!(record.correct);
        assert_eq!(session.cursor(), 0);
        assert_eq!(
            session.answer_for(QuestionId::new(1)),
            Some(AnswerRecord {
                selected: 2,
                correct: true
            })
        );
    }

    #[test]
    fn resubmit_overwrites_prior_grading() {
        let mut session = session(vec![two_option_question(1, 2)]);

        session.submit_answer(1, fixed_now()).unwrap();
        assert!(!session.answer_for(QuestionId::new(1)).unwrap().correct);

        session.submit_answer(2, fixed_now()).unwrap();
        let record = session.answer_for(QuestionId::new(1)).unwrap();
        assert!(record.correct);
        assert_eq!(record.selected, 2);
        assert_eq!(session.progress().answered, 1);
    }

    #[test]
    fn invalid_selection_is_rejected() {
        let mut session = session(vec![two_option_question(1, 1)]);

        assert!(matches!(
            session.submit_answer(3, fixed_now()).unwrap_err(),
            SessionError::InvalidSelection { selected: 3 }
        ));
        assert!(matches!(
            session.submit_answer(0, fixed_now()).unwrap_err(),
            SessionError::InvalidSelection { selected: 0 }
        ));
    }

    #[test]
    fn submit_past_the_end_is_rejected() {
        let mut session = session(vec![two_option_question(1, 1)]);
        session.advance(fixed_now()).unwrap();
        assert!(session.is_exhausted());
        assert!(matches!(
            session.submit_answer(1, fixed_now()).unwrap_err(),
            SessionError::InvalidSelection { .. }
        ));
    }

    #[test]
    fn navigation_clamps_at_bounds() {
        let mut session = session(vec![two_option_question(1, 1), two_option_question(2, 1)]);

        assert!(matches!(
            session.retreat(fixed_now()).unwrap_err(),
            SessionError::Boundary
        ));

        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        assert_eq!(session.cursor(), 2);
        assert!(matches!(
            session.advance(fixed_now()).unwrap_err(),
            SessionError::Boundary
        ));

        session.retreat(fixed_now()).unwrap();
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn running_score_ignores_unanswered_final_score_does_not() {
        let mut session = session(vec![
            two_option_question(1, 1),
            two_option_question(2, 1),
            two_option_question(3, 1),
            two_option_question(4, 1),
        ]);

        session.submit_answer(1, fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        session.submit_answer(2, fixed_now()).unwrap();

        let progress = session.progress();
        assert_eq!(progress.answered, 2);
        assert!((progress.running_score().unwrap() - 0.5).abs() < f64::EPSILON);

        let summary = session.final_summary(fixed_now());
        assert_eq!(summary.total, 4);
        assert!((summary.score() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_roundtrip_preserves_answers_and_cursor() {
        let mut session = session(vec![
            two_option_question(1, 2),
            four_option_question(2, 3),
            four_option_question(3, 1),
        ]);

        session.submit_answer(2, fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        session.submit_answer(4, fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        session.submit_answer(1, fixed_now()).unwrap();

        let snapshot = session.snapshot();
        let restored = QuizSession::resume(snapshot.clone());

        assert_eq!(restored.cursor(), session.cursor());
        assert_eq!(restored.snapshot().answers, snapshot.answers);
        assert_eq!(restored.progress(), session.progress());
    }

    #[test]
    fn resume_clamps_cursor_to_working_set() {
        let mut snapshot = session(vec![two_option_question(1, 1)]).snapshot();
        snapshot.cursor = 40;
        let restored = QuizSession::resume(snapshot);
        assert_eq!(restored.cursor(), 1);
    }

    #[test]
    fn mutation_updates_last_updated_at() {
        let mut session = session(vec![two_option_question(1, 1)]);
        let later = fixed_now() + Duration::minutes(5);
        session.submit_answer(1, later).unwrap();
        assert_eq!(session.last_updated_at(), later);
    }

    // Exam 3 mixes a 2-option and a 4-option question; one correct and one
    // incorrect answer score 1/2.
    #[test]
    fn mixed_width_exam_scores_one_half() {
        let mut corpus = Corpus::default();
        let scope = Scope::new("private", "b");
        corpus.insert_exam(
            scope.clone(),
            3,
            vec![two_option_question(1, 2), four_option_question(2, 3)],
        );

        let builder = WorkingSetBuilder::new(&corpus, scope);
        let set = builder.literal(3).unwrap();
        let ids: Vec<u64> = set.iter().map(|wq| wq.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);

        let mut session = QuizSession::new(set, fixed_now());
        assert!(session.submit_answer(2, fixed_now()).unwrap().correct);
        session.advance(fixed_now()).unwrap();
        assert!(!session.submit_answer(1, fixed_now()).unwrap().correct);
        session.advance(fixed_now()).unwrap();

        let summary = session.final_summary(fixed_now());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.correct, 1);
        assert!((summary.score() - 0.5).abs() < f64::EPSILON);
    }
}
