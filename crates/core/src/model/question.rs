use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("option D present without option C")]
    GappedOptions,

    #[error("correct option {correct} out of range for {options} options")]
    CorrectOutOfRange { correct: u8, options: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One validated quiz item: a prompt with 2 or 4 ordered answer choices and a
/// 1-based correct index guaranteed to reference one of them.
///
/// Prompt and option text may carry `[[identifier]]` icon tokens; the engine
/// never rewrites the text, so the tokens survive any reordering byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct: u8,
}

impl Question {
    /// Validate and build a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is empty, fewer than two
    /// options are present, or `correct` does not reference an option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: u8,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions(options.len()));
        }
        if correct == 0 || usize::from(correct) > options.len() {
            return Err(QuestionError::CorrectOutOfRange {
                correct,
                options: options.len(),
            });
        }
        Ok(Self {
            id,
            prompt,
            options,
            correct,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Number of answer choices (2 or 4 for authored content).
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// The 1-based index of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> u8 {
        self.correct
    }

    /// True when `selected` is a valid 1-based choice for this question.
    #[must_use]
    pub fn accepts(&self, selected: u8) -> bool {
        selected >= 1 && usize::from(selected) <= self.options.len()
    }

    /// Grade a 1-based selection.
    #[must_use]
    pub fn is_correct(&self, selected: u8) -> bool {
        selected == self.correct
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn builds_two_option_question() {
        let q = Question::new(QuestionId::new(1), "Allowed?", opts(&["Yes", "No"]), 2).unwrap();
        assert_eq!(q.option_count(), 2);
        assert!(q.is_correct(2));
        assert!(!q.is_correct(1));
    }

    #[test]
    fn rejects_correct_out_of_range() {
        let err = Question::new(QuestionId::new(1), "Q", opts(&["A", "B"]), 3).unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectOutOfRange {
                correct: 3,
                options: 2
            }
        );
        let err = Question::new(QuestionId::new(1), "Q", opts(&["A", "B"]), 0).unwrap_err();
        assert!(matches!(err, QuestionError::CorrectOutOfRange { .. }));
    }

    #[test]
    fn rejects_too_few_options() {
        let err = Question::new(QuestionId::new(1), "Q", opts(&["A"]), 1).unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions(1));
    }

    #[test]
    fn rejects_empty_prompt() {
        let err = Question::new(QuestionId::new(1), "  ", opts(&["A", "B"]), 1).unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn accepts_checks_option_bounds() {
        let q = Question::new(QuestionId::new(1), "Q", opts(&["A", "B"]), 1).unwrap();
        assert!(q.accepts(1));
        assert!(q.accepts(2));
        assert!(!q.accepts(0));
        assert!(!q.accepts(3));
    }
}
