use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

//
// ─── WORKING SET ───────────────────────────────────────────────────────────────
//

/// Provenance of a question drawn into a generated working set: which authored
/// exam it came from and its 1-based position there, for later reference lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub exam_number: u32,
    pub position: u32,
}

/// One entry of a session's working set. `origin` is `None` when the set is
/// the authored exam itself (literal mode) or collaborator-supplied
/// (saved/wrong modes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingQuestion {
    pub question: Question,
    pub origin: Option<Origin>,
}

impl WorkingQuestion {
    #[must_use]
    pub fn untagged(question: Question) -> Self {
        Self {
            question,
            origin: None,
        }
    }

    #[must_use]
    pub fn tagged(question: Question, exam_number: u32, position: u32) -> Self {
        Self {
            question,
            origin: Some(Origin {
                exam_number,
                position,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id()
    }
}

//
// ─── ANSWERS & SNAPSHOT ────────────────────────────────────────────────────────
//

/// The graded record of one submitted answer. Re-submitting the same question
/// replaces this wholesale (last-write-wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 1-based option index the user selected.
    pub selected: u8,
    pub correct: bool,
}

/// The persisted serialization of a session's progress. This is the only
/// shape that crosses the persistence boundary; it round-trips losslessly
/// through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub working_set: Vec<WorkingQuestion>,
    pub cursor: usize,
    pub answers: BTreeMap<QuestionId, AnswerRecord>,
    pub started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }

    /// Time elapsed since the snapshot was last touched.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_updated_at
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Aggregate result of a finished run. Unlike the in-progress score, the
/// denominator here is the full working-set length: unanswered questions
/// count against the final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Final score in `[0, 1]`; zero for an empty working set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["A".into(), "B".into()],
            1,
        )
        .unwrap()
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let now = fixed_now();
        let mut answers = BTreeMap::new();
        answers.insert(
            QuestionId::new(1),
            AnswerRecord {
                selected: 2,
                correct: false,
            },
        );
        let snapshot = Snapshot {
            working_set: vec![
                WorkingQuestion::untagged(question(1)),
                WorkingQuestion::tagged(question(2), 4, 7),
            ],
            cursor: 1,
            answers,
            started_at: now,
            last_updated_at: now + Duration::minutes(5),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn snapshot_age_is_measured_from_last_update() {
        let now = fixed_now();
        let snapshot = Snapshot {
            working_set: vec![WorkingQuestion::untagged(question(1))],
            cursor: 0,
            answers: BTreeMap::new(),
            started_at: now - Duration::hours(2),
            last_updated_at: now - Duration::hours(1),
        };
        assert_eq!(snapshot.age(now), Duration::hours(1));
    }

    #[test]
    fn summary_score_uses_working_set_length() {
        let now = fixed_now();
        let summary = SessionSummary {
            total: 4,
            answered: 2,
            correct: 1,
            started_at: now,
            completed_at: now,
        };
        assert!((summary.score() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary_scores_zero() {
        let now = fixed_now();
        let summary = SessionSummary {
            total: 0,
            answered: 0,
            correct: 0,
            started_at: now,
            completed_at: now,
        };
        assert!((summary.score() - 0.0).abs() < f64::EPSILON);
    }
}
