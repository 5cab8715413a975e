use chrono::{DateTime, Duration, Utc};

use quiz_core::model::Snapshot;

/// Seconds a snapshot may sit untouched before it stops being resumable.
pub const STALENESS_THRESHOLD_SECS: i64 = 24 * 60 * 60;

/// The staleness policy as a `Duration` (24 hours).
#[must_use]
pub fn staleness_threshold() -> Duration {
    Duration::seconds(STALENESS_THRESHOLD_SECS)
}

/// Structural gate for resuming a persisted snapshot. Fails closed: absent
/// snapshot, empty working set, or (unless `allow_partial`) a working-set
/// length different from `expected_len` all make the snapshot invalid.
///
/// `allow_partial` is used for derived-length selectors (random,
/// comprehensive) whose expected length is itself regenerated, not authored;
/// there any non-empty working set is structurally acceptable.
#[must_use]
pub fn is_progress_valid(
    snapshot: Option<&Snapshot>,
    expected_len: usize,
    allow_partial: bool,
) -> bool {
    let Some(snapshot) = snapshot else {
        return false;
    };
    if snapshot.is_empty() {
        return false;
    }
    allow_partial || snapshot.working_set.len() == expected_len
}

/// Staleness gate, boundary inclusive: a snapshot exactly `max_age` old is
/// still recent. Expired snapshots are treated as absent, not as errors.
#[must_use]
pub fn is_progress_recent(snapshot: &Snapshot, now: DateTime<Utc>, max_age: Duration) -> bool {
    snapshot.age(now) <= max_age
}

/// Aggregated view of session progress.
///
/// The running score divides by the number of answered questions;
/// unanswered questions only count against the final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// In-progress score; `None` until something has been answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn running_score(&self) -> Option<f64> {
        if self.answered == 0 {
            None
        } else {
            Some(self.correct as f64 / self.answered as f64)
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionId, WorkingQuestion};
    use quiz_core::time::fixed_now;
    use std::collections::BTreeMap;

    fn snapshot(len: usize, last_updated_at: DateTime<Utc>) -> Snapshot {
        let working_set = (0..len)
            .map(|i| {
                let id = u64::try_from(i).unwrap() + 1;
                WorkingQuestion::untagged(
                    Question::new(
                        QuestionId::new(id),
                        format!("Q{id}"),
                        vec!["A".into(), "B".into()],
                        1,
                    )
                    .unwrap(),
                )
            })
            .collect();
        Snapshot {
            working_set,
            cursor: 0,
            answers: BTreeMap::new(),
            started_at: last_updated_at,
            last_updated_at,
        }
    }

    #[test]
    fn absent_snapshot_is_invalid() {
        assert!(!is_progress_valid(None, 5, false));
        assert!(!is_progress_valid(None, 5, true));
    }

    #[test]
    fn empty_working_set_is_invalid_even_with_partial_match() {
        let snap = snapshot(0, fixed_now());
        assert!(!is_progress_valid(Some(&snap), 0, false));
        assert!(!is_progress_valid(Some(&snap), 0, true));
    }

    #[test]
    fn exact_length_required_without_partial_match() {
        let snap = snapshot(5, fixed_now());
        assert!(is_progress_valid(Some(&snap), 5, false));
        assert!(!is_progress_valid(Some(&snap), 4, false));
        assert!(!is_progress_valid(Some(&snap), 6, false));
    }

    #[test]
    fn partial_match_skips_length_comparison() {
        let snap = snapshot(5, fixed_now());
        assert!(is_progress_valid(Some(&snap), 30, true));
        assert!(is_progress_valid(Some(&snap), 0, true));
    }

    #[test]
    fn staleness_boundary_is_inclusive() {
        let now = fixed_now();
        let at_threshold = snapshot(3, now - staleness_threshold());
        assert!(is_progress_recent(&at_threshold, now, staleness_threshold()));

        let past_threshold = snapshot(
            3,
            now - staleness_threshold() - Duration::seconds(1),
        );
        assert!(!is_progress_recent(
            &past_threshold,
            now,
            staleness_threshold()
        ));
    }

    #[test]
    fn threshold_is_twenty_four_hours() {
        assert_eq!(staleness_threshold(), Duration::hours(24));
    }

    #[test]
    fn running_score_divides_by_answered() {
        let progress = SessionProgress {
            total: 10,
            answered: 4,
            correct: 3,
            remaining: 6,
            is_complete: false,
        };
        assert!((progress.running_score().unwrap() - 0.75).abs() < f64::EPSILON);

        let untouched = SessionProgress {
            total: 10,
            answered: 0,
            correct: 0,
            remaining: 10,
            is_complete: false,
        };
        assert!(untouched.running_score().is_none());
    }
}
