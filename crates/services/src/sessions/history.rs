use std::collections::BTreeSet;

use quiz_core::Corpus;
use quiz_core::model::{Question, Scope};
use storage::repository::{SnapshotRepository, StorageError};

/// Rebuild the wrong-answer set for a scope by scanning every persisted
/// snapshot's answers for incorrect entries and mapping the ids back to
/// corpus questions.
///
/// This is a materialized view: the history collaborator normally keeps it
/// incrementally, but it can always be reconstructed from session data.
/// First occurrence wins; ids no longer present in the corpus are dropped.
///
/// # Errors
///
/// Returns `StorageError` when the snapshot listing fails.
pub async fn rebuild_wrong_set(
    corpus: &Corpus,
    scope: &Scope,
    snapshots: &dyn SnapshotRepository,
) -> Result<Vec<Question>, StorageError> {
    let mut seen = BTreeSet::new();
    let mut wrong = Vec::new();

    for (_key, snapshot) in snapshots.list_for_scope(scope).await? {
        for (id, record) in &snapshot.answers {
            if !record.correct && seen.insert(*id) {
                if let Some(question) = corpus.find_question(scope, *id) {
                    wrong.push(question.clone());
                }
            }
        }
    }

    Ok(wrong)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{
        AnswerRecord, ExamKey, ExamSelector, QuestionId, Snapshot, WorkingQuestion,
    };
    use quiz_core::time::fixed_now;
    use std::collections::BTreeMap;
    use storage::repository::InMemoryRepository;

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["A".into(), "B".into()],
            1,
        )
        .unwrap()
    }

    fn snapshot_with_answers(entries: &[(u64, bool)]) -> Snapshot {
        let mut answers = BTreeMap::new();
        for (id, correct) in entries {
            answers.insert(
                QuestionId::new(*id),
                AnswerRecord {
                    selected: if *correct { 1 } else { 2 },
                    correct: *correct,
                },
            );
        }
        Snapshot {
            working_set: entries
                .iter()
                .map(|(id, _)| WorkingQuestion::untagged(question(*id)))
                .collect(),
            cursor: 0,
            answers,
            started_at: fixed_now(),
            last_updated_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn collects_incorrect_answers_across_sessions() {
        let repo = InMemoryRepository::new();
        let scope = Scope::new("private", "b");
        let mut corpus = Corpus::default();
        corpus.insert_exam(
            scope.clone(),
            1,
            vec![question(1), question(2), question(3)],
        );

        let literal = ExamKey::new(scope.clone(), ExamSelector::Number(1));
        let random = ExamKey::new(scope.clone(), ExamSelector::Random);
        repo.save(&literal, &snapshot_with_answers(&[(1, false), (2, true)]))
            .await
            .unwrap();
        repo.save(&random, &snapshot_with_answers(&[(1, false), (3, false)]))
            .await
            .unwrap();

        let wrong = rebuild_wrong_set(&corpus, &scope, &repo).await.unwrap();
        let ids: Vec<u64> = wrong.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn drops_ids_missing_from_corpus() {
        let repo = InMemoryRepository::new();
        let scope = Scope::new("private", "b");
        let mut corpus = Corpus::default();
        corpus.insert_exam(scope.clone(), 1, vec![question(1)]);

        let key = ExamKey::new(scope.clone(), ExamSelector::Number(1));
        repo.save(&key, &snapshot_with_answers(&[(1, false), (99, false)]))
            .await
            .unwrap();

        let wrong = rebuild_wrong_set(&corpus, &scope, &repo).await.unwrap();
        assert_eq!(wrong.len(), 1);
        assert_eq!(wrong[0].id(), QuestionId::new(1));
    }
}
