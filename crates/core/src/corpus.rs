//! Question corpus: loading, validation and lookup.
//!
//! The corpus provider supplies raw JSON of shape
//! `category -> subcategory -> exam number -> [question records]`. Records
//! that violate the question invariants (missing correct option, gapped
//! options) and exams that end up empty are filtered out here, so a single
//! bad record can never abort an otherwise-valid exam mid-session.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{Question, QuestionError, QuestionId, Scope};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CorpusError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Raw question record as delivered by the corpus provider. `optionC` and
/// `optionD` are absent (or empty) for two-option questions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: u64,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
    pub correct_option: u8,
}

fn non_empty(option: Option<String>) -> Option<String> {
    option.filter(|text| !text.trim().is_empty())
}

impl RawQuestion {
    /// Validate the raw record into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for records the loader must filter out:
    /// an option gap (D without C) or a correct index that does not
    /// reference a present option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let option_c = non_empty(self.option_c);
        let option_d = non_empty(self.option_d);
        if option_d.is_some() && option_c.is_none() {
            return Err(QuestionError::GappedOptions);
        }

        let mut options = vec![self.option_a, self.option_b];
        options.extend(option_c);
        options.extend(option_d);

        Question::new(QuestionId::new(self.id), self.prompt, options, self.correct_option)
    }
}

/// Outcome of a corpus load: how many questions survived validation and how
/// many records were filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorpusReport {
    pub loaded: usize,
    pub skipped: usize,
}

type RawCorpus = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<RawQuestion>>>>;

/// Validated question corpus: `scope -> exam number -> questions`, with exam
/// numbers kept in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    exams: BTreeMap<Scope, BTreeMap<u32, Vec<Question>>>,
}

impl Corpus {
    /// Parse and validate a corpus from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Json` when the document is not the expected
    /// shape. Individual malformed question records are filtered, not fatal.
    pub fn from_json_str(json: &str) -> Result<(Self, CorpusReport), CorpusError> {
        let raw: RawCorpus = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Build a corpus from pre-parsed raw records, filtering invalid ones.
    ///
    /// Exam identifiers that are not literal numbers are skipped wholesale:
    /// synthetic selectors (`random`, `saved`, ...) are never authored content.
    #[must_use]
    pub fn from_raw(raw: RawCorpus) -> (Self, CorpusReport) {
        let mut corpus = Corpus::default();
        let mut report = CorpusReport::default();

        for (category, subcategories) in raw {
            for (subcategory, exams) in subcategories {
                let scope = Scope::new(category.clone(), subcategory);
                for (exam_id, records) in exams {
                    let Ok(number) = exam_id.parse::<u32>() else {
                        report.skipped += records.len();
                        continue;
                    };
                    let mut questions = Vec::with_capacity(records.len());
                    for record in records {
                        match record.validate() {
                            Ok(question) => questions.push(question),
                            Err(_) => report.skipped += 1,
                        }
                    }
                    if questions.is_empty() {
                        continue;
                    }
                    report.loaded += questions.len();
                    corpus
                        .exams
                        .entry(scope.clone())
                        .or_default()
                        .insert(number, questions);
                }
            }
        }

        (corpus, report)
    }

    /// Insert an already-validated exam, replacing any previous content for
    /// that number. Empty exams are ignored.
    pub fn insert_exam(&mut self, scope: Scope, number: u32, questions: Vec<Question>) {
        if questions.is_empty() {
            return;
        }
        self.exams.entry(scope).or_default().insert(number, questions);
    }

    #[must_use]
    pub fn contains_scope(&self, scope: &Scope) -> bool {
        self.exams.contains_key(scope)
    }

    /// The questions of an authored exam, in authored order.
    #[must_use]
    pub fn exam(&self, scope: &Scope, number: u32) -> Option<&[Question]> {
        self.exams
            .get(scope)
            .and_then(|exams| exams.get(&number))
            .map(Vec::as_slice)
    }

    /// All exams in a scope, ascending by exam number.
    pub fn exams_in<'a>(
        &'a self,
        scope: &Scope,
    ) -> impl Iterator<Item = (u32, &'a [Question])> + 'a {
        self.exams
            .get(scope)
            .into_iter()
            .flat_map(|exams| exams.iter().map(|(number, qs)| (*number, qs.as_slice())))
    }

    /// Total question count across all exams of a scope.
    #[must_use]
    pub fn question_count(&self, scope: &Scope) -> usize {
        self.exams_in(scope).map(|(_, qs)| qs.len()).sum()
    }

    /// Look a question up by id anywhere in the scope.
    #[must_use]
    pub fn find_question(&self, scope: &Scope, id: QuestionId) -> Option<&Question> {
        self.exams_in(scope)
            .flat_map(|(_, qs)| qs.iter())
            .find(|q| q.id() == id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    {
        "private": {
            "b": {
                "1": [
                    {"id": 1, "prompt": "Q1", "optionA": "A", "optionB": "B",
                     "optionC": "C", "optionD": "D", "correctOption": 3},
                    {"id": 2, "prompt": "Q2", "optionA": "Yes", "optionB": "No",
                     "correctOption": 2}
                ],
                "2": [
                    {"id": 3, "prompt": "Q3", "optionA": "A", "optionB": "B",
                     "correctOption": 1}
                ]
            }
        }
    }
    "#;

    #[test]
    fn loads_nested_corpus() {
        let (corpus, report) = Corpus::from_json_str(SAMPLE).unwrap();
        let scope = Scope::new("private", "b");

        assert_eq!(report.loaded, 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(corpus.exam(&scope, 1).unwrap().len(), 2);
        assert_eq!(corpus.exam(&scope, 2).unwrap().len(), 1);
        assert_eq!(corpus.question_count(&scope), 3);
    }

    #[test]
    fn infers_two_vs_four_options() {
        let (corpus, _) = Corpus::from_json_str(SAMPLE).unwrap();
        let scope = Scope::new("private", "b");
        let exam = corpus.exam(&scope, 1).unwrap();
        assert_eq!(exam[0].option_count(), 4);
        assert_eq!(exam[1].option_count(), 2);
    }

    #[test]
    fn filters_question_with_correct_out_of_range() {
        let json = r#"
        {"private": {"b": {"1": [
            {"id": 1, "prompt": "ok", "optionA": "A", "optionB": "B", "correctOption": 1},
            {"id": 2, "prompt": "bad", "optionA": "A", "optionB": "B", "correctOption": 4}
        ]}}}
        "#;
        let (corpus, report) = Corpus::from_json_str(json).unwrap();
        let scope = Scope::new("private", "b");
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(corpus.exam(&scope, 1).unwrap().len(), 1);
    }

    #[test]
    fn empty_string_options_count_as_absent() {
        let json = r#"
        {"private": {"b": {"1": [
            {"id": 1, "prompt": "two", "optionA": "A", "optionB": "B",
             "optionC": "", "optionD": "", "correctOption": 3}
        ]}}}
        "#;
        // correctOption 3 points past the two real options: filtered.
        let (corpus, report) = Corpus::from_json_str(json).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(!corpus.contains_scope(&Scope::new("private", "b")));
    }

    #[test]
    fn gapped_options_are_filtered() {
        let json = r#"
        {"private": {"b": {"1": [
            {"id": 1, "prompt": "gap", "optionA": "A", "optionB": "B",
             "optionD": "D", "correctOption": 1}
        ]}}}
        "#;
        let (_, report) = Corpus::from_json_str(json).unwrap();
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn exam_dropped_when_all_questions_invalid() {
        let json = r#"
        {"private": {"b": {"9": [
            {"id": 1, "prompt": "bad", "optionA": "A", "optionB": "B", "correctOption": 0}
        ]}}}
        "#;
        let (corpus, _) = Corpus::from_json_str(json).unwrap();
        let scope = Scope::new("private", "b");
        assert!(corpus.exam(&scope, 9).is_none());
    }

    #[test]
    fn non_numeric_exam_identifiers_are_skipped() {
        let json = r#"
        {"private": {"b": {"random": [
            {"id": 1, "prompt": "q", "optionA": "A", "optionB": "B", "correctOption": 1}
        ]}}}
        "#;
        let (corpus, report) = Corpus::from_json_str(json).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(!corpus.contains_scope(&Scope::new("private", "b")));
    }

    #[test]
    fn exams_iterate_in_ascending_number_order() {
        let mut corpus = Corpus::default();
        let scope = Scope::new("private", "b");
        let q = |id: u64| {
            Question::new(QuestionId::new(id), "Q", vec!["A".into(), "B".into()], 1).unwrap()
        };
        corpus.insert_exam(scope.clone(), 10, vec![q(1)]);
        corpus.insert_exam(scope.clone(), 2, vec![q(2)]);
        corpus.insert_exam(scope.clone(), 7, vec![q(3)]);

        let numbers: Vec<u32> = corpus.exams_in(&scope).map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 7, 10]);
    }

    #[test]
    fn find_question_scans_all_exams() {
        let (corpus, _) = Corpus::from_json_str(SAMPLE).unwrap();
        let scope = Scope::new("private", "b");
        assert!(corpus.find_question(&scope, QuestionId::new(3)).is_some());
        assert!(corpus.find_question(&scope, QuestionId::new(99)).is_none());
    }
}
