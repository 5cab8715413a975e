use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Question within its (category, subcategory) scope.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(u64);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing an identifier or selector from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(QuestionId::new)
            .map_err(|_| ParseIdError {
                kind: "QuestionId".to_string(),
            })
    }
}

/// Top-level license category of an exam corpus (e.g. `private`, `truck`, `training`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `training` corpus is access-gated; everything else is open.
    #[must_use]
    pub fn is_training(&self) -> bool {
        self.0 == "training"
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({})", self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Second-level grouping under a category (e.g. a license class).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subcategory(String);

impl Subcategory {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subcategory({})", self.0)
    }
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (category, subcategory) pair: the unit at which exams, bookmarks and
/// wrong-answer history are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    pub category: Category,
    pub subcategory: Subcategory,
}

impl Scope {
    #[must_use]
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: Category::new(category),
            subcategory: Subcategory::new(subcategory),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.subcategory)
    }
}

//
// ─── EXAM SELECTORS ────────────────────────────────────────────────────────────
//

/// Identifies which working set an exam route refers to: a literal authored
/// exam number, or one of the synthetic selectors denoting a generated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExamSelector {
    /// A literal authored exam.
    Number(u32),
    /// Thirty questions drawn uniformly from every exam in the scope.
    Random,
    /// Every exam in the scope, concatenated in ascending order.
    Comprehensive,
    /// The user's bookmarked questions.
    Saved,
    /// The user's previously-missed questions.
    Wrong,
}

impl ExamSelector {
    /// True for selectors whose working set is derived rather than authored,
    /// so its length varies between constructions.
    #[must_use]
    pub fn is_derived_length(&self) -> bool {
        matches!(self, ExamSelector::Random | ExamSelector::Comprehensive)
    }
}

impl fmt::Display for ExamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamSelector::Number(n) => write!(f, "{n}"),
            ExamSelector::Random => write!(f, "random"),
            ExamSelector::Comprehensive => write!(f, "comprehensive"),
            ExamSelector::Saved => write!(f, "saved"),
            ExamSelector::Wrong => write!(f, "wrong"),
        }
    }
}

impl FromStr for ExamSelector {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(ExamSelector::Random),
            "comprehensive" => Ok(ExamSelector::Comprehensive),
            "saved" => Ok(ExamSelector::Saved),
            "wrong" => Ok(ExamSelector::Wrong),
            other => other
                .parse::<u32>()
                .map(ExamSelector::Number)
                .map_err(|_| ParseIdError {
                    kind: "ExamSelector".to_string(),
                }),
        }
    }
}

/// Composite key a session is stored and resumed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExamKey {
    pub category: Category,
    pub subcategory: Subcategory,
    pub selector: ExamSelector,
}

impl ExamKey {
    #[must_use]
    pub fn new(scope: Scope, selector: ExamSelector) -> Self {
        Self {
            category: scope.category,
            subcategory: scope.subcategory,
            selector,
        }
    }

    /// The (category, subcategory) scope this key lives in.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope {
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
        }
    }
}

impl fmt::Display for ExamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.subcategory, self.selector)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
