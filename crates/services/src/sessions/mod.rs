//! Quiz-session engine: working-set planning, in-memory session state,
//! resumability gates and the storage-backed session loop.

mod history;
mod plan;
mod progress;
mod queries;
mod service;
mod workflow;

pub use history::rebuild_wrong_set;
pub use plan::{HistorySets, RANDOM_SET_SIZE, WorkingSetBuilder};
pub use progress::{
    STALENESS_THRESHOLD_SECS, SessionProgress, is_progress_recent, is_progress_valid,
    staleness_threshold,
};
pub use service::QuizSession;
pub use workflow::{AnswerOutcome, SessionLoopService};
