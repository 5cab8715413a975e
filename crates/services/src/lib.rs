#![forbid(unsafe_code)]

pub mod auth;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use auth::TrainingAccess;
pub use error::{BuildError, SessionError};

pub use sessions::{
    AnswerOutcome, QuizSession, RANDOM_SET_SIZE, SessionLoopService, SessionProgress,
    WorkingSetBuilder,
};
