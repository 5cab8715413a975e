#![forbid(unsafe_code)]

pub mod corpus;
pub mod error;
pub mod markup;
pub mod model;
pub mod time;

pub use corpus::{Corpus, CorpusError, CorpusReport, RawQuestion};
pub use error::Error;
pub use time::Clock;
