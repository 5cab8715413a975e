use thiserror::Error;

use crate::corpus::CorpusError;
use crate::model::QuestionError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}
