use crate::llm::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
