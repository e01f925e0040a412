use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Empty query for column '{column}'")]
    EmptyQuery { column: String },

    #[error("Both fields cannot be empty")]
    NoCriteria,

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Index out of bounds: {index} (len {len})")]
    Index { index: usize, len: usize },

    #[error("Invalid threshold: {0} (expected 0..=100)")]
    InvalidThreshold(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category without payload, carried by a failed match stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    ModelLoad,
    EmptyQuery,
    NoCriteria,
    Inference,
    Training,
    Index,
    InvalidThreshold,
    InvalidConfig,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Load(_) => ErrorKind::Load,
            Error::ModelLoad(_) => ErrorKind::ModelLoad,
            Error::EmptyQuery { .. } => ErrorKind::EmptyQuery,
            Error::NoCriteria => ErrorKind::NoCriteria,
            Error::Inference(_) => ErrorKind::Inference,
            Error::Training(_) => ErrorKind::Training,
            Error::Index { .. } => ErrorKind::Index,
            Error::InvalidThreshold(_) => ErrorKind::InvalidThreshold,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Per-request errors the caller can report and move on from.
    /// Everything else means startup or wiring is broken.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::EmptyQuery { .. } | Error::NoCriteria | Error::InvalidThreshold(_)
        )
    }
}
