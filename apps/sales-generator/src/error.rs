use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("unknown product: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
