use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("tokenizer init failed: {0}")]
    Tokenizer(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
