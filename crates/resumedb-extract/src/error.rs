use std::fmt;
use thiserror::Error;

use crate::strategy::Strategy;

/// One failed strategy and the reason it gave.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub strategy: Strategy,
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy.name(), self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text from {path} ({} strategies failed)", .attempts.len())]
    Exhausted { path: String, attempts: Vec<Attempt> },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
