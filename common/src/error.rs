//! Tipos de erro do motor

use thiserror::Error;

/// Erro comum do motor
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Export error: {0}")]
    Export(String),
}

/// Alias de Result
pub type Result<T> = std::result::Result<T, Error>;
