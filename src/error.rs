//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
