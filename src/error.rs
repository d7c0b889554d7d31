//! Application error type shared by the API layer and the upload pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

// Transport failures stay as Http; a response the server did send with a
// non-success status surfaces as Api.
impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_status() {
            AppError::Api(e.to_string())
        } else {
            AppError::Http(e)
        }
    }
}
