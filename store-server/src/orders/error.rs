use crate::common::AppError;
use crate::db::repository::RepoError;
use thiserror::Error;

/// Lifecycle errors
///
/// The service and policy never suppress these; the HTTP surface owns
/// the translation to wire status codes (via [`AppError`]).
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => OrderError::NotFound(msg),
            RepoError::Database(msg) => OrderError::Store(msg),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(msg) => AppError::NotFound(msg),
            OrderError::Forbidden(msg) => AppError::Forbidden(msg),
            OrderError::InvalidTransition(msg) => AppError::InvalidTransition(msg),
            OrderError::InvalidInput(msg) => AppError::Validation(msg),
            OrderError::Store(msg) => AppError::Database(msg),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
