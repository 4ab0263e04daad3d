//! Convenience result type alias for QueryPage.

use crate::error::AppError;

/// A specialized `Result` type for QueryPage operations.
pub type AppResult<T> = Result<T, AppError>;
