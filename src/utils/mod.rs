//! Shared utilities

pub mod error;
pub mod validation;

pub use error::{AppError, AppResult};
pub use validation::{validate_audit_log_params, InvalidParameter};
