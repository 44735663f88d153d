//! Utilities Module

pub mod error;
pub mod logger;
pub mod result;
pub mod upload;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
