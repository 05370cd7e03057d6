//! Authenticated request pipeline: credential injection, envelope unwrapping
//! and the normalized error taxonomy.

mod client;
mod envelope;
mod error;

pub use client::{ApiClient, USER_ID_HEADER};
pub use envelope::ApiEnvelope;
pub use error::{ApiError, ErrorKind};

/// Result type of pipeline calls.
pub type ApiResult<T> = Result<T, ApiError>;
