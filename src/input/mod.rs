//! Run-level validation of the URLs handed to the packager.
//!
//! Validation is all-or-nothing: a single bad URL rejects the whole request
//! before any extraction or download starts.

mod error;
mod validate;

pub use error::{MAX_URL_LENGTH, ValidationError};
pub use validate::{validate_url, validate_urls};
