//! Headers module
//!
//! This module provides a constants for HTTP headers.
//!

pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";
