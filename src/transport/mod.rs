//! # Transport Providers Module
//!
//! This module contains the transport implementations shipped with the
//! crate.

#[cfg(feature = "reqwest")]
pub use self::reqwest::TransportReqwest;
#[cfg(feature = "reqwest")]
pub mod reqwest;
