//! # Transport core
//!
//! Core types shared by every transport implementation.
//!
//! The `core` module contains the [`Transport`] traits, the request and
//! response types exchanged through them and the [`TransportError`] type. It
//! doesn't depend on any HTTP library, so it can be used to plug in a custom
//! transport.

pub use configuration::{
    TransportConfiguration, TransportConfigurationBuilder, DEFAULT_USER_AGENT,
};
pub mod configuration;

pub use error::TransportError;
pub mod error;

pub use transport::{blocking, Transport};
pub mod transport;

pub use transport_request::{TransportBody, TransportMethod, TransportRequest, DEFAULT_TIMEOUT};
pub mod transport_request;

pub use transport_response::TransportResponse;
pub mod transport_response;

pub(crate) mod utils;
