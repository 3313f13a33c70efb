//! # Transport configuration
//!
//! This module contains the [`TransportConfiguration`] struct which describes
//! how transport implementations should build their HTTP clients.

use derive_builder::{Builder, UninitializedFieldError};

use super::TransportError;

/// Value of the `User-Agent` header used when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("http-transport/", env!("CARGO_PKG_VERSION"));

/// Settings applied to every HTTP client created by a transport.
///
/// Both the per-call clients and the long-lived streaming client are built
/// from the same configuration. There is intentionally no timeout here: only
/// `GET` and stream calls are time-limited, and only per call.
///
/// # Examples
/// ```
/// use http_transport::core::TransportConfigurationBuilder;
///
/// let configuration = TransportConfigurationBuilder::default()
///     .with_user_agent("my-app/1.0")
///     .build()
///     .unwrap();
///
/// assert_eq!(configuration.user_agent.as_deref(), Some("my-app/1.0"));
/// assert!(!configuration.accept_invalid_certs);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(
    pattern = "owned",
    name = "TransportConfigurationBuilder",
    build_fn(error = "TransportError"),
    setter(prefix = "with")
)]
pub struct TransportConfiguration {
    /// `User-Agent` header sent with every request.
    ///
    /// `None` leaves the header to the HTTP library.
    #[builder(
        setter(into, strip_option),
        default = "Some(DEFAULT_USER_AGENT.to_string())"
    )]
    pub user_agent: Option<String>,

    /// Accept invalid TLS certificates.
    #[builder(default = "false")]
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfiguration {
    fn default() -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            accept_invalid_certs: false,
        }
    }
}

impl From<UninitializedFieldError> for TransportError {
    fn from(err: UninitializedFieldError) -> Self {
        TransportError::ClientInitialization {
            details: err.to_string(),
        }
    }
}
