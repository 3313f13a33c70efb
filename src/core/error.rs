//! # Error types
//!
//! This module contains the error types for the [`http_transport`] crate.
//!
//! [`http_transport`]: ../index.html

use snafu::Snafu;

/// Boxed error reported by the underlying HTTP library.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Transport error type
///
/// This type is used to represent errors that can occur while a request is
/// issued. Failures reported by the underlying HTTP library are never
/// translated: they are kept as the `source` of [`TransportError::Transport`].
///
/// Responses with error statuses (`4xx`, `5xx`) are **not** errors.
///
/// # Examples
/// ```
/// use http_transport::core::TransportError;
///
/// fn foo() -> Result<(), TransportError> {
///   Ok(())
/// }
///
/// foo().map_err(|e| match e {
///   TransportError::Transport { .. } => println!("Transport error"),
///   TransportError::InvalidHeader { .. } => println!("Header error"),
///   _ => println!("Other error"),
/// });
/// ```
#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    /// this error is returned when the underlying call fails
    #[snafu(display("Transport error: {}", source))]
    Transport {
        /// error reported by the HTTP library
        source: BoxedError,
    },

    /// this error is returned when the HTTP client can't be created
    #[snafu(display("Client initialization error: {}", details))]
    ClientInitialization {
        /// details of the failure
        details: String,
    },

    /// this error is returned when one of the headers can't be sent
    #[snafu(display("Invalid header: {}", details))]
    InvalidHeader {
        /// details of the failure
        details: String,
    },

    /// this error is returned when the request body can't be serialized
    #[snafu(display("Serialization error: {}", details))]
    Serialization {
        /// details of the failure
        details: String,
    },
}

impl TransportError {
    /// Wrap an error reported by the underlying HTTP library.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxedError>,
    {
        TransportError::Transport {
            source: error.into(),
        }
    }

    /// Whether the underlying call failed because it exceeded its timeout.
    ///
    /// Covers request timeouts reported by `reqwest` and stream steps which
    /// ran out of time.
    #[cfg(feature = "reqwest")]
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Transport { source } => {
                source.is::<tokio::time::error::Elapsed>()
                    || source
                        .downcast_ref::<reqwest::Error>()
                        .map_or(false, reqwest::Error::is_timeout)
            }
            _ => false,
        }
    }
}
