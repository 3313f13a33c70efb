//! # HTTP transport
//!
//! Minimal request transports which issue a single `DELETE`, `GET`, `POST` or
//! `PUT` request, or open a `GET` stream, and hand back the raw response.
//!
//! - Two interchangeable execution models: [`Transport`] for `async` callers
//!   and [`blocking::Transport`] for blocking ones.
//! - Nothing is retried, translated or interpreted: error statuses come back
//!   as responses and failures of the HTTP library are returned as is.
//! - Every request is sent with its own short-lived client. Streams use the
//!   client held by the transport so they can outlive the call.
//!
//! ```no_run
//! use http_transport::{Transport, TransportReqwest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), http_transport::TransportError> {
//! let transport = TransportReqwest::new()?;
//! let response = transport.get("https://example.com/ping", None, None, None).await?;
//!
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * `reqwest` (default) - `async` transport built on top of [`reqwest`]
//! * `blocking` (default) - blocking transport built on top of
//!   `reqwest::blocking`
//!
//! [`reqwest`]: https://docs.rs/reqwest

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use crate::core::{
    blocking, Transport, TransportBody, TransportConfiguration, TransportConfigurationBuilder,
    TransportError, TransportMethod, TransportRequest, TransportResponse, DEFAULT_TIMEOUT,
};
pub mod core;

#[cfg(feature = "reqwest")]
pub use crate::transport::TransportReqwest;
pub mod transport;
