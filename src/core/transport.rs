//! # Transport module
//!
//! This module contains the [`Transport`] trait and its [`blocking`]
//! counterpart.
//!
//! Both traits describe the same capability: issue a single `DELETE`, `GET`,
//! `POST` or `PUT` request, or open a `GET` stream, against a fully-formed
//! URL and hand back the raw response. Pick the one which matches the
//! caller's execution model.
//!
//! You can implement these traits for your own types, or use one of the
//! provided features to use a transport library.

use std::time::Duration;

use super::{
    transport_request::{Headers, QueryParameters, DEFAULT_TIMEOUT},
    TransportBody, TransportError, TransportMethod, TransportRequest, TransportResponse,
};

/// This trait is used to send requests without blocking the caller.
///
/// Implementors provide [`send`] and [`open_stream`], the verb methods are
/// built on top of them and take care of request normalization.
///
/// # Examples
/// ```
/// use http_transport::core::{Transport, TransportRequest, TransportResponse, TransportError};
///
/// struct MyTransport;
///
/// #[async_trait::async_trait]
/// impl Transport for MyTransport {
///    type Stream = ();
///
///    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
///         // Send your request here
///
///         Ok(TransportResponse::default())
///    }
///
///    async fn open_stream(&self, req: TransportRequest) -> Result<(), TransportError> {
///         Ok(())
///    }
/// }
/// ```
///
/// [`send`]: Transport::send
/// [`open_stream`]: Transport::open_stream
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Scoped handle of an open response stream.
    ///
    /// The connection must stay open while the handle is alive and be closed
    /// when it is dropped.
    type Stream: Send;

    /// Send a request and wait for the complete response.
    ///
    /// # Errors
    /// Should return an [`TransportError::Transport`] if the request cannot be
    /// sent.
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Send a request and return as soon as the response headers are
    /// available.
    ///
    /// # Errors
    /// Should return an [`TransportError::Transport`] if the request cannot be
    /// sent.
    async fn open_stream(&self, req: TransportRequest) -> Result<Self::Stream, TransportError>;

    /// Send `DELETE` request.
    async fn delete(
        &self,
        url: &str,
        params: Option<QueryParameters>,
        headers: Option<Headers>,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(
            TransportMethod::Delete,
            url,
            params,
            headers,
        ))
        .await
    }

    /// Send `GET` request.
    ///
    /// The call fails when it takes longer than `timeout` (60 seconds by
    /// default).
    async fn get(
        &self,
        url: &str,
        params: Option<QueryParameters>,
        headers: Option<Headers>,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError> {
        self.send(
            TransportRequest::new(TransportMethod::Get, url, params, headers)
                .with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT)),
        )
        .await
    }

    /// Send `POST` request.
    async fn post(
        &self,
        url: &str,
        params: Option<QueryParameters>,
        headers: Option<Headers>,
        body: Option<TransportBody>,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(TransportMethod::Post, url, params, headers).with_body(body))
            .await
    }

    /// Send `PUT` request.
    async fn put(
        &self,
        url: &str,
        params: Option<QueryParameters>,
        headers: Option<Headers>,
        body: Option<TransportBody>,
    ) -> Result<TransportResponse, TransportError> {
        self.send(TransportRequest::new(TransportMethod::Put, url, params, headers).with_body(body))
            .await
    }

    /// Open `GET` stream.
    ///
    /// Opening fails when the response headers don't arrive within `timeout`
    /// (60 seconds by default). The same limit applies to every wait for the
    /// next chunk, so a stream which keeps delivering data stays open for as
    /// long as the caller holds it.
    async fn stream(
        &self,
        url: &str,
        params: Option<QueryParameters>,
        headers: Option<Headers>,
        timeout: Option<Duration>,
    ) -> Result<Self::Stream, TransportError> {
        self.open_stream(
            TransportRequest::new(TransportMethod::Get, url, params, headers)
                .with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT)),
        )
        .await
    }
}

pub mod blocking {
    //! # Blocking transport module
    //!
    //! This module contains the blocking [`Transport`] trait.
    //!
    //! You can implement this trait for your own types, or use one of the provided
    //! features to use a transport library.

    use std::time::Duration;

    use crate::core::{
        transport_request::{Headers, QueryParameters, DEFAULT_TIMEOUT},
        TransportBody, TransportError, TransportMethod, TransportRequest, TransportResponse,
    };

    /// This trait is used to send requests while blocking the calling thread.
    ///
    /// # Examples
    /// ```
    /// use http_transport::core::{blocking::Transport, TransportRequest, TransportResponse, TransportError};
    ///
    /// struct MyTransport;
    ///
    /// impl Transport for MyTransport {
    ///    type Stream = ();
    ///
    ///    fn send(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
    ///         // Send your request here
    ///
    ///         Ok(TransportResponse::default())
    ///    }
    ///
    ///    fn open_stream(&self, req: TransportRequest) -> Result<(), TransportError> {
    ///         Ok(())
    ///    }
    /// }
    /// ```
    pub trait Transport {
        /// Scoped handle of an open response stream.
        type Stream;

        /// Send a request and wait for the complete response.
        ///
        /// # Errors
        /// Should return an [`TransportError::Transport`] if the request cannot be sent.
        fn send(&self, req: TransportRequest) -> Result<TransportResponse, TransportError>;

        /// Send a request and return as soon as the response headers are
        /// available.
        fn open_stream(&self, req: TransportRequest) -> Result<Self::Stream, TransportError>;

        /// Send `DELETE` request.
        fn delete(
            &self,
            url: &str,
            params: Option<QueryParameters>,
            headers: Option<Headers>,
        ) -> Result<TransportResponse, TransportError> {
            self.send(TransportRequest::new(
                TransportMethod::Delete,
                url,
                params,
                headers,
            ))
        }

        /// Send `GET` request, limited by `timeout` (60 seconds by default).
        fn get(
            &self,
            url: &str,
            params: Option<QueryParameters>,
            headers: Option<Headers>,
            timeout: Option<Duration>,
        ) -> Result<TransportResponse, TransportError> {
            self.send(
                TransportRequest::new(TransportMethod::Get, url, params, headers)
                    .with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT)),
            )
        }

        /// Send `POST` request.
        fn post(
            &self,
            url: &str,
            params: Option<QueryParameters>,
            headers: Option<Headers>,
            body: Option<TransportBody>,
        ) -> Result<TransportResponse, TransportError> {
            self.send(
                TransportRequest::new(TransportMethod::Post, url, params, headers).with_body(body),
            )
        }

        /// Send `PUT` request.
        fn put(
            &self,
            url: &str,
            params: Option<QueryParameters>,
            headers: Option<Headers>,
            body: Option<TransportBody>,
        ) -> Result<TransportResponse, TransportError> {
            self.send(
                TransportRequest::new(TransportMethod::Put, url, params, headers).with_body(body),
            )
        }

        /// Open `GET` stream.
        ///
        /// `timeout` (60 seconds by default) limits the wait for the response
        /// headers and every wait for data, not the lifetime of the stream.
        fn stream(
            &self,
            url: &str,
            params: Option<QueryParameters>,
            headers: Option<Headers>,
            timeout: Option<Duration>,
        ) -> Result<Self::Stream, TransportError> {
            self.open_stream(
                TransportRequest::new(TransportMethod::Get, url, params, headers)
                    .with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT)),
            )
        }
    }
}
