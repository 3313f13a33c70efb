//! # Reqwest Transport Implementation
//!
//! This module contains the [`TransportReqwest`] struct.
//! It is used to send requests using the [`reqwest`] crate.
//!
//! It requires the [`reqwest` feature] to be enabled.
//!
//! Every [`send`] builds a new client which lives only as long as the call.
//! Streams are opened with the client held by the transport instance, because
//! a stream has to outlive the call which opened it.
//!
//! [`TransportReqwest`]: ./struct.TransportReqwest.html
//! [`reqwest`]: https://docs.rs/reqwest
//! [`send`]: crate::core::Transport::send
//! [`reqwest` feature]: ../index.html#features

use crate::core::{
    Transport, TransportConfiguration, TransportError, TransportMethod, TransportRequest,
    TransportResponse,
};
use bytes::Bytes;
use futures::Stream;
use log::{debug, info};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    StatusCode,
};
use std::{collections::HashMap, future::Future, time::Duration};

/// This struct is used to send requests using the [`reqwest`] crate without
/// blocking the caller.
///
/// [`reqwest`]: https://docs.rs/reqwest
#[derive(Clone, Debug)]
pub struct TransportReqwest {
    /// Client used by streams.
    reqwest_client: reqwest::Client,

    /// Configuration for every client created by the transport.
    configuration: TransportConfiguration,
}

#[async_trait::async_trait]
impl Transport for TransportReqwest {
    type Stream = ResponseStream;

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let client = build_client(&self.configuration)?;
        let request_url = request.prepared_url();
        info!("{} {}", request.method, request_url);

        let mut builder = prepare_request(&client, &request, request_url)?;
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let result = builder.send().await.map_err(TransportError::transport)?;

        let status = result.status();
        let headers = response_headers(result.headers());
        result
            .bytes()
            .await
            .map_err(TransportError::transport)
            .map(|bytes| create_result(status, headers, bytes))
    }

    async fn open_stream(&self, request: TransportRequest) -> Result<ResponseStream, TransportError> {
        let request_url = request.prepared_url();
        info!("{} {} (stream)", request.method, request_url);

        let builder = prepare_request(&self.reqwest_client, &request, request_url.clone())?;
        let response = with_timeout(request.timeout, builder.send()).await?;

        debug!("Stream opened: {}", request_url);
        Ok(ResponseStream {
            response,
            timeout: request.timeout,
            url: request_url,
        })
    }
}

impl TransportReqwest {
    /// Create a new [`TransportReqwest`] instance with default
    /// [`TransportConfiguration`].
    ///
    /// # Errors
    /// Returns [`TransportError::ClientInitialization`] when the streaming
    /// client can't be created.
    ///
    /// # Example
    /// ```
    /// use http_transport::transport::TransportReqwest;
    ///
    /// let transport = TransportReqwest::new().unwrap();
    /// ```
    pub fn new() -> Result<Self, TransportError> {
        Self::with_configuration(TransportConfiguration::default())
    }

    /// Create a new [`TransportReqwest`] instance with custom configuration.
    pub fn with_configuration(configuration: TransportConfiguration) -> Result<Self, TransportError> {
        Ok(Self {
            reqwest_client: build_stream_client(&configuration)?,
            configuration,
        })
    }
}

/// Open response stream.
///
/// Created by [`TransportReqwest`] when a stream is requested. The connection
/// stays open while the value is alive and is closed when it is dropped.
///
/// The stream timeout limits every wait for the next chunk, not the lifetime
/// of the stream.
#[derive(Debug)]
pub struct ResponseStream {
    response: reqwest::Response,
    timeout: Option<Duration>,
    url: String,
}

impl ResponseStream {
    /// Status code of the response.
    pub fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    /// Headers of the response.
    pub fn headers(&self) -> HashMap<String, Vec<String>> {
        response_headers(self.response.headers())
    }

    /// Wait for the next chunk of the body.
    ///
    /// Returns `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        with_timeout(self.timeout, self.response.chunk()).await
    }

    /// Turn the response body into a [`Stream`] of chunks.
    ///
    /// The connection is closed when the returned stream is dropped.
    pub fn into_chunks(self) -> impl Stream<Item = Result<Bytes, TransportError>> + Send {
        futures::stream::try_unfold(self, |mut stream| async move {
            let chunk = stream.chunk().await?;
            Ok::<_, TransportError>(chunk.map(|chunk| (chunk, stream)))
        })
    }
}

impl Drop for ResponseStream {
    fn drop(&mut self) {
        debug!("Stream closed: {}", self.url);
    }
}

/// Limit a single step of a stream: waiting for headers or for one chunk.
async fn with_timeout<F, T>(timeout: Option<Duration>, future: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    let result = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, future)
            .await
            .map_err(TransportError::transport)?,
        None => future.await,
    };

    result.map_err(TransportError::transport)
}

fn client_builder(configuration: &TransportConfiguration) -> reqwest::ClientBuilder {
    let builder =
        reqwest::Client::builder().danger_accept_invalid_certs(configuration.accept_invalid_certs);

    match &configuration.user_agent {
        Some(user_agent) => builder.user_agent(user_agent),
        None => builder,
    }
}

fn build_client(configuration: &TransportConfiguration) -> Result<reqwest::Client, TransportError> {
    client_builder(configuration)
        .build()
        .map_err(|err| TransportError::ClientInitialization {
            details: err.to_string(),
        })
}

/// Streaming client keeps no idle connections: a connection is closed as soon
/// as its stream is released.
fn build_stream_client(
    configuration: &TransportConfiguration,
) -> Result<reqwest::Client, TransportError> {
    client_builder(configuration)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|err| TransportError::ClientInitialization {
            details: err.to_string(),
        })
}

fn prepare_request(
    client: &reqwest::Client,
    request: &TransportRequest,
    url: String,
) -> Result<reqwest::RequestBuilder, TransportError> {
    let mut builder = client
        .request(request.method.into(), url)
        .headers(prepare_headers(request)?);

    if let Some(body) = prepare_body(request)? {
        builder = builder.body(body);
    }

    Ok(builder)
}

impl From<TransportMethod> for reqwest::Method {
    fn from(method: TransportMethod) -> Self {
        match method {
            TransportMethod::Delete => reqwest::Method::DELETE,
            TransportMethod::Get => reqwest::Method::GET,
            TransportMethod::Post => reqwest::Method::POST,
            TransportMethod::Put => reqwest::Method::PUT,
        }
    }
}

fn prepare_headers(request: &TransportRequest) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::try_from(&request.headers).map_err(|err| {
        TransportError::InvalidHeader {
            details: err.to_string(),
        }
    })?;

    if let Some(body) = &request.body {
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type()));
        }
    }

    Ok(headers)
}

fn prepare_body(request: &TransportRequest) -> Result<Option<Vec<u8>>, TransportError> {
    request.body.as_ref().map(|body| body.to_bytes()).transpose()
}

fn response_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        result
            .entry(name.to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    result
}

fn create_result(
    status: StatusCode,
    headers: HashMap<String, Vec<String>>,
    body: Bytes,
) -> TransportResponse {
    TransportResponse {
        status: status.as_u16(),
        headers,
        body: (!body.is_empty()).then(|| body.to_vec()),
    }
}

#[cfg(feature = "blocking")]
pub mod blocking {
    //! # Reqwest Transport Blocking Implementation
    //!
    //! This module contains the blocking [`TransportReqwest`] struct.
    //! It is used to send requests using the [`reqwest`] crate.
    //!
    //! It requires the [`reqwest` and `blocking` feature] to be enabled.
    //!
    //! Requests are sent with `reqwest::blocking` clients. Streams are driven
    //! by the held async client on the transport's own runtime, so that every
    //! read can be time-limited on its own.
    //!
    //! [`TransportReqwest`]: ./struct.TransportReqwest.html
    //! [`reqwest`]: https://docs.rs/reqwest
    //! [`reqwest` and `blocking` feature]: ../../index.html#features

    use std::{
        collections::HashMap,
        io::{self, Read},
        sync::Arc,
        time::Duration,
    };

    use bytes::Bytes;
    use log::{debug, info};
    use tokio::runtime::Runtime;

    use crate::{
        core::{
            blocking::Transport, TransportConfiguration, TransportError, TransportRequest,
            TransportResponse,
        },
        transport::reqwest::{
            build_stream_client, create_result, prepare_body, prepare_headers, response_headers,
            with_timeout,
        },
    };

    /// This struct is used to send requests using the [`reqwest`] crate while
    /// blocking the calling thread.
    ///
    /// It requires the [`reqwest` and `blocking` feature] to be enabled.
    ///
    /// Don't create or drop it inside an async runtime: the transport runs its
    /// own one.
    ///
    /// [`reqwest`]: https://docs.rs/reqwest
    #[derive(Clone, Debug)]
    pub struct TransportReqwest {
        /// Client used by streams.
        reqwest_client: reqwest::Client,

        /// Runtime which drives streams.
        runtime: Arc<Runtime>,

        /// Configuration for every client created by the transport.
        configuration: TransportConfiguration,
    }

    impl Transport for TransportReqwest {
        type Stream = ResponseStream;

        fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            let client = build_client(&self.configuration)?;
            let request_url = request.prepared_url();
            info!("{} {}", request.method, request_url);

            let mut builder = prepare_request(&client, &request, request_url)?;
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            let result = builder.send().map_err(TransportError::transport)?;

            let status = result.status();
            let headers = response_headers(result.headers());
            result
                .bytes()
                .map_err(TransportError::transport)
                .map(|bytes| create_result(status, headers, bytes))
        }

        fn open_stream(&self, request: TransportRequest) -> Result<ResponseStream, TransportError> {
            let request_url = request.prepared_url();
            info!("{} {} (stream)", request.method, request_url);

            let builder =
                super::prepare_request(&self.reqwest_client, &request, request_url.clone())?;
            let response = self
                .runtime
                .block_on(with_timeout(request.timeout, builder.send()))?;

            debug!("Stream opened: {}", request_url);
            Ok(ResponseStream {
                response,
                pending: Bytes::new(),
                timeout: request.timeout,
                runtime: Arc::clone(&self.runtime),
                url: request_url,
            })
        }
    }

    impl TransportReqwest {
        /// Create a new [`TransportReqwest`] instance with default
        /// [`TransportConfiguration`].
        ///
        /// # Example
        /// ```no_run
        /// use http_transport::transport::reqwest::blocking::TransportReqwest;
        ///
        /// let transport = TransportReqwest::new().unwrap();
        /// ```
        pub fn new() -> Result<Self, TransportError> {
            Self::with_configuration(TransportConfiguration::default())
        }

        /// Create a new [`TransportReqwest`] instance with custom configuration.
        pub fn with_configuration(
            configuration: TransportConfiguration,
        ) -> Result<Self, TransportError> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("http-transport-stream")
                .enable_all()
                .build()
                .map_err(|err| TransportError::ClientInitialization {
                    details: err.to_string(),
                })?;

            Ok(Self {
                reqwest_client: build_stream_client(&configuration)?,
                runtime: Arc::new(runtime),
                configuration,
            })
        }
    }

    /// Open response stream.
    ///
    /// The body is consumed through [`Read`] or [`ResponseStream::chunk`].
    /// The stream timeout limits every wait for data, not the lifetime of the
    /// stream. The connection is closed when the value is dropped.
    #[derive(Debug)]
    pub struct ResponseStream {
        response: reqwest::Response,
        pending: Bytes,
        timeout: Option<Duration>,
        runtime: Arc<Runtime>,
        url: String,
    }

    impl ResponseStream {
        /// Status code of the response.
        pub fn status(&self) -> u16 {
            self.response.status().as_u16()
        }

        /// Headers of the response.
        pub fn headers(&self) -> HashMap<String, Vec<String>> {
            response_headers(self.response.headers())
        }

        /// Wait for the next chunk of the body.
        ///
        /// Returns `None` once the body is exhausted.
        pub fn chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
            if !self.pending.is_empty() {
                return Ok(Some(std::mem::take(&mut self.pending)));
            }

            self.runtime
                .block_on(with_timeout(self.timeout, self.response.chunk()))
        }
    }

    impl Read for ResponseStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            while self.pending.is_empty() {
                match self.chunk().map_err(into_io_error)? {
                    Some(chunk) => self.pending = chunk,
                    None => return Ok(0),
                }
            }

            let len = buf.len().min(self.pending.len());
            buf[..len].copy_from_slice(&self.pending.split_to(len));
            Ok(len)
        }
    }

    impl Drop for ResponseStream {
        fn drop(&mut self) {
            debug!("Stream closed: {}", self.url);
        }
    }

    fn into_io_error(error: TransportError) -> io::Error {
        let kind = if error.is_timeout() {
            io::ErrorKind::TimedOut
        } else {
            io::ErrorKind::Other
        };

        io::Error::new(kind, error)
    }

    fn build_client(
        configuration: &TransportConfiguration,
    ) -> Result<reqwest::blocking::Client, TransportError> {
        // Blocking client defaults to a 30 seconds limit, requests carry their
        // own timeout instead.
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(None)
            .danger_accept_invalid_certs(configuration.accept_invalid_certs);
        if let Some(user_agent) = &configuration.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .map_err(|err| TransportError::ClientInitialization {
                details: err.to_string(),
            })
    }

    fn prepare_request(
        client: &reqwest::blocking::Client,
        request: &TransportRequest,
        url: String,
    ) -> Result<reqwest::blocking::RequestBuilder, TransportError> {
        let mut builder = client
            .request(request.method.into(), url)
            .headers(prepare_headers(request)?);

        if let Some(body) = prepare_body(request)? {
            builder = builder.body(body);
        }

        Ok(builder)
    }

}
