//! # Transport Request
//!
//! This module contains the [`TransportRequest`] struct and related types.
//!
//! Requests are always normalized: missing query parameters and headers are
//! stored as empty maps, so transports never have to deal with absent
//! collections.

use std::{collections::HashMap, fmt::Display, time::Duration};

use serde::Serialize;

use super::{utils::encoding::url_encode, TransportError};

/// Timeout used for `GET` and stream requests when the caller doesn't
/// provide one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Query parameters which should be appended to the request URL.
pub type QueryParameters = HashMap<String, String>;

/// Headers which should be sent with the request.
pub type Headers = HashMap<String, String>;

/// The method to use for a request.
///
/// This enum represents the method to use for a request. It is used by the
/// [`TransportRequest`] struct.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub enum TransportMethod {
    /// `DELETE` request.
    Delete,

    /// `GET` request.
    #[default]
    Get,

    /// `POST` request.
    Post,

    /// `PUT` request.
    Put,
}

impl Display for TransportMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransportMethod::Delete => "DELETE",
                TransportMethod::Get => "GET",
                TransportMethod::Post => "POST",
                TransportMethod::Put => "PUT",
            }
        )
    }
}

/// Structured payload of `POST` and `PUT` requests.
#[derive(Clone, PartialEq, Debug)]
pub enum TransportBody {
    /// Payload sent as `application/json`.
    Json(serde_json::Value),

    /// Payload sent as `application/x-www-form-urlencoded`.
    Form(HashMap<String, String>),
}

impl TransportBody {
    /// Create JSON payload from any serializable value.
    ///
    /// # Examples
    /// ```
    /// use http_transport::core::TransportBody;
    /// use std::collections::HashMap;
    ///
    /// let body = TransportBody::json(HashMap::from([("name", "a")])).unwrap();
    /// assert_eq!(body, TransportBody::Json(serde_json::json!({"name": "a"})));
    /// ```
    pub fn json<T>(value: T) -> Result<Self, TransportError>
    where
        T: Serialize,
    {
        serde_json::to_value(value)
            .map(TransportBody::Json)
            .map_err(|err| TransportError::Serialization {
                details: err.to_string(),
            })
    }

    /// Create form payload from key / value pairs.
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TransportBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Value of the `Content-Type` header for this payload.
    pub fn content_type(&self) -> &'static str {
        match self {
            TransportBody::Json(_) => super::utils::headers::APPLICATION_JSON,
            TransportBody::Form(_) => super::utils::headers::APPLICATION_FORM,
        }
    }

    /// Serialize payload into bytes which will be sent over the wire.
    ///
    /// Form fields are written in key order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        match self {
            TransportBody::Json(value) => {
                serde_json::to_vec(value).map_err(|err| TransportError::Serialization {
                    details: err.to_string(),
                })
            }
            TransportBody::Form(fields) => Ok(encode_pairs(fields).into_bytes()),
        }
    }
}

/// This struct represents a request which should be sent by the transport.
///
/// All fields are representing certain parts of the request that can be used
/// to prepare one.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TransportRequest {
    /// fully-formed URL of the resource
    pub url: String,

    /// query parameters to be sent with the request
    pub query_parameters: QueryParameters,

    /// method to use for the request
    pub method: TransportMethod,

    /// headers to be sent with the request
    pub headers: Headers,

    /// body to be sent with the request
    pub body: Option<TransportBody>,

    /// time limit for the call, `None` means no limit
    ///
    /// Streams apply it to every step separately: waiting for the response
    /// headers and waiting for each chunk of the body.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a request with normalized query parameters and headers.
    ///
    /// # Examples
    /// ```
    /// use http_transport::core::{TransportMethod, TransportRequest};
    ///
    /// let request = TransportRequest::new(TransportMethod::Delete, "http://x/items/5", None, None);
    ///
    /// assert!(request.headers.is_empty());
    /// assert!(request.query_parameters.is_empty());
    /// assert!(request.timeout.is_none());
    /// ```
    pub fn new<S>(
        method: TransportMethod,
        url: S,
        query_parameters: Option<QueryParameters>,
        headers: Option<Headers>,
    ) -> Self
    where
        S: Into<String>,
    {
        Self {
            url: url.into(),
            query_parameters: query_parameters.unwrap_or_default(),
            method,
            headers: headers.unwrap_or_default(),
            body: None,
            timeout: None,
        }
    }

    /// Attach payload to the request.
    pub fn with_body(mut self, body: Option<TransportBody>) -> Self {
        self.body = body;
        self
    }

    /// Limit the time which the call may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// URL with query parameters appended.
    ///
    /// Parameters are percent-encoded and written in key order. They are
    /// joined with `&` when the URL already has a query string. A `#fragment`
    /// stays at the end of the URL.
    pub fn prepared_url(&self) -> String {
        if self.query_parameters.is_empty() {
            return self.url.clone();
        }

        let (base, fragment) = match self.url.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (self.url.as_str(), None),
        };

        let separator = if base.ends_with('?') || base.ends_with('&') {
            ""
        } else if base.contains('?') {
            "&"
        } else {
            "?"
        };

        let mut url = format!(
            "{}{}{}",
            base,
            separator,
            encode_pairs(&self.query_parameters)
        );
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }

        url
    }
}

fn encode_pairs(pairs: &HashMap<String, String>) -> String {
    let mut pairs = pairs.iter().collect::<Vec<_>>();
    pairs.sort();

    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", url_encode(k.as_bytes()), url_encode(v.as_bytes())))
        .collect::<Vec<String>>()
        .join("&")
}
