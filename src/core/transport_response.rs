//! This module contains the `TransportResponse` struct.
//!
//! This struct is used to represent the response received for a request.
//! It is used as the response type for the [`Transport`] trait.
//!
//! [`Transport`]: ../transport/trait.Transport.html

use std::collections::HashMap;

/// This struct is used to represent the response received for a request.
/// It is used as the response type for the [`Transport`] trait.
///
/// The transport doesn't interpret the response: any status code, including
/// error statuses, is delivered as is.
///
/// [`Transport`]: ../transport/trait.Transport.html
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TransportResponse {
    /// status code of the response
    pub status: u16,

    /// headers of the response
    ///
    /// Names are lowercase. Every value of a repeated header is kept in the
    /// order it was received. Bytes which aren't valid UTF-8 are replaced with
    /// `U+FFFD`.
    pub headers: HashMap<String, Vec<String>>,

    /// body of the response
    pub body: Option<Vec<u8>>,
}
