//! This module declares the readers.
//! A reader is used to fetch the dataset over the network. The cache only
//! knows the [`Transport`] trait, so any reader can be injected in a
//! [`crate::scores::Client`], including fake ones in tests.

pub mod http;

/// The error type returned by a [`Transport`].
/// It is opaque to the cache: any failure makes the refresh fail.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// The raw response returned by a [`Transport`].
#[derive(Debug)]
pub struct TransportResponse {
    /// The HTTP status code
    pub status: u16,
    /// The body of the response, still compressed
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a new TransportResponse
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        TransportResponse { status, body }
    }

    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A common interface between all readers able to download the dataset.
///
/// Timeouts are handled by the implementation, an elapsed timeout is
/// reported as an `Err` like any other failure.
pub trait Transport: Send + Sync {
    /// Fetches the resource at the given URL.
    fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError>;
}
