//! Fetch data over HTTP(S)
//!
//! The [`HttpTransport`] downloads the dataset with a blocking HTTP client.
//! Each [`crate::scores::Client`] owns its own transport.

use std::time::Duration;

use log::{debug, error, trace};
use reqwest::blocking::Client;

use super::{Transport, TransportError, TransportResponse};

/// The default timeout of a request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The User-Agent sent with each request.
const USER_AGENT: &str = concat!("epss_cache/", env!("CARGO_PKG_VERSION"));

/// A reader used to fetch HTTP(S) resources.
pub struct HttpTransport {
    /// The underlying HTTP client
    http_client: Client,
}

impl HttpTransport {
    /// Creates a new HttpTransport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        trace!("Running HttpTransport::new()");
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(HttpTransport { http_client })
    }

    /// Wraps an already configured HTTP client.
    pub fn with_client(http_client: Client) -> Self {
        HttpTransport { http_client }
    }
}

impl Transport for HttpTransport {
    /// Sends one GET request and reads the whole body.
    fn fetch(&self, url: &str) -> Result<TransportResponse, TransportError> {
        trace!("Running HttpTransport::fetch()");
        debug!("Sending HTTP request for URL {}", url);
        let response = self.http_client.get(url).send().map_err(|e| {
            error!("An error occured in the HTTP request to {}: {:?}", url, e);
            e
        })?;

        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        debug!("Got HTTP {} with {} bytes from {}", status, body.len(), url);
        Ok(TransportResponse::new(status, body))
    }
}
