//! Outbound HTTP capability used to fetch the issuer's key set
//!
//! The validator never opens connections itself. It is handed an
//! [`HttpClient`] which performs one GET and reports the status and body.
//! With the `reqwest` feature (on by default) [`ReqwestClient`] provides a
//! blocking implementation with a request timeout.
use std::{
    error::Error as StdError,
    sync::Arc,
};

/// Failure below HTTP: connection, TLS, timeout or cancellation
pub type TransportError = Box<dyn StdError + Send + Sync>;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// `true` for any 2xx status
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Capability to perform a single HTTP GET
///
/// Implementations should bound the request with a timeout and report
/// it as a [`TransportError`]; the validator does not retry.
pub trait HttpClient: Send + Sync {
    /// Issues a GET for `url` and returns the complete response.
    ///
    /// # Errors
    ///
    /// A [`TransportError`] when no response was received. Non-success
    /// statuses are NOT errors at this level.
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Box<T> {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;

#[cfg(feature = "reqwest")]
mod reqwest_client {
    use std::time::Duration;

    use reqwest::{
        blocking::Client,
        header::ACCEPT,
    };

    use super::{
        HttpClient,
        HttpResponse,
        TransportError,
    };

    /// [`HttpClient`] backed by [`reqwest::blocking::Client`]
    ///
    /// Must not be called from within an async runtime's worker thread.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        /// Builds a client whose requests fail once `timeout` elapses.
        ///
        /// # Errors
        ///
        /// Propagates [`reqwest::Error`] when the TLS backend cannot be initialized.
        pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
            let client = Client::builder()
                .timeout(timeout)
                .connect_timeout(timeout)
                .build()?;
            Ok(Self { client })
        }

        /// Wraps a preconfigured client (proxies, custom roots, ...).
        #[must_use]
        pub const fn from_client(client: Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            let response = self
                .client
                .get(url)
                .header(ACCEPT, "application/json")
                .send()?;
            let status = response.status().as_u16();
            let body = response.bytes()?.to_vec();
            Ok(HttpResponse { status, body })
        }
    }

}
