use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};

use crate::api::ApiError;

/// A simple wrapper on an HTTP client for making requests. Sets the defaults
/// every call shares: the global timeout and the user-agent.
///
/// There is no retry layer, a failed call is reported once to the caller.
#[derive(Debug)]
pub struct Request {
    client: reqwest::Client,
    timeout: Duration,
}

impl Request {
    /// Initializes a new `Request` instance with the given per-call timeout.
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Creates a request builder with defaults applied.
    pub(crate) fn req(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(self.timeout)
            .header(
                "User-Agent",
                format!("kyckit-core/{}", env!("CARGO_PKG_VERSION")),
            )
    }

    /// Sends a request built by `req`.
    ///
    /// Any failure that leaves the caller without a response (connect error,
    /// timeout, invalid request) becomes [`ApiError::Network`].
    pub(crate) async fn handle(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, ApiError> {
        request_builder.send().await.map_err(|err| {
            let url = err
                .url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
            if err.is_timeout() {
                ApiError::network(format!("request to {url} timed out"))
            } else if err.is_connect() {
                ApiError::network(format!("could not connect to {url}: {err}"))
            } else {
                ApiError::network(format!("request to {url} failed: {err}"))
            }
        })
    }
}
