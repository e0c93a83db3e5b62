//! HTTP transport for feed downloads.

use std::future::Future;
use std::time::Duration;

use crate::error::{DaybookError, DaybookResult};

const USER_AGENT: &str = concat!("daybook/", env!("CARGO_PKG_VERSION"));

/// Raw response of a feed download.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

impl FeedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single GET bounded by a timeout.
///
/// Implementations return `Err` only for transport problems; HTTP error
/// statuses come back as a normal `FeedResponse`.
pub trait FeedTransport: Send + Sync + 'static {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = DaybookResult<FeedResponse>> + Send;
}

/// `reqwest` backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> DaybookResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DaybookError::Config(format!("Could not build HTTP client: {e}")))?;
        Ok(HttpTransport { client })
    }
}

impl FeedTransport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> DaybookResult<FeedResponse> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DaybookError::Fetch(format!("{url}: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DaybookError::Fetch(format!("{url}: {e}")))?;

        Ok(FeedResponse { status, body })
    }
}
