//! HTTP fetching of search responses.
//!
//! [`HttpSource`] is the production [`ArticleSource`]: one blocking GET per
//! call with fixed connect/read timeouts.  It is only ever called from a load
//! worker thread, never from the UI thread.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use super::ArticleSource;
use crate::error::FetchError;

/// Maximum time to establish the TCP/TLS connection.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Share of the whole-request timeout meant for reading the response.  The
/// blocking client has no separate read timeout, so this constant only feeds
/// the total budget of `CONNECT_TIMEOUT + READ_TIMEOUT`.
const READ_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Fetches search responses over HTTP(S).
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(CONNECT_TIMEOUT + READ_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ArticleSource for HttpSource {
    /// GET `url` and return the body of a `200 OK` response.
    ///
    /// A URL that does not parse is not an error: it is logged and yields an
    /// empty body, which the parser treats as "no data".  The response (and
    /// with it the connection) is dropped on every return path.
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                warn!(%url, error = %e, "could not build request URL, treating as empty response");
                return Ok(String::new());
            }
        };

        debug!(%url, "sending search request");
        let response = self.client.get(url.clone()).send()?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "search request rejected");
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response.text()?;
        info!(%url, bytes = body.len(), "search response received");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
