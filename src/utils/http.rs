//! HTTP fetch collaborator.
//!
//! Decoders do not talk to the network directly; they go through the
//! [`Fetch`] trait so callers can substitute canned payloads in tests. The
//! default implementation wraps `reqwest` behind a current-thread runtime.

use std::collections::HashMap;
use std::time::Duration;

use case_insensitive_string::CaseInsensitiveString;
use reqwest::{Client, StatusCode};

use crate::error::{Error, Result};

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT: u64 = 15;

/// Anything that can fetch a subscription body by URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Makes an HTTP GET request to the specified URL.
pub async fn web_get_async(
    url: &str,
    user_agent: &str,
    headers: Option<&HashMap<CaseInsensitiveString, String>>,
) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT))
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::Fetch {
            url: url.to_string(),
            message: format!("failed to build HTTP client: {}", e),
        })?;

    let mut request_builder = client.get(url);
    if let Some(custom_headers) = headers {
        for (key, value) in custom_headers {
            let name: &str = key.as_ref();
            request_builder = request_builder.header(name, value);
        }
    }

    let response = request_builder.send().await.map_err(|e| Error::Fetch {
        url: url.to_string(),
        message: format!("failed to send request: {}", e),
    })?;

    if response.status() != StatusCode::OK {
        return Err(Error::Fetch {
            url: url.to_string(),
            message: format!("HTTP error: {}", response.status()),
        });
    }

    response.text().await.map_err(|e| Error::Fetch {
        url: url.to_string(),
        message: format!("failed to read response body: {}", e),
    })
}

/// Synchronous wrapper over [`web_get_async`] using a current-thread
/// runtime.
pub fn web_get(
    url: &str,
    user_agent: &str,
    headers: Option<&HashMap<CaseInsensitiveString, String>>,
) -> Result<String> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Fetch {
            url: url.to_string(),
            message: format!("failed to create runtime: {}", e),
        })?;
    rt.block_on(web_get_async(url, user_agent, headers))
}

/// Default fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    pub user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher {
            user_agent: format!("subforge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        web_get(url, &self.user_agent, None)
    }
}
