//! HTTPS and HSTS checks

use crate::error::Result;
use crate::fetch::Fetcher;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Transport security of the audited URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpsSecurityResult {
    pub is_secure: bool,
    #[serde(rename = "hasHSTS")]
    pub has_hsts: bool,
    /// Embedded resources are not scanned; always false
    pub mixed_content: bool,
}

impl HttpsSecurityResult {
    /// Result used when the page could not be fetched
    ///
    /// The scheme check needs no network, so it is still reported.
    pub fn fallback(url: &Url) -> Self {
        Self {
            is_secure: is_secure(url),
            ..Self::default()
        }
    }

    /// Check the scheme and fetch once for the HSTS header
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        Ok(Self::from_headers(url, &page.headers))
    }

    /// Build the result from the URL and its response headers
    pub fn from_headers(url: &Url, headers: &HeaderMap) -> Self {
        Self {
            is_secure: is_secure(url),
            has_hsts: headers.contains_key("strict-transport-security"),
            mixed_content: false,
        }
    }
}

fn is_secure(url: &Url) -> bool {
    url.scheme() == "https"
}
