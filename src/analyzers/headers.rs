//! Security, caching, compression and cookie response headers

use crate::error::Result;
use crate::fetch::{Fetcher, header_value};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Raw header values plus derived flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalHeadersResult {
    pub content_security_policy: Option<String>,
    pub x_frame_options: Option<String>,
    pub strict_transport_security: Option<String>,
    pub cache_control: Option<String>,
    pub etag: Option<String>,
    pub expires: Option<String>,
    pub server_info: Option<String>,
    pub content_encoding: Option<String>,
    pub is_compressed: bool,
    pub http_only_set: bool,
    pub secure_set: bool,
    pub same_site_set: bool,
}

impl TechnicalHeadersResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Fetch `url` and inspect its response headers
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let headers = fetcher.get_headers(url).await?;
        Ok(Self::from_headers(&headers))
    }

    /// Inspect a response header map
    ///
    /// Cookie flags are case-sensitive substring checks over every
    /// `Set-Cookie` value merged into one string.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_encoding = header_value(headers, "content-encoding");
        let is_compressed = content_encoding
            .as_deref()
            .is_some_and(|enc| enc.contains("gzip") || enc.contains("br"));
        let cookies = header_value(headers, "set-cookie").unwrap_or_default();

        Self {
            content_security_policy: header_value(headers, "content-security-policy"),
            x_frame_options: header_value(headers, "x-frame-options"),
            strict_transport_security: header_value(headers, "strict-transport-security"),
            cache_control: header_value(headers, "cache-control"),
            etag: header_value(headers, "etag"),
            expires: header_value(headers, "expires"),
            server_info: header_value(headers, "server"),
            content_encoding,
            is_compressed,
            http_only_set: cookies.contains("HttpOnly"),
            secure_set: cookies.contains("Secure"),
            same_site_set: cookies.contains("SameSite"),
        }
    }
}
