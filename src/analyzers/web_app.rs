//! Favicon, manifest, hreflang and HTTP→HTTPS redirect detection

use crate::error::Result;
use crate::fetch::Fetcher;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static ICON_REL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]*rel\s*=\s*["'][^"']*icon[^"']*["'][^>]*>"#).expect("valid regex")
});
static FAVICON_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]*href\s*=\s*["'][^"']*favicon[^"']*["'][^>]*>"#)
        .expect("valid regex")
});
static MANIFEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]*rel\s*=\s*["']manifest["'][^>]*>"#).expect("valid regex")
});
static HREFLANG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]*hreflang\s*=\s*["'][^"']*["'][^>]*>"#).expect("valid regex")
});

/// Progressive web app and internationalisation signals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAppFeaturesResult {
    pub has_favicon: bool,
    pub has_manifest: bool,
    pub has_hreflang: bool,
    pub https_redirect: bool,
    pub recommendations: Vec<String>,
}

impl WebAppFeaturesResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self {
            recommendations: vec!["Unable to analyze web app features".to_string()],
            ..Self::default()
        }
    }

    /// Fetch `url`, scan its `<link>` tags and probe the HTTP mirror
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        let https_redirect = probe_https_redirect(fetcher, url).await;
        Ok(Self::from_html(&page.body, url, https_redirect))
    }

    /// Build the result from a page body and the redirect probe outcome
    pub fn from_html(html: &str, url: &Url, https_redirect: bool) -> Self {
        let has_favicon = ICON_REL.is_match(html) || FAVICON_HREF.is_match(html);
        let has_manifest = MANIFEST.is_match(html);
        let has_hreflang = HREFLANG.is_match(html);
        let is_https = url.scheme() == "https";

        let mut recommendations = Vec::new();
        if !has_favicon {
            recommendations
                .push("Add a favicon to improve brand recognition and user experience".to_string());
        }
        if !has_manifest {
            recommendations.push(
                "Add a web app manifest for better mobile experience and PWA capabilities"
                    .to_string(),
            );
        }
        if !has_hreflang && html.contains("lang=") {
            recommendations.push(
                "Consider adding hreflang tags for international SEO if serving multiple languages"
                    .to_string(),
            );
        }
        if !https_redirect && is_https {
            recommendations.push("Ensure automatic HTTP to HTTPS redirect is configured".to_string());
        }

        Self {
            has_favicon,
            has_manifest,
            has_hreflang,
            https_redirect,
            recommendations,
        }
    }
}

/// Whether the `http://` twin of an `https://` URL answers with a redirect
///
/// Only attempted for HTTPS inputs. Probe errors count as "no redirect".
pub async fn probe_https_redirect(fetcher: &Fetcher, url: &Url) -> bool {
    if url.scheme() != "https" {
        return false;
    }

    let mut http_url = url.clone();
    if http_url.set_scheme("http").is_err() {
        return false;
    }

    match fetcher.status_without_redirect(&http_url).await {
        Ok(status) => (300..400).contains(&status),
        Err(e) => {
            tracing::debug!(url = %http_url, error = %e, "HTTPS redirect probe failed");
            false
        }
    }
}
