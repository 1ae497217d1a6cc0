//! Broken link sampling
//!
//! The first `max_links` anchors in document order are considered. Links
//! that are neither root-relative nor absolute http(s) are skipped, but
//! still count toward `totalChecked`. So are links the fetcher refuses to
//! contact because they point at internal addresses.

use crate::error::Result;
use crate::fetch::{Fetcher, LinkProbe};
use futures::future::join_all;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Links that failed a HEAD probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLinksResult {
    pub broken_links: Vec<String>,
    pub total_checked: usize,
}

impl BrokenLinksResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Fetch `url`, then probe its first `max_links` anchors concurrently
    pub async fn analyze(fetcher: &Fetcher, url: &Url, max_links: usize) -> Result<Self> {
        let page = fetcher.get(url).await?;
        let candidates = extract_links(&page.body, max_links);
        let origin = url.origin().ascii_serialization();

        let probes = candidates.iter().filter_map(|link| {
            let target = resolve(link, &origin)?;
            Some(async move {
                if let Ok(parsed) = Url::parse(&target)
                    && let Err(e) = fetcher.guard(&parsed).await
                {
                    tracing::debug!(link = %target, error = %e, "skipped refused link");
                    return None;
                }

                let outcome = fetcher.probe(&target).await;
                tracing::debug!(link = %target, ?outcome, "probed link");
                match outcome {
                    LinkProbe::Alive => None,
                    LinkProbe::Status(_) => Some(target),
                    LinkProbe::Failed => Some(link.clone()),
                }
            })
        });

        let broken_links = join_all(probes).await.into_iter().flatten().collect();

        Ok(Self {
            broken_links,
            total_checked: candidates.len(),
        })
    }
}

/// Non-empty `href` values of the first `max` anchors, in document order
pub fn extract_links(html: &str, max: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// URL to probe for a candidate link, or `None` if it is skipped
///
/// Root-relative links are joined to `origin`; mailto, tel, fragments and
/// path-relative links are skipped.
pub fn resolve(link: &str, origin: &str) -> Option<String> {
    if link.starts_with('/') {
        Some(format!("{}{}", origin, link))
    } else if link.starts_with("http") {
        Some(link.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_page(server: &MockServer, html: String) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(server)
            .await;
    }

    async fn head_requests(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == "HEAD")
            .count()
    }

    #[test]
    fn caps_at_max_in_document_order() {
        let html: String = (0..25)
            .map(|i| format!(r#"<a href="/page-{}">{}</a>"#, i, i))
            .collect();
        let links = extract_links(&html, 10);
        assert_eq!(links.len(), 10);
        assert_eq!(links[0], "/page-0");
        assert_eq!(links[9], "/page-9");
    }

    #[test]
    fn empty_hrefs_are_ignored() {
        let html = r#"<a href="">x</a><a>no href</a><a href="/ok">ok</a>"#;
        assert_eq!(extract_links(html, 10), vec!["/ok"]);
    }

    #[test]
    fn resolve_candidates() {
        let origin = "https://example.com";
        assert_eq!(
            resolve("/about", origin).as_deref(),
            Some("https://example.com/about")
        );
        assert_eq!(
            resolve("https://other.org/x", origin).as_deref(),
            Some("https://other.org/x")
        );
        assert_eq!(resolve("mailto:me@example.com", origin), None);
        assert_eq!(resolve("tel:+123", origin), None);
        assert_eq!(resolve("relative/page", origin), None);
        assert_eq!(resolve("#section", origin), None);
    }

    #[tokio::test]
    async fn probes_at_most_ten_links() {
        let server = MockServer::start().await;
        let html: String = (0..15)
            .map(|i| format!(r#"<a href="/page-{}">{}</a>"#, i, i))
            .collect();
        serve_page(&server, html).await;
        Mock::given(method("HEAD"))
            .and(path_regex(r"^/page-\d+$"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = AuditConfig::builder().allow_private(true).build();
        let fetcher = Fetcher::new(&config).unwrap();
        let url = Url::parse(&format!("{}/", server.uri())).unwrap();

        let result = BrokenLinksResult::analyze(&fetcher, &url, config.max_links)
            .await
            .unwrap();

        assert_eq!(result.total_checked, 10);
        assert!(result.broken_links.is_empty());
        assert_eq!(head_requests(&server).await, 10);
    }

    #[tokio::test]
    async fn internal_links_are_never_probed() {
        let page = MockServer::start().await;
        let internal = MockServer::start().await;
        serve_page(
            &page,
            format!(r#"<a href="{}/admin">admin</a>"#, internal.uri()),
        )
        .await;

        // Private targets refused; the page itself is fetched directly
        let fetcher = Fetcher::new(&AuditConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/", page.uri())).unwrap();

        let result = BrokenLinksResult::analyze(&fetcher, &url, 10).await.unwrap();

        assert_eq!(result.total_checked, 1);
        assert!(result.broken_links.is_empty());
        assert_eq!(head_requests(&internal).await, 0);
    }
}
