//! robots.txt and sitemap.xml presence

use crate::error::{Error, Result};
use crate::fetch::{FetchedPage, Fetcher};
use serde::{Deserialize, Serialize};
use url::Url;

const ROBOTS_PATH: &str = "/robots.txt";
const SITEMAP_PATH: &str = "/sitemap.xml";

/// Crawl-control files found at the site origin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsAndSitemapResult {
    pub robots_exists: bool,
    pub sitemap_exists: bool,
    pub robots_content: Option<String>,
}

impl RobotsAndSitemapResult {
    /// Result used when the origin could not be probed
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Probe `/robots.txt` and `/sitemap.xml` at the origin of `url`
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let robots_url = origin_path(url, ROBOTS_PATH)?;
        let sitemap_url = origin_path(url, SITEMAP_PATH)?;

        let (robots, sitemap) = tokio::join!(fetcher.get(&robots_url), fetcher.get(&sitemap_url));

        let robots = match robots {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::debug!(url = %robots_url, error = %e, "robots.txt fetch failed");
                None
            }
        };

        let sitemap = match sitemap {
            Ok(page) => Some(page.is_success()),
            Err(e) => {
                tracing::debug!(url = %sitemap_url, error = %e, "sitemap.xml fetch failed");
                None
            }
        };

        Ok(Self::from_probes(robots.as_ref(), sitemap))
    }

    /// Combine probe outcomes; `None` means the request itself failed
    ///
    /// When the sitemap request fails, a `Sitemap:` line in robots.txt is
    /// accepted as evidence that a sitemap exists.
    pub fn from_probes(robots: Option<&FetchedPage>, sitemap: Option<bool>) -> Self {
        let robots_content = robots
            .filter(|page| page.is_success())
            .map(|page| page.body.clone())
            .filter(|body| !body.is_empty());
        let robots_exists = robots.is_some_and(FetchedPage::is_success);

        let sitemap_exists = match sitemap {
            Some(found) => found,
            None => robots_content
                .as_deref()
                .is_some_and(|body| body.to_lowercase().contains("sitemap:")),
        };

        Self {
            robots_exists,
            sitemap_exists,
            robots_content,
        }
    }
}

fn origin_path(url: &Url, path: &str) -> Result<Url> {
    let origin = url.origin().ascii_serialization();
    Url::parse(&format!("{}{}", origin, path)).map_err(|e| Error::InvalidUrl(e.to_string()))
}
