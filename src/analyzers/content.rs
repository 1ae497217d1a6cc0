//! Plain-text word count, language attribute and external link usage

use crate::error::Result;
use crate::fetch::Fetcher;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Pages with fewer words than this are considered thin
pub const THIN_CONTENT_WORDS: usize = 300;

static LANG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<html[^>]*lang\s*=\s*["'][^"']*["']"#).expect("valid regex")
});
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]*href\s*=\s*["']([^"']*)["'][^>]*>"#).expect("valid regex")
});

/// Text and link statistics for a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysisResult {
    pub word_count: usize,
    pub is_thin_content: bool,
    pub has_lang_attribute: bool,
    pub external_links_count: usize,
    pub external_links_with_nofollow: usize,
    pub recommendations: Vec<String>,
}

impl ContentAnalysisResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self {
            is_thin_content: true,
            recommendations: vec!["Unable to analyze content".to_string()],
            ..Self::default()
        }
    }

    /// Fetch `url` and analyze its content
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        Ok(Self::from_html(&page.body, url))
    }

    /// Analyze an HTML document served from `page_url`
    pub fn from_html(html: &str, page_url: &Url) -> Self {
        let has_lang_attribute = LANG_ATTR.is_match(html);
        let word_count = plain_text(html).split_whitespace().count();
        let is_thin_content = word_count < THIN_CONTENT_WORDS;

        let host = page_url.host_str().unwrap_or_default();
        let mut external_links_count = 0;
        let mut external_links_with_nofollow = 0;

        for caps in ANCHOR.captures_iter(html) {
            let href = &caps[1];
            if !is_external(href, host) {
                continue;
            }
            external_links_count += 1;

            // Literal match only; "noopener nofollow" is not recognised
            let tag = &caps[0];
            if tag.contains(r#"rel="nofollow""#) || tag.contains("rel='nofollow'") {
                external_links_with_nofollow += 1;
            }
        }

        let mut recommendations = Vec::new();
        if is_thin_content {
            recommendations.push(format!(
                "Increase content length (currently {} words, recommended: {}+ words)",
                word_count, THIN_CONTENT_WORDS
            ));
        }
        if !has_lang_attribute {
            recommendations
                .push("Add lang attribute to <html> tag for better accessibility".to_string());
        }
        if external_links_count > 0 && external_links_with_nofollow == 0 {
            recommendations.push(
                r#"Consider adding rel="nofollow" to external links to preserve link equity"#
                    .to_string(),
            );
        }

        Self {
            word_count,
            is_thin_content,
            has_lang_attribute,
            external_links_count,
            external_links_with_nofollow,
            recommendations,
        }
    }
}

/// Strip scripts, styles and tags, collapsing whitespace
pub fn plain_text(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, "");
    let text = ANY_TAG.replace_all(&without_styles, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An absolute http(s) link pointing at a different host
fn is_external(href: &str, host: &str) -> bool {
    if !href.starts_with("http") {
        return false;
    }
    match Url::parse(href) {
        Ok(link) => link.host_str().is_some_and(|h| !h.eq_ignore_ascii_case(host)),
        Err(_) => !href.contains(host),
    }
}
