//! Title, description, social and technical meta tags

use crate::error::Result;
use crate::fetch::Fetcher;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use url::Url;

/// Title lengths search engines display without truncation
const OPTIMAL_TITLE_LENGTH: RangeInclusive<usize> = 30..=60;

/// Description lengths search engines display without truncation
const OPTIMAL_DESCRIPTION_LENGTH: RangeInclusive<usize> = 120..=160;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").expect("valid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("link").expect("valid selector"));
static HTML_ROOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html[lang]").expect("valid selector"));

/// Meta tags found on a page
///
/// Only the first occurrence of each tag is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTagsResult {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub canonical: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_url: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_site: Option<String>,
    pub twitter_creator: Option<String>,
    pub viewport: Option<String>,
    pub robots: Option<String>,
    pub language: Option<String>,
    pub charset: Option<String>,
    pub title_length: usize,
    pub description_length: usize,
    pub title_optimal: bool,
    pub description_optimal: bool,
    pub has_all_required_tags: bool,
}

impl MetaTagsResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Fetch `url` and extract its meta tags
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        Ok(Self::from_html(&page.body))
    }

    /// Extract meta tags from an HTML document
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = document
            .select(&TITLE)
            .next()
            .map(|el| el.text().collect::<String>())
            .and_then(non_empty);
        let description = meta_content(&document, "name", "description");
        let og_title = meta_content(&document, "property", "og:title");
        let og_description = meta_content(&document, "property", "og:description");

        let title_length = title.as_deref().map_or(0, |t| t.chars().count());
        let description_length = description.as_deref().map_or(0, |d| d.chars().count());
        let has_all_required_tags = title.is_some()
            && description.is_some()
            && (og_title.is_some() || og_description.is_some());

        Self {
            keywords: meta_content(&document, "name", "keywords"),
            canonical: link_href(&document, "canonical"),
            og_image: meta_content(&document, "property", "og:image"),
            og_url: meta_content(&document, "property", "og:url"),
            twitter_card: meta_content(&document, "name", "twitter:card"),
            twitter_site: meta_content(&document, "name", "twitter:site"),
            twitter_creator: meta_content(&document, "name", "twitter:creator"),
            viewport: meta_content(&document, "name", "viewport"),
            robots: meta_content(&document, "name", "robots"),
            language: document
                .select(&HTML_ROOT)
                .next()
                .and_then(|el| el.value().attr("lang"))
                .and_then(non_empty),
            charset: charset(&document),
            title_optimal: OPTIMAL_TITLE_LENGTH.contains(&title_length),
            description_optimal: OPTIMAL_DESCRIPTION_LENGTH.contains(&description_length),
            title_length,
            description_length,
            has_all_required_tags,
            title,
            description,
            og_title,
            og_description,
        }
    }
}

fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn attr_is(el: &ElementRef<'_>, attr: &str, expected: &str) -> bool {
    el.value()
        .attr(attr)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

/// `content` of the first `<meta {attr}="{key}">` that has one
fn meta_content(document: &Html, attr: &str, key: &str) -> Option<String> {
    document
        .select(&META)
        .filter(|el| attr_is(el, attr, key))
        .find_map(|el| el.value().attr("content"))
        .and_then(non_empty)
}

/// `href` of the first `<link rel="{rel}">` that has one
fn link_href(document: &Html, rel: &str) -> Option<String> {
    document
        .select(&LINK)
        .filter(|el| attr_is(el, "rel", rel))
        .find_map(|el| el.value().attr("href"))
        .and_then(non_empty)
}

/// `<meta charset>` or the charset parameter of a Content-Type `http-equiv`
fn charset(document: &Html) -> Option<String> {
    if let Some(value) = document
        .select(&META)
        .find_map(|el| el.value().attr("charset"))
    {
        return non_empty(value);
    }

    document
        .select(&META)
        .filter(|el| attr_is(el, "http-equiv", "content-type"))
        .find_map(|el| el.value().attr("content"))
        .and_then(|content| {
            let lower = content.to_ascii_lowercase();
            let start = lower.find("charset=")? + "charset=".len();
            let value = content[start..]
                .split(|c: char| c == ';' || c.is_whitespace())
                .next()?
                .trim_matches(|c: char| c == '"' || c == '\'');
            non_empty(value)
        })
}
