//! Heading counts and hierarchy validation

use crate::error::Result;
use crate::fetch::Fetcher;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));

/// Recommendation reported when the page could not be analyzed
pub const FALLBACK_RECOMMENDATION: &str = "Unable to analyze heading structure";

/// H1-H6 usage on a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStructureResult {
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub h4_count: usize,
    pub h5_count: usize,
    pub h6_count: usize,
    pub h1_text: Vec<String>,
    pub has_h1: bool,
    pub multiple_h1: bool,
    pub proper_hierarchy: bool,
    pub missing_levels: Vec<String>,
    pub recommendations: Vec<String>,
}

impl HeadingStructureResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self {
            recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
            ..Self::default()
        }
    }

    /// Fetch `url` and analyze its headings
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        Ok(Self::from_html(&page.body))
    }

    /// Analyze the headings of an HTML document
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut counts = [0usize; 6];
        let mut h1_text = Vec::new();

        for element in document.select(&HEADINGS) {
            let level = match element.value().name() {
                "h1" => 1,
                "h2" => 2,
                "h3" => 3,
                "h4" => 4,
                "h5" => 5,
                _ => 6,
            };
            counts[level - 1] += 1;

            if level == 1 {
                let text = element.text().collect::<String>();
                let text = text.trim();
                if !text.is_empty() {
                    h1_text.push(text.to_string());
                }
            }
        }

        Self::from_counts(counts, h1_text)
    }

    /// Derive flags and recommendations from per-level counts
    pub fn from_counts(counts: [usize; 6], h1_text: Vec<String>) -> Self {
        let (proper_hierarchy, missing_levels) = check_hierarchy(&counts);
        let has_h1 = counts[0] > 0;
        let multiple_h1 = counts[0] > 1;

        let mut recommendations = Vec::new();
        if !has_h1 {
            recommendations
                .push("Add an H1 tag to clearly define the main topic of the page".to_string());
        }
        if multiple_h1 {
            recommendations.push("Use only one H1 tag per page for better SEO structure".to_string());
        }
        if !proper_hierarchy {
            recommendations.push(
                "Follow proper heading hierarchy (H1 → H2 → H3, etc.) without skipping levels"
                    .to_string(),
            );
        }
        if !missing_levels.is_empty() {
            recommendations.push(format!(
                "Consider adding missing heading levels: {}",
                missing_levels.join(", ")
            ));
        }
        if counts[1] == 0 && counts[2..].iter().any(|&c| c > 0) {
            recommendations.push("Add H2 headings to create better content structure".to_string());
        }

        Self {
            h1_count: counts[0],
            h2_count: counts[1],
            h3_count: counts[2],
            h4_count: counts[3],
            h5_count: counts[4],
            h6_count: counts[5],
            h1_text,
            has_h1,
            multiple_h1,
            proper_hierarchy,
            missing_levels,
            recommendations,
        }
    }
}

/// Walk H1..H6 and report whether levels nest without gaps
///
/// Levels skipped before the first present heading are missing, and so is
/// every absent level that is followed by a present one.
pub fn check_hierarchy(counts: &[usize; 6]) -> (bool, Vec<String>) {
    let mut proper = true;
    let mut missing = Vec::new();
    let mut found_heading = false;

    for (i, &count) in counts.iter().enumerate() {
        if count > 0 {
            if !found_heading && i > 0 {
                proper = false;
                missing.extend((1..=i).map(|level| format!("H{}", level)));
            }
            found_heading = true;
        } else if found_heading && counts[i + 1..].iter().any(|&c| c > 0) {
            proper = false;
            missing.push(format!("H{}", i + 1));
        }
    }

    (proper, missing)
}
