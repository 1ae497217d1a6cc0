//! Image alt text and format checks

use crate::error::Result;
use crate::fetch::Fetcher;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img[^>]*>").expect("valid regex"));
static ALT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)alt\s*=\s*["'][^"']*["']"#).expect("valid regex"));
static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src\s*=\s*["']([^"']*)["']"#).expect("valid regex"));
static LEGACY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png)$").expect("valid regex"));

/// Image statistics for a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptimizationResult {
    pub total_images: usize,
    pub images_without_alt: usize,
    /// File sizes are not inspected; always 0
    pub large_size_images: usize,
    pub suboptimal_formats: usize,
    pub recommendations: Vec<String>,
}

impl ImageOptimizationResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self {
            recommendations: vec!["Unable to analyze images".to_string()],
            ..Self::default()
        }
    }

    /// Fetch `url` and scan its `<img>` tags
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        Ok(Self::from_html(&page.body))
    }

    /// Scan the `<img>` tags of an HTML document
    pub fn from_html(html: &str) -> Self {
        let mut total_images = 0;
        let mut images_without_alt = 0;
        let mut suboptimal_formats = 0;

        for tag in IMG_TAG.find_iter(html).map(|m| m.as_str()) {
            total_images += 1;

            if !ALT_ATTR.is_match(tag) {
                images_without_alt += 1;
            }

            if let Some(caps) = SRC_ATTR.captures(tag)
                && LEGACY_FORMAT.is_match(&caps[1])
            {
                suboptimal_formats += 1;
            }
        }

        let mut recommendations = Vec::new();
        if images_without_alt > 0 {
            recommendations.push(format!(
                "Add alt text to {} images for better accessibility and SEO",
                images_without_alt
            ));
        }
        if suboptimal_formats > 0 {
            recommendations.push(format!(
                "Consider converting {} images to modern formats (WebP, AVIF) for better performance",
                suboptimal_formats
            ));
        }
        if total_images == 0 {
            recommendations
                .push("Consider adding relevant images to improve user engagement".to_string());
        }

        Self {
            total_images,
            images_without_alt,
            large_size_images: 0,
            suboptimal_formats,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_images_one_missing_alt_two_png() {
        let html = r#"<body>
            <img src="/a.png" alt="A">
            <img src="/b.PNG">
            <img src="/c.webp" alt="">
        </body>"#;
        let result = ImageOptimizationResult::from_html(html);

        assert_eq!(result.total_images, 3);
        assert_eq!(result.images_without_alt, 1);
        assert_eq!(result.suboptimal_formats, 2);
        assert_eq!(result.large_size_images, 0);
        assert_eq!(
            result.recommendations,
            vec![
                "Add alt text to 1 images for better accessibility and SEO",
                "Consider converting 2 images to modern formats (WebP, AVIF) for better performance",
            ]
        );
    }

    #[test]
    fn query_string_hides_extension() {
        let html = r#"<img src="/photo.jpg?w=200" alt="x"><img src='/photo.JPEG' alt='y'>"#;
        let result = ImageOptimizationResult::from_html(html);
        assert_eq!(result.suboptimal_formats, 1);
        assert_eq!(result.images_without_alt, 0);
    }

    #[test]
    fn no_images() {
        let result = ImageOptimizationResult::from_html("<p>text only</p>");
        assert_eq!(result.total_images, 0);
        assert_eq!(
            result.recommendations,
            vec!["Consider adding relevant images to improve user engagement"]
        );
    }

    #[test]
    fn fallback_message() {
        let fallback = ImageOptimizationResult::fallback();
        assert_eq!(fallback.total_images, 0);
        assert_eq!(fallback.recommendations, vec!["Unable to analyze images"]);
    }
}
