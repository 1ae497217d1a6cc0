//! Component self-test
//!
//! Runs the PageSpeed client and every analyzer once against a reference
//! URL and reports which of them succeeded.

use crate::analyzers::{
    BrokenLinksResult, ContentAnalysisResult, HeadingStructureResult, HttpsSecurityResult,
    ImageOptimizationResult, MetaTagsResult, RobotsAndSitemapResult, StructuredDataResult,
    TechnicalHeadersResult, WebAppFeaturesResult,
};
use crate::audit::{Auditor, timestamp};
use crate::error::Result;
use crate::pagespeed::Strategy;
use serde::{Deserialize, Serialize};
use url::Url;

/// URL the self-test audits by default
pub const REFERENCE_URL: &str = "https://example.com";

/// Pass/fail per component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTests {
    pub page_speed_api: bool,
    pub meta_tags_analysis: bool,
    pub heading_structure_analysis: bool,
    pub technical_headers_analysis: bool,
    pub image_optimization_analysis: bool,
    pub content_analysis: bool,
    pub web_app_features_analysis: bool,
    pub https_security_check: bool,
    pub structured_data_check: bool,
    pub robots_sitemap_check: bool,
    pub broken_links_check: bool,
}

impl ComponentTests {
    /// Whether every component passed
    pub fn all_passed(&self) -> bool {
        [
            self.page_speed_api,
            self.meta_tags_analysis,
            self.heading_structure_analysis,
            self.technical_headers_analysis,
            self.image_optimization_analysis,
            self.content_analysis,
            self.web_app_features_analysis,
            self.https_security_check,
            self.structured_data_check,
            self.robots_sitemap_check,
            self.broken_links_check,
        ]
        .iter()
        .all(|passed| *passed)
    }
}

/// Body of the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    pub api_key_configured: bool,
    pub component_tests: ComponentTests,
    pub all_tests_passed: bool,
}

/// Exercise every component against `reference`
///
/// The SSRF guard is not applied; `reference` comes from configuration,
/// not from a caller.
pub async fn check(auditor: &Auditor, reference: &Url) -> HealthReport {
    let fetcher = auditor.fetcher();
    let max_links = auditor.config().max_links;

    let (
        page_speed_api,
        meta_tags_analysis,
        heading_structure_analysis,
        technical_headers_analysis,
        image_optimization_analysis,
        content_analysis,
        web_app_features_analysis,
        https_security_check,
        structured_data_check,
        robots_sitemap_check,
        broken_links_check,
    ) = tokio::join!(
        passed(
            "PageSpeed API",
            auditor.pagespeed().run(reference.as_str(), Strategy::Mobile)
        ),
        passed("meta tags", MetaTagsResult::analyze(fetcher, reference)),
        passed(
            "heading structure",
            HeadingStructureResult::analyze(fetcher, reference)
        ),
        passed(
            "technical headers",
            TechnicalHeadersResult::analyze(fetcher, reference)
        ),
        passed(
            "image optimization",
            ImageOptimizationResult::analyze(fetcher, reference)
        ),
        passed("content", ContentAnalysisResult::analyze(fetcher, reference)),
        passed(
            "web app features",
            WebAppFeaturesResult::analyze(fetcher, reference)
        ),
        passed(
            "https security",
            HttpsSecurityResult::analyze(fetcher, reference)
        ),
        passed(
            "structured data",
            StructuredDataResult::analyze(fetcher, reference)
        ),
        passed(
            "robots and sitemap",
            RobotsAndSitemapResult::analyze(fetcher, reference)
        ),
        passed(
            "broken links",
            BrokenLinksResult::analyze(fetcher, reference, max_links)
        ),
    );

    let component_tests = ComponentTests {
        page_speed_api,
        meta_tags_analysis,
        heading_structure_analysis,
        technical_headers_analysis,
        image_optimization_analysis,
        content_analysis,
        web_app_features_analysis,
        https_security_check,
        structured_data_check,
        robots_sitemap_check,
        broken_links_check,
    };

    HealthReport {
        status: "healthy".to_string(),
        timestamp: timestamp(),
        api_key_configured: auditor.config().has_api_key(),
        all_tests_passed: component_tests.all_passed(),
        component_tests,
    }
}

async fn passed<T>(component: &str, test: impl Future<Output = Result<T>>) -> bool {
    match test.await {
        Ok(_) => true,
        Err(e) => {
            tracing::info!(component, error = %e, "component test failed");
            false
        }
    }
}
