//! Audit orchestration
//!
//! One audit runs the PageSpeed client for both strategies alongside all ten
//! analyzers, concurrently. A failing analyzer degrades to its fallback
//! result; a failing PageSpeed call fails the whole audit and cancels the
//! branches still in flight.

use crate::analyzers::{
    BrokenLinksResult, ContentAnalysisResult, HeadingStructureResult, HttpsSecurityResult,
    ImageOptimizationResult, MetaTagsResult, RobotsAndSitemapResult, StructuredDataResult,
    TechnicalHeadersResult, WebAppFeaturesResult,
};
use crate::config::AuditConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::pagespeed::{PageSpeedClient, PerformanceReport, Strategy};
use crate::recommendations::{Findings, generate_recommendations, technical_issues};
use crate::report::{AuditReport, AuditRequest, PerformanceScore};
use chrono::{SecondsFormat, Utc};
use std::time::Instant;

/// Runs audits with a shared HTTP client and configuration
#[derive(Debug, Clone)]
pub struct Auditor {
    config: AuditConfig,
    fetcher: Fetcher,
    pagespeed: PageSpeedClient,
}

impl Auditor {
    /// Create an auditor from `config`
    pub fn new(config: AuditConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let pagespeed = PageSpeedClient::new(fetcher.client().clone(), &config);
        Ok(Self {
            config,
            fetcher,
            pagespeed,
        })
    }

    /// Configuration this auditor was built with
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Shared fetcher used by the analyzers
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// PageSpeed client
    pub fn pagespeed(&self) -> &PageSpeedClient {
        &self.pagespeed
    }

    /// Validate `url` and audit it
    pub async fn audit(&self, url: &str) -> Result<AuditReport> {
        let request = AuditRequest::new(url)?;
        self.audit_request(&request).await
    }

    /// Audit an already validated request
    pub async fn audit_request(&self, request: &AuditRequest) -> Result<AuditReport> {
        let url = request.url();
        self.fetcher.guard(url).await?;

        if !self.pagespeed.is_configured() {
            return Err(Error::MissingApiKey);
        }

        tracing::info!(url = request.as_str(), "starting audit");
        let started = Instant::now();
        let fetcher = &self.fetcher;

        let (
            mobile,
            desktop,
            meta_tags,
            heading_structure,
            technical_headers,
            image_optimization,
            content_analysis,
            web_app_features,
            https_security,
            structured_data,
            robots_and_sitemap,
            broken_links,
        ) = tokio::try_join!(
            self.performance(request.as_str(), Strategy::Mobile),
            self.performance(request.as_str(), Strategy::Desktop),
            recover(
                "meta tags",
                MetaTagsResult::analyze(fetcher, url),
                MetaTagsResult::fallback
            ),
            recover(
                "heading structure",
                HeadingStructureResult::analyze(fetcher, url),
                HeadingStructureResult::fallback
            ),
            recover(
                "technical headers",
                TechnicalHeadersResult::analyze(fetcher, url),
                TechnicalHeadersResult::fallback
            ),
            recover(
                "image optimization",
                ImageOptimizationResult::analyze(fetcher, url),
                ImageOptimizationResult::fallback
            ),
            recover(
                "content",
                ContentAnalysisResult::analyze(fetcher, url),
                ContentAnalysisResult::fallback
            ),
            recover(
                "web app features",
                WebAppFeaturesResult::analyze(fetcher, url),
                WebAppFeaturesResult::fallback
            ),
            recover(
                "https security",
                HttpsSecurityResult::analyze(fetcher, url),
                || HttpsSecurityResult::fallback(url)
            ),
            recover(
                "structured data",
                StructuredDataResult::analyze(fetcher, url),
                StructuredDataResult::fallback
            ),
            recover(
                "robots and sitemap",
                RobotsAndSitemapResult::analyze(fetcher, url),
                RobotsAndSitemapResult::fallback
            ),
            recover(
                "broken links",
                BrokenLinksResult::analyze(fetcher, url, self.config.max_links),
                BrokenLinksResult::fallback
            ),
        )?;

        tracing::info!(
            url = request.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "all audits completed"
        );

        let analyses = Analyses {
            meta_tags,
            heading_structure,
            technical_headers,
            image_optimization,
            content_analysis,
            web_app_features,
            https_security,
            structured_data,
            robots_and_sitemap,
            broken_links,
        };

        let report = compose(request.as_str(), timestamp(), &mobile, &desktop, analyses);

        tracing::debug!(
            performance = report.performance,
            accessibility = report.accessibility,
            best_practices = report.best_practices,
            seo = report.seo,
            "mobile scores"
        );
        tracing::debug!(
            performance = report.desktop_score.performance,
            accessibility = report.desktop_score.accessibility,
            best_practices = report.desktop_score.best_practices,
            seo = report.desktop_score.seo,
            "desktop scores"
        );
        tracing::debug!(
            title = report.meta_tags.title.is_some(),
            description = report.meta_tags.description.is_some(),
            h1 = report.heading_structure.h1_count,
            h2 = report.heading_structure.h2_count,
            proper_hierarchy = report.heading_structure.proper_hierarchy,
            "page structure"
        );
        tracing::debug!(
            https = report.https_security.is_secure,
            robots = report.robots_and_sitemap.robots_exists,
            sitemap = report.robots_and_sitemap.sitemap_exists,
            broken_links = report.broken_links.broken_links.len(),
            "technical checks"
        );

        Ok(report)
    }

    async fn performance(&self, url: &str, strategy: Strategy) -> Result<PerformanceReport> {
        self.pagespeed.run(url, strategy).await.inspect_err(|e| {
            tracing::error!(url, %strategy, error = %e, "PageSpeed run failed");
        })
    }
}

/// Await an analyzer, substituting its fallback on failure
async fn recover<T>(
    name: &'static str,
    analysis: impl Future<Output = Result<T>>,
    fallback: impl FnOnce() -> T,
) -> Result<T> {
    match analysis.await {
        Ok(result) => Ok(result),
        Err(e) => {
            tracing::warn!(analyzer = name, error = %e, "analysis failed, using fallback");
            Ok(fallback())
        }
    }
}

/// Current time as RFC 3339 UTC with millisecond precision
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Weighted mean of mobile and desktop category scores
///
/// Weights: performance 0.2, accessibility 0.15, best practices 0.15,
/// SEO 0.25, applied to the sum of both strategies and halved. The weights
/// total 0.75, so a perfect site scores 75.
pub fn overall_score(mobile: &PerformanceScore, desktop: &PerformanceScore) -> u8 {
    let sum = |a: u8, b: u8| f64::from(a) + f64::from(b);
    let weighted = sum(mobile.performance, desktop.performance) * 0.2
        + sum(mobile.accessibility, desktop.accessibility) * 0.15
        + sum(mobile.best_practices, desktop.best_practices) * 0.15
        + sum(mobile.seo, desktop.seo) * 0.25;
    (weighted / 2.0).round() as u8
}

struct Analyses {
    meta_tags: MetaTagsResult,
    heading_structure: HeadingStructureResult,
    technical_headers: TechnicalHeadersResult,
    image_optimization: ImageOptimizationResult,
    content_analysis: ContentAnalysisResult,
    web_app_features: WebAppFeaturesResult,
    https_security: HttpsSecurityResult,
    structured_data: StructuredDataResult,
    robots_and_sitemap: RobotsAndSitemapResult,
    broken_links: BrokenLinksResult,
}

fn compose(
    url: &str,
    timestamp: String,
    mobile: &PerformanceReport,
    desktop: &PerformanceReport,
    analyses: Analyses,
) -> AuditReport {
    let mobile_score = mobile.categories.to_percent();
    let desktop_score = desktop.categories.to_percent();

    let technical_issues = technical_issues(&Findings {
        https: &analyses.https_security,
        meta_tags: &analyses.meta_tags,
        structured_data: &analyses.structured_data,
        robots_and_sitemap: &analyses.robots_and_sitemap,
        broken_links: &analyses.broken_links,
    });

    AuditReport {
        url: url.to_string(),
        timestamp,
        overall_score: overall_score(&mobile_score, &desktop_score),
        performance: mobile_score.performance,
        accessibility: mobile_score.accessibility,
        best_practices: mobile_score.best_practices,
        seo: mobile_score.seo,
        fcp: mobile.fcp.display.clone(),
        lcp: mobile.lcp.display.clone(),
        fcp_numeric: mobile.fcp.numeric,
        lcp_numeric: mobile.lcp.numeric,
        recommendations: generate_recommendations(&mobile.audits),
        mobile_score,
        desktop_score,
        technical_issues,
        meta_tags: analyses.meta_tags,
        heading_structure: analyses.heading_structure,
        technical_headers: analyses.technical_headers,
        image_optimization: analyses.image_optimization,
        content_analysis: analyses.content_analysis,
        web_app_features: analyses.web_app_features,
        https_security: analyses.https_security,
        structured_data: analyses.structured_data,
        robots_and_sitemap: analyses.robots_and_sitemap,
        broken_links: analyses.broken_links,
    }
}
