//! PageSpeed Insights client
//!
//! One call per strategy. The response is decoded into typed structs that
//! only name the fields the audit reads; a category without a numeric score
//! is treated as a malformed response rather than silently scored as zero.

use crate::config::AuditConfig;
use crate::error::{Error, Result};
use crate::report::PerformanceScore;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Lighthouse categories requested on every call
pub const CATEGORIES: &[&str] = &["performance", "accessibility", "best-practices", "seo"];

/// Device profile Lighthouse emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "lighthouseResult")]
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    categories: Categories,
    #[serde(default)]
    audits: HashMap<String, AuditEntry>,
}

#[derive(Debug, Deserialize)]
struct Categories {
    performance: Option<Category>,
    accessibility: Option<Category>,
    #[serde(rename = "best-practices")]
    best_practices: Option<Category>,
    seo: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditEntry {
    score: Option<f64>,
    display_value: Option<String>,
    numeric_value: Option<f64>,
}

/// Raw category scores in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryScores {
    pub performance: f64,
    pub accessibility: f64,
    pub best_practices: f64,
    pub seo: f64,
}

impl CategoryScores {
    /// Scores as rounded integer percentages
    pub fn to_percent(&self) -> PerformanceScore {
        PerformanceScore {
            performance: percent(self.performance),
            accessibility: percent(self.accessibility),
            best_practices: percent(self.best_practices),
            seo: percent(self.seo),
        }
    }
}

/// Convert a `0.0..=1.0` score to a rounded percentage
pub fn percent(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Lighthouse audit scores used to derive recommendations
///
/// `None` means the audit was absent or not applicable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AuditScores {
    pub unused_css_rules: Option<f64>,
    pub unused_javascript: Option<f64>,
    pub render_blocking_resources: Option<f64>,
    pub meta_description: Option<f64>,
    pub document_title: Option<f64>,
}

/// A paint timing metric as displayed and in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub display: String,
    pub numeric: f64,
}

impl Metric {
    fn from_audit(entry: Option<&AuditEntry>) -> Self {
        let display = entry
            .and_then(|a| a.display_value.as_deref())
            .filter(|v| !v.is_empty())
            .unwrap_or("N/A")
            .to_string();
        let numeric = entry
            .and_then(|a| a.numeric_value)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);

        Self { display, numeric }
    }
}

/// The parts of one PageSpeed run the audit report needs
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub categories: CategoryScores,
    pub fcp: Metric,
    pub lcp: Metric,
    pub audits: AuditScores,
}

impl PerformanceReport {
    /// Decode a PageSpeed v5 response body
    pub fn from_json(body: &str) -> Result<Self> {
        let response: ApiResponse =
            serde_json::from_str(body).map_err(|e| Error::UpstreamSchema(e.to_string()))?;
        let LighthouseResult { categories, audits } = response.lighthouse_result;

        let categories = CategoryScores {
            performance: category_score(categories.performance, "performance")?,
            accessibility: category_score(categories.accessibility, "accessibility")?,
            best_practices: category_score(categories.best_practices, "best-practices")?,
            seo: category_score(categories.seo, "seo")?,
        };

        let audit_score = |id: &str| audits.get(id).and_then(|a| a.score);

        Ok(Self {
            categories,
            fcp: Metric::from_audit(audits.get("first-contentful-paint")),
            lcp: Metric::from_audit(audits.get("largest-contentful-paint")),
            audits: AuditScores {
                unused_css_rules: audit_score("unused-css-rules"),
                unused_javascript: audit_score("unused-javascript"),
                render_blocking_resources: audit_score("render-blocking-resources"),
                meta_description: audit_score("meta-description"),
                document_title: audit_score("document-title"),
            },
        })
    }
}

fn category_score(category: Option<Category>, name: &str) -> Result<f64> {
    category
        .and_then(|c| c.score)
        .ok_or_else(|| Error::UpstreamSchema(format!("category '{}' has no score", name)))
}

/// Map a non-success PageSpeed status to its error
pub fn status_error(status: u16) -> Error {
    match status {
        400 => Error::TargetNotAccessible,
        401 => Error::InvalidApiKey,
        403 => Error::QuotaExceeded,
        429 => Error::RateLimited,
        other => Error::ApiStatus(other),
    }
}

/// Client for the PageSpeed Insights v5 endpoint
#[derive(Debug, Clone)]
pub struct PageSpeedClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl PageSpeedClient {
    /// Use `client` for requests and take the key and endpoint from `config`
    pub fn new(client: Client, config: &AuditConfig) -> Self {
        let api_key = config.has_api_key().then(|| config.api_key.clone()).flatten();
        Self {
            client,
            api_base: config.api_base.clone(),
            api_key,
            timeout: config.pagespeed_timeout,
        }
    }

    /// Whether calls can be made at all
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run Lighthouse against `url` with the given strategy
    pub async fn run(&self, url: &str, strategy: Strategy) -> Result<PerformanceReport> {
        let key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;

        let mut query = vec![("url", url), ("key", key), ("strategy", strategy.as_str())];
        query.extend(CATEGORIES.iter().map(|c| ("category", *c)));

        tracing::debug!(url, %strategy, "calling PageSpeed API");

        let response = self
            .client
            .get(&self.api_base)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, %strategy, status = status.as_u16(), "PageSpeed API call failed");
            return Err(status_error(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(Error::transport)?;

        PerformanceReport::from_json(&body)
    }
}
