//! Audit request validation and the report produced by one audit run
//!
//! Records serialize in camelCase so the JSON matches what report consumers
//! (dashboards, exporters, storage) already read.

use crate::analyzers::{
    BrokenLinksResult, ContentAnalysisResult, HeadingStructureResult, HttpsSecurityResult,
    ImageOptimizationResult, MetaTagsResult, RobotsAndSitemapResult, StructuredDataResult,
    TechnicalHeadersResult, WebAppFeaturesResult,
};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// One problem found while validating an audit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable issue code
    pub code: String,
    /// Path of the offending field
    pub path: Vec<String>,
    /// Human-readable message
    pub message: String,
}

impl ValidationIssue {
    fn new(code: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    /// Free-form issue on `field`
    pub fn custom(field: &str, message: impl Into<String>) -> Self {
        Self::new("custom", field, message)
    }
}

/// A validated audit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    raw: String,
    url: Url,
}

impl AuditRequest {
    /// Validate a URL string
    pub fn new(url: &str) -> Result<Self> {
        let mut issues = Vec::new();
        let parsed = Fetcher::parse_target(url);

        if parsed.is_err() {
            issues.push(ValidationIssue::new(
                "invalid_string",
                "url",
                "Please enter a valid URL",
            ));
        }
        if url.is_empty() {
            issues.push(ValidationIssue::new("too_small", "url", "URL is required"));
        }

        match parsed {
            Ok(parsed) if issues.is_empty() => Ok(Self {
                raw: url.to_string(),
                url: parsed,
            }),
            _ => Err(Error::InvalidRequest(issues)),
        }
    }

    /// Validate a JSON request body of the form `{"url": "..."}`
    pub fn from_json(body: &Value) -> Result<Self> {
        match body.get("url") {
            Some(Value::String(url)) => Self::new(url),
            Some(other) => Err(Error::InvalidRequest(vec![ValidationIssue::new(
                "invalid_type",
                "url",
                format!("Expected string, received {}", json_type_name(other)),
            )])),
            None => Err(Error::InvalidRequest(vec![ValidationIssue::new(
                "invalid_type",
                "url",
                "Required",
            )])),
        }
    }

    /// The URL exactly as submitted
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Category scores for one strategy, as integer percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceScore {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

/// Expected effect of acting on a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
    Positive,
}

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Performance,
    Seo,
    Success,
}

/// A prioritized suggestion derived from PageSpeed audits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub impact: Impact,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
}

/// Issue severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// A technical problem found by one of the analyzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalIssue {
    pub category: String,
    pub issue: String,
    pub severity: Severity,
    pub description: String,
}

/// The complete result of one audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub url: String,
    pub timestamp: String,
    pub overall_score: u8,
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
    pub fcp: String,
    pub lcp: String,
    pub fcp_numeric: f64,
    pub lcp_numeric: f64,
    pub recommendations: Vec<Recommendation>,
    pub mobile_score: PerformanceScore,
    pub desktop_score: PerformanceScore,
    pub technical_issues: Vec<TechnicalIssue>,
    pub meta_tags: MetaTagsResult,
    pub heading_structure: HeadingStructureResult,
    pub technical_headers: TechnicalHeadersResult,
    pub image_optimization: ImageOptimizationResult,
    pub content_analysis: ContentAnalysisResult,
    pub web_app_features: WebAppFeaturesResult,
    pub https_security: HttpsSecurityResult,
    pub structured_data: StructuredDataResult,
    pub robots_and_sitemap: RobotsAndSitemapResult,
    pub broken_links: BrokenLinksResult,
}
