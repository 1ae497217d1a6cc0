//! Error types for seo-audit

use crate::report::ValidationIssue;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during SEO audit operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid URL provided
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Audit request failed validation
    #[error("Invalid request data")]
    InvalidRequest(Vec<ValidationIssue>),

    /// PageSpeed API key missing from the environment
    #[error("Google PageSpeed API key is not configured")]
    MissingApiKey,

    /// PageSpeed API rejected the target URL (400)
    #[error("Invalid URL or URL is not accessible")]
    TargetNotAccessible,

    /// PageSpeed API rejected the key (401)
    #[error("Invalid API key")]
    InvalidApiKey,

    /// PageSpeed API quota exhausted or access denied (403)
    #[error("API quota exceeded or access denied")]
    QuotaExceeded,

    /// PageSpeed API rate limit hit (429)
    #[error("Rate limit exceeded. Please try again later")]
    RateLimited,

    /// Any other non-success PageSpeed API status
    #[error("PageSpeed API error: {0}")]
    ApiStatus(u16),

    /// PageSpeed API answered with a body missing required fields
    #[error("unexpected PageSpeed API response: {0}")]
    UpstreamSchema(String),

    /// Failed to create HTTP client
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    /// Invalid output format specified
    #[error("invalid output format: '{0}' (valid: human, json, none)")]
    InvalidOutputFormat(String),

    /// Invalid output sort order specified
    #[error("invalid output sort: '{0}' (valid: rule, severity)")]
    InvalidOutputSort(String),

    /// Output operation failed
    #[error("output failed: {0}")]
    OutputFailed(#[source] std::io::Error),

    /// JSON serialization failed
    #[error("JSON serialization failed")]
    SerializationFailed(#[from] serde_json::Error),

    /// HTTP server could not bind or stopped unexpectedly
    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}

impl Error {
    /// Transport failure with the request URL left out of the message
    ///
    /// PageSpeed request URLs carry the API key.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::HttpRequest(err.without_url().to_string())
    }

    /// Whether the error was caused by the caller's input rather than by
    /// the audit itself
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::InvalidRequest(_))
    }

    /// Whether the error came from the PageSpeed API or its configuration
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey
                | Self::TargetNotAccessible
                | Self::InvalidApiKey
                | Self::QuotaExceeded
                | Self::RateLimited
                | Self::ApiStatus(_)
                | Self::UpstreamSchema(_)
        )
    }

    /// Validation issues carried by this error, if any
    ///
    /// A plain [`Error::InvalidUrl`] is reported as a single issue on `url`.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        match self {
            Self::InvalidRequest(issues) => issues.clone(),
            Self::InvalidUrl(reason) => vec![ValidationIssue::custom("url", reason)],
            _ => Vec::new(),
        }
    }
}
