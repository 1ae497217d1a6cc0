//! SEO Audit - Website SEO and performance auditor
//!
//! Combines Google PageSpeed Insights scores for mobile and desktop with ten
//! on-page analyzers (meta tags, headings, headers, images, content, web app
//! features, HTTPS, structured data, robots/sitemap and broken links) into a
//! single report.
//!
//! # Example
//!
//! ```no_run
//! use seo_audit::{AuditConfig, Auditor};
//!
//! #[tokio::main]
//! async fn main() -> seo_audit::Result<()> {
//!     let auditor = Auditor::new(AuditConfig::from_env())?;
//!     let report = auditor.audit("https://example.com").await?;
//!     println!("Overall score: {}", report.overall_score);
//!     Ok(())
//! }
//! ```

pub mod analyzers;
pub mod audit;
pub mod config;
pub mod error;
pub mod fetch;
pub mod health;
pub mod output;
pub mod pagespeed;
pub mod recommendations;
pub mod report;
pub mod server;

pub use audit::Auditor;
pub use config::{AuditConfig, AuditConfigBuilder};
pub use error::{Error, Result};
pub use health::HealthReport;
pub use output::{OutputConfig, OutputFormat, OutputSort, output_report};
pub use report::{AuditReport, AuditRequest, Recommendation, TechnicalIssue};
pub use server::{AppState, router, serve};
