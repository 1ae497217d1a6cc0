//! On-page analyzers
//!
//! Each analyzer fetches what it needs through the shared
//! [`Fetcher`](crate::fetch::Fetcher) and turns it into a typed result. The
//! parsing step is a pure function (`from_html`, `from_headers`, ...) so it
//! can be tested without a network. When the fetch fails, the audit
//! substitutes the analyzer's `fallback()` value instead of failing.

pub mod content;
pub mod headers;
pub mod headings;
pub mod https;
pub mod images;
pub mod links;
pub mod meta_tags;
pub mod robots;
pub mod structured_data;
pub mod web_app;

pub use content::ContentAnalysisResult;
pub use headers::TechnicalHeadersResult;
pub use headings::HeadingStructureResult;
pub use https::HttpsSecurityResult;
pub use images::ImageOptimizationResult;
pub use links::BrokenLinksResult;
pub use meta_tags::MetaTagsResult;
pub use robots::RobotsAndSitemapResult;
pub use structured_data::StructuredDataResult;
pub use web_app::WebAppFeaturesResult;
