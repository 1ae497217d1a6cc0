//! Recommendation and technical-issue synthesis
//!
//! Both lists are built in a fixed rule order, so the same inputs always
//! produce the same report.

use crate::analyzers::{
    BrokenLinksResult, HttpsSecurityResult, MetaTagsResult, RobotsAndSitemapResult,
    StructuredDataResult,
};
use crate::pagespeed::AuditScores;
use crate::report::{Impact, Recommendation, RecommendationType, Severity, TechnicalIssue};

/// Score below which a performance audit yields a recommendation
const PERFORMANCE_THRESHOLD: f64 = 0.9;

/// Score below which an SEO audit yields a recommendation
const SEO_THRESHOLD: f64 = 1.0;

struct Rule {
    score: fn(&AuditScores) -> Option<f64>,
    threshold: f64,
    title: &'static str,
    description: &'static str,
    impact: Impact,
    kind: RecommendationType,
}

const RULES: &[Rule] = &[
    Rule {
        score: |a| a.unused_css_rules,
        threshold: PERFORMANCE_THRESHOLD,
        title: "Optimize CSS",
        description: "Remove unused CSS rules to reduce file size and improve loading performance.",
        impact: Impact::Medium,
        kind: RecommendationType::Performance,
    },
    Rule {
        score: |a| a.unused_javascript,
        threshold: PERFORMANCE_THRESHOLD,
        title: "Optimize JavaScript",
        description: "Remove unused JavaScript code to reduce bundle size and improve performance.",
        impact: Impact::Medium,
        kind: RecommendationType::Performance,
    },
    // Labelled as an image issue although it comes from render-blocking-resources
    Rule {
        score: |a| a.render_blocking_resources,
        threshold: PERFORMANCE_THRESHOLD,
        title: "Optimize Images",
        description: "Large images are slowing down your Largest Contentful Paint. Consider using WebP format and proper sizing.",
        impact: Impact::Medium,
        kind: RecommendationType::Performance,
    },
    Rule {
        score: |a| a.meta_description,
        threshold: SEO_THRESHOLD,
        title: "Add Meta Description",
        description: "Some pages are missing meta descriptions which help search engines understand your content.",
        impact: Impact::Low,
        kind: RecommendationType::Seo,
    },
    Rule {
        score: |a| a.document_title,
        threshold: SEO_THRESHOLD,
        title: "Optimize Page Titles",
        description: "Ensure all pages have descriptive, unique titles for better SEO.",
        impact: Impact::Medium,
        kind: RecommendationType::Seo,
    },
];

/// Recommendations derived from the mobile run's audit scores
///
/// Never empty: when no rule fires, a single "Excellent Performance"
/// entry is returned.
pub fn generate_recommendations(audits: &AuditScores) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| (rule.score)(audits).is_some_and(|score| score < rule.threshold))
        .map(|rule| Recommendation {
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            impact: rule.impact,
            kind: rule.kind,
        })
        .collect();

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            title: "Excellent Performance".to_string(),
            description:
                "Your website follows web performance best practices well. Keep up the good work!"
                    .to_string(),
            impact: Impact::Positive,
            kind: RecommendationType::Success,
        });
    }

    recommendations
}

/// Analyzer findings that feed the technical-issue list
#[derive(Debug, Clone, Copy)]
pub struct Findings<'a> {
    pub https: &'a HttpsSecurityResult,
    pub meta_tags: &'a MetaTagsResult,
    pub structured_data: &'a StructuredDataResult,
    pub robots_and_sitemap: &'a RobotsAndSitemapResult,
    pub broken_links: &'a BrokenLinksResult,
}

fn issue(
    category: &str,
    issue: impl Into<String>,
    severity: Severity,
    description: impl Into<String>,
) -> TechnicalIssue {
    TechnicalIssue {
        category: category.to_string(),
        issue: issue.into(),
        severity,
        description: description.into(),
    }
}

/// Technical issues in rule order
pub fn technical_issues(findings: &Findings<'_>) -> Vec<TechnicalIssue> {
    let mut issues = Vec::new();

    if !findings.https.is_secure {
        issues.push(issue(
            "Security",
            "No HTTPS",
            Severity::High,
            "Website is not using HTTPS, which affects SEO rankings and user trust.",
        ));
    }

    if findings.meta_tags.title.is_none() {
        issues.push(issue(
            "SEO",
            "Missing Title Tag",
            Severity::High,
            "Page is missing a title tag, which is crucial for SEO.",
        ));
    }

    if findings.meta_tags.description.is_none() {
        issues.push(issue(
            "SEO",
            "Missing Meta Description",
            Severity::Medium,
            "Page is missing a meta description, which helps search engines understand content.",
        ));
    }

    if !findings.structured_data.has_schema {
        issues.push(issue(
            "SEO",
            "No Structured Data",
            Severity::Low,
            "No structured data found. Adding Schema markup can improve search visibility.",
        ));
    }

    if !findings.robots_and_sitemap.robots_exists {
        issues.push(issue(
            "SEO",
            "Missing robots.txt",
            Severity::Medium,
            "robots.txt file not found. This file helps search engines understand how to crawl your site.",
        ));
    }

    if !findings.robots_and_sitemap.sitemap_exists {
        issues.push(issue(
            "SEO",
            "Missing sitemap.xml",
            Severity::Medium,
            "sitemap.xml file not found. This helps search engines discover and index your pages.",
        ));
    }

    let broken = findings.broken_links.broken_links.len();
    if broken > 0 {
        issues.push(issue(
            "SEO",
            format!("{} Broken Links Found", broken),
            Severity::High,
            format!(
                "Found {} broken links out of {} checked. Broken links hurt user experience and SEO.",
                broken, findings.broken_links.total_checked
            ),
        ));
    }

    issues
}
