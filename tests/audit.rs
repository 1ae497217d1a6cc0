//! End-to-end audits against a mock website and a mock PageSpeed API

mod common;

use common::{API_KEY, PAGESPEED_PATH, auditor, config, dead_url, mount_pagespeed, mount_site};
use seo_audit::{AuditConfig, Auditor, Error};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn full_audit_of_mock_site() {
    let server = MockServer::start().await;
    mount_pagespeed(&server).await;
    mount_site(&server).await;

    let url = format!("{}/", server.uri());
    let report = assert_ok!(auditor(&server).audit(&url).await);

    assert_eq!(report.url, url);
    assert_eq!(report.performance, 80);
    assert_eq!(report.mobile_score.performance, 80);
    assert_eq!(report.desktop_score.performance, 100);
    assert_eq!(report.seo, 90);
    // ((80+100)*0.2 + (90+90)*0.15 + (100+100)*0.15 + (90+90)*0.25) / 2
    assert_eq!(report.overall_score, 69);
    assert_eq!(report.fcp, "1.1 s");
    assert_eq!(report.lcp_numeric, 2200.0);

    let titles: Vec<_> = report.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Optimize CSS"]);

    assert_eq!(
        report.meta_tags.title.as_deref(),
        Some("Acme Widgets - Handmade widgets since 1999")
    );
    assert!(report.meta_tags.title_optimal);
    assert_eq!(report.meta_tags.charset.as_deref(), Some("utf-8"));
    assert_eq!(report.meta_tags.language.as_deref(), Some("en"));

    assert_eq!(report.heading_structure.h1_count, 1);
    assert!(report.heading_structure.proper_hierarchy);

    assert_eq!(report.technical_headers.x_frame_options.as_deref(), Some("DENY"));
    assert!(report.technical_headers.http_only_set);
    assert!(report.technical_headers.same_site_set);
    assert!(!report.technical_headers.secure_set);

    assert_eq!(report.image_optimization.total_images, 2);
    assert_eq!(report.image_optimization.images_without_alt, 1);
    assert_eq!(report.image_optimization.suboptimal_formats, 1);

    assert!(report.content_analysis.has_lang_attribute);
    assert!(report.content_analysis.is_thin_content);

    assert!(report.web_app_features.has_favicon);
    assert!(!report.web_app_features.https_redirect);

    assert!(!report.https_security.is_secure);
    assert_eq!(report.structured_data.types, vec!["Organization"]);

    assert!(report.robots_and_sitemap.robots_exists);
    assert!(!report.robots_and_sitemap.sitemap_exists);

    // mailto is counted but never probed
    assert_eq!(report.broken_links.total_checked, 3);
    assert_eq!(
        report.broken_links.broken_links,
        vec![format!("{}/missing", server.uri())]
    );

    let issues: Vec<_> = report
        .technical_issues
        .iter()
        .map(|i| i.issue.as_str())
        .collect();
    assert_eq!(
        issues,
        vec!["No HTTPS", "Missing sitemap.xml", "1 Broken Links Found"]
    );
}

#[tokio::test]
async fn unreachable_site_degrades_to_fallbacks() {
    let server = MockServer::start().await;
    mount_pagespeed(&server).await;

    let report = assert_ok!(auditor(&server).audit(&dead_url()).await);

    assert_eq!(report.meta_tags.title, None);
    assert!(!report.meta_tags.has_all_required_tags);
    assert_eq!(
        report.heading_structure.recommendations,
        vec!["Unable to analyze heading structure"]
    );
    assert_eq!(
        report.image_optimization.recommendations,
        vec!["Unable to analyze images"]
    );
    assert!(report.content_analysis.is_thin_content);
    assert_eq!(
        report.structured_data.errors,
        vec!["Could not analyze structured data"]
    );
    assert!(!report.robots_and_sitemap.robots_exists);
    assert_eq!(report.broken_links.total_checked, 0);

    // Scores still come from PageSpeed
    assert_eq!(report.overall_score, 69);

    let issues: Vec<_> = report
        .technical_issues
        .iter()
        .map(|i| i.issue.as_str())
        .collect();
    assert_eq!(
        issues,
        vec![
            "No HTTPS",
            "Missing Title Tag",
            "Missing Meta Description",
            "No Structured Data",
            "Missing robots.txt",
            "Missing sitemap.xml",
        ]
    );
}

#[tokio::test]
async fn pagespeed_status_codes_fail_the_audit() {
    for (status, expected) in [
        (400, "Invalid URL or URL is not accessible"),
        (401, "Invalid API key"),
        (403, "API quota exceeded or access denied"),
        (429, "Rate limit exceeded. Please try again later"),
        (503, "PageSpeed API error: 503"),
    ] {
        let server = MockServer::start().await;
        common::mount_pagespeed_status(&server, status).await;
        mount_site(&server).await;

        let url = format!("{}/", server.uri());
        let err = assert_err!(auditor(&server).audit(&url).await);
        assert_eq!(err.to_string(), expected);
        assert!(err.is_upstream());
    }
}

#[tokio::test]
async fn pagespeed_has_its_own_timeout() {
    let server = MockServer::start().await;
    common::mount_slow_pagespeed(&server, Duration::from_millis(1500)).await;
    mount_site(&server).await;

    // Analyzer requests are bounded at 1 s, PageSpeed at 10 s
    let config = AuditConfig {
        request_timeout: Duration::from_secs(1),
        pagespeed_timeout: Duration::from_secs(10),
        ..config(&server)
    };
    let auditor = Auditor::new(config).unwrap();

    let report = assert_ok!(auditor.audit(&format!("{}/", server.uri())).await);
    assert_eq!(report.overall_score, 69);
}

#[tokio::test]
async fn pagespeed_transport_error_hides_request_url() {
    let server = MockServer::start().await;
    common::mount_slow_pagespeed(&server, Duration::from_secs(3)).await;
    mount_site(&server).await;

    let config = AuditConfig {
        pagespeed_timeout: Duration::from_millis(500),
        ..config(&server)
    };
    let auditor = Auditor::new(config).unwrap();

    let err = assert_err!(auditor.audit(&format!("{}/", server.uri())).await);
    assert!(matches!(err, Error::HttpRequest(_)));
    assert!(!err.to_string().contains(API_KEY));
    assert!(!err.to_string().contains(PAGESPEED_PATH));
}

#[tokio::test]
async fn null_category_score_is_rejected() {
    let server = MockServer::start().await;
    let mut body = common::pagespeed_body(0.8, 0.9, 1.0, 0.9);
    body["lighthouseResult"]["categories"]["seo"]["score"] = serde_json::Value::Null;

    Mock::given(method("GET"))
        .and(path(PAGESPEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    mount_site(&server).await;

    let url = format!("{}/", server.uri());
    let err = assert_err!(auditor(&server).audit(&url).await);
    assert!(matches!(err, Error::UpstreamSchema(_)));
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let server = MockServer::start().await;
    mount_pagespeed(&server).await;
    mount_site(&server).await;

    let config = AuditConfig::builder()
        .api_base(format!("{}{}", server.uri(), PAGESPEED_PATH))
        .allow_private(true)
        .build();
    let auditor = Auditor::new(config).unwrap();

    let err = assert_err!(auditor.audit(&format!("{}/", server.uri())).await);
    assert!(matches!(err, Error::MissingApiKey));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request may be sent without a key");
}

#[tokio::test]
async fn blank_api_key_counts_as_missing() {
    let server = MockServer::start().await;
    let config = AuditConfig {
        api_key: Some("   ".to_string()),
        ..config(&server)
    };
    let auditor = Auditor::new(config).unwrap();

    let err = assert_err!(auditor.audit(&format!("{}/", server.uri())).await);
    assert!(matches!(err, Error::MissingApiKey));
}

#[tokio::test]
async fn private_targets_refused_by_default() {
    let server = MockServer::start().await;
    let config = AuditConfig::builder().api_key(API_KEY).build();
    let auditor = Auditor::new(config).unwrap();

    let err = assert_err!(auditor.audit(&format!("{}/", server.uri())).await);
    assert!(err.is_validation());
}
