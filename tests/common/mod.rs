//! Shared fixtures: a mock website and a mock PageSpeed endpoint on one
//! wiremock server

#![allow(dead_code)]

use seo_audit::{AuditConfig, Auditor};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const PAGESPEED_PATH: &str = "/pagespeedonline/v5/runPagespeed";

pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Acme Widgets - Handmade widgets since 1999</title>
    <meta name="description" content="Acme builds sturdy handmade widgets for homes and workshops, shipped worldwide with a lifetime warranty and friendly support.">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="icon" href="/favicon.ico">
    <script type="application/ld+json">{"@context":"https://schema.org","@type":"Organization","name":"Acme"}</script>
</head>
<body>
    <h1>Acme Widgets</h1>
    <h2>Catalog</h2>
    <img src="/hero.webp" alt="Workshop">
    <img src="/team.png">
    <p>Every widget is made by hand.</p>
    <a href="/about">About</a>
    <a href="/missing">Old page</a>
    <a href="mailto:hello@acme.test">Mail us</a>
</body>
</html>"#;

/// Lighthouse response with the given category scores
pub fn pagespeed_body(performance: f64, accessibility: f64, best_practices: f64, seo: f64) -> Value {
    json!({
        "lighthouseResult": {
            "categories": {
                "performance": { "score": performance },
                "accessibility": { "score": accessibility },
                "best-practices": { "score": best_practices },
                "seo": { "score": seo }
            },
            "audits": {
                "first-contentful-paint": { "displayValue": "1.1 s", "numericValue": 1100.0 },
                "largest-contentful-paint": { "displayValue": "2.2 s", "numericValue": 2200.0 },
                "unused-css-rules": { "score": 0.5 },
                "unused-javascript": { "score": 1 },
                "render-blocking-resources": { "score": null },
                "meta-description": { "score": 1 },
                "document-title": { "score": 1 }
            }
        }
    })
}

/// PageSpeed answers mobile 80/90/100/90 and desktop 100/90/100/90
pub async fn mount_pagespeed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PAGESPEED_PATH))
        .and(query_param("key", API_KEY))
        .and(query_param("strategy", "mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pagespeed_body(0.8, 0.9, 1.0, 0.9)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(PAGESPEED_PATH))
        .and(query_param("key", API_KEY))
        .and(query_param("strategy", "desktop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pagespeed_body(1.0, 0.9, 1.0, 0.9)))
        .mount(server)
        .await;
}

/// PageSpeed answers normally, but only after `delay`
pub async fn mount_slow_pagespeed(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(PAGESPEED_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pagespeed_body(0.8, 0.9, 1.0, 0.9))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// PageSpeed answers every call with `status`
pub async fn mount_pagespeed_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(PAGESPEED_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Home page, robots.txt without sitemap.xml, one live and one dead link
pub async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("x-frame-options", "DENY")
                .insert_header("set-cookie", "session=abc; HttpOnly; SameSite=Lax")
                .set_body_string(HOME_PAGE),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /admin\n"),
        )
        .mount(server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Config pointing PageSpeed at the mock server, with private targets allowed
pub fn config(server: &MockServer) -> AuditConfig {
    AuditConfig::builder()
        .api_key(API_KEY)
        .api_base(format!("{}{}", server.uri(), PAGESPEED_PATH))
        .request_timeout(Duration::from_secs(5))
        .link_timeout(Duration::from_secs(2))
        .allow_private(true)
        .build()
}

pub fn auditor(server: &MockServer) -> Auditor {
    Auditor::new(config(server)).expect("auditor builds")
}

/// A local URL nothing is listening on
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/", addr)
}
