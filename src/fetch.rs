//! Outbound HTTP for the audit pipeline
//!
//! Every analyzer performs its own GET through a shared [`Fetcher`]. The
//! fetcher also owns target validation: only `http`/`https` URLs are
//! accepted, and hosts resolving to internal networks are refused unless
//! private targets were explicitly allowed.
//!
//! With private targets refused, the clients enforce the same rule on every
//! connection they open: names resolve through [`SafeResolver`], and each
//! redirect hop to `localhost` or an internal IP literal is stopped.

use crate::config::AuditConfig;
use crate::error::{Error, Result};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::header::{ACCEPT_ENCODING, HeaderMap};
use reqwest::{Client, ClientBuilder, redirect};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use url::{Host, Url};

/// Allowed URL schemes
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Encodings advertised when probing for response compression
const PROBE_ENCODINGS: &str = "gzip, deflate, br";

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// A fetched response: status, headers and full body text
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Body decoded as text
    pub body: String,
}

impl FetchedPage {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read a header value, merging repeated headers the way the Fetch
/// standard's `Headers.get` does
pub fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Shared HTTP client for all analyzers
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    no_redirect: Client,
    link_timeout: Duration,
    allow_private: bool,
}

impl Fetcher {
    /// Build the clients described by `config`
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let client = Self::builder(config)
            .redirect(redirect_policy(config.allow_private))
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        let no_redirect = Self::builder(config)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            no_redirect,
            link_timeout: config.link_timeout,
            allow_private: config.allow_private,
        })
    }

    fn builder(config: &AuditConfig) -> ClientBuilder {
        let builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout);

        if config.allow_private {
            builder
        } else {
            builder.dns_resolver(Arc::new(SafeResolver))
        }
    }

    /// The general-purpose client (also used for the PageSpeed API)
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Parse a URL and check that its scheme is allowed
    pub fn parse_target(url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(Error::InvalidUrl(format!(
                "scheme '{}' not allowed (use http or https)",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidUrl("missing host".to_string()));
        }

        Ok(parsed)
    }

    /// Refuse targets on internal networks (SSRF protection)
    ///
    /// A no-op when private targets are allowed.
    pub async fn guard(&self, url: &Url) -> Result<()> {
        if self.allow_private {
            return Ok(());
        }

        let host = url
            .host()
            .ok_or_else(|| Error::InvalidUrl("missing host".to_string()))?;

        if let Some(reason) = refused_host(&host) {
            return Err(Error::InvalidUrl(reason));
        }

        let Host::Domain(host) = host else {
            return Ok(());
        };
        let port = url.port_or_known_default().unwrap_or(443);

        // Unresolvable hosts are left for the analyzers to fail on
        if let Ok(addrs) = tokio::net::lookup_host((host, port)).await {
            for addr in addrs {
                if is_internal_ip(addr.ip()) {
                    return Err(Error::InvalidUrl(format!(
                        "internal/private IP address not allowed: {}",
                        addr.ip()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Single GET; non-success statuses are returned, not treated as errors
    pub async fn get(&self, url: &Url) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(Error::transport)?;

        Ok(FetchedPage {
            status,
            headers,
            body,
        })
    }

    /// GET advertising compression support, returning only the headers
    ///
    /// The body is never read, so a compressed body needs no decoder.
    pub async fn get_headers(&self, url: &Url) -> Result<HeaderMap> {
        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT_ENCODING, PROBE_ENCODINGS)
            .send()
            .await
            .map_err(Error::transport)?;

        Ok(response.headers().clone())
    }

    /// GET with redirects disabled, returning the raw status
    pub async fn status_without_redirect(&self, url: &Url) -> Result<u16> {
        let response = self
            .no_redirect
            .get(url.as_str())
            .send()
            .await
            .map_err(Error::transport)?;

        Ok(response.status().as_u16())
    }

    /// HEAD-probe a link with the per-link timeout
    pub async fn probe(&self, url: &str) -> LinkProbe {
        match self
            .client
            .head(url)
            .timeout(self.link_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => LinkProbe::Alive,
            Ok(response) => LinkProbe::Status(response.status().as_u16()),
            Err(e) => {
                tracing::debug!(url, error = %e, "link probe failed");
                LinkProbe::Failed
            }
        }
    }
}

/// Redirect policy re-checking every hop when private targets are refused
///
/// Only hosts that need no lookup are checked here; names are covered by
/// [`SafeResolver`] when the hop connects.
fn redirect_policy(allow_private: bool) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if !allow_private
            && let Some(reason) = attempt.url().host().as_ref().and_then(refused_host)
        {
            return attempt.error(format!("redirect refused: {}", reason));
        }
        attempt.follow()
    })
}

/// Why `host` is refused without a DNS lookup, if it is
fn refused_host(host: &Host<&str>) -> Option<String> {
    let ip = match *host {
        Host::Domain(name) if name == "localhost" || name.ends_with(".localhost") => {
            return Some("localhost not allowed".to_string());
        }
        Host::Domain(_) => return None,
        Host::Ipv4(ip) => IpAddr::V4(ip),
        Host::Ipv6(ip) => IpAddr::V6(ip),
    };

    is_internal_ip(ip).then(|| format!("internal/private IP address not allowed: {}", ip))
}

/// DNS resolver that drops internal addresses
///
/// Resolution fails when every address of a name is internal, so no
/// connection is attempted.
#[derive(Debug, Clone, Copy)]
pub struct SafeResolver;

impl Resolve for SafeResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = format!("{}:0", name.as_str());
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&host)
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .filter(|addr| !is_internal_ip(addr.ip()))
                .collect();

            if addrs.is_empty() {
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("all addresses of '{}' are internal", name.as_str()),
                )) as Box<dyn std::error::Error + Send + Sync>);
            }

            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok(addrs)
        })
    }
}

/// Outcome of a HEAD probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkProbe {
    /// 2xx response
    Alive,
    /// Any other status
    Status(u16),
    /// Timed out or failed at the transport level
    Failed,
}

/// Check if an IP address is internal/private (RFC 1918, link-local, loopback, etc.)
pub fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_loopback()                      // 127.0.0.0/8
                || ipv4.is_private()                // 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
                || ipv4.is_link_local()             // 169.254.0.0/16
                || ipv4.is_broadcast()              // 255.255.255.255
                || ipv4.is_unspecified()            // 0.0.0.0
                || ipv4.octets()[0] == 100          // Shared address space 100.64.0.0/10
                    && ipv4.octets()[1] >= 64
                    && ipv4.octets()[1] <= 127
                || is_reserved_v4(ipv4.octets())
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()                      // ::1
                || ipv6.is_unspecified()            // ::
                // Unique local addresses (fc00::/7)
                || (ipv6.segments()[0] & 0xfe00) == 0xfc00
                // Link-local (fe80::/10)
                || (ipv6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// IETF protocol assignments, benchmarking and documentation ranges
fn is_reserved_v4(octets: [u8; 4]) -> bool {
    match octets {
        [192, 0, 0 | 2, _] => true,        // 192.0.0.0/24, 192.0.2.0/24
        [198, 18 | 19, _, _] => true,      // 198.18.0.0/15
        [198, 51, 100, _] => true,         // 198.51.100.0/24
        [203, 0, 113, _] => true,          // 203.0.113.0/24
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::net::Ipv4Addr;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&AuditConfig::default()).unwrap()
    }

    #[test]
    fn parse_valid_url() {
        let url = Fetcher::parse_target("https://example.com/page").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn parse_invalid_url() {
        assert!(Fetcher::parse_target("not a url").is_err());
    }

    #[test]
    fn reject_file_scheme() {
        let result = Fetcher::parse_target("file:///etc/passwd");
        assert!(result.unwrap_err().to_string().contains("scheme"));
    }

    #[test]
    fn reject_ftp_scheme() {
        let result = Fetcher::parse_target("ftp://example.com");
        assert!(result.unwrap_err().to_string().contains("scheme"));
    }

    #[tokio::test]
    async fn reject_localhost() {
        let url = Url::parse("http://localhost").unwrap();
        let result = fetcher().guard(&url).await;
        assert!(result.unwrap_err().to_string().contains("localhost"));
    }

    #[tokio::test]
    async fn reject_localhost_subdomain() {
        let url = Url::parse("http://foo.localhost").unwrap();
        assert!(fetcher().guard(&url).await.is_err());
    }

    #[tokio::test]
    async fn reject_loopback_literal() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        let result = fetcher().guard(&url).await;
        assert!(result.unwrap_err().to_string().contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn allow_private_skips_guard() {
        let config = AuditConfig::builder().allow_private(true).build();
        let fetcher = Fetcher::new(&config).unwrap();
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert!(fetcher.guard(&url).await.is_ok());
    }

    #[test]
    fn internal_ip_detection() {
        // Private ranges
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1))));
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));

        // Loopback
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))));

        // Link-local, including the cloud metadata address
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(169, 254, 169, 254))));

        // Shared address space
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(100, 64, 0, 1))));
        assert!(!is_internal_ip(IpAddr::V4(Ipv4Addr::new(100, 128, 0, 1))));

        // Documentation and benchmarking ranges
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))));
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(192, 0, 0, 8))));
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(198, 19, 4, 1))));
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7))));
        assert!(is_internal_ip(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5))));

        // Public IP should pass
        assert!(!is_internal_ip(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
        assert!(!is_internal_ip(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))));
    }

    #[test]
    fn rest_of_192_0_is_public() {
        // WordPress.com hosting
        assert!(!is_internal_ip(IpAddr::V4(Ipv4Addr::new(192, 0, 78, 9))));
        assert!(!is_internal_ip(IpAddr::V4(Ipv4Addr::new(192, 0, 1, 1))));
        assert!(!is_internal_ip(IpAddr::V4(Ipv4Addr::new(198, 20, 0, 1))));
    }

    #[tokio::test]
    async fn public_ip_literal_passes_guard() {
        let url = Url::parse("http://192.0.78.9/").unwrap();
        assert!(fetcher().guard(&url).await.is_ok());
    }

    #[tokio::test]
    async fn resolver_refuses_localhost() {
        use std::str::FromStr;
        let name = Name::from_str("localhost").unwrap();
        assert!(SafeResolver.resolve(name).await.is_err());
    }

    #[tokio::test]
    async fn status_without_redirect_reports_301() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "https://example.com/new"),
            )
            .mount(&server)
            .await;

        let config = AuditConfig::builder().allow_private(true).build();
        let fetcher = Fetcher::new(&config).unwrap();
        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();

        assert_eq!(fetcher.status_without_redirect(&url).await.unwrap(), 301);
    }

    #[tokio::test]
    async fn redirect_to_internal_address_is_refused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/secret", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
            .expect(0)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/hop", server.uri())).unwrap();
        let err = fetcher().get(&url).await.unwrap_err();
        assert!(matches!(err, Error::HttpRequest(_)));
    }

    #[tokio::test]
    async fn redirects_followed_when_private_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/landing", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200).set_body_string("landed"))
            .mount(&server)
            .await;

        let config = AuditConfig::builder().allow_private(true).build();
        let fetcher = Fetcher::new(&config).unwrap();
        let url = Url::parse(&format!("{}/hop", server.uri())).unwrap();

        let page = fetcher.get(&url).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "landed");
    }

    #[test]
    fn repeated_headers_are_merged() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1; HttpOnly"));
        headers.append("set-cookie", HeaderValue::from_static("b=2; Secure"));

        assert_eq!(
            header_value(&headers, "set-cookie").as_deref(),
            Some("a=1; HttpOnly, b=2; Secure")
        );
        assert_eq!(header_value(&headers, "etag"), None);
    }
}
