//! Audit configuration
//!
//! Everything that varies between deployments lives here: the PageSpeed API
//! key and endpoint, outbound timeouts, and whether private network targets
//! may be audited.

use std::time::Duration;

/// Environment variable holding the PageSpeed API key
pub const API_KEY_ENV: &str = "GOOGLE_PAGESPEED_API_KEY";

/// PageSpeed Insights v5 endpoint
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// User agent for requests (standard Chrome on Windows)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// PageSpeed call timeout in seconds; a Lighthouse run can take over a minute
pub const DEFAULT_PAGESPEED_TIMEOUT_SECS: u64 = 120;

/// Timeout for a single broken-link probe in seconds
pub const LINK_PROBE_TIMEOUT_SECS: u64 = 3;

/// Maximum number of anchors probed by the broken-link checker
pub const MAX_LINKS_CHECKED: usize = 10;

/// Runtime configuration for an audit
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// PageSpeed API key; absence fails every audit
    pub api_key: Option<String>,
    /// PageSpeed endpoint URL
    pub api_base: String,
    /// Upper bound for any single outbound request
    pub request_timeout: Duration,
    /// Upper bound for one PageSpeed call
    pub pagespeed_timeout: Duration,
    /// Upper bound for one broken-link HEAD probe
    pub link_timeout: Duration,
    /// Number of anchors the broken-link checker looks at
    pub max_links: usize,
    /// User agent sent to audited sites
    pub user_agent: String,
    /// Allow auditing private/internal addresses
    pub allow_private: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pagespeed_timeout: Duration::from_secs(DEFAULT_PAGESPEED_TIMEOUT_SECS),
            link_timeout: Duration::from_secs(LINK_PROBE_TIMEOUT_SECS),
            max_links: MAX_LINKS_CHECKED,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private: false,
        }
    }
}

impl AuditConfig {
    /// Create a builder starting from defaults
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Defaults with the API key taken from [`API_KEY_ENV`]
    pub fn from_env() -> Self {
        Self::builder().api_key_from_env().build()
    }

    /// Whether a usable API key is present
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Builder for [`AuditConfig`]
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    /// Set the PageSpeed API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the API key only if one was supplied
    pub fn maybe_api_key(mut self, key: Option<String>) -> Self {
        if key.is_some() {
            self.config.api_key = key;
        }
        self
    }

    /// Read the API key from [`API_KEY_ENV`], if set
    pub fn api_key_from_env(self) -> Self {
        let key = std::env::var(API_KEY_ENV).ok();
        self.maybe_api_key(key)
    }

    /// Override the PageSpeed endpoint (used by tests and proxies)
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    /// Bound every outbound request
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Bound each PageSpeed call
    pub fn pagespeed_timeout(mut self, timeout: Duration) -> Self {
        self.config.pagespeed_timeout = timeout;
        self
    }

    /// Bound each broken-link probe
    pub fn link_timeout(mut self, timeout: Duration) -> Self {
        self.config.link_timeout = timeout;
        self
    }

    /// Change how many anchors are probed
    pub fn max_links(mut self, max: usize) -> Self {
        self.config.max_links = max;
        self
    }

    /// Override the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Allow auditing private/internal IP addresses (localhost, 192.168.x.x, etc.)
    ///
    /// By default, SSRF protection blocks requests to internal networks.
    pub fn allow_private(mut self, allow: bool) -> Self {
        self.config.allow_private = allow;
        self
    }

    /// Finish building
    pub fn build(self) -> AuditConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AuditConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.link_timeout, Duration::from_secs(3));
        assert_eq!(config.pagespeed_timeout, Duration::from_secs(120));
        assert!(config.pagespeed_timeout > config.request_timeout);
        assert_eq!(config.max_links, 10);
        assert!(!config.allow_private);
        assert!(!config.has_api_key());
    }

    #[test]
    fn blank_key_is_not_usable() {
        let config = AuditConfig::builder().api_key("   ").build();
        assert!(!config.has_api_key());

        let config = AuditConfig::builder().api_key("abc").build();
        assert!(config.has_api_key());
    }

    #[test]
    fn maybe_api_key_keeps_existing() {
        let config = AuditConfig::builder()
            .api_key("first")
            .maybe_api_key(None)
            .build();
        assert_eq!(config.api_key.as_deref(), Some("first"));
    }
}
