use std::env;
use std::time::Duration;

/// Remote service configuration.
///
/// Reads from the `MEALMATE_API_URL` and `MEALMATE_REQUEST_TIMEOUT_SECS`
/// environment variables, falling back to the compile-time defaults.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL every endpoint path is appended to (no trailing slash).
    pub base_url: String,
    /// Upper bound on any single call.
    pub request_timeout: Duration,
    /// Upper bound on AI suggestion calls, which are much slower.
    pub suggestion_timeout: Duration,
}

impl GatewayConfig {
    /// The default base URL used when no environment variable is set.
    pub const DEFAULT_URL: &str = "http://localhost:5000/api";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_SUGGESTION_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build a config from the environment.
    pub fn from_env() -> Self {
        let base_url = env::var("MEALMATE_API_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        let mut config = Self::new(base_url);
        if let Some(secs) = env::var("MEALMATE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            suggestion_timeout: Self::DEFAULT_SUGGESTION_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_suggestion_timeout(mut self, timeout: Duration) -> Self {
        self.suggestion_timeout = timeout;
        self
    }

    /// Join an endpoint path (starting with `/`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of the service root, one level above the API prefix. The health
    /// probe lives there.
    pub fn service_root(&self) -> &str {
        match self.base_url.rsplit_once('/') {
            Some((root, last)) if last == "api" => root,
            _ => &self.base_url,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = GatewayConfig::new(GatewayConfig::DEFAULT_URL);
        assert_eq!(cfg.base_url, "http://localhost:5000/api");
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let cfg = GatewayConfig::new("http://example.test/api/");
        assert_eq!(cfg.endpoint("/plan"), "http://example.test/api/plan");
    }

    #[test]
    fn service_root_strips_api_prefix() {
        let cfg = GatewayConfig::new("http://localhost:5000/api");
        assert_eq!(cfg.service_root(), "http://localhost:5000");

        let bare = GatewayConfig::new("http://localhost:5000");
        assert_eq!(bare.service_root(), "http://localhost:5000");
    }

    #[test]
    fn builder_overrides_timeouts() {
        let cfg = GatewayConfig::new("http://x")
            .with_request_timeout(Duration::from_millis(250))
            .with_suggestion_timeout(Duration::from_secs(2));
        assert_eq!(cfg.request_timeout, Duration::from_millis(250));
        assert_eq!(cfg.suggestion_timeout, Duration::from_secs(2));
    }
}
