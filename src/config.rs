/*
 * Responsibility
 * - Load settings from the environment (.env is honored via dotenvy)
 * - Validate them once at startup (missing/invalid values abort the boot)
 * - Nothing here is read again at request time
 */
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_SITE_URL: &str = "http://localhost:4000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Cookie attributes shared by every cookie the service writes.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub prefix: String,
    pub secure: bool,
}

impl CookieSettings {
    /// `<prefix>-auth-token`
    pub fn session_name(&self) -> String {
        format!("{}-auth-token", self.prefix)
    }

    /// `<prefix>-auth-token-code-verifier`
    pub fn verifier_name(&self) -> String {
        format!("{}-auth-token-code-verifier", self.prefix)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub site_url: Url,
    pub cookies: CookieSettings,

    pub backend_url: Url,
    pub backend_api_key: SecretString,
    pub backend_timeout: Duration,
    pub request_timeout: Duration,

    // None is a valid deployment: bearer fallback then always fails closed.
    pub jwt_secret: Option<SecretString>,
    pub jwt_leeway_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` is a thin wrapper; tests feed a map here so they never touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let site_url = match non_empty(lookup("SITE_URL")) {
            Some(raw) => parse_absolute_url(&raw, "SITE_URL")?,
            None => parse_absolute_url(DEFAULT_SITE_URL, "SITE_URL")?,
        };

        let backend_url = non_empty(lookup("AUTH_BACKEND_URL"))
            .ok_or(ConfigError::Missing("AUTH_BACKEND_URL"))
            .and_then(|raw| parse_absolute_url(&raw, "AUTH_BACKEND_URL"))?;

        let backend_api_key = non_empty(lookup("AUTH_BACKEND_API_KEY"))
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("AUTH_BACKEND_API_KEY"))?;

        let jwt_secret = non_empty(lookup("AUTH_JWT_SECRET")).map(SecretString::from);

        let jwt_leeway_seconds = parse_u64_or(&lookup, "AUTH_JWT_LEEWAY_SECONDS", 0)?;
        let backend_timeout =
            Duration::from_secs(parse_u64_or(&lookup, "BACKEND_TIMEOUT_SECONDS", 10)?.max(1));
        let request_timeout =
            Duration::from_secs(parse_u64_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?.max(1));

        let prefix = non_empty(lookup("SESSION_COOKIE_PREFIX")).unwrap_or_else(|| "sb".to_string());
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid("SESSION_COOKIE_PREFIX"));
        }

        let secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("COOKIE_SECURE"))?,
            None => site_url.scheme() == "https",
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            site_url,
            cookies: CookieSettings { prefix, secure },
            backend_url,
            backend_api_key,
            backend_timeout,
            request_timeout,
            jwt_secret,
            jwt_leeway_seconds,
        })
    }

    /// Absolute URL on this site, e.g. `site_link("/auth/callback")`.
    pub fn site_link(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.site_url.as_str().trim_end_matches('/'),
            path_and_query
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_absolute_url(raw: &str, key: &'static str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::Invalid(key))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(ConfigError::Invalid(key)),
    }
}

fn parse_u64_or<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("AUTH_BACKEND_URL", "https://project.example.co"),
        ("AUTH_BACKEND_API_KEY", "publishable-key"),
    ];

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.addr.port(), 4000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.site_url.as_str(), "http://localhost:4000/");
        assert_eq!(config.cookies.prefix, "sb");
        assert!(!config.cookies.secure);
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.jwt_leeway_seconds, 0);
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert_eq!(config.backend_api_key.expose_secret(), "publishable-key");
    }

    #[test]
    fn missing_backend_url_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("AUTH_BACKEND_API_KEY", "k")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AUTH_BACKEND_URL"));
    }

    #[test]
    fn relative_backend_url_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("AUTH_BACKEND_URL", "/auth"),
            ("AUTH_BACKEND_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("AUTH_BACKEND_URL"));
    }

    #[test]
    fn blank_jwt_secret_counts_as_absent() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AUTH_JWT_SECRET", "   "));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn https_site_turns_on_secure_cookies() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SITE_URL", "https://app.example.com"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.cookies.secure);
        assert_eq!(
            config.site_link("/auth/callback"),
            "https://app.example.com/auth/callback"
        );
    }

    #[test]
    fn explicit_cookie_secure_wins() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SITE_URL", "https://app.example.com"));
        pairs.push(("COOKIE_SECURE", "off"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(!config.cookies.secure);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("PORT"));
    }

    #[test]
    fn cookie_prefix_must_be_token_safe() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SESSION_COOKIE_PREFIX", "sb;path=/"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("SESSION_COOKIE_PREFIX"));
    }

    #[test]
    fn cookie_names_follow_prefix() {
        let cookies = CookieSettings {
            prefix: "sb-abc".into(),
            secure: false,
        };
        assert_eq!(cookies.session_name(), "sb-abc-auth-token");
        assert_eq!(cookies.verifier_name(), "sb-abc-auth-token-code-verifier");
    }
}
