use std::{path::PathBuf, time::Duration};

use url::Url;

const DEFAULT_FONT_MEDIUM: &str = "public/fonts/Inter-Medium.ttf";
const DEFAULT_FONT_SEMIBOLD: &str = "public/fonts/Inter-SemiBold.ttf";
const DEFAULT_LOGO: &str = "public/logo.png";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },

    #[error("{name} must be a valid number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Origin used for outbound share links and og:image URLs.
    /// When unset, the request's own origin is used.
    pub public_url: Option<Url>,
    /// Where the share page sends visitors after crawlers have scraped it.
    pub app_url: Option<Url>,
    pub font_medium_path: PathBuf,
    pub font_semibold_path: PathBuf,
    pub logo_path: PathBuf,
    pub compose_url: Option<Url>,
    pub share_confirm_timeout: Duration,
    pub render_cache_ttl: Duration,
    pub debug_mode: bool,
    pub allowed_origins: Option<String>,
    /// Honour X-Forwarded-Host/-Proto when deriving the request origin.
    /// Only enable behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let public_url = parse_url(&var, "PUBLIC_URL")?;
        let app_url = parse_url(&var, "APP_URL")?.or_else(|| public_url.clone());

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_number(&var, "PORT", 3001)?,
            public_url,
            app_url,
            font_medium_path: var("FONT_MEDIUM_PATH")
                .unwrap_or_else(|| DEFAULT_FONT_MEDIUM.to_string())
                .into(),
            font_semibold_path: var("FONT_SEMIBOLD_PATH")
                .unwrap_or_else(|| DEFAULT_FONT_SEMIBOLD.to_string())
                .into(),
            logo_path: var("LOGO_PATH")
                .unwrap_or_else(|| DEFAULT_LOGO.to_string())
                .into(),
            compose_url: parse_url(&var, "COMPOSE_URL")?,
            share_confirm_timeout: Duration::from_secs(parse_number(
                &var,
                "SHARE_CONFIRM_TIMEOUT_SECS",
                30,
            )?),
            render_cache_ttl: Duration::from_secs(parse_number(
                &var,
                "RENDER_CACHE_TTL_SECS",
                3600,
            )?),
            debug_mode: parse_flag(&var, "DEBUG_MODE"),
            allowed_origins: var("ALLOWED_ORIGINS"),
            trust_proxy_headers: parse_flag(&var, "TRUST_PROXY_HEADERS"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            public_url: None,
            app_url: None,
            font_medium_path: DEFAULT_FONT_MEDIUM.into(),
            font_semibold_path: DEFAULT_FONT_SEMIBOLD.into(),
            logo_path: DEFAULT_LOGO.into(),
            compose_url: None,
            share_confirm_timeout: Duration::from_secs(30),
            render_cache_ttl: Duration::from_secs(3600),
            debug_mode: false,
            allowed_origins: None,
            trust_proxy_headers: false,
        }
    }
}

fn parse_url<F>(var: &F, name: &'static str) -> Result<Option<Url>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { name, source }))
        .transpose()
}

fn parse_flag<F>(var: &F, name: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true") || v.trim() == "1")
        .unwrap_or(false)
}

fn parse_number<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.public_url.is_none());
        assert_eq!(config.share_confirm_timeout, Duration::from_secs(30));
        assert!(!config.debug_mode);
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn proxy_headers_are_trusted_only_when_enabled() {
        let config = config_from(&[("TRUST_PROXY_HEADERS", "true")]).unwrap();
        assert!(config.trust_proxy_headers);
        let config = config_from(&[("TRUST_PROXY_HEADERS", "no")]).unwrap();
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn app_url_falls_back_to_public_url() {
        let config = config_from(&[("PUBLIC_URL", "https://zerox.example")]).unwrap();
        assert_eq!(
            config.app_url.map(|u| u.to_string()),
            Some("https://zerox.example/".to_string())
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config_from(&[("PUBLIC_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { name: "PUBLIC_URL", .. })
        ));
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidNumber { name: "PORT", .. })
        ));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("COMPOSE_URL", "  "), ("DEBUG_MODE", "1")]).unwrap();
        assert!(config.compose_url.is_none());
        assert!(config.debug_mode);
    }
}
