//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `cms.endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `cms.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub root: String,

    // Directory
    pub public_dir: String,
    pub stylesheet: Option<String>,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub reading: ReadingConfig,

    // Regeneration
    pub revalidate_secs: u64,
    pub listing_revalidate_secs: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),

            root: "/".to_string(),

            public_dir: "public".to_string(),
            stylesheet: None,

            cms: CmsConfig::default(),
            reading: ReadingConfig::default(),

            revalidate_secs: 60 * 30,
            listing_revalidate_secs: None,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_ENDPOINT).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("CMS endpoint overridden from environment");
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.cms.access_token = Some(token);
        }
    }

    /// Parsed timezone used for date display
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        if self.timezone.trim().is_empty() {
            return Ok(chrono_tz::UTC);
        }
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Window after which a generated post page may be regenerated
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    /// Window for the listing page; `None` keeps it until restart
    pub fn listing_revalidate(&self) -> Option<Duration> {
        self.listing_revalidate_secs.map(Duration::from_secs)
    }
}

/// Headless CMS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: u32,
    /// How many posts are pre-rendered as static paths
    pub static_paths: u32,
    pub ordering: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 4,
            static_paths: 4,
            ordering: "document.first_publication_date".to_string(),
        }
    }
}

/// Reading-time estimation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 4);
        assert_eq!(config.cms.static_paths, 4);
        assert_eq!(config.reading.words_per_minute, 200);
        assert_eq!(config.revalidate(), Duration::from_secs(1800));
        assert_eq!(config.listing_revalidate(), None);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en
cms:
  endpoint: https://blog.cdn.prismic.io/api/v2
  page_size: 10
revalidate_secs: 60
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, "en");
        assert_eq!(config.cms.endpoint, "https://blog.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 10);
        // untouched nested fields keep their defaults
        assert_eq!(config.cms.static_paths, 4);
        assert_eq!(config.revalidate_secs, 60);
    }

    #[test]
    fn test_env_overrides_skip_blank_values() {
        let mut config = SiteConfig::default();
        config.cms.endpoint = "https://a.cdn.prismic.io/api/v2".to_string();
        config.apply_overrides(Some("  ".to_string()), Some("secret".to_string()));
        assert_eq!(config.cms.endpoint, "https://a.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_timezone() {
        let mut config = SiteConfig::default();
        assert_eq!(config.tz().unwrap(), chrono_tz::UTC);
        config.timezone = "America/Sao_Paulo".to_string();
        assert_eq!(config.tz().unwrap(), chrono_tz::America::Sao_Paulo);
        config.timezone = "Mars/Olympus".to_string();
        assert!(config.tz().is_err());
    }
}
