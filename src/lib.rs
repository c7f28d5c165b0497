//! spacetraveling: a blog front-end for a headless CMS
//!
//! Posts are fetched from a Prismic-style REST API and rendered with
//! embedded Tera templates, either into a static site on disk or live,
//! with on-demand generation and timed revalidation of post pages.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod pages;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{Cms, PrismicClient};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// UI strings and month names for `config.language`
    pub i18n: i18n::I18n,
    /// Timezone dates are displayed in
    pub tz: chrono_tz::Tz,
}

impl Blog {
    /// Create a new Blog instance from a directory.
    ///
    /// Reads `_config.yml` when present and applies `PRISMIC_*`
    /// environment overrides.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env_overrides();

        let mut blog = Self::from_config(config, &base_dir)?;
        blog.i18n.load_languages(base_dir.join("languages"))?;
        Ok(blog)
    }

    /// Create a Blog from an already built configuration
    pub fn from_config<P: AsRef<Path>>(config: config::SiteConfig, base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let i18n = i18n::I18n::new(&config.language);
        let tz = config.tz()?;

        Ok(Self {
            config,
            base_dir,
            public_dir,
            i18n,
            tz,
        })
    }

    /// CMS client for the configured endpoint
    pub fn cms(&self) -> Result<Arc<dyn Cms>> {
        Ok(Arc::new(PrismicClient::new(&self.config.cms)?))
    }

    /// Generate the static site
    pub async fn generate(&self, cms: &dyn Cms, all_posts: bool) -> Result<()> {
        commands::generate::run(self, cms, all_posts).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
