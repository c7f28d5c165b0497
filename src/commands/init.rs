//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: UTC

# URL
root: /

# Directory
public_dir: public
# stylesheet: css/main.css

# CMS
## The endpoint and token may also come from PRISMIC_API_ENDPOINT and
## PRISMIC_ACCESS_TOKEN.
cms:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  access_token:
  document_type: posts
  page_size: 4
  static_paths: 4
  ordering: document.first_publication_date

# Reading time
reading:
  words_per_minute: 200

# Regeneration windows, in seconds
revalidate_secs: 1800
# listing_revalidate_secs: 300
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir)?;
    fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::debug!("Wrote {:?}", config_path);

    Ok(())
}
