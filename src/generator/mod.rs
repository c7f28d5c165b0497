//! Generator module - renders the site from CMS content into `public_dir`
//!
//! Output layout:
//!
//! - `index.html`: the first listing page
//! - `posts/page/{n}.json`: each further batch for "load more", chained by
//!   local links so the static site never calls the CMS from the browser
//! - `post/{uid}/index.html`: one page per static path, or per listed post
//!   with [`Generator::all_posts`]. Without it, the other posts linked from
//!   the listing only exist when served by `server`.

use anyhow::{bail, Context as _, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::cms::Cms;
use crate::content::PostPage;
use crate::helpers::{is_valid_slug, static_page_link};
use crate::listing::Listing;
use crate::pages;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// What a generation run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Posts reachable from the listing
    pub posts: usize,
    /// JSON batches written after the first page
    pub listing_pages: usize,
    /// Detail pages written
    pub post_pages: usize,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    all_posts: bool,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new(blog)?,
            all_posts: false,
        })
    }

    /// Render every post reached through the listing, not only the static paths
    pub fn all_posts(mut self, all_posts: bool) -> Self {
        self.all_posts = all_posts;
        self
    }

    /// Generate the entire site
    pub async fn generate(&self, cms: &dyn Cms) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let mut listing = pages::listing_props(cms, &self.blog)
            .await
            .context("Failed to fetch the post listing")?;

        let mut report = GenerateReport::default();

        // The first page links to batch 2 when the CMS has more
        let first = listing.to_page(|_| static_page_link(&self.blog.config, 2));
        self.write("index.html", &self.renderer.render_listing(&first)?)?;

        report.listing_pages = self.generate_listing_pages(&mut listing, cms).await?;
        report.posts = listing.posts().len();

        let uids = if self.all_posts {
            listing.posts().iter().map(|post| post.uid.clone()).collect()
        } else {
            pages::static_paths(cms, &self.blog)
                .await
                .context("Failed to fetch static paths")?
        };
        report.post_pages = self.generate_post_pages(cms, uids).await?;

        // Pages shown by static hosts for unknown routes
        self.write("404.html", &self.renderer.render_not_found()?)?;

        Ok(report)
    }

    /// Follow the cursor chain, writing each batch as `posts/page/{n}.json`
    async fn generate_listing_pages(&self, listing: &mut Listing, cms: &dyn Cms) -> Result<usize> {
        let mut seen = HashSet::new();
        let mut page_number = 2;

        while let Some(cursor) = listing.next_page().cloned() {
            if !seen.insert(cursor.clone()) {
                bail!("The CMS returned cursor {} twice", cursor);
            }

            let before = listing.posts().len();
            listing
                .load_more(cms, &self.blog)
                .await
                .with_context(|| format!("Failed to fetch listing page {}", page_number))?;

            let next_page = listing
                .has_more()
                .then(|| static_page_link(&self.blog.config, page_number + 1));
            let batch = PostPage {
                results: listing.posts()[before..].to_vec(),
                next_page,
            };

            let json = serde_json::to_string(&batch)?;
            self.write(&format!("posts/page/{}.json", page_number), &json)?;
            tracing::debug!(
                "Wrote listing page {} with {} posts",
                page_number,
                batch.results.len()
            );
            page_number += 1;
        }

        Ok(page_number as usize - 2)
    }

    /// Render a detail page for each of `uids`
    async fn generate_post_pages(&self, cms: &dyn Cms, uids: Vec<String>) -> Result<usize> {
        let mut written = 0;
        for uid in uids {
            if !is_valid_slug(&uid) {
                tracing::warn!("Skipping post with unusable uid {:?}", uid);
                continue;
            }

            let Some(post) = pages::post_props(cms, &self.blog, &uid)
                .await
                .with_context(|| format!("Failed to fetch post {}", uid))?
            else {
                tracing::warn!("Post {} vanished while generating", uid);
                continue;
            };

            let html = self.renderer.render_post(&post)?;
            self.write(&format!("post/{}/index.html", uid), &html)?;
            written += 1;
        }

        Ok(written)
    }

    /// Write a file below `public_dir`, creating parent directories
    fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.blog.public_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::debug!("Generated: {:?}", path);
        Ok(path)
    }
}
