//! Generate static files

use anyhow::Result;

use crate::cms::Cms;
use crate::generator::Generator;
use crate::Blog;

/// Generate the static site from the CMS; `all_posts` renders every listed
/// post instead of only the static paths
pub async fn run(blog: &Blog, cms: &dyn Cms, all_posts: bool) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?.all_posts(all_posts);
    let report = generator.generate(cms).await?;

    tracing::info!(
        "Rendered {} posts: {} listing pages, {} post pages",
        report.posts,
        report.listing_pages + 1,
        report.post_pages
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
