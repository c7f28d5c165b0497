//! List site content fetched from the CMS

use anyhow::Result;

use crate::cms::Cms;
use crate::listing::Listing;
use crate::pages;
use crate::Blog;

/// List posts (`post`, following every cursor) or the pre-rendered
/// static paths (`path`)
pub async fn run(blog: &Blog, cms: &dyn Cms, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let listing = all_posts(blog, cms).await?;
            println!("Posts ({}):", listing.posts().len());
            for post in listing.posts() {
                println!("  {} - {} [{}]", post.date, post.title, post.uid);
            }
        }
        "path" | "paths" => {
            let paths = pages::static_paths(cms, blog).await?;
            println!("Static paths ({}):", paths.len());
            for uid in paths {
                println!("  {}", crate::helpers::post_path(&blog.config, &uid));
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, path", content_type);
        }
    }

    Ok(())
}

/// The whole listing, every batch loaded
pub async fn all_posts(blog: &Blog, cms: &dyn Cms) -> Result<Listing> {
    let mut listing = pages::listing_props(cms, blog).await?;
    while listing.has_more() {
        if listing.load_more(cms, blog).await? == 0 {
            tracing::warn!("Empty batch before the end of the listing, stopping");
            break;
        }
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::pages::testing::FakeCms;

    fn blog() -> Blog {
        Blog::from_config(SiteConfig::default(), ".").unwrap()
    }

    #[tokio::test]
    async fn test_all_posts_loads_every_batch() {
        let cms = FakeCms::with_posts(9);
        let listing = all_posts(&blog(), &cms).await.unwrap();
        assert_eq!(listing.posts().len(), 9);
        assert_eq!(listing.posts()[8].uid, "post-9");
        assert!(!listing.has_more());
    }

    #[tokio::test]
    async fn test_unknown_type_is_an_error() {
        let cms = FakeCms::with_posts(1);
        assert!(run(&blog(), &cms, "tags").await.is_err());
        assert!(run(&blog(), &cms, "path").await.is_ok());
    }
}
