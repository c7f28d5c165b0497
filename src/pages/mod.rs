//! Page data fetching: what each route needs from the CMS

use crate::cms::{Cms, CmsResult, QueryOptions};
use crate::content::PostView;
use crate::listing::Listing;
use crate::Blog;

/// First page of the listing
pub async fn listing_props(cms: &dyn Cms, blog: &Blog) -> CmsResult<Listing> {
    let response = cms
        .query_posts(&QueryOptions::listing(&blog.config.cms))
        .await?;
    tracing::debug!(
        "Listing has {} posts, more: {}",
        response.results.len(),
        response.next_page.is_some()
    );
    Ok(Listing::from_response(&response, blog))
}

/// Uids of the posts pre-rendered at build/startup time
pub async fn static_paths(cms: &dyn Cms, blog: &Blog) -> CmsResult<Vec<String>> {
    let response = cms
        .query_posts(&QueryOptions::static_paths(&blog.config.cms))
        .await?;
    Ok(response
        .results
        .into_iter()
        .filter_map(|doc| doc.uid)
        .filter(|uid| !uid.is_empty())
        .collect())
}

/// Detail page data for `slug`; `None` when the CMS has no such post
pub async fn post_props(cms: &dyn Cms, blog: &Blog, slug: &str) -> CmsResult<Option<PostView>> {
    let doc = cms.get_post_by_uid(slug).await?;
    if doc.is_none() {
        tracing::info!("No post with uid {:?}", slug);
    }
    Ok(doc.map(|doc| PostView::from_doc(&doc, slug, blog)))
}

/// In-memory CMS used by tests across the crate
#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::cms::model::{
        ContentGroup, Document, ImageField, PostDetailData, PostSummaryData, RichTextBlock,
        TextField,
    };
    use crate::cms::{
        Cms, CmsError, CmsResult, Cursor, PostDetailDoc, PostSummaryDoc, QueryOptions,
        SearchResponse,
    };

    pub const ORIGIN: &str = "https://blog.cdn.prismic.io/api/v2/documents/search";

    /// Posts served in pages, continuation cursors on [`ORIGIN`]
    pub struct FakeCms {
        pub posts: Vec<PostSummaryDoc>,
        pub details: Mutex<HashMap<String, PostDetailDoc>>,
        pub detail_calls: AtomicUsize,
        pub fail: Mutex<bool>,
        /// Delay before every listing query answers
        pub latency: Mutex<Duration>,
    }

    impl FakeCms {
        pub fn with_posts(count: usize) -> Self {
            let posts: Vec<_> = (1..=count).map(|i| summary(&format!("post-{}", i))).collect();
            let details = posts
                .iter()
                .filter_map(|p| p.uid.clone())
                .map(|uid| (uid.clone(), detail(&uid, "Lorem ipsum dolor sit amet")))
                .collect();
            Self {
                posts,
                details: Mutex::new(details),
                detail_calls: AtomicUsize::new(0),
                fail: Mutex::new(false),
                latency: Mutex::new(Duration::ZERO),
            }
        }

        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock().expect("latency mutex poisoned") = latency;
        }

        pub fn set_failing(&self, failing: bool) {
            *self.fail.lock().expect("fail mutex poisoned") = failing;
        }

        fn check(&self) -> CmsResult<()> {
            if *self.fail.lock().expect("fail mutex poisoned") {
                return Err(CmsError::MissingMasterRef);
            }
            Ok(())
        }

        fn page(&self, page: u32, page_size: u32) -> SearchResponse<PostSummaryDoc> {
            let size = page_size.max(1) as usize;
            let start = (page.max(1) as usize - 1) * size;
            let results: Vec<_> = self.posts.iter().skip(start).take(size).cloned().collect();
            let total_pages = self.posts.len().div_ceil(size) as u32;
            let next_page = (page < total_pages)
                .then(|| Cursor::new(format!("{}?page={}&pageSize={}", ORIGIN, page + 1, size)));
            SearchResponse {
                page,
                total_pages,
                results,
                next_page,
            }
        }
    }

    #[async_trait]
    impl Cms for FakeCms {
        async fn query_posts(
            &self,
            options: &QueryOptions,
        ) -> CmsResult<SearchResponse<PostSummaryDoc>> {
            let latency = *self.latency.lock().expect("latency mutex poisoned");
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            self.check()?;
            Ok(self.page(options.page.unwrap_or(1), options.page_size))
        }

        async fn get_post_by_uid(&self, uid: &str) -> CmsResult<Option<PostDetailDoc>> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self
                .details
                .lock()
                .expect("details mutex poisoned")
                .get(uid)
                .cloned())
        }

        async fn fetch_page(&self, cursor: &Cursor) -> CmsResult<SearchResponse<PostSummaryDoc>> {
            self.check()?;
            if !cursor.as_str().starts_with(ORIGIN) {
                return Err(CmsError::ForeignCursor(cursor.to_string()));
            }
            let page = cursor.page().unwrap_or(1);
            let size = reqwest::Url::parse(cursor.as_str())
                .ok()
                .and_then(|url| {
                    url.query_pairs()
                        .find(|(k, _)| k == "pageSize")
                        .and_then(|(_, v)| v.parse().ok())
                })
                .unwrap_or(4);
            Ok(self.page(page, size))
        }
    }

    pub fn summary(uid: &str) -> PostSummaryDoc {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            first_publication_date: Some("2023-05-10T00:00:00Z".to_string()),
            last_publication_date: None,
            data: PostSummaryData {
                title: TextField::Plain(format!("Title of {}", uid)),
                subtitle: TextField::Plain("A subtitle".to_string()),
                author: TextField::Plain("Joseph Oliveira".to_string()),
            },
        }
    }

    pub fn detail(uid: &str, body: &str) -> PostDetailDoc {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            first_publication_date: Some("2023-05-10T00:00:00Z".to_string()),
            last_publication_date: None,
            data: PostDetailData {
                title: TextField::Plain(format!("Title of {}", uid)),
                subtitle: TextField::default(),
                banner: ImageField {
                    url: Some("https://images.prismic.io/banner.png".to_string()),
                    alt: None,
                },
                author: TextField::Plain("Joseph Oliveira".to_string()),
                content: vec![ContentGroup {
                    heading: TextField::Plain("Intro".to_string()),
                    body: vec![RichTextBlock {
                        kind: "paragraph".to_string(),
                        text: body.to_string(),
                        ..RichTextBlock::default()
                    }],
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeCms;
    use super::*;
    use crate::config::SiteConfig;

    fn blog() -> Blog {
        Blog::from_config(SiteConfig::default(), ".").unwrap()
    }

    #[tokio::test]
    async fn test_listing_props_first_page() {
        let cms = FakeCms::with_posts(6);
        let listing = listing_props(&cms, &blog()).await.unwrap();
        assert_eq!(listing.posts().len(), 4);
        assert_eq!(listing.posts()[0].uid, "post-1");
        assert_eq!(listing.next_page().and_then(|c| c.page()), Some(2));
    }

    #[tokio::test]
    async fn test_listing_props_single_page_has_no_cursor() {
        let cms = FakeCms::with_posts(3);
        let listing = listing_props(&cms, &blog()).await.unwrap();
        assert_eq!(listing.posts().len(), 3);
        assert!(!listing.has_more());
    }

    #[tokio::test]
    async fn test_static_paths() {
        let cms = FakeCms::with_posts(9);
        let paths = static_paths(&cms, &blog()).await.unwrap();
        assert_eq!(paths, ["post-1", "post-2", "post-3", "post-4"]);
    }

    #[tokio::test]
    async fn test_post_props() {
        let cms = FakeCms::with_posts(2);
        let view = post_props(&cms, &blog(), "post-2").await.unwrap().unwrap();
        assert_eq!(view.title, "Title of post-2");
        assert_eq!(view.reading_time, "1 min");
        assert_eq!(view.date, "10 mai 2023");

        assert!(post_props(&cms, &blog(), "nope").await.unwrap().is_none());
    }
}
