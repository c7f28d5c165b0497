//! Headless CMS access
//!
//! The [`Cms`] trait is the seam between page builders and the network;
//! [`PrismicClient`] implements it over the REST API.

mod client;
mod cursor;
mod error;
pub mod model;
pub mod query;

use async_trait::async_trait;

pub use client::PrismicClient;
pub use cursor::Cursor;
pub use error::{CmsError, CmsResult};
pub use model::{PostDetailDoc, PostSummaryDoc, SearchResponse};
pub use query::QueryOptions;

/// Read access to the posts of the CMS
#[async_trait]
pub trait Cms: Send + Sync {
    /// Search documents of the configured post type
    async fn query_posts(&self, options: &QueryOptions)
        -> CmsResult<SearchResponse<PostSummaryDoc>>;

    /// The post with `uid`, or `None` when the CMS has no such document
    async fn get_post_by_uid(&self, uid: &str) -> CmsResult<Option<PostDetailDoc>>;

    /// Follow a `next_page` cursor
    async fn fetch_page(&self, cursor: &Cursor) -> CmsResult<SearchResponse<PostSummaryDoc>>;
}
