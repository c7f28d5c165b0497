//! Listing state: accumulated posts plus the cursor to the next batch
//!
//! "Load more" runs in three steps so that only one request is in flight
//! at a time: [`Listing::begin_load_more`] hands out a token and the
//! cursor, the caller fetches, then [`Listing::complete`] or
//! [`Listing::abandon`] settles the token. Results carrying a stale token
//! are dropped.

use crate::cms::{Cms, CmsResult, Cursor, PostSummaryDoc, SearchResponse};
use crate::content::{PostCard, PostPage};
use crate::Blog;

/// Identifies one in-flight "load more" request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// What the caller must fetch for a load-more request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    posts: Vec<PostCard>,
    next_page: Option<Cursor>,
    in_flight: Option<LoadToken>,
    issued: u64,
}

impl Listing {
    pub fn new(posts: Vec<PostCard>, next_page: Option<Cursor>) -> Self {
        Self {
            posts,
            next_page,
            ..Self::default()
        }
    }

    /// Initial state from the first search response
    pub fn from_response(response: &SearchResponse<PostSummaryDoc>, blog: &Blog) -> Self {
        Self::new(
            PostCard::from_docs(&response.results, blog),
            response.next_page.clone(),
        )
    }

    pub fn posts(&self) -> &[PostCard] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&Cursor> {
        self.next_page.as_ref()
    }

    /// Whether the "load more" control should be shown
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a load-more request.
    ///
    /// Returns `None` when the list is exhausted or a request is already
    /// in flight.
    pub fn begin_load_more(&mut self) -> Option<LoadRequest> {
        if self.in_flight.is_some() {
            tracing::debug!("Load more ignored: request already in flight");
            return None;
        }
        let cursor = self.next_page.clone()?;

        self.issued += 1;
        let token = LoadToken(self.issued);
        self.in_flight = Some(token);
        Some(LoadRequest { token, cursor })
    }

    /// Append a fetched batch and move the cursor.
    ///
    /// Prior entries are kept. Returns `false`, changing nothing, when
    /// `token` is not the request in flight.
    pub fn complete(
        &mut self,
        token: LoadToken,
        posts: Vec<PostCard>,
        next_page: Option<Cursor>,
    ) -> bool {
        if self.in_flight != Some(token) {
            tracing::debug!("Dropping stale load-more result {:?}", token);
            return false;
        }
        self.in_flight = None;
        self.posts.extend(posts);
        self.next_page = next_page;
        true
    }

    /// Give up on a failed request so it can be retried
    pub fn abandon(&mut self, token: LoadToken) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Fetch the next batch through `cms` and append it.
    ///
    /// Returns the number of posts appended; 0 when there was nothing to
    /// load. On error the listing is left as it was, ready for a retry.
    pub async fn load_more(&mut self, cms: &dyn Cms, blog: &Blog) -> CmsResult<usize> {
        let Some(request) = self.begin_load_more() else {
            return Ok(0);
        };

        match cms.fetch_page(&request.cursor).await {
            Ok(response) => {
                let posts = PostCard::from_docs(&response.results, blog);
                let appended = posts.len();
                self.complete(request.token, posts, response.next_page);
                Ok(appended)
            }
            Err(e) => {
                self.abandon(request.token);
                Err(e)
            }
        }
    }

    /// Browser-facing view of the whole list, with the cursor mapped by `link`
    pub fn to_page(&self, link: impl Fn(&Cursor) -> String) -> PostPage {
        PostPage {
            results: self.posts.clone(),
            next_page: self.next_page.as_ref().map(link),
        }
    }
}
