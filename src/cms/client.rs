//! HTTP client for a Prismic-style REST API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::model::{ApiRoot, PostDetailDoc, PostSummaryDoc, SearchResponse};
use super::query::{render_query, Predicate, QueryOptions};
use super::cursor::strip_query_param;
use super::{Cms, CmsError, CmsResult, Cursor};
use crate::config::CmsConfig;

/// How long a resolved master ref is reused before asking the API root again
const REF_TTL: Duration = Duration::from_secs(5);

/// CMS client backed by `reqwest`
pub struct PrismicClient {
    endpoint: String,
    access_token: Option<String>,
    document_type: String,
    client: Client,
    master_ref: Mutex<Option<(String, Instant)>>,
}

impl PrismicClient {
    pub fn new(cms: &CmsConfig) -> CmsResult<Self> {
        let endpoint = cms.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(CmsError::NotConfigured);
        }
        Url::parse(&endpoint).map_err(|_| CmsError::InvalidUrl(endpoint.clone()))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint,
            access_token: cms.access_token.clone(),
            document_type: cms.document_type.clone(),
            client,
            master_ref: Mutex::new(None),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/documents/search", self.endpoint)
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    /// Send a GET and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> CmsResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status,
                url: redact(response.url()),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Ref of the currently published content
    async fn master_ref(&self) -> CmsResult<String> {
        let mut cached = self.master_ref.lock().await;
        if let Some((reference, fetched_at)) = cached.as_ref() {
            if fetched_at.elapsed() < REF_TTL {
                return Ok(reference.clone());
            }
        }

        let request = self.with_token(self.client.get(&self.endpoint));
        let root: ApiRoot = self.get_json(request).await?;
        let reference = root
            .master_ref()
            .ok_or(CmsError::MissingMasterRef)?
            .to_string();
        tracing::debug!("Resolved master ref {}", reference);
        *cached = Some((reference.clone(), Instant::now()));
        Ok(reference)
    }

    async fn search<T: DeserializeOwned>(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> CmsResult<SearchResponse<T>> {
        let reference = self.master_ref().await?;
        let request = self
            .client
            .get(self.search_url())
            .query(&[("ref", reference), ("q", render_query(predicates))])
            .query(&options.to_params());
        let response = self.get_json(self.with_token(request)).await?;
        Ok(strip_cursor(response))
    }
}

#[async_trait]
impl Cms for PrismicClient {
    async fn query_posts(
        &self,
        options: &QueryOptions,
    ) -> CmsResult<SearchResponse<PostSummaryDoc>> {
        let predicates = [Predicate::document_type(&self.document_type)];
        let response = self.search(&predicates, options).await?;
        tracing::debug!(
            "Fetched {} posts (page {} of {})",
            response.results.len(),
            response.page,
            response.total_pages
        );
        Ok(response)
    }

    async fn get_post_by_uid(&self, uid: &str) -> CmsResult<Option<PostDetailDoc>> {
        let predicates = [Predicate::uid(&self.document_type, uid)];
        let options = QueryOptions {
            page_size: 1,
            page: None,
            orderings: Vec::new(),
        };
        let response: SearchResponse<PostDetailDoc> = self.search(&predicates, &options).await?;
        Ok(response.results.into_iter().next())
    }

    async fn fetch_page(&self, cursor: &Cursor) -> CmsResult<SearchResponse<PostSummaryDoc>> {
        if !cursor.same_origin(&self.endpoint) {
            return Err(CmsError::ForeignCursor(cursor.to_string()));
        }
        // The cursor carries ref and query; only the token was stripped.
        let cursor = cursor.clone().without_access_token();
        let request = self.with_token(self.client.get(cursor.as_str()));
        let response = self.get_json(request).await?;
        Ok(strip_cursor(response))
    }
}

/// Drop the access token from a URL before it reaches logs or errors
fn redact(url: &Url) -> String {
    strip_query_param(url, "access_token")
}

/// Cursors leave the client without the token; [`PrismicClient::with_token`]
/// puts it back when one is followed
fn strip_cursor<T>(mut response: SearchResponse<T>) -> SearchResponse<T> {
    response.next_page = response.next_page.map(Cursor::without_access_token);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> CmsConfig {
        CmsConfig {
            endpoint: endpoint.to_string(),
            ..CmsConfig::default()
        }
    }

    #[test]
    fn new_requires_endpoint() {
        assert!(matches!(
            PrismicClient::new(&config("  ")),
            Err(CmsError::NotConfigured)
        ));
        assert!(matches!(
            PrismicClient::new(&config("not a url")),
            Err(CmsError::InvalidUrl(_))
        ));
    }

    #[test]
    fn search_url_normalizes_trailing_slash() {
        let client = PrismicClient::new(&config("https://blog.cdn.prismic.io/api/v2/")).unwrap();
        assert_eq!(
            client.search_url(),
            "https://blog.cdn.prismic.io/api/v2/documents/search"
        );
    }

    #[tokio::test]
    async fn foreign_cursor_is_rejected_without_a_request() {
        let client = PrismicClient::new(&config("https://blog.cdn.prismic.io/api/v2")).unwrap();
        let cursor = Cursor::new("https://attacker.example/documents/search?page=2");
        assert!(matches!(
            client.fetch_page(&cursor).await,
            Err(CmsError::ForeignCursor(_))
        ));
    }

    #[test]
    fn redact_strips_access_token() {
        let url =
            Url::parse("https://b.cdn.prismic.io/api/v2?access_token=secret&page=2").unwrap();
        assert_eq!(redact(&url), "https://b.cdn.prismic.io/api/v2?page=2");
        let url = Url::parse("https://b.cdn.prismic.io/api/v2?access_token=secret").unwrap();
        assert_eq!(redact(&url), "https://b.cdn.prismic.io/api/v2");
    }
}
