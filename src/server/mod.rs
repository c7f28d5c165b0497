//! Live server with on-demand generation and timed revalidation
//!
//! The listing and post pages are rendered from the CMS and kept in a
//! [`PageCache`]. Posts not rendered at startup are generated on their
//! first request while the client sees a self-refreshing placeholder.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::cache::{CachedPage, Lookup, PageCache};
use crate::cms::{Cms, CmsError, Cursor};
use crate::content::{PostCard, PostPage};
use crate::helpers::{api_page_link, is_valid_slug};
use crate::pages;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Seconds between refreshes of the loading placeholder
const LOADING_REFRESH_SECS: u64 = 2;

/// How long a not-found page is kept before the CMS is asked again
const NOT_FOUND_REVALIDATE: Duration = Duration::from_secs(60);

/// Server state
pub struct AppState {
    blog: Blog,
    cms: Arc<dyn Cms>,
    renderer: TemplateRenderer,
    cache: PageCache,
    /// Held while the listing is looked up and rendered in place
    listing_render: Mutex<()>,
}

impl AppState {
    pub fn new(blog: &Blog, cms: Arc<dyn Cms>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            cms,
            renderer: TemplateRenderer::new(blog)?,
            cache: PageCache::new(),
            listing_render: Mutex::new(()),
        })
    }
}

/// A cacheable page route
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRoute {
    Listing,
    Post(String),
}

impl PageRoute {
    fn key(&self) -> String {
        match self {
            PageRoute::Listing => "/".to_string(),
            PageRoute::Post(slug) => format!("/post/{}", slug),
        }
    }

    fn revalidate(&self, blog: &Blog, page: &CachedPage) -> Option<Duration> {
        if !page.found {
            return Some(NOT_FOUND_REVALIDATE);
        }
        match self {
            PageRoute::Listing => blog.config.listing_revalidate(),
            PageRoute::Post(_) => Some(blog.config.revalidate()),
        }
    }
}

/// Start the server
pub async fn start(blog: &Blog, cms: Arc<dyn Cms>, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(blog, cms)?);

    match prerender(&state).await {
        Ok(count) => tracing::info!("Pre-rendered {} pages", count),
        Err(e) => tracing::warn!("Pre-rendering failed, pages will render on demand: {:#}", e),
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes for the live site
pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(api_posts_handler))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render the listing and the static paths into the cache
pub async fn prerender(state: &AppState) -> Result<usize> {
    let mut routes = vec![PageRoute::Listing];
    let uids = pages::static_paths(state.cms.as_ref(), &state.blog).await?;
    routes.extend(
        uids.into_iter()
            .filter(|uid| is_valid_slug(uid))
            .map(PageRoute::Post),
    );

    let mut rendered = 0;
    for route in routes {
        if state.cache.lookup(&route.key(), Instant::now()).await != Lookup::Generate {
            continue;
        }
        generate(state, &route).await?;
        rendered += 1;
    }
    Ok(rendered)
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    serve_page(state, PageRoute::Listing).await
}

async fn post_handler(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    if !is_valid_slug(&slug) {
        tracing::debug!("Rejecting slug {:?}", slug);
        return not_found_response(&state);
    }
    serve_page(state, PageRoute::Post(slug)).await
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    cursor: String,
}

/// Next listing batch as JSON, for the load-more button
async fn api_posts_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let cursor = Cursor::new(query.cursor);
    match state.cms.fetch_page(&cursor).await {
        Ok(response) => {
            let config = &state.blog.config;
            Json(PostPage {
                results: PostCard::from_docs(&response.results, &state.blog),
                next_page: response
                    .next_page
                    .map(|next| api_page_link(config, next.as_str())),
            })
            .into_response()
        }
        Err(e @ (CmsError::ForeignCursor(_) | CmsError::InvalidUrl(_))) => {
            tracing::warn!("Rejected cursor: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load more posts: {}", e);
            (StatusCode::BAD_GATEWAY, "CMS request failed").into_response()
        }
    }
}

async fn serve_page(state: Arc<AppState>, route: PageRoute) -> Response {
    // The listing has no placeholder: concurrent first requests wait for one render
    let _listing_guard = if route == PageRoute::Listing {
        Some(state.listing_render.lock().await)
    } else {
        None
    };

    match state.cache.lookup(&route.key(), Instant::now()).await {
        Lookup::Fresh(page) => page_response(page),
        Lookup::Stale { page, regenerate } => {
            if regenerate {
                tracing::debug!("Revalidating {}", route.key());
                spawn_generate(state.clone(), route);
            }
            page_response(page)
        }
        Lookup::Pending => loading_response(&state),
        Lookup::Generate => match route {
            // No placeholder for the listing; render it in place
            PageRoute::Listing => match generate(&state, &route).await {
                Ok(page) => page_response(page),
                Err(e) => {
                    tracing::error!("Failed to render the listing: {:#}", e);
                    (StatusCode::BAD_GATEWAY, "CMS request failed").into_response()
                }
            },
            PageRoute::Post(_) => {
                spawn_generate(state.clone(), route);
                loading_response(&state)
            }
        },
    }
}

fn spawn_generate(state: Arc<AppState>, route: PageRoute) {
    tokio::spawn(async move {
        if let Err(e) = generate(&state, &route).await {
            tracing::error!("Failed to generate {}: {:#}", route.key(), e);
        }
    });
}

/// Render `route` and settle its cache claim
async fn generate(state: &AppState, route: &PageRoute) -> Result<CachedPage> {
    let key = route.key();
    match render(state, route).await {
        Ok(page) => {
            let revalidate = route.revalidate(&state.blog, &page);
            state
                .cache
                .store(&key, page.clone(), revalidate, Instant::now())
                .await;
            tracing::info!("Generated {} ({} pages cached)", key, state.cache.len().await);
            Ok(page)
        }
        Err(e) => {
            state.cache.release(&key).await;
            Err(e)
        }
    }
}

async fn render(state: &AppState, route: &PageRoute) -> Result<CachedPage> {
    let cms = state.cms.as_ref();
    let blog = &state.blog;

    match route {
        PageRoute::Listing => {
            let listing = pages::listing_props(cms, blog).await?;
            let page = listing.to_page(|cursor| api_page_link(&blog.config, cursor.as_str()));
            Ok(CachedPage::found(state.renderer.render_listing(&page)?))
        }
        PageRoute::Post(slug) => match pages::post_props(cms, blog, slug).await? {
            Some(post) => Ok(CachedPage::found(state.renderer.render_post(&post)?)),
            None => Ok(CachedPage::not_found(state.renderer.render_not_found()?)),
        },
    }
}

fn page_response(page: CachedPage) -> Response {
    let status = if page.found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Html(page.html)).into_response()
}

fn loading_response(state: &AppState) -> Response {
    match state.renderer.render_loading(LOADING_REFRESH_SECS) {
        Ok(html) => (StatusCode::ACCEPTED, Html(html)).into_response(),
        Err(e) => template_error(e),
    }
}

fn not_found_response(state: &AppState) -> Response {
    match state.renderer.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => template_error(e),
    }
}

fn template_error(e: anyhow::Error) -> Response {
    tracing::error!("Template error: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
