//! URL helper functions

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::config::SiteConfig;

/// Characters kept verbatim in a single path segment or query value
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

lazy_static! {
    /// Shape of a CMS uid: lowercase words joined by `-`, `_` or `.`
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:[-_.][a-z0-9]+)*$").unwrap();
}

/// Whether `slug` can name a post route and an output directory
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= 256 && SLUG_RE.is_match(slug)
}

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello") // -> "/blog/post/hello"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Percent-encode a single path segment or query value
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Link to a post detail page
pub fn post_path(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &format!("post/{}", encode_component(uid)))
}

/// Load-more endpoint following `cursor` through the live server
pub fn api_page_link(config: &SiteConfig, cursor: &str) -> String {
    format!(
        "{}?cursor={}",
        url_for(config, "api/posts"),
        encode_component(cursor)
    )
}

/// Pre-built load-more page written by `generate`
pub fn static_page_link(config: &SiteConfig, page: u32) -> String {
    url_for(config, &format!("posts/page/{}.json", page))
}
