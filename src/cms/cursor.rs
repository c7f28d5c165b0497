use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque continuation URL for the next page of a search.
///
/// Absence of a cursor means the list is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `page` query parameter, when the cursor carries one
    pub fn page(&self) -> Option<u32> {
        let url = Url::parse(&self.0).ok()?;
        let page = url.query_pairs().find(|(key, _)| key == "page")?;
        page.1.parse().ok()
    }

    /// The cursor without its `access_token` parameter, safe to hand to browsers
    pub fn without_access_token(self) -> Self {
        match Url::parse(&self.0) {
            Ok(url) => Self(strip_query_param(&url, "access_token")),
            Err(_) => self,
        }
    }

    /// Whether the cursor targets the same scheme, host and port as `endpoint`
    pub fn same_origin(&self, endpoint: &str) -> bool {
        match (Url::parse(&self.0), Url::parse(endpoint)) {
            (Ok(cursor), Ok(endpoint)) => {
                cursor.scheme() == endpoint.scheme()
                    && cursor.host_str() == endpoint.host_str()
                    && cursor.port_or_known_default() == endpoint.port_or_known_default()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `url` as a string with every `key` query pair removed
pub(crate) fn strip_query_param(url: &Url, key: &str) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}

/// `null`, missing and blank `next_page` values all mean "no more pages"
pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Cursor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()).map(Cursor))
}
