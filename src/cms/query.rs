//! Predicate queries against the documents search endpoint

use crate::config::CmsConfig;

/// A search predicate, e.g. `[at(document.type, "posts")]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Documents of a custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// The document of `doc_type` whose uid is `uid`
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }

    fn render(&self) -> String {
        match self {
            Predicate::At { path, value } => format!(
                "[at({}, \"{}\")]",
                path,
                value.replace('\\', "\\\\").replace('"', "\\\"")
            ),
        }
    }
}

/// The `q` parameter for a list of predicates
pub fn render_query(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(Predicate::render).collect();
    format!("[{}]", inner)
}

/// Sort key for search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parse the configured form: `my.posts.date` or `my.posts.date desc`
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.strip_suffix(" desc") {
            Some(field) => Self::desc(field.trim_end()),
            None => Self::asc(value),
        }
    }
}

/// Paging and ordering of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub page_size: u32,
    pub page: Option<u32>,
    pub orderings: Vec<Ordering>,
}

impl QueryOptions {
    /// First page of the listing
    pub fn listing(cms: &CmsConfig) -> Self {
        Self {
            page_size: cms.page_size,
            page: Some(1),
            orderings: vec![Ordering::parse(&cms.ordering)],
        }
    }

    /// Posts pre-rendered as static paths
    pub fn static_paths(cms: &CmsConfig) -> Self {
        Self {
            page_size: cms.static_paths,
            page: None,
            orderings: vec![Ordering::parse(&cms.ordering)],
        }
    }

    /// Query parameters for the search endpoint (without `ref` and `q`)
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("pageSize", self.page_size.to_string())];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if !self.orderings.is_empty() {
            let fields: Vec<String> = self
                .orderings
                .iter()
                .map(|o| {
                    if o.descending {
                        format!("{} desc", o.field)
                    } else {
                        o.field.clone()
                    }
                })
                .collect();
            params.push(("orderings", format!("[{}]", fields.join(","))));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_query() {
        assert_eq!(
            render_query(&[Predicate::document_type("posts")]),
            r#"[[at(document.type, "posts")]]"#
        );
        assert_eq!(
            render_query(&[Predicate::uid("posts", "say \"hi\"")]),
            r#"[[at(my.posts.uid, "say \"hi\"")]]"#
        );
    }

    #[test]
    fn test_ordering_parse() {
        assert_eq!(
            Ordering::parse("document.first_publication_date"),
            Ordering::asc("document.first_publication_date")
        );
        assert_eq!(
            Ordering::parse(" document.last_publication_date desc "),
            Ordering::desc("document.last_publication_date")
        );
    }

    #[test]
    fn test_listing_params_descending() {
        let cms = CmsConfig {
            ordering: "document.first_publication_date desc".to_string(),
            ..CmsConfig::default()
        };
        let params = QueryOptions::listing(&cms).to_params();
        assert_eq!(
            params[2],
            (
                "orderings",
                "[document.first_publication_date desc]".to_string()
            )
        );
    }

    #[test]
    fn test_listing_params() {
        let options = QueryOptions::listing(&CmsConfig::default());
        assert_eq!(
            options.to_params(),
            vec![
                ("pageSize", "4".to_string()),
                ("page", "1".to_string()),
                ("orderings", "[document.first_publication_date]".to_string()),
            ]
        );
    }

    #[test]
    fn test_static_paths_params_have_no_page() {
        let options = QueryOptions {
            orderings: vec![
                Ordering::desc("document.first_publication_date"),
                Ordering::asc("my.posts.title"),
            ],
            ..QueryOptions::static_paths(&CmsConfig::default())
        };
        let params = options.to_params();
        assert!(!params.iter().any(|(k, _)| *k == "page"));
        assert_eq!(
            params[1].1,
            "[document.first_publication_date desc,my.posts.title]"
        );
    }
}
