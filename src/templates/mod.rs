//! Built-in templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on for every
//! `.html` template; rendered rich text is marked `safe` explicitly.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::{PostPage, PostView};
use crate::helpers::url_for;
use crate::Blog;

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub home: String,
    pub stylesheet: Option<String>,
    pub version: &'static str,
}

impl SiteData {
    fn from_blog(blog: &Blog) -> Self {
        let config = &blog.config;
        let stylesheet = config.stylesheet.as_ref().map(|path| {
            if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
            {
                path.clone()
            } else {
                url_for(config, path)
            }
        });

        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: blog.i18n.language().to_string(),
            home: url_for(config, ""),
            stylesheet,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Template renderer with the site templates loaded
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    strings: HashMap<&'static str, String>,
}

impl TemplateRenderer {
    /// Create a new renderer for `blog`
    pub fn new(blog: &Blog) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self {
            tera,
            site: SiteData::from_blog(blog),
            strings: blog.i18n.ui_strings(),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("strings", &self.strings);
        context
    }

    /// The post listing; the load-more control appears iff `page.next_page` is set
    pub fn render_listing(&self, page: &PostPage) -> Result<String> {
        let mut context = self.base_context();
        context.insert("posts", &page.results);
        context.insert("next_page", &page.next_page);
        self.render("index.html", &context)
    }

    /// A post detail page
    pub fn render_post(&self, post: &PostView) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// Placeholder shown while a page is generated on demand
    pub fn render_loading(&self, refresh_secs: u64) -> Result<String> {
        let mut context = self.base_context();
        context.insert("refresh_secs", &refresh_secs);
        self.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render("not_found.html", &self.base_context())
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{PostCard, SectionView};

    fn renderer() -> TemplateRenderer {
        let config = SiteConfig {
            title: "spacetraveling".to_string(),
            stylesheet: Some("css/main.css".to_string()),
            ..SiteConfig::default()
        };
        TemplateRenderer::new(&Blog::from_config(config, ".").unwrap()).unwrap()
    }

    fn card(uid: &str) -> PostCard {
        PostCard {
            uid: uid.to_string(),
            href: format!("/post/{}", uid),
            title: format!("Title <{}>", uid),
            subtitle: "Sub".to_string(),
            author: "Joseph".to_string(),
            date: "10 mai 2023".to_string(),
        }
    }

    #[test]
    fn test_listing_with_cursor_has_load_more() {
        let page = PostPage {
            results: vec![card("a"), card("b"), card("c")],
            next_page: Some("/posts/page/2.json".to_string()),
        };
        let html = renderer().render_listing(&page).unwrap();
        assert_eq!(html.matches(r#"<a class="post""#).count(), 3);
        assert!(html.contains(r#"id="load-more""#));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("Title &lt;a&gt;"));
        // autoescape encodes the slashes; the path itself is resolved against root
        assert!(html.contains("&#x2F;css&#x2F;main.css"));
    }

    #[test]
    fn test_listing_without_cursor_omits_load_more() {
        let page = PostPage {
            results: vec![card("a")],
            next_page: None,
        };
        let html = renderer().render_listing(&page).unwrap();
        assert_eq!(html.matches(r#"<a class="post""#).count(), 1);
        assert!(!html.contains("load-more"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_listing() {
        let page = PostPage {
            results: vec![],
            next_page: None,
        };
        let html = renderer().render_listing(&page).unwrap();
        assert!(html.contains("Nenhum post publicado ainda."));
    }

    #[test]
    fn test_post_injects_rich_text_unescaped() {
        let post = PostView {
            uid: "hooks".to_string(),
            title: "Hooks & <you>".to_string(),
            subtitle: String::new(),
            banner_url: Some("https://images.prismic.io/b.png".to_string()),
            banner_alt: "Banner".to_string(),
            author: "Joseph".to_string(),
            date: "25 mar 2021".to_string(),
            date_iso: Some("2021-03-25T19:25:28.000+00:00".to_string()),
            reading_time: "4 min".to_string(),
            summary: "A long summary".to_string(),
            sections: vec![SectionView {
                heading: "Intro".to_string(),
                html: "<p><strong>bold</strong></p>".to_string(),
            }],
        };
        let html = renderer().render_post(&post).unwrap();
        assert!(html.contains("<h1>Hooks &amp; &lt;you&gt;</h1>"));
        assert!(html.contains("<p><strong>bold</strong></p>"));
        assert!(html.contains("4 min"));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains(r#"class="banner""#));
        assert!(html.contains(r#"<meta name="description" content="A long summary">"#));
    }

    #[test]
    fn test_loading_and_not_found() {
        let renderer = renderer();
        let loading = renderer.render_loading(2).unwrap();
        assert!(loading.contains("Carregando..."));
        assert!(loading.contains(r#"<meta http-equiv="refresh" content="2">"#));

        let missing = renderer.render_not_found().unwrap();
        assert!(missing.contains("Post não encontrado"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let value = truncate_chars_filter(&tera::Value::from("hello   world"), &args).unwrap();
        assert_eq!(value, tera::Value::from("hello..."));
        let value = truncate_chars_filter(&tera::Value::from("hi"), &args).unwrap();
        assert_eq!(value, tera::Value::from("hi"));
    }
}
