//! Display models for the listing and detail pages

use serde::{Deserialize, Serialize};

use super::reading_time::ReadingTime;
use super::richtext;
use crate::cms::{PostDetailDoc, PostSummaryDoc};
use crate::helpers::{date_xml, display_date, parse_timestamp, post_path};
use crate::Blog;

/// A post as shown in the listing, with its date already formatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCard {
    pub uid: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// `dd MMM yyyy` in the site locale; empty when unpublished
    pub date: String,
}

impl PostCard {
    /// Build a card; documents without a uid cannot be linked and yield `None`
    pub fn from_doc(doc: &PostSummaryDoc, blog: &Blog) -> Option<Self> {
        let uid = match doc.uid.as_deref().filter(|u| !u.is_empty()) {
            Some(uid) => uid.to_string(),
            None => {
                tracing::warn!("Skipping document {} without uid", doc.id);
                return None;
            }
        };

        Some(Self {
            href: post_path(&blog.config, &uid),
            uid,
            title: doc.data.title.as_text(),
            subtitle: doc.data.subtitle.as_text(),
            author: doc.data.author.as_text(),
            date: display_date(doc.first_publication_date.as_deref(), &blog.tz, &blog.i18n),
        })
    }

    /// Cards for a batch of documents, in order
    pub fn from_docs(docs: &[PostSummaryDoc], blog: &Blog) -> Vec<Self> {
        docs.iter()
            .filter_map(|doc| Self::from_doc(doc, blog))
            .collect()
    }
}

/// One batch of the listing as served to the browser's "load more"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<PostCard>,
    pub next_page: Option<String>,
}

/// A heading and its rendered rich-text body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub heading: String,
    pub html: String,
}

/// Everything the detail template needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub author: String,
    pub date: String,
    /// Machine-readable date for `<time datetime>`
    pub date_iso: Option<String>,
    pub reading_time: String,
    /// Plain-text lead used for the meta description
    pub summary: String,
    pub sections: Vec<SectionView>,
}

impl PostView {
    pub fn from_doc(doc: &PostDetailDoc, slug: &str, blog: &Blog) -> Self {
        let data = &doc.data;
        let reading_time =
            ReadingTime::estimate(&data.content, blog.config.reading.words_per_minute);

        let sections = data
            .content
            .iter()
            .map(|group| SectionView {
                heading: group.heading.as_text(),
                html: richtext::as_html(&group.body),
            })
            .collect();

        let summary = data
            .content
            .first()
            .map(|group| richtext::as_text(&group.body))
            .unwrap_or_default();

        let published = doc.first_publication_date.as_deref();

        Self {
            uid: doc.uid.clone().unwrap_or_else(|| slug.to_string()),
            title: data.title.as_text(),
            subtitle: data.subtitle.as_text(),
            banner_url: data.banner.url.clone().filter(|u| !u.is_empty()),
            banner_alt: data
                .banner
                .alt
                .clone()
                .unwrap_or_else(|| blog.i18n.get("post.banner_alt")),
            author: data.author.as_text(),
            date: display_date(published, &blog.tz, &blog.i18n),
            date_iso: published
                .and_then(|p| parse_timestamp(p).ok())
                .map(|d| date_xml(&d)),
            reading_time: blog
                .i18n
                .get_count("post.reading_time", reading_time.minutes as u64),
            summary,
            sections,
        }
    }
}
