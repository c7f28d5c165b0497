//! Wire shapes of the CMS REST API

use serde::{Deserialize, Serialize};

use super::Cursor;

/// `GET {endpoint}`: the API root listing content refs
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRoot {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiRoot {
    /// The ref of the published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

fn first_page() -> u32 {
    1
}

/// `GET {endpoint}/documents/search` and every `next_page` continuation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SearchResponse<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default, deserialize_with = "super::cursor::deserialize_optional")]
    pub next_page: Option<Cursor>,
}

/// A CMS document carrying custom-type `data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    pub data: T,
}

pub type PostSummaryDoc = Document<PostSummaryData>;
pub type PostDetailDoc = Document<PostDetailData>;

/// Fields of a `posts` document needed by the listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostSummaryData {
    #[serde(default)]
    pub title: TextField,
    #[serde(default)]
    pub subtitle: TextField,
    #[serde(default)]
    pub author: TextField,
}

/// Fields of a `posts` document needed by the detail page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDetailData {
    #[serde(default)]
    pub title: TextField,
    #[serde(default)]
    pub subtitle: TextField,
    #[serde(default)]
    pub banner: ImageField,
    #[serde(default)]
    pub author: TextField,
    #[serde(default)]
    pub content: Vec<ContentGroup>,
}

/// Key-text fields are plain strings; title fields may arrive as rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(Vec<RichTextBlock>),
    Empty(Option<()>),
}

impl Default for TextField {
    fn default() -> Self {
        TextField::Plain(String::new())
    }
}

impl TextField {
    /// Flatten to plain text
    pub fn as_text(&self) -> String {
        match self {
            TextField::Plain(text) => text.clone(),
            TextField::Rich(blocks) => blocks
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            TextField::Empty(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageField {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One entry of the `content` group: a heading and its rich-text body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentGroup {
    #[serde(default)]
    pub heading: TextField,
    #[serde(default)]
    pub body: Vec<RichTextBlock>,
}

/// A structured-text block (`paragraph`, `heading2`, `list-item`, `image`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

/// Inline formatting over `[start, end)` of a block's text.
///
/// Offsets count UTF-16 code units, as the CMS editor does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
}
