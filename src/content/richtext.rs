//! Structured rich text to HTML
//!
//! Block text is escaped; span markup and embeds are the only raw HTML
//! emitted. The result is injected into pages unescaped.

use crate::cms::model::{RichTextBlock, Span};
use crate::helpers::{html_escape, image_tag, is_safe_href};

/// Render a block list to HTML
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

/// Plain text of a block list, one block per line
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &RichTextBlock) -> String {
    match block.kind.as_str() {
        kind @ ("heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6") => {
            let level = &kind["heading".len()..];
            format!("<h{0}>{1}</h{0}>", level, render_spans(&block.text, &block.spans))
        }
        "paragraph" => format!("<p>{}</p>", render_spans(&block.text, &block.spans)),
        "preformatted" => format!("<pre>{}</pre>", render_spans(&block.text, &block.spans)),
        "list-item" | "o-list-item" => {
            format!("<li>{}</li>", render_spans(&block.text, &block.spans))
        }
        "image" => match block.url.as_deref().filter(|u| is_safe_href(u)) {
            Some(url) => format!(
                r#"<p class="block-img">{}</p>"#,
                image_tag(url, block.alt.as_deref())
            ),
            None => String::new(),
        },
        "embed" => match &block.oembed {
            Some(embed) => format!(
                r#"<div data-oembed="{}">{}</div>"#,
                html_escape(embed.embed_url.as_deref().unwrap_or("")),
                embed.html.as_deref().unwrap_or("")
            ),
            None => String::new(),
        },
        other => {
            tracing::debug!("Rendering unknown block type {:?} as paragraph", other);
            format!("<p>{}</p>", render_spans(&block.text, &block.spans))
        }
    }
}

/// Apply inline spans to `text`, escaping everything else
fn render_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let offsets = utf16_to_char_offsets(text);
    let to_char = |utf16: usize| offsets[utf16.min(offsets.len() - 1)];

    // (start, end) in chars, plus the span itself
    let mut ranges: Vec<(usize, usize, &Span)> = spans
        .iter()
        .map(|s| (to_char(s.start), to_char(s.end), s))
        .filter(|(start, end, _)| start < end)
        .collect();
    // outer spans first so they open before the ones they contain
    ranges.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut html = String::with_capacity(text.len());
    let mut stack: Vec<usize> = Vec::new();

    for pos in 0..=chars.len() {
        // Close spans ending here; spans opened inside them are closed and reopened.
        if stack.iter().any(|&i| ranges[i].1 <= pos) {
            let mut reopen = Vec::new();
            while stack.iter().any(|&i| ranges[i].1 <= pos) {
                let Some(top) = stack.pop() else { break };
                html.push_str(close_tag(ranges[top].2));
                if ranges[top].1 > pos {
                    reopen.push(top);
                }
            }
            for i in reopen.into_iter().rev() {
                html.push_str(&open_tag(ranges[i].2));
                stack.push(i);
            }
        }

        for (i, range) in ranges.iter().enumerate() {
            if range.0 == pos {
                html.push_str(&open_tag(range.2));
                stack.push(i);
            }
        }

        if let Some(&c) = chars.get(pos) {
            match c {
                '\n' => html.push_str("<br />"),
                '&' => html.push_str("&amp;"),
                '<' => html.push_str("&lt;"),
                '>' => html.push_str("&gt;"),
                '"' => html.push_str("&quot;"),
                '\'' => html.push_str("&#39;"),
                c => html.push(c),
            }
        }
    }

    html
}

fn open_tag(span: &Span) -> String {
    let data = span.data.as_ref();
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let url = data
                .and_then(|d| d.url.as_deref())
                .filter(|u| is_safe_href(u))
                .unwrap_or("#");
            let target = match data.and_then(|d| d.target.as_deref()) {
                Some(target) => format!(
                    r#" target="{}" rel="noopener noreferrer""#,
                    html_escape(target)
                ),
                None => String::new(),
            };
            format!(r#"<a href="{}"{}>"#, html_escape(url), target)
        }
        "label" => {
            let label = data.and_then(|d| d.label.as_deref()).unwrap_or("");
            format!(r#"<span class="{}">"#, html_escape(label))
        }
        _ => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

/// `offsets[u]` is the char index holding UTF-16 unit `u`; the last entry is the char count
fn utf16_to_char_offsets(text: &str) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(text.len() + 1);
    let mut count = 0;
    for (index, c) in text.chars().enumerate() {
        for _ in 0..c.len_utf16() {
            offsets.push(index);
        }
        count = index + 1;
    }
    offsets.push(count);
    offsets
}
