//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Whether a link target may be emitted into an `href`/`src` attribute.
///
/// Rejects script-capable schemes such as `javascript:`.
pub fn is_safe_href(url: &str) -> bool {
    let lowered = url.trim().to_ascii_lowercase();
    match lowered.split_once(':') {
        // a colon after the first slash belongs to the path, not a scheme
        Some((scheme, _)) if !scheme.contains('/') => {
            matches!(scheme, "http" | "https" | "mailto" | "tel")
        }
        _ => true,
    }
}

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag("https://images.prismic.io/a.png", Some("Banner")) // -> <img src="..." alt="Banner">
/// ```
pub fn image_tag(src: &str, alt: Option<&str>) -> String {
    format!(
        r#"<img src="{}" alt="{}">"#,
        html_escape(src),
        html_escape(alt.unwrap_or(""))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_is_safe_href() {
        assert!(is_safe_href("https://example.com"));
        assert!(is_safe_href("/post/hello"));
        assert!(is_safe_href("mailto:me@example.com"));
        assert!(is_safe_href("/a:b"));
        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href(" JavaScript:alert(1)"));
        assert!(!is_safe_href("data:text/html,hi"));
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(
            image_tag("https://img/a.png?w=1&h=2", Some("A \"cat\"")),
            r#"<img src="https://img/a.png?w=1&amp;h=2" alt="A &quot;cat&quot;">"#
        );
    }
}
