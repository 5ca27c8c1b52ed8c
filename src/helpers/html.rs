//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape XML special characters (sitemap, SVG text)
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Truncate a string to a number of characters, without appending an
/// ellipsis. Used for the Open-Graph title cap.
pub fn truncate_chars(s: &str, length: usize) -> String {
    s.chars().take(length).collect()
}

/// Generate Open Graph + Twitter card meta tags for a document
pub fn open_graph(
    title: &str,
    description: &str,
    url: &str,
    image: &str,
    og_type: &str,
) -> String {
    let mut tags = vec![
        format!(r#"<meta property="og:type" content="{}">"#, og_type),
        format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape(title)
        ),
        format!(r#"<meta property="og:url" content="{}">"#, url),
    ];

    if !description.is_empty() {
        tags.push(format!(
            r#"<meta property="og:description" content="{}">"#,
            html_escape(description)
        ));
        tags.push(format!(
            r#"<meta name="description" content="{}">"#,
            html_escape(description)
        ));
    }

    if !image.is_empty() {
        tags.push(format!(r#"<meta property="og:image" content="{}">"#, image));
        tags.push(format!(
            r#"<meta name="twitter:card" content="summary_large_image">"#
        ));
        tags.push(format!(r#"<meta name="twitter:image" content="{}">"#, image));
    }

    tags.push(format!(
        r#"<meta name="twitter:title" content="{}">"#,
        html_escape(title)
    ));

    tags.join("\n")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Hello World", 5), "Hello");
        assert_eq!(truncate_chars("Hi", 100), "Hi");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_open_graph_includes_twitter_card() {
        let tags = open_graph("T", "D", "https://example.com/p", "/og?title=T", "article");
        assert!(tags.contains(r#"og:title" content="T""#));
        assert!(tags.contains("summary_large_image"));
    }
}
