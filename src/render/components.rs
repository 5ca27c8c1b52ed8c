//! Rendering contract: element-kind to markup substitutions
//!
//! The compiled body never contains bare `<img>`/`<a>`/`<pre>` tags; each
//! semantic kind maps to a fixed renderer here. Violations of the image
//! contract are build-time errors so a bad document can never ship.

use serde::Deserialize;
use thiserror::Error;

use crate::content::Heading;
use crate::helpers::html_escape;

/// A violation of the rendering contract in a document body. Fatal.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image: missing `src`")]
    MissingImageSrc,

    #[error("invalid image {src:?}: unable to parse structured alt payload: {reason}")]
    BadImageAlt { src: String, reason: String },

    #[error("unknown callout type {0:?}")]
    UnknownCalloutType(String),
}

/// Structured payload carried in an image's alt text
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAltProps {
    pub width: u32,
    pub height: u32,
    pub alt: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub unoptimized: bool,
}

/// Render an image as a figure.
///
/// The alt text is a JSON payload (`{width, height, alt?, caption?,
/// unoptimized?}`); an absent `src` or an unparseable payload aborts the
/// build rather than surfacing at render time.
pub fn figure(src: &str, alt_payload: &str) -> Result<String, RenderError> {
    if src.is_empty() {
        return Err(RenderError::MissingImageSrc);
    }
    if alt_payload.is_empty() {
        return Err(RenderError::BadImageAlt {
            src: src.to_string(),
            reason: "alt was empty".to_string(),
        });
    }

    let props: ImageAltProps =
        serde_json::from_str(alt_payload).map_err(|e| RenderError::BadImageAlt {
            src: src.to_string(),
            reason: e.to_string(),
        })?;

    let alt = props.alt.as_deref().unwrap_or("");
    let mut out = format!(
        r#"<figure class="figure"><img src="{}" alt="{}" width="{}" height="{}" loading="lazy">"#,
        html_escape(src),
        html_escape(alt),
        props.width,
        props.height
    );

    if let Some(caption) = &props.caption {
        out.push_str(&format!(
            "<figcaption>{}</figcaption>",
            html_escape(caption)
        ));
    }

    out.push_str("</figure>");
    Ok(out)
}

/// How a link destination should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// Root-relative: internal navigation
    Internal,
    /// Same-page anchor (`#...`)
    Anchor,
    /// Anything else: opens in a new context without opener access
    External,
}

pub fn classify_link(href: &str) -> LinkTarget {
    if href.starts_with('/') {
        LinkTarget::Internal
    } else if href.starts_with('#') {
        LinkTarget::Anchor
    } else {
        LinkTarget::External
    }
}

/// Opening `<a>` tag for a link destination. External links must never
/// leak window-opener access to the originating page.
pub fn link_open(href: &str) -> String {
    match classify_link(href) {
        LinkTarget::Internal | LinkTarget::Anchor => {
            format!(r#"<a href="{}">"#, html_escape(href))
        }
        LinkTarget::External => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
            html_escape(href)
        ),
    }
}

const CALLOUT_TYPES: [&str; 5] = ["info", "note", "success", "warning", "error"];

/// Opening markup for a callout panel block
pub fn callout_open(kind: &str, hide_type: bool) -> Result<String, RenderError> {
    if !CALLOUT_TYPES.contains(&kind) {
        return Err(RenderError::UnknownCalloutType(kind.to_string()));
    }

    let mut out = format!(r#"<aside class="callout callout-{}">"#, kind);
    if !hide_type {
        let mut label = kind.to_string();
        label[..1].make_ascii_uppercase();
        out.push_str(&format!(r#"<div class="callout-label">{}</div>"#, label));
    }
    Ok(out)
}

pub fn callout_close() -> &'static str {
    "</aside>"
}

/// Table of contents built from the document's own h1-h3 headings,
/// rendered as a disclosure so the expand state needs no script.
pub fn table_of_contents(headings: &[Heading]) -> String {
    let mut out = String::from(
        r#"<details class="toc"><summary>Table of Contents</summary><ol>"#,
    );

    for heading in headings {
        out.push_str(&format!(
            r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
            heading.level,
            heading.id,
            html_escape(&heading.text)
        ));
    }

    out.push_str("</ol></details>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_parses_structured_alt() {
        let html = figure(
            "/images/photo.jpg",
            r#"{"width":800,"height":600,"alt":"A photo","caption":"Taken at dawn"}"#,
        )
        .unwrap();
        assert!(html.contains(r#"src="/images/photo.jpg""#));
        assert!(html.contains(r#"width="800""#));
        assert!(html.contains("<figcaption>Taken at dawn</figcaption>"));
    }

    #[test]
    fn test_figure_without_caption() {
        let html = figure("/i.png", r#"{"width":10,"height":10}"#).unwrap();
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn test_figure_rejects_missing_src_and_bad_alt() {
        assert!(matches!(
            figure("", r#"{"width":1,"height":1}"#),
            Err(RenderError::MissingImageSrc)
        ));
        assert!(matches!(
            figure("/i.png", "just words"),
            Err(RenderError::BadImageAlt { .. })
        ));
        // width/height are required by the payload schema
        assert!(matches!(
            figure("/i.png", r#"{"alt":"x"}"#),
            Err(RenderError::BadImageAlt { .. })
        ));
    }

    #[test]
    fn test_link_classification() {
        assert_eq!(classify_link("/posts/a"), LinkTarget::Internal);
        assert_eq!(classify_link("#section"), LinkTarget::Anchor);
        assert_eq!(classify_link("https://example.com"), LinkTarget::External);
    }

    #[test]
    fn test_external_link_has_no_opener() {
        let open = link_open("https://example.com");
        assert!(open.contains(r#"target="_blank""#));
        assert!(open.contains("noopener"));
        assert!(open.contains("noreferrer"));

        assert_eq!(link_open("/about"), r#"<a href="/about">"#);
        assert_eq!(link_open("#top"), r##"<a href="#top">"##);
    }

    #[test]
    fn test_callout_open() {
        let html = callout_open("warning", false).unwrap();
        assert!(html.contains("callout-warning"));
        assert!(html.contains(">Warning<"));

        let bare = callout_open("info", true).unwrap();
        assert!(!bare.contains("callout-label"));

        assert!(callout_open("shout", false).is_err());
    }

    #[test]
    fn test_table_of_contents() {
        let headings = vec![
            Heading {
                level: 2,
                id: "intro".to_string(),
                text: "Intro".to_string(),
            },
            Heading {
                level: 3,
                id: "details".to_string(),
                text: "Details".to_string(),
            },
        ];
        let html = table_of_contents(&headings);
        assert!(html.contains(r##"<a href="#intro">Intro</a>"##));
        assert!(html.contains("toc-level-3"));
        assert!(html.starts_with("<details"));
    }
}
