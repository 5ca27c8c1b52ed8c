//! Open Graph image generation
//!
//! Renders the 1200x630 social card as a standalone SVG document. Titles
//! are truncated to 100 characters before layout.

use serde::Deserialize;

use crate::config::SiteConfig;
use crate::helpers::{escape_xml, truncate_chars};

pub const OG_WIDTH: u32 = 1200;
pub const OG_HEIGHT: u32 = 630;

/// Longest title the card will lay out
const TITLE_MAX_CHARS: usize = 100;

/// Approximate characters per wrapped title line at the card font size
const LINE_WRAP_CHARS: usize = 28;
const MAX_TITLE_LINES: usize = 4;

/// Query parameters accepted by the image endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OgImageParams {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub blog: bool,
}

/// Render the social card for a title.
pub fn render_svg(params: &OgImageParams, config: &SiteConfig) -> String {
    let title = truncate_chars(params.title.trim(), TITLE_MAX_CHARS);
    let title = if title.is_empty() {
        config.title.clone()
    } else {
        title
    };

    let lines = wrap_title(&title);
    let mut svg = format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            r##"<rect width="{w}" height="{h}" fill="#17191c"/>"##,
            r##"<rect x="0" y="0" width="{w}" height="8" fill="#6cb2ff"/>"##
        ),
        w = OG_WIDTH,
        h = OG_HEIGHT,
    );

    let mut y = 240;
    for line in &lines {
        svg.push_str(&format!(
            r##"<text x="80" y="{y}" font-family="sans-serif" font-size="64" font-weight="700" fill="#f3f4f6">{}</text>"##,
            escape_xml(line)
        ));
        y += 80;
    }

    if let Some(subtitle) = params.subtitle.as_deref().filter(|s| !s.is_empty()) {
        svg.push_str(&format!(
            r##"<text x="80" y="{y}" font-family="sans-serif" font-size="32" fill="#9aa2ad">{}</text>"##,
            escape_xml(&truncate_chars(subtitle, 120))
        ));
    }

    let footer = if params.blog {
        format!("{} · Blog", config.title)
    } else {
        config.title.clone()
    };
    svg.push_str(&format!(
        r##"<text x="80" y="560" font-family="sans-serif" font-size="28" fill="#6cb2ff">{}</text>"##,
        escape_xml(&footer)
    ));

    svg.push_str("</svg>");
    svg
}

/// Greedy word wrap; a final overflow line is swallowed with an ellipsis.
fn wrap_title(title: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > LINE_WRAP_CHARS
        {
            lines.push(std::mem::take(&mut current));
            if lines.len() == MAX_TITLE_LINES {
                let last = lines.last_mut().unwrap();
                last.push('…');
                return lines;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
