//! Markdown compilation pipeline
//!
//! Bodies are parsed once with pulldown-cmark and rewritten at the event
//! level, in a fixed transform order: GFM extensions at parse time, then
//! heading IDs, anchor links, syntax highlighting, and the element-kind
//! substitutions of the rendering contract (figures, links, callouts,
//! table of contents).

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

use super::highlight::{CodeHighlighter, FenceMeta};
use crate::config::HighlightConfig;
use crate::render;

/// A heading encountered in a body, with its stable anchor id
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// The executable representation of a body: final HTML plus the heading
/// outline it was built from.
#[derive(Debug, Clone)]
pub struct CompiledBody {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Inline link icon prepended inside h1-h3 elements
const ANCHOR_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16" width="16" height="16" fill="currentColor" aria-label="Anchor Link"><path d="M7.775 3.275a.75.75 0 0 0 1.06 1.06l1.25-1.25a2 2 0 1 1 2.83 2.83l-2.5 2.5a2 2 0 0 1-2.83 0 .75.75 0 0 0-1.06 1.06 3.5 3.5 0 0 0 4.95 0l2.5-2.5a3.5 3.5 0 0 0-4.95-4.95l-1.25 1.25Zm-4.69 9.64a2 2 0 0 1 0-2.83l2.5-2.5a2 2 0 0 1 2.83 0 .75.75 0 0 0 1.06-1.06 3.5 3.5 0 0 0-4.95 0l-2.5 2.5a3.5 3.5 0 0 0 4.95 4.95l1.25-1.25a.75.75 0 0 0-1.06-1.06l-1.25 1.25a2 2 0 0 1-2.83 0Z"></path></svg>"##;

/// Anchor links are injected for headings up to this depth
const ANCHOR_MAX_LEVEL: u8 = 3;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    highlighter: CodeHighlighter,
}

impl MarkdownRenderer {
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            highlighter: CodeHighlighter::new(config),
        }
    }

    /// Compile a raw body to HTML.
    ///
    /// Fails on any rendering-contract violation (bad image payload,
    /// unknown callout type); a malformed document aborts the build.
    pub fn render(&self, body: &str) -> Result<CompiledBody> {
        // No smart punctuation: it would rewrite the straight quotes
        // inside structured image alt payloads.
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;

        let events: Vec<Event> = Parser::new_ext(body, options).collect();

        let headings = collect_headings(&events);
        let rewritten = self.rewrite(events, &headings)?;

        let mut html_output = String::new();
        html::push_html(&mut html_output, rewritten.into_iter());

        Ok(CompiledBody {
            html: html_output,
            headings,
        })
    }

    /// Second pass: substitute renderers for the element kinds the
    /// contract covers, leaving everything else untouched.
    fn rewrite<'a>(
        &self,
        events: Vec<Event<'a>>,
        headings: &[Heading],
    ) -> Result<Vec<Event<'a>>> {
        let mut out: Vec<Event> = Vec::with_capacity(events.len());
        let mut heading_index = 0usize;

        let mut iter = events.into_iter().peekable();
        while let Some(event) = iter.next() {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                }) => {
                    let heading = &headings[heading_index];
                    heading_index += 1;

                    out.push(Event::Start(Tag::Heading {
                        level,
                        id: Some(CowStr::from(heading.id.clone())),
                        classes,
                        attrs,
                    }));

                    if heading.level <= ANCHOR_MAX_LEVEL {
                        out.push(Event::InlineHtml(CowStr::from(format!(
                            r##"<a class="heading-anchor" href="#{}">{}</a>"##,
                            heading.id, ANCHOR_ICON
                        ))));
                    }
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    let meta = match kind {
                        CodeBlockKind::Fenced(info) => FenceMeta::parse(&info),
                        CodeBlockKind::Indented => FenceMeta::default(),
                    };

                    let mut code = String::new();
                    for inner in iter.by_ref() {
                        match inner {
                            Event::End(TagEnd::CodeBlock) => break,
                            Event::Text(text) => code.push_str(&text),
                            _ => {}
                        }
                    }

                    out.push(Event::Html(CowStr::from(
                        self.highlighter.render(&code, &meta),
                    )));
                }

                Event::Start(Tag::Image { dest_url, .. }) => {
                    let mut alt = String::new();
                    for inner in iter.by_ref() {
                        match inner {
                            Event::End(TagEnd::Image) => break,
                            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                            _ => {}
                        }
                    }

                    let figure = render::figure(&dest_url, &alt)
                        .map_err(|e| anyhow!("{e}"))?;
                    out.push(Event::InlineHtml(CowStr::from(figure)));
                }

                Event::Start(Tag::Link { dest_url, .. }) => {
                    out.push(Event::InlineHtml(CowStr::from(render::link_open(
                        &dest_url,
                    ))));
                }
                Event::End(TagEnd::Link) => {
                    out.push(Event::InlineHtml(CowStr::from("</a>")));
                }

                Event::Html(raw) => {
                    let substituted = substitute_components(&raw, headings)?;
                    out.push(Event::Html(CowStr::from(substituted)));
                }
                Event::InlineHtml(raw) => {
                    let substituted = substitute_components(&raw, headings)?;
                    out.push(Event::InlineHtml(CowStr::from(substituted)));
                }

                other => out.push(other),
            }
        }

        Ok(out)
    }
}

/// First pass: collect heading text and assign stable, slugified ids.
/// Colliding slugs get a numeric suffix in document order.
fn collect_headings(events: &[Event]) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(u8, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((heading_depth(*level), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    let base = {
                        let s = slug::slugify(&text);
                        if s.is_empty() {
                            "section".to_string()
                        } else {
                            s
                        }
                    };

                    let id = match seen.get_mut(&base) {
                        Some(count) => {
                            *count += 1;
                            format!("{}-{}", base, count)
                        }
                        None => {
                            seen.insert(base.clone(), 0);
                            base
                        }
                    };

                    headings.push(Heading { level, id, text });
                }
            }
            _ => {}
        }
    }

    headings
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Replace custom block invocations (`<TableOfContents />`,
/// `<CalloutPanel type="...">`) inside raw HTML chunks.
fn substitute_components(raw: &str, headings: &[Heading]) -> Result<String> {
    if !raw.contains("<TableOfContents") && !raw.contains("CalloutPanel") {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while !rest.is_empty() {
        if let Some(pos) = rest.find('<') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];
        } else {
            out.push_str(rest);
            break;
        }

        if rest.starts_with("<TableOfContents") {
            let end = rest
                .find('>')
                .ok_or_else(|| anyhow!("unterminated <TableOfContents> tag"))?;
            let toc_headings: Vec<Heading> = headings
                .iter()
                .filter(|h| h.level <= ANCHOR_MAX_LEVEL)
                .cloned()
                .collect();
            out.push_str(&render::table_of_contents(&toc_headings));
            rest = &rest[end + 1..];
        } else if rest.starts_with("<CalloutPanel") {
            let end = rest
                .find('>')
                .ok_or_else(|| anyhow!("unterminated <CalloutPanel> tag"))?;
            let tag = &rest[..=end];
            let kind = attr_value(tag, "type")
                .ok_or_else(|| anyhow!("<CalloutPanel> requires a `type` attribute"))?;
            let hide_type = tag.contains("hideType") && !tag.contains("hideType={false}");
            out.push_str(&render::callout_open(&kind, hide_type).map_err(|e| anyhow!("{e}"))?);
            rest = &rest[end + 1..];
        } else if rest.starts_with("</CalloutPanel") {
            let end = rest
                .find('>')
                .ok_or_else(|| anyhow!("unterminated </CalloutPanel> tag"))?;
            out.push_str(render::callout_close());
            rest = &rest[end + 1..];
        } else {
            out.push('<');
            rest = &rest[1..];
        }
    }

    Ok(out)
}

/// Extract a quoted attribute value from a raw tag string
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(tag[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(&HighlightConfig::default())
    }

    #[test]
    fn test_render_basic_markdown() {
        let compiled = renderer().render("## Hello World\n\nThis is a test.").unwrap();
        assert!(compiled.html.contains(r#"<h2 id="hello-world">"#));
        assert!(compiled.html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_gfm_table_and_strikethrough() {
        let compiled = renderer()
            .render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~")
            .unwrap();
        assert!(compiled.html.contains("<table>"));
        assert!(compiled.html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_heading_id_collisions_get_suffixes() {
        let compiled = renderer()
            .render("## Setup\n\n## Setup\n\n## Setup")
            .unwrap();
        let ids: Vec<&str> = compiled.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1", "setup-2"]);
        assert!(compiled.html.contains(r#"id="setup-2""#));
    }

    #[test]
    fn test_anchor_link_injected_for_h1_to_h3_only() {
        let compiled = renderer().render("# One\n\n#### Four").unwrap();
        let anchors = compiled.html.matches("heading-anchor").count();
        assert_eq!(anchors, 1);
        assert!(compiled.html.contains(r##"href="#one""##));
    }

    #[test]
    fn test_code_block_is_highlighted() {
        let compiled = renderer()
            .render("```rust\nfn main() {}\n```")
            .unwrap();
        assert!(compiled.html.contains(r#"data-language="rust""#));
        assert!(compiled.html.contains(r#"data-theme="light""#));
        assert!(compiled.html.contains("copy-button"));
    }

    #[test]
    fn test_image_becomes_figure() {
        let compiled = renderer()
            .render(r#"![{"width":800,"height":600,"caption":"Dawn"}](/photo.jpg)"#)
            .unwrap();
        assert!(compiled.html.contains("<figure"));
        assert!(compiled.html.contains("Dawn"));
    }

    #[test]
    fn test_bad_image_payload_fails_the_build() {
        assert!(renderer().render("![plain alt text](/photo.jpg)").is_err());
    }

    #[test]
    fn test_link_mapping() {
        let compiled = renderer()
            .render("[in](/posts/a) [anchor](#x) [out](https://example.com)")
            .unwrap();
        assert!(compiled.html.contains(r#"<a href="/posts/a">in</a>"#));
        assert!(compiled.html.contains(r##"<a href="#x">anchor</a>"##));
        assert!(compiled
            .html
            .contains(r#"target="_blank" rel="noopener noreferrer""#));
    }

    #[test]
    fn test_callout_panel_block() {
        let body = "<CalloutPanel type=\"warning\">\n\nCareful now.\n\n</CalloutPanel>";
        let compiled = renderer().render(body).unwrap();
        assert!(compiled.html.contains("callout-warning"));
        assert!(compiled.html.contains("Careful now."));
        assert!(compiled.html.contains("</aside>"));
    }

    #[test]
    fn test_unknown_callout_type_fails() {
        assert!(renderer()
            .render("<CalloutPanel type=\"shout\">\n\nx\n\n</CalloutPanel>")
            .is_err());
    }

    #[test]
    fn test_table_of_contents_block() {
        let body = "<TableOfContents />\n\n## First\n\n### Second\n\n#### Deep";
        let compiled = renderer().render(body).unwrap();
        assert!(compiled.html.contains("<details class=\"toc\""));
        assert!(compiled.html.contains(r##"<a href="#first">First</a>"##));
        // h4 stays out of the outline
        assert!(!compiled.html.contains(r##"<a href="#deep">"##));
    }
}
