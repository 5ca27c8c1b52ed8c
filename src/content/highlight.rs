//! Fenced code block rendering with syntax highlighting
//!
//! Each fenced block is tokenized with syntect and re-emitted twice, once
//! per theme variant, so the client can switch between light and dark
//! without re-rendering. The fence info string may carry highlight
//! annotations:
//!
//! ```text
//! ```rust {1,3-4} "Result"
//! ```
//!
//! `{..}` flags whole lines, quoted strings flag every occurrence of a
//! word. Lines with no visible content are emitted as a single space so
//! the block keeps its layout height.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

/// Parsed fence info string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FenceMeta {
    pub lang: Option<String>,
    /// 1-based line numbers to mark as highlighted
    pub highlight_lines: Vec<(usize, usize)>,
    /// Words to mark as highlighted wherever they occur
    pub highlight_words: Vec<String>,
}

impl FenceMeta {
    /// Parse a fence info string like `rust {1,3-4} "word"`.
    pub fn parse(info: &str) -> Self {
        let info = info.trim();
        let mut meta = FenceMeta::default();

        let lang_end = info
            .find(|c: char| c.is_whitespace() || c == '{')
            .unwrap_or(info.len());
        if lang_end > 0 {
            meta.lang = Some(info[..lang_end].to_string());
        }

        let mut rest = &info[lang_end..];
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            if let Some(after) = rest.strip_prefix('{') {
                let Some(close) = after.find('}') else { break };
                for part in after[..close].split(',') {
                    let part = part.trim();
                    if let Some((a, b)) = part.split_once('-') {
                        if let (Ok(a), Ok(b)) = (a.trim().parse(), b.trim().parse()) {
                            meta.highlight_lines.push((a, b));
                        }
                    } else if let Ok(n) = part.parse() {
                        meta.highlight_lines.push((n, n));
                    }
                }
                rest = &after[close + 1..];
            } else if let Some(after) = rest.strip_prefix('"') {
                let Some(close) = after.find('"') else { break };
                if !after[..close].is_empty() {
                    meta.highlight_words.push(after[..close].to_string());
                }
                rest = &after[close + 1..];
            } else {
                // Unrecognised annotation token; skip it
                let skip = rest.find(char::is_whitespace).unwrap_or(rest.len());
                rest = &rest[skip..];
            }
        }

        meta
    }

    fn line_is_highlighted(&self, line: usize) -> bool {
        self.highlight_lines.iter().any(|&(a, b)| line >= a && line <= b)
    }
}

/// Renders fenced code blocks as themed token spans
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    light: Theme,
    dark: Theme,
}

impl CodeHighlighter {
    pub fn new(config: &HighlightConfig) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let pick = |name: &str| {
            theme_set
                .themes
                .get(name)
                .or_else(|| theme_set.themes.values().next())
                .expect("syntect default themes missing")
                .clone()
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            light: pick(&config.light_theme),
            dark: pick(&config.dark_theme),
        }
    }

    /// Render a fenced block as a figure with a copy affordance and one
    /// `<pre>` per theme variant.
    pub fn render(&self, code: &str, meta: &FenceMeta) -> String {
        let lang = meta.lang.as_deref().unwrap_or("text");

        let mut out = format!(r#"<figure class="code-block" data-language="{}">"#, lang);
        out.push('\n');
        // The copy payload is the concatenated plain text of the block
        out.push_str(&format!(
            r#"<button type="button" class="copy-button" aria-label="Copy code" data-clipboard="{}">Copy</button>"#,
            html_escape(code)
        ));
        out.push('\n');
        out.push_str(&self.render_variant(code, meta, &self.light, "light"));
        out.push_str(&self.render_variant(code, meta, &self.dark, "dark"));
        out.push_str("</figure>");
        out
    }

    fn render_variant(&self, code: &str, meta: &FenceMeta, theme: &Theme, variant: &str) -> String {
        let lang = meta.lang.as_deref().unwrap_or("text");
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut out = format!(r#"<pre data-theme="{}"><code>"#, variant);

        for (number, line) in LinesWithEndings::from(code).enumerate() {
            let number = number + 1;
            let class = if meta.line_is_highlighted(number) {
                "line highlighted"
            } else {
                "line"
            };

            let text = line.trim_end_matches(['\r', '\n']);
            if text.trim().is_empty() {
                // Single space token preserves the line's layout height
                out.push_str(&format!(r#"<span class="{}"> </span>"#, class));
                out.push('\n');
                continue;
            }

            out.push_str(&format!(r#"<span class="{}">"#, class));
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(tokens) => {
                    out.push_str(&emit_tokens(text, &tokens, &meta.highlight_words));
                }
                Err(_) => out.push_str(&html_escape(text)),
            }
            out.push_str("</span>\n");
        }

        out.push_str("</code></pre>\n");
        out
    }
}

/// Emit one line's tokens, splitting them at highlighted-word boundaries.
fn emit_tokens(line_text: &str, tokens: &[(Style, &str)], words: &[String]) -> String {
    let ranges = word_ranges(line_text, words);
    let mut out = String::new();
    let mut offset = 0usize;

    for (style, token) in tokens {
        let token = token.trim_end_matches(['\r', '\n']);
        if token.is_empty() {
            continue;
        }

        let colour = format!(
            "#{:02x}{:02x}{:02x}",
            style.foreground.r, style.foreground.g, style.foreground.b
        );

        for (text, in_word) in split_at_ranges(token, offset, &ranges) {
            if text.is_empty() {
                continue;
            }
            if in_word {
                out.push_str(&format!(
                    r#"<span class="word" style="color:{}">{}</span>"#,
                    colour,
                    html_escape(text)
                ));
            } else {
                out.push_str(&format!(
                    r#"<span style="color:{}">{}</span>"#,
                    colour,
                    html_escape(text)
                ));
            }
        }

        offset += token.len();
    }

    out
}

/// Byte ranges of every occurrence of every highlighted word.
fn word_ranges(line: &str, words: &[String]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    for word in words {
        if word.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(pos) = line[from..].find(word.as_str()) {
            let start = from + pos;
            ranges.push((start, start + word.len()));
            from = start + word.len();
        }
    }
    ranges.sort_unstable();
    ranges
}

/// Split a token (starting at `offset` within the line) into segments that
/// are fully inside or fully outside the highlighted ranges.
fn split_at_ranges<'a>(
    token: &'a str,
    offset: usize,
    ranges: &[(usize, usize)],
) -> Vec<(&'a str, bool)> {
    let end = offset + token.len();
    let mut cuts = vec![offset, end];
    for &(a, b) in ranges {
        if a > offset && a < end {
            cuts.push(a);
        }
        if b > offset && b < end {
            cuts.push(b);
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut segments = Vec::new();
    for pair in cuts.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let in_word = ranges.iter().any(|&(a, b)| from >= a && to <= b);
        // Cuts come from byte positions of ASCII-safe matches; guard anyway
        if let Some(text) = token.get(from - offset..to - offset) {
            segments.push((text, in_word));
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> CodeHighlighter {
        CodeHighlighter::new(&HighlightConfig::default())
    }

    #[test]
    fn test_fence_meta_lang_only() {
        let meta = FenceMeta::parse("rust");
        assert_eq!(meta.lang.as_deref(), Some("rust"));
        assert!(meta.highlight_lines.is_empty());
        assert!(meta.highlight_words.is_empty());
    }

    #[test]
    fn test_fence_meta_lines_and_words() {
        let meta = FenceMeta::parse(r#"rust {1,3-4} "Result""#);
        assert_eq!(meta.highlight_lines, vec![(1, 1), (3, 4)]);
        assert_eq!(meta.highlight_words, vec!["Result"]);
        assert!(meta.line_is_highlighted(3));
        assert!(meta.line_is_highlighted(4));
        assert!(!meta.line_is_highlighted(2));
    }

    #[test]
    fn test_fence_meta_empty() {
        let meta = FenceMeta::parse("");
        assert_eq!(meta.lang, None);
    }

    #[test]
    fn test_render_emits_both_theme_variants() {
        let html = highlighter().render("fn main() {}\n", &FenceMeta::parse("rust"));
        assert!(html.contains(r#"data-theme="light""#));
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(html.contains(r#"data-language="rust""#));
        assert!(html.contains("fn"));
    }

    #[test]
    fn test_blank_line_becomes_single_space() {
        let html = highlighter().render("a\n\nb\n", &FenceMeta::parse("text"));
        assert!(html.contains(r#"<span class="line"> </span>"#));
    }

    #[test]
    fn test_highlighted_line_gets_marker_class() {
        let html = highlighter().render("a\nb\n", &FenceMeta::parse("text {2}"));
        assert!(html.contains(r#"<span class="line highlighted">"#));
    }

    #[test]
    fn test_highlighted_word_gets_marker_class() {
        let html = highlighter().render(
            "let x = foo();\n",
            &FenceMeta::parse(r#"rust "foo""#),
        );
        assert!(html.contains(r#"class="word""#));
    }

    #[test]
    fn test_copy_payload_is_escaped_source() {
        let html = highlighter().render("<tag>\n", &FenceMeta::parse("text"));
        assert!(html.contains(r#"data-clipboard="&lt;tag&gt;"#));
    }
}
