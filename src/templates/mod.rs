//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary; a site checkout carries only
//! content and configuration.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::date::FormattedDateTime;

/// Template renderer with the embedded theme loaded
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Bodies are pre-rendered HTML; escaping here would mangle them
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("builtin/layout.html")),
            ("index.html", include_str!("builtin/index.html")),
            ("post.html", include_str!("builtin/post.html")),
            ("page.html", include_str!("builtin/page.html")),
            ("not_found.html", include_str!("builtin/not_found.html")),
        ])?;

        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape text destined for an HTML attribute or text node.
/// Autoescaping is off globally, so plain-text fields opt in here.
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::html_escape(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

impl From<&crate::config::SiteConfig> for ConfigData {
    fn from(config: &crate::config::SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
        }
    }
}

/// A post as shown in listings and article headers
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub reading_time: Option<u32>,
    pub date: FormattedDateTime,
}

/// A navigation entry for standalone pages
#[derive(Debug, Clone, Serialize)]
pub struct NavPage {
    pub title: String,
    pub url: String,
}
