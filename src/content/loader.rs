//! Content discovery and loading
//!
//! Walks the content directory, parses front-matter, compiles bodies and
//! builds the in-memory document index. Any schema or pipeline violation
//! aborts the load; there is no partially-valid index.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::document::{Document, DocumentIndex, Page, Post};
use super::frontmatter::FrontMatter;
use super::markdown::MarkdownRenderer;
use crate::config::SiteConfig;

const CONTENT_EXTENSION: &str = "mdx";

/// Loads every document under the content directory
pub struct ContentLoader {
    content_dir: PathBuf,
    posts_dir: String,
    pages_dir: String,
    renderer: MarkdownRenderer,
}

impl ContentLoader {
    pub fn new(base_dir: &Path, config: &SiteConfig) -> Self {
        Self {
            content_dir: base_dir.join(&config.content_dir),
            posts_dir: config.posts_dir.clone(),
            pages_dir: config.pages_dir.clone(),
            renderer: MarkdownRenderer::new(&config.highlight),
        }
    }

    /// Load all posts and pages into an index.
    pub fn load(&self) -> Result<DocumentIndex> {
        let mut index = DocumentIndex::default();

        for path in self.discover(&self.posts_dir)? {
            match self.load_document(&path, true)? {
                Document::Post(post) => index.posts.push(post),
                Document::Page(_) => unreachable!(),
            }
        }
        for path in self.discover(&self.pages_dir)? {
            match self.load_document(&path, false)? {
                Document::Page(page) => index.pages.push(page),
                Document::Post(_) => unreachable!(),
            }
        }

        check_unique_slugs(&index)?;

        tracing::info!(
            posts = index.posts.len(),
            pages = index.pages.len(),
            "content loaded"
        );
        Ok(index)
    }

    /// Discover source files under one kind directory, in a stable order.
    fn discover(&self, kind_dir: &str) -> Result<Vec<PathBuf>> {
        let root = self.content_dir.join(kind_dir);
        if !root.exists() {
            tracing::debug!(dir = %root.display(), "content dir missing, skipping");
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CONTENT_EXTENSION) {
                paths.push(path.to_path_buf());
            }
        }
        Ok(paths)
    }

    fn load_document(&self, path: &Path, is_post: bool) -> Result<Document> {
        let raw_path = self.raw_path(path)?;
        let document = format!("{raw_path}.{CONTENT_EXTENSION}");
        tracing::debug!(document = %document, "loading");

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let (front_matter, body) = FrontMatter::parse(&content, &document)?;
        let body = body.to_string();

        let compiled = self
            .renderer
            .render(&body)
            .with_context(|| format!("failed to compile {document}"))?;

        if is_post {
            let fields = front_matter.into_post_fields(&document)?;
            Ok(Document::Post(Post::new(
                fields,
                raw_path,
                body,
                compiled.html,
            )))
        } else {
            let fields = front_matter.into_page_fields(&document)?;
            Ok(Document::Page(Page::new(
                fields,
                raw_path,
                body,
                compiled.html,
            )))
        }
    }

    /// Path relative to the content dir, forward-slashed, extension
    /// stripped. This is the input every computed field derives from.
    fn raw_path(&self, path: &Path) -> Result<String> {
        let rel = path
            .strip_prefix(&self.content_dir)
            .with_context(|| format!("{} is outside the content dir", path.display()))?;
        let rel = rel.with_extension("");

        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }
}

/// Every slug must be unique within its kind; a collision would make one
/// document unreachable.
fn check_unique_slugs(index: &DocumentIndex) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for post in &index.posts {
        if let Some(other) = seen.insert(&post.slug, &post.raw_path) {
            bail!(
                "duplicate post slug `{}` ({} and {})",
                post.slug,
                other,
                post.raw_path
            );
        }
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for page in &index.pages {
        if let Some(other) = seen.insert(&page.slug, &page.raw_path) {
            bail!(
                "duplicate page slug `{}` ({} and {})",
                page.slug,
                other,
                page.raw_path
            );
        }
    }
    Ok(())
}
