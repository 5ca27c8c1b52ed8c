//! Document models
//!
//! A document is a parsed, field-validated content unit. The two kinds
//! share the raw/compiled body pair and the computed `url`/`slug`; the
//! kind tag drives which declared fields exist and how routes derive.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::frontmatter::{PageFields, PostFields};
use super::schema::{reading_time, resolve_page_path, resolve_post_path};

/// Document kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    Post,
    Page,
}

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Short summary shown on cards and in meta tags
    pub summary: String,

    /// Publication instant
    pub published_date: DateTime<Utc>,

    /// Authored date string, kept verbatim for the display formatter
    pub published_date_raw: String,

    /// Topic the post is organized under
    pub topic: String,

    /// Ordered tags; duplicates are preserved
    pub tags: Vec<String>,

    /// Slugs of recommended posts. Weak references: they may dangle if the
    /// target was removed, and consumers must tolerate that.
    pub recommended_posts: Vec<String>,

    /// Flattened source path (relative, extension stripped)
    pub raw_path: String,

    /// Raw MDX body (front-matter removed)
    pub body: String,

    /// Compiled HTML body
    pub content: String,

    /// Site-root-relative URL, e.g. "/posts/topic-a/my-post"
    pub url: String,

    /// Route slug, e.g. "topic-a/my-post"
    pub slug: String,

    /// Estimated reading time in minutes; None for wordless bodies
    pub reading_time: Option<u32>,
}

impl Post {
    /// Build a post from validated fields; computed fields are derived
    /// here and nowhere else.
    pub fn new(fields: PostFields, raw_path: String, body: String, content: String) -> Self {
        let url = format!("/{}", resolve_post_path(&raw_path, false));
        let slug = resolve_post_path(&raw_path, true);
        let reading_time = reading_time(&body);

        Self {
            title: fields.title,
            summary: fields.summary,
            published_date: fields.published_date,
            published_date_raw: fields.published_date_raw,
            topic: fields.topic,
            tags: fields.tags,
            recommended_posts: fields.recommended_posts,
            raw_path,
            body,
            content,
            url,
            slug,
            reading_time,
        }
    }
}

/// A standalone page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Short description for meta tags
    pub description: String,

    /// Flattened source path (relative, extension stripped)
    pub raw_path: String,

    /// Raw MDX body (front-matter removed)
    pub body: String,

    /// Compiled HTML body
    pub content: String,

    /// Site-root-relative URL, e.g. "/about"
    pub url: String,

    /// Route slug, e.g. "about"
    pub slug: String,
}

impl Page {
    pub fn new(fields: PageFields, raw_path: String, body: String, content: String) -> Self {
        let slug = resolve_page_path(&raw_path);
        let url = format!("/{}", slug);

        Self {
            title: fields.title,
            description: fields.description,
            raw_path,
            body,
            content,
            url,
            slug,
        }
    }
}

/// A document of either kind
#[derive(Debug, Clone, Serialize)]
pub enum Document {
    Post(Post),
    Page(Page),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Post(_) => DocumentKind::Post,
            Document::Page(_) => DocumentKind::Page,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Document::Post(p) => &p.title,
            Document::Page(p) => &p.title,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Document::Post(p) => &p.url,
            Document::Page(p) => &p.url,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Document::Post(p) => &p.slug,
            Document::Page(p) => &p.slug,
        }
    }
}

/// The published output of one content build: an immutable snapshot of all
/// documents. Unordered; consumers sort explicitly.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
}

impl DocumentIndex {
    /// Look up a post by its slug
    pub fn find_post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Look up a page by its slug
    pub fn find_page(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.slug == slug)
    }

    /// Posts sorted by publication date, newest first
    pub fn posts_by_date_desc(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        posts
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter::FrontMatter;

    fn post_fields() -> PostFields {
        let content = "---\ntitle: My Post\nsummary: S\npublishedDate: 2024-01-15\ntopic: topic-a\ntags: [a]\n---\n";
        let (fm, _) = FrontMatter::parse(content, "test").unwrap();
        fm.into_post_fields("test").unwrap()
    }

    #[test]
    fn test_post_computed_fields() {
        let body = "some words here".to_string();
        let post = Post::new(
            post_fields(),
            "posts/topic-a/2024-1-5-my-post".to_string(),
            body,
            String::new(),
        );

        assert_eq!(post.url, "/posts/topic-a/my-post");
        assert_eq!(post.slug, "topic-a/my-post");
        assert_eq!(post.reading_time, Some(1));

        // slug == url minus the leading slash and kind segment
        let stripped = post
            .url
            .trim_start_matches('/')
            .splitn(2, '/')
            .nth(1)
            .unwrap();
        assert_eq!(post.slug, stripped);
    }

    #[test]
    fn test_page_computed_fields() {
        let content = "---\ntitle: About\ndescription: D\n---\n";
        let (fm, _) = FrontMatter::parse(content, "pages/about").unwrap();
        let fields = fm.into_page_fields("pages/about").unwrap();
        let page = Page::new(
            fields,
            "pages/about".to_string(),
            String::new(),
            String::new(),
        );

        assert_eq!(page.url, "/about");
        assert_eq!(page.slug, "about");
    }

    #[test]
    fn test_index_sorts_posts_newest_first() {
        let mut older = Post::new(
            post_fields(),
            "posts/t/2023-1-5-older".to_string(),
            String::new(),
            String::new(),
        );
        older.published_date = crate::helpers::parse_date_input("2023-01-01").unwrap();

        let newer = Post::new(
            post_fields(),
            "posts/t/2024-1-5-newer".to_string(),
            String::new(),
            String::new(),
        );

        let index = DocumentIndex {
            posts: vec![older, newer],
            pages: Vec::new(),
        };

        let sorted = index.posts_by_date_desc();
        assert_eq!(sorted[0].slug, "t/newer");
        assert_eq!(sorted[1].slug, "t/older");
    }

    #[test]
    fn test_document_dispatches_on_kind() {
        let post = Document::Post(Post::new(
            post_fields(),
            "posts/t/2024-1-5-x".to_string(),
            String::new(),
            String::new(),
        ));
        assert_eq!(post.kind(), DocumentKind::Post);
        assert_eq!(post.slug(), "t/x");
        assert_eq!(post.url(), "/posts/t/x");
    }
}
