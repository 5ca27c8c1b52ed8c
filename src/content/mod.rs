//! Content model and pipeline: schema, front-matter, markdown compilation
//! and document loading.

pub mod document;
pub mod frontmatter;
pub mod highlight;
pub mod loader;
pub mod markdown;
pub mod schema;

pub use document::{Document, DocumentIndex, DocumentKind, Page, Post};
pub use frontmatter::{FrontMatter, PageFields, PostFields, SchemaError};
pub use highlight::{CodeHighlighter, FenceMeta};
pub use loader::ContentLoader;
pub use markdown::{CompiledBody, Heading, MarkdownRenderer};
pub use schema::{reading_time, resolve_page_path, resolve_post_path};
