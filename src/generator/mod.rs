//! Static output generation
//!
//! Renders the document index into the public directory: front page, post
//! listing, article and page routes, the 404 page, the sitemap and the
//! embedded assets.

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{DocumentIndex, Post};
use crate::helpers::{self, escape_xml};
use crate::templates::{ConfigData, NavPage, PostCard, TemplateRenderer};

const SITE_CSS: &str = include_str!("../templates/builtin/site.css");
const SITE_JS: &str = include_str!("../templates/builtin/site.js");

/// Static site generator
pub struct Generator {
    config: SiteConfig,
    static_dir: PathBuf,
    public_dir: PathBuf,
    renderer: TemplateRenderer,
}

impl Generator {
    pub fn new(base_dir: &Path, config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            static_dir: base_dir.join("static"),
            public_dir: base_dir.join(&config.public_dir),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Render the whole site into the public directory.
    pub fn generate(&self, index: &DocumentIndex) -> Result<()> {
        fs::create_dir_all(&self.public_dir)?;

        self.write_assets()?;
        self.copy_static_files()?;

        let config_data = ConfigData::from(&self.config);
        let nav_pages = self.nav_pages(index);
        let cards: Vec<PostCard> = index.posts_by_date_desc().into_iter().map(card).collect();

        self.generate_listing(&config_data, &nav_pages, &cards, "index.html")?;
        self.generate_listing(&config_data, &nav_pages, &cards, "posts/index.html")?;
        self.generate_post_pages(index, &config_data, &nav_pages)?;
        self.generate_page_pages(index, &config_data, &nav_pages)?;
        self.generate_not_found(&config_data, &nav_pages)?;
        self.generate_sitemap(index)?;

        tracing::info!(
            documents = index.len(),
            out = %self.public_dir.display(),
            "site generated"
        );
        Ok(())
    }

    /// Pages shown in the header navigation, in stable slug order
    fn nav_pages(&self, index: &DocumentIndex) -> Vec<NavPage> {
        let mut pages: Vec<NavPage> = index
            .pages
            .iter()
            .map(|p| NavPage {
                title: p.title.clone(),
                url: p.url.clone(),
            })
            .collect();
        pages.sort_by(|a, b| a.url.cmp(&b.url));
        pages
    }

    fn generate_listing(
        &self,
        config_data: &ConfigData,
        nav_pages: &[NavPage],
        cards: &[PostCard],
        out_path: &str,
    ) -> Result<()> {
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("nav_pages", nav_pages);
        context.insert("posts", cards);

        let html = self.renderer.render("index.html", &context)?;
        self.write_file(out_path, html.as_bytes())
    }

    fn generate_post_pages(
        &self,
        index: &DocumentIndex,
        config_data: &ConfigData,
        nav_pages: &[NavPage],
    ) -> Result<()> {
        for post in &index.posts {
            let image = helpers::full_url_for(
                &self.config,
                &helpers::og_image_url(&self.config, &post.title, true),
            );
            let meta = helpers::open_graph(
                &post.title,
                &post.summary,
                &helpers::full_url_for(&self.config, &post.url),
                &image,
                "article",
            );

            // Dangling recommendations are skipped, not fatal; the target
            // may simply be unpublished.
            let recommended: Vec<PostCard> = post
                .recommended_posts
                .iter()
                .filter_map(|slug| {
                    let found = index.find_post(slug);
                    if found.is_none() {
                        tracing::warn!(
                            post = %post.slug,
                            recommended = %slug,
                            "recommended post not found, skipping"
                        );
                    }
                    found.map(card)
                })
                .collect();

            let mut context = Context::new();
            context.insert("config", config_data);
            context.insert("nav_pages", nav_pages);
            context.insert("post", &card(post));
            context.insert("content", &post.content);
            context.insert("meta", &meta);
            context.insert("recommended", &recommended);

            let html = self.renderer.render("post.html", &context)?;
            let out = format!("{}/index.html", post.url.trim_start_matches('/'));
            self.write_file(&out, html.as_bytes())?;
        }
        Ok(())
    }

    fn generate_page_pages(
        &self,
        index: &DocumentIndex,
        config_data: &ConfigData,
        nav_pages: &[NavPage],
    ) -> Result<()> {
        for page in &index.pages {
            let image = helpers::full_url_for(
                &self.config,
                &helpers::og_image_url(&self.config, &page.title, false),
            );
            let meta = helpers::open_graph(
                &page.title,
                &page.description,
                &helpers::full_url_for(&self.config, &page.url),
                &image,
                "website",
            );

            let mut context = Context::new();
            context.insert("config", config_data);
            context.insert("nav_pages", nav_pages);
            context.insert("page", page);
            context.insert("content", &page.content);
            context.insert("meta", &meta);

            let html = self.renderer.render("page.html", &context)?;
            let out = format!("{}/index.html", page.url.trim_start_matches('/'));
            self.write_file(&out, html.as_bytes())?;
        }
        Ok(())
    }

    fn generate_not_found(&self, config_data: &ConfigData, nav_pages: &[NavPage]) -> Result<()> {
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("nav_pages", nav_pages);

        let html = self.renderer.render("not_found.html", &context)?;
        self.write_file("404.html", html.as_bytes())
    }

    /// Sitemap priorities step down from the front page to listings to
    /// articles to standalone pages.
    fn generate_sitemap(&self, index: &DocumentIndex) -> Result<()> {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        let mut entry = |path: &str, freq: &str, priority: &str| {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                escape_xml(&helpers::full_url_for(&self.config, path))
            ));
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", freq));
            xml.push_str(&format!("    <priority>{}</priority>\n", priority));
            xml.push_str("  </url>\n");
        };

        entry("", "weekly", "1.0");
        entry("/posts", "weekly", "0.9");
        for post in index.posts_by_date_desc() {
            entry(&post.url, "monthly", "0.7");
        }
        for page in &index.pages {
            entry(&page.url, "monthly", "0.5");
        }

        xml.push_str("</urlset>\n");
        self.write_file("sitemap.xml", xml.as_bytes())
    }

    fn write_assets(&self) -> Result<()> {
        self.write_file("css/site.css", SITE_CSS.as_bytes())?;
        self.write_file("js/site.js", SITE_JS.as_bytes())
    }

    /// Copy everything under static/ verbatim into the output root.
    fn copy_static_files(&self) -> Result<()> {
        if !self.static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(&self.static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&self.static_dir)?;
            let dest = self.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }
        Ok(())
    }

    fn write_file(&self, relative: &str, bytes: &[u8]) -> Result<()> {
        let dest = self.public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, bytes).with_context(|| format!("failed to write {}", dest.display()))?;
        tracing::debug!(file = %dest.display(), "written");
        Ok(())
    }
}

/// Listing/header view of a post
fn card(post: &Post) -> PostCard {
    PostCard {
        title: post.title.clone(),
        summary: post.summary.clone(),
        url: post.url.clone(),
        topic: post.topic.clone(),
        tags: post.tags.clone(),
        reading_time: post.reading_time,
        date: helpers::date::format_date_time(&post.published_date_raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLoader;
    use std::path::Path;
    use tempfile::tempdir;

    const POST: &str = r#"---
title: My Post
summary: A post about things
publishedDate: 2024-01-15
topic: topic-a
tags: rust
recommendedPosts:
  - topic-a/other-post
  - topic-a/missing
---

## Heading

Body text for the article.
"#;

    const OTHER_POST: &str = r#"---
title: Other Post
summary: Another one
publishedDate: 2024-02-20
topic: topic-a
tags: rust
---

More body text.
"#;

    const PAGE: &str = r#"---
title: About
description: Who writes this blog
---

I write things.
"#;

    fn write_content(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build_site(root: &Path) -> SiteConfig {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        write_content(root, "content/posts/topic-a/2024-1-5-my-post.mdx", POST);
        write_content(root, "content/posts/topic-a/2024-2-2-other-post.mdx", OTHER_POST);
        write_content(root, "content/pages/about.mdx", PAGE);

        let index = ContentLoader::new(root, &config).load().unwrap();
        Generator::new(root, &config)
            .unwrap()
            .generate(&index)
            .unwrap();
        config
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join("public").join(rel)).unwrap()
    }

    #[test]
    fn test_generates_routes() {
        let dir = tempdir().unwrap();
        build_site(dir.path());

        assert!(dir.path().join("public/index.html").exists());
        assert!(dir.path().join("public/posts/index.html").exists());
        assert!(dir
            .path()
            .join("public/posts/topic-a/my-post/index.html")
            .exists());
        assert!(dir.path().join("public/about/index.html").exists());
        assert!(dir.path().join("public/404.html").exists());
        assert!(dir.path().join("public/css/site.css").exists());
        assert!(dir.path().join("public/js/site.js").exists());
    }

    #[test]
    fn test_post_page_has_meta_and_recommendations() {
        let dir = tempdir().unwrap();
        build_site(dir.path());

        let html = read(dir.path(), "posts/topic-a/my-post/index.html");
        assert!(html.contains(r#"property="og:type" content="article""#));
        assert!(html.contains("og?title=My%20Post&blog=true"));
        // resolvable recommendation kept, dangling one dropped
        assert!(html.contains("Other Post"));
        assert!(!html.contains("topic-a/missing"));
    }

    #[test]
    fn test_index_lists_posts_newest_first() {
        let dir = tempdir().unwrap();
        build_site(dir.path());

        let html = read(dir.path(), "index.html");
        let newer = html.find("Other Post").unwrap();
        let older = html.find("My Post").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn test_sitemap_priorities() {
        let dir = tempdir().unwrap();
        build_site(dir.path());

        let xml = read(dir.path(), "sitemap.xml");
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/posts</loc>"));
        assert!(xml.contains("<loc>https://example.com/posts/topic-a/my-post</loc>"));
        assert!(xml.contains("<loc>https://example.com/about</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        assert!(xml.contains("<priority>0.7</priority>"));
        assert!(xml.contains("<priority>0.5</priority>"));
    }

    #[test]
    fn test_static_files_are_copied() {
        let dir = tempdir().unwrap();
        write_content(dir.path(), "static/img/photo.jpg", "fake image bytes");
        build_site(dir.path());

        assert!(dir.path().join("public/img/photo.jpg").exists());
    }
}
