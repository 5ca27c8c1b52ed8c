//! List site content

use anyhow::Result;

use crate::content::ContentLoader;
use crate::Site;

pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let index = ContentLoader::new(&site.base_dir, &site.config).load()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", index.posts.len());
            for post in index.posts_by_date_desc() {
                println!(
                    "  {} - {} [{}]",
                    post.published_date.format("%Y-%m-%d"),
                    post.title,
                    post.url
                );
            }
        }
        "page" | "pages" => {
            println!("Pages ({}):", index.pages.len());
            for page in &index.pages {
                println!("  {} [{}]", page.title, page.url);
            }
        }
        "topic" | "topics" => {
            let mut topics: std::collections::HashMap<String, usize> =
                std::collections::HashMap::new();
            for post in &index.posts {
                *topics.entry(post.topic.clone()).or_insert(0) += 1;
            }
            println!("Topics ({}):", topics.len());
            let mut topics: Vec<_> = topics.into_iter().collect();
            topics.sort_by(|a, b| b.1.cmp(&a.1));
            for (topic, count) in topics {
                println!("  {} ({})", topic, count);
            }
        }
        "tag" | "tags" => {
            let mut tags: std::collections::HashMap<String, usize> =
                std::collections::HashMap::new();
            for post in &index.posts {
                for tag in &post.tags {
                    *tags.entry(tag.clone()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, topic, tag",
                content_type
            );
        }
    }

    Ok(())
}
