//! Scaffold a new post or page

use anyhow::Result;
use std::fs;

use crate::Site;

/// Create a new content file with front-matter filled in.
///
/// Posts land at `content/posts/<topic>/<yy-mm-dd->slug.mdx`. The date
/// prefix is an ordering aid that the URL derivation strips; it must be
/// exactly nine characters, which `%y-%m-%d-` always is.
pub fn run(site: &Site, title: &str, topic: Option<&str>, page: bool) -> Result<()> {
    let slug = slug::slugify(title);
    let now = chrono::Utc::now();

    let (file_path, content) = if page {
        let path = site
            .content_dir
            .join(&site.config.pages_dir)
            .join(format!("{}.mdx", slug));
        let content = format!(
            "---\ntitle: {}\ndescription: \n---\n\n",
            title
        );
        (path, content)
    } else {
        let topic = topic.unwrap_or("general");
        let prefix = now.format("%y-%m-%d-").to_string();
        let path = site
            .content_dir
            .join(&site.config.posts_dir)
            .join(topic)
            .join(format!("{}{}.mdx", prefix, slug));
        let content = format!(
            "---\ntitle: {}\nsummary: \npublishedDate: {}\ntopic: {}\ntags:\n  - \n---\n\n",
            title,
            now.format("%Y-%m-%dT%H:%M:%SZ"),
            topic
        );
        (path, content)
    };

    if file_path.exists() {
        anyhow::bail!("file already exists: {}", file_path.display());
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    println!("Created: {}", file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_post_lands_under_topic_with_date_prefix() {
        let dir = tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        run(&site, "Hello World", Some("topic-a"), false).unwrap();

        let topic_dir = dir.path().join("content/posts/topic-a");
        let entries: Vec<_> = fs::read_dir(&topic_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let name = entries[0].as_ref().unwrap().file_name();
        let name = name.to_string_lossy().into_owned();
        assert!(name.ends_with("hello-world.mdx"));
        // the ordering prefix must be exactly what the url derivation strips
        assert_eq!(
            name.len(),
            crate::content::schema::DATE_PREFIX_LEN + "hello-world.mdx".len()
        );

        let content = fs::read_to_string(topic_dir.join(&name)).unwrap();
        assert!(content.contains("title: Hello World"));
        assert!(content.contains("topic: topic-a"));
    }

    #[test]
    fn test_new_page() {
        let dir = tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        run(&site, "About", None, true).unwrap();
        let path = dir.path().join("content/pages/about.mdx");
        assert!(path.exists());

        // refuses to overwrite
        assert!(run(&site, "About", None, true).is_err());
    }
}
