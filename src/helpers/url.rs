//! URL helper functions

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Generate a site-root-relative URL
///
/// # Examples
/// ```ignore
/// url_for(&config, "/posts/topic/my-post") // -> "/blog/posts/topic/my-post"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Percent-encode a query-string value
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Build the social-preview image URL for a document title
pub fn og_image_url(config: &SiteConfig, title: &str, blog: bool) -> String {
    let mut url = format!(
        "{}og?title={}",
        url_for(config, "/"),
        encode_query_value(title)
    );
    if blog {
        url.push_str("&blog=true");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/posts/a/b"), "/posts/a/b");
        assert_eq!(url_for(&config, ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(full_url_for(&config, "/about"), "https://example.com/about");
    }

    #[test]
    fn test_og_image_url_encodes_title() {
        let config = test_config();
        let url = og_image_url(&config, "Hello World", true);
        assert_eq!(url, "/og?title=Hello%20World&blog=true");
    }
}
