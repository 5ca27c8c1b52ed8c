//! Computed-field derivation
//!
//! `url`, `slug` and `readingTime` are never authored; they are derived
//! deterministically from a document's flattened source path and raw body.

use lazy_static::lazy_static;
use regex::Regex;

/// Length of the date-like ordering prefix on post file names
/// (`<prefix><name>.mdx`). The content convention uses single-digit
/// month/day fields, so the prefix is 9 characters, not the 10 of a full
/// ISO date. Do not "fix" this without renaming the content tree.
pub const DATE_PREFIX_LEN: usize = 9;

/// Average reading speed used for the estimate, in words per minute.
const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
}

/// Resolve the routable path for a flattened source path
/// (relative path with the extension already stripped).
///
/// Drops the kind-directory segment when `remove_first_segment` is set and
/// always strips the leading [`DATE_PREFIX_LEN`] characters from the final
/// segment. Mirrors string-slice semantics: a final segment shorter than
/// the prefix resolves to an empty name.
pub fn resolve_post_path(flattened_path: &str, remove_first_segment: bool) -> String {
    let mut parts: Vec<&str> = flattened_path.split('/').collect();
    if remove_first_segment && !parts.is_empty() {
        parts.remove(0);
    }

    if let Some(last) = parts.last_mut() {
        *last = last.get(DATE_PREFIX_LEN..).unwrap_or("");
    }

    parts.join("/")
}

/// Resolve the routable path for a page: the kind directory is dropped and
/// file names carry no date prefix.
pub fn resolve_page_path(flattened_path: &str) -> String {
    flattened_path
        .split('/')
        .skip(1)
        .collect::<Vec<_>>()
        .join("/")
}

/// Estimated minutes for an average person to read the body.
///
/// `None` when the body has no word matches; otherwise at least 1.
pub fn reading_time(body: &str) -> Option<u32> {
    let words = WORD.find_iter(body).count();
    if words == 0 {
        return None;
    }
    Some(words.div_ceil(WORDS_PER_MINUTE) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url_keeps_kind_prefix() {
        // url = "/" + resolve with the kind directory kept
        assert_eq!(
            resolve_post_path("posts/topic-a/2024-1-5-my-post", false),
            "posts/topic-a/my-post"
        );
    }

    #[test]
    fn test_post_slug_drops_kind_prefix() {
        assert_eq!(
            resolve_post_path("posts/topic-a/2024-1-5-my-post", true),
            "topic-a/my-post"
        );
    }

    #[test]
    fn test_prefix_strip_is_exactly_nine_chars() {
        // <9-char-prefix><name> round-trips to <name>
        assert_eq!(resolve_post_path("posts/123456789hello", true), "hello");
        // A short final segment resolves to an empty name
        assert_eq!(resolve_post_path("posts/short", true), "");
    }

    #[test]
    fn test_page_path_has_no_prefix_strip() {
        assert_eq!(resolve_page_path("pages/about"), "about");
        assert_eq!(resolve_page_path("pages/nested/deep"), "nested/deep");
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert_eq!(reading_time(&words(199)), Some(1));
        assert_eq!(reading_time(&words(200)), Some(1));
        assert_eq!(reading_time(&words(201)), Some(2));
    }

    #[test]
    fn test_reading_time_empty_body() {
        assert_eq!(reading_time(""), None);
        assert_eq!(reading_time("--- ~~~ !!!"), None);
        // Never zero: a single word still reads as one minute
        assert_eq!(reading_time("hello"), Some(1));
    }
}
