//! Front-matter parsing and schema validation
//!
//! Every document starts with a YAML front-matter block. A missing
//! required field is fatal for the whole build; the error names the
//! offending document and field so the author can fix it.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use thiserror::Error;

use crate::helpers::parse_date_input;

/// A schema violation in a single document. Always fatal.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{document}: missing required field `{field}`")]
    MissingField {
        document: String,
        field: &'static str,
    },

    #[error("{document}: `publishedDate` is not a parseable date: {value:?}")]
    InvalidDate { document: String, value: String },

    #[error("{document}: `tags` must not be empty")]
    EmptyTags { document: String },
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Raw front-matter as authored; everything optional until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published_date: Option<String>,
    pub topic: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub recommended_posts: Option<Vec<String>>,
    pub description: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Validated declared fields for a post
#[derive(Debug, Clone)]
pub struct PostFields {
    pub title: String,
    pub summary: String,
    pub published_date: DateTime<Utc>,
    /// Raw authored date string, preserved for display formatting
    pub published_date_raw: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub recommended_posts: Vec<String>,
}

/// Validated declared fields for a standalone page
#[derive(Debug, Clone)]
pub struct PageFields {
    pub title: String,
    pub description: String,
}

impl FrontMatter {
    /// Split front-matter from a document and deserialise it.
    /// Returns the front-matter and the remaining body.
    ///
    /// Unlike looser generators this treats any malformed block as a hard
    /// error; a partial index must never be published.
    pub fn parse<'a>(content: &'a str, document: &str) -> Result<(Self, &'a str)> {
        let content = content.trim_start_matches('\u{feff}');

        let Some(rest) = content.strip_prefix("---") else {
            return Err(anyhow!("{document}: missing front-matter block"));
        };
        let rest = rest.trim_start_matches(['\r', '\n']);

        let Some(end) = rest.find("\n---") else {
            return Err(anyhow!("{document}: unterminated front-matter block"));
        };

        let yaml = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\r', '\n']);

        let fm: FrontMatter = serde_yaml::from_str(yaml)
            .map_err(|e| anyhow!("{document}: invalid front-matter: {e}"))?;

        Ok((fm, body))
    }

    /// Validate into post fields, consuming the front-matter.
    pub fn into_post_fields(self, document: &str) -> Result<PostFields, SchemaError> {
        let missing = |field| SchemaError::MissingField {
            document: document.to_string(),
            field,
        };

        let title = self.title.ok_or_else(|| missing("title"))?;
        let summary = self.summary.ok_or_else(|| missing("summary"))?;
        let raw_date = self.published_date.ok_or_else(|| missing("publishedDate"))?;
        let topic = self.topic.ok_or_else(|| missing("topic"))?;

        if self.tags.is_empty() {
            return Err(SchemaError::EmptyTags {
                document: document.to_string(),
            });
        }

        let published_date =
            parse_date_input(&raw_date).ok_or_else(|| SchemaError::InvalidDate {
                document: document.to_string(),
                value: raw_date.clone(),
            })?;

        Ok(PostFields {
            title,
            summary,
            published_date,
            published_date_raw: raw_date,
            topic,
            tags: self.tags,
            recommended_posts: self.recommended_posts.unwrap_or_default(),
        })
    }

    /// Validate into page fields, consuming the front-matter.
    pub fn into_page_fields(self, document: &str) -> Result<PageFields, SchemaError> {
        let missing = |field| SchemaError::MissingField {
            document: document.to_string(),
            field,
        };

        Ok(PageFields {
            title: self.title.ok_or_else(|| missing("title"))?,
            description: self.description.ok_or_else(|| missing("description"))?,
        })
    }
}
