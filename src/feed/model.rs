use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// ISO-8601 offset date-time without seconds, e.g. `2024-05-01T09:30+02:00`.
const OFFSET_MINUTES_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// Errors that make a response body unusable as a [`Document`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not JSON, or JSON of the wrong shape (missing field, wrong type)
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A post's `date_published` is not an ISO-8601 date-time
    #[error("Post {post_id}: invalid date_published {value:?}")]
    InvalidDate { post_id: String, value: String },
    /// Two posts share the same `id`
    #[error("Duplicate post id: {0}")]
    DuplicatePostId(String),
}

/// A parsed `beluga.json` feed.
///
/// Order of `authors` and `posts` is the order the server sent them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub home_page_url: String,
    pub authors: Vec<Author>,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Avatar image URL
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub url: String,
    pub content_text: String,
    pub content_html: String,
    pub date_published: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub hash_digest: String,
    pub link_title: String,
    pub link_url: String,
    /// Ordering hint from the server. Never used to re-sort `attachments`.
    pub index: i64,
}

impl Document {
    /// Decodes and validates a `beluga.json` body.
    ///
    /// Unknown fields are ignored. Beyond the JSON shape, every post must carry a
    /// parseable `date_published` and post ids must be unique.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        let document: Document = serde_json::from_slice(bytes)?;
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        let mut seen = HashSet::with_capacity(self.posts.len());
        for post in &self.posts {
            if post.published().is_none() {
                return Err(DecodeError::InvalidDate {
                    post_id: post.id.clone(),
                    value: post.date_published.clone(),
                });
            }
            if !seen.insert(post.id.as_str()) {
                return Err(DecodeError::DuplicatePostId(post.id.clone()));
            }
        }
        Ok(())
    }

    /// The author shown for every post: index 0, if the feed lists any.
    pub fn primary_author(&self) -> Option<&Author> {
        self.authors.first()
    }

    /// Author attributed to `post`.
    ///
    /// The format carries no per-post author reference, so this is always the
    /// primary author.
    pub fn author_for(&self, _post: &Post) -> Option<&Author> {
        self.primary_author()
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}

impl Post {
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        parse_date_time(&self.date_published)
    }

    /// `None` when the field is absent or does not parse.
    pub fn modified(&self) -> Option<DateTime<FixedOffset>> {
        self.date_modified.as_deref().and_then(parse_date_time)
    }
}

/// Parses an ISO-8601 offset date-time, accepting RFC 3339 and the
/// minute-precision form without seconds.
pub fn parse_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(value, OFFSET_MINUTES_FORMAT) {
        return Some(dt);
    }
    // `Z` suffix with minute precision
    value
        .strip_suffix('Z')
        .and_then(|naive| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M").ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "home_page_url": "https://example.test",
        "authors": [
            {"name": "A", "avatar": "https://x/a.png"},
            {"name": "B", "avatar": "https://x/b.png"}
        ],
        "posts": [
            {
                "id": "p1",
                "url": "https://example.test/p1",
                "content_text": "hello",
                "content_html": "<p>hello</p>",
                "date_published": "2024-05-01T09:30:00+02:00",
                "attachments": [
                    {"id": "a2", "hash_digest": "abc", "link_title": "two", "link_url": "https://x/2", "index": 2},
                    {"id": "a1", "hash_digest": "def", "link_title": "one", "link_url": "https://x/1", "index": 1}
                ]
            },
            {
                "id": "p2",
                "url": "https://example.test/p2",
                "content_text": "world",
                "content_html": "<p>world</p>",
                "date_published": "2024-05-02T10:00Z",
                "date_modified": "2024-05-03T11:00:00Z",
                "attachments": []
            }
        ]
    }"#;

    #[test]
    fn test_decode_preserves_order_and_fields() {
        let doc = Document::from_json(SAMPLE.as_bytes()).unwrap();

        assert_eq!(doc.home_page_url, "https://example.test");
        let names: Vec<_> = doc.authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let ids: Vec<_> = doc.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);

        // Attachments keep wire order regardless of `index`
        let attachment_ids: Vec<_> = doc.posts[0]
            .attachments
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(attachment_ids, vec!["a2", "a1"]);
        assert_eq!(doc.posts[0].attachments[0].index, 2);
    }

    #[test]
    fn test_missing_date_modified_is_none() {
        let doc = Document::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.posts[0].date_modified, None);
        assert_eq!(
            doc.posts[1].date_modified.as_deref(),
            Some("2024-05-03T11:00:00Z")
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let body = r#"{
            "home_page_url": "https://example.test",
            "version": "1.0",
            "authors": [{"name": "A", "avatar": "https://x/a.png", "bio": "hi"}],
            "posts": []
        }"#;
        let doc = Document::from_json(body.as_bytes()).unwrap();
        assert_eq!(doc.authors.len(), 1);
    }

    #[test]
    fn test_missing_post_id_rejected() {
        let body = r#"{
            "home_page_url": "https://example.test",
            "authors": [],
            "posts": [{
                "url": "u", "content_text": "t", "content_html": "h",
                "date_published": "2024-05-01T09:30:00Z", "attachments": []
            }]
        }"#;
        let err = Document::from_json(body.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let body = r#"{"home_page_url": 5, "authors": [], "posts": []}"#;
        assert!(matches!(
            Document::from_json(body.as_bytes()),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let body = r#"{
            "home_page_url": "h",
            "authors": [],
            "posts": [{
                "id": "p1", "url": "u", "content_text": "t", "content_html": "h",
                "date_published": "yesterday", "attachments": []
            }]
        }"#;
        match Document::from_json(body.as_bytes()) {
            Err(DecodeError::InvalidDate { post_id, value }) => {
                assert_eq!(post_id, "p1");
                assert_eq!(value, "yesterday");
            }
            other => panic!("Expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_post_id_rejected() {
        let post = r#"{
            "id": "same", "url": "u", "content_text": "t", "content_html": "h",
            "date_published": "2024-05-01T09:30:00Z", "attachments": []
        }"#;
        let body = format!(
            r#"{{"home_page_url": "h", "authors": [], "posts": [{post}, {post}]}}"#
        );
        assert!(matches!(
            Document::from_json(body.as_bytes()),
            Err(DecodeError::DuplicatePostId(id)) if id == "same"
        ));
    }

    #[test]
    fn test_primary_author_used_for_every_post() {
        let doc = Document::from_json(SAMPLE.as_bytes()).unwrap();
        for post in &doc.posts {
            assert_eq!(doc.author_for(post).map(|a| a.name.as_str()), Some("A"));
        }
    }

    #[test]
    fn test_primary_author_empty() {
        let doc = Document {
            home_page_url: String::new(),
            authors: Vec::new(),
            posts: Vec::new(),
        };
        assert!(doc.primary_author().is_none());
    }

    #[test]
    fn test_post_lookup() {
        let doc = Document::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.post("p2").map(|p| p.content_text.as_str()), Some("world"));
        assert!(doc.post("missing").is_none());
    }

    #[test]
    fn test_parse_date_time_forms() {
        assert!(parse_date_time("2024-05-01T09:30:00+02:00").is_some());
        assert!(parse_date_time("2024-05-01T09:30:00.123Z").is_some());
        assert!(parse_date_time("2024-05-01T09:30+02:00").is_some());
        assert!(parse_date_time("2024-05-01T09:30Z").is_some());
        assert!(parse_date_time("2024-05-01").is_none());
        assert!(parse_date_time("").is_none());

        let dt = parse_date_time("2024-05-01T09:30+02:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-05-01 09:30");
    }

    #[test]
    fn test_modified_unparseable_is_none() {
        let mut doc = Document::from_json(SAMPLE.as_bytes()).unwrap();
        assert!(doc.posts[1].modified().is_some());
        doc.posts[1].date_modified = Some("soon".to_string());
        assert!(doc.posts[1].modified().is_none());
    }
}
