//! Property tests: any well-formed document survives encode → decode unchanged.

use beluga::feed::{Attachment, Author, Document, Post};
use chrono::{DateTime, Utc};
use proptest::prelude::*;

fn author() -> impl Strategy<Value = Author> {
    (any::<String>(), any::<String>()).prop_map(|(name, avatar)| Author { name, avatar })
}

fn attachment() -> impl Strategy<Value = Attachment> {
    (
        any::<String>(),
        "[0-9a-f]{64}",
        any::<String>(),
        any::<String>(),
        any::<i64>(),
    )
        .prop_map(|(id, hash_digest, link_title, link_url, index)| Attachment {
            id,
            hash_digest,
            link_title,
            link_url,
            index,
        })
}

fn timestamp() -> impl Strategy<Value = String> {
    // 1970..2100
    (0i64..4_102_444_800).prop_map(|secs| {
        DateTime::<Utc>::from_timestamp(secs, 0)
            .unwrap_or_default()
            .to_rfc3339()
    })
}

fn post() -> impl Strategy<Value = Post> {
    (
        any::<String>(),
        any::<String>(),
        any::<String>(),
        timestamp(),
        proptest::option::of(any::<String>()),
        proptest::collection::vec(attachment(), 0..4),
    )
        .prop_map(
            |(url, content_text, content_html, date_published, date_modified, attachments)| Post {
                id: String::new(),
                url,
                content_text,
                content_html,
                date_published,
                date_modified,
                attachments,
            },
        )
}

fn document() -> impl Strategy<Value = Document> {
    (
        any::<String>(),
        proptest::collection::vec(author(), 0..4),
        proptest::collection::vec(post(), 0..6),
    )
        .prop_map(|(home_page_url, authors, mut posts)| {
            // Post ids must be unique within a document
            for (i, post) in posts.iter_mut().enumerate() {
                post.id = format!("post-{i}");
            }
            Document {
                home_page_url,
                authors,
                posts,
            }
        })
}

proptest! {
    #[test]
    fn decode_returns_input_verbatim(doc in document()) {
        let bytes = serde_json::to_vec(&doc).unwrap();
        let decoded = Document::from_json(&bytes).unwrap();
        prop_assert_eq!(decoded, doc);
    }

    #[test]
    fn decode_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = Document::from_json(&bytes);
    }
}
