// src/models/post.rs

//! Post data structures.
//!
//! `RawPost` is the loosely-typed serde view of one API post object; every
//! type-specific field is optional so a missing field never fails the page.
//! `PostRecord` is the uniform entity the store persists, with the payload
//! carried as a `PostKind` sum type and flattened to the generic
//! `(data_1, data_2)` column pair only at the persistence boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Deserialize a value that was present in the JSON, keeping an explicit
/// null as `Some(None)`. Combined with `#[serde(default)]` this makes an
/// absent key (`None`) distinguishable from a present null, so recovery
/// only fires for keys that are genuinely missing.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The nine post types the store knows about.
///
/// `Photoset` is derived, never a raw API tag: a `photo` post carrying more
/// than one image is promoted during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostType {
    Photo,
    Photoset,
    Video,
    Answer,
    Text,
    Quote,
    Link,
    Audio,
    Chat,
}

impl PostType {
    /// All nine types, in table-creation order.
    pub const ALL: [PostType; 9] = [
        PostType::Photo,
        PostType::Photoset,
        PostType::Text,
        PostType::Answer,
        PostType::Video,
        PostType::Quote,
        PostType::Link,
        PostType::Audio,
        PostType::Chat,
    ];

    /// Type tag as stored in the flat log and the union view.
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Photo => "photo",
            PostType::Photoset => "photoset",
            PostType::Video => "video",
            PostType::Answer => "answer",
            PostType::Text => "text",
            PostType::Quote => "quote",
            PostType::Link => "link",
            PostType::Audio => "audio",
            PostType::Chat => "chat",
        }
    }

    /// Relational table holding this type. Same as the tag.
    pub fn table(self) -> &'static str {
        self.as_str()
    }

    /// Names of the two type-specific payload columns.
    pub fn payload_columns(self) -> (&'static str, &'static str) {
        match self {
            PostType::Photo => ("img", "caption"),
            PostType::Photoset => ("photoset", "caption"),
            PostType::Video => ("video_url", "caption"),
            PostType::Answer => ("question", "answer"),
            PostType::Text => ("title", "body"),
            PostType::Quote => ("quote", "source"),
            PostType::Link => ("title", "url"),
            PostType::Audio => ("url", "caption"),
            PostType::Chat => ("title", "body"),
        }
    }
}

impl FromStr for PostType {
    type Err = AppError;

    /// Parse a raw API type tag. `photoset` is not accepted here because
    /// the API never emits it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(PostType::Photo),
            "video" => Ok(PostType::Video),
            "answer" => Ok(PostType::Answer),
            "text" => Ok(PostType::Text),
            "quote" => Ok(PostType::Quote),
            "link" => Ok(PostType::Link),
            "audio" => Ok(PostType::Audio),
            "chat" => Ok(PostType::Chat),
            other => Err(AppError::validation(format!("unknown post type '{other}'"))),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image of a photo post.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPhoto {
    #[serde(default)]
    pub original_size: Option<PhotoSize>,
}

/// A sized rendition of a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub url: String,
}

/// Embedded player metadata of a video post, keyed by provider.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoEmbed {
    #[serde(default)]
    pub youtube: Option<YoutubeEmbed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeEmbed {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// Raw post object as returned by the API.
///
/// Only the type tag and the id are required; the rest depends on the
/// declared type and may be absent even where the type would require it.
/// The type-required string fields are double-`Option`: the outer layer is
/// key presence, the inner one the value, which may itself be null (an
/// untitled text post carries `"title": null`, not no title key).
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    #[serde(rename = "type")]
    pub post_type: String,

    /// Unique per post, stable across runs
    pub id: u64,

    /// Date string as returned by the source; stored without reformatting
    #[serde(default)]
    pub date: String,

    /// Note/engagement count
    #[serde(default)]
    pub note_count: i64,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Reblog trail; its presence marks the post as a reblog
    #[serde(default)]
    pub trail: Option<Vec<serde_json::Value>>,

    // --- photo / video / audio ---
    #[serde(default, deserialize_with = "present")]
    pub caption: Option<Option<String>>,

    #[serde(default)]
    pub photos: Option<Vec<RawPhoto>>,

    #[serde(default, deserialize_with = "present")]
    pub video_type: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub permalink_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub video_url: Option<Option<String>>,

    #[serde(default)]
    pub video: Option<VideoEmbed>,

    #[serde(default, deserialize_with = "present")]
    pub source_url: Option<Option<String>>,

    // --- answer ---
    #[serde(default, deserialize_with = "present")]
    pub question: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub answer: Option<Option<String>>,

    // --- text / link / chat ---
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub body: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub url: Option<Option<String>>,

    // --- quote ---
    #[serde(default, deserialize_with = "present")]
    pub text: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub source: Option<Option<String>>,
}

/// Type-tagged payload of a normalized post.
///
/// One variant per post type with explicitly named fields; `payload()`
/// flattens to the generic two-column pair for the sinks. Fields are
/// `Option` because a post missing a required source field is still
/// emitted, with null payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKind {
    Photo {
        image_url: Option<String>,
        caption: Option<String>,
    },
    Photoset {
        image_urls: Vec<String>,
        caption: Option<String>,
    },
    Video {
        video_url: Option<String>,
        caption: Option<String>,
    },
    Answer {
        question: Option<String>,
        answer: Option<String>,
    },
    Text {
        title: Option<String>,
        body: Option<String>,
    },
    Quote {
        text: Option<String>,
        source: Option<String>,
    },
    Link {
        title: Option<String>,
        url: Option<String>,
    },
    Audio {
        source_url: Option<String>,
        caption: Option<String>,
    },
    Chat {
        title: Option<String>,
        body: Option<String>,
    },
}

impl PostKind {
    /// The type tag of this payload.
    pub fn post_type(&self) -> PostType {
        match self {
            PostKind::Photo { .. } => PostType::Photo,
            PostKind::Photoset { .. } => PostType::Photoset,
            PostKind::Video { .. } => PostType::Video,
            PostKind::Answer { .. } => PostType::Answer,
            PostKind::Text { .. } => PostType::Text,
            PostKind::Quote { .. } => PostType::Quote,
            PostKind::Link { .. } => PostType::Link,
            PostKind::Audio { .. } => PostType::Audio,
            PostKind::Chat { .. } => PostType::Chat,
        }
    }

    /// An instance of this type with both payload fields null, used when a
    /// required source field is missing.
    pub fn empty(post_type: PostType) -> Self {
        match post_type {
            PostType::Photo => PostKind::Photo {
                image_url: None,
                caption: None,
            },
            PostType::Photoset => PostKind::Photoset {
                image_urls: Vec::new(),
                caption: None,
            },
            PostType::Video => PostKind::Video {
                video_url: None,
                caption: None,
            },
            PostType::Answer => PostKind::Answer {
                question: None,
                answer: None,
            },
            PostType::Text => PostKind::Text {
                title: None,
                body: None,
            },
            PostType::Quote => PostKind::Quote {
                text: None,
                source: None,
            },
            PostType::Link => PostKind::Link {
                title: None,
                url: None,
            },
            PostType::Audio => PostKind::Audio {
                source_url: None,
                caption: None,
            },
            PostType::Chat => PostKind::Chat {
                title: None,
                body: None,
            },
        }
    }

    /// Flatten to the generic `(data_1, data_2)` pair.
    ///
    /// A photoset joins its image URLs with commas, in original order.
    pub fn payload(&self) -> (Option<String>, Option<String>) {
        match self {
            PostKind::Photo { image_url, caption } => (image_url.clone(), caption.clone()),
            PostKind::Photoset { image_urls, caption } => {
                let joined = if image_urls.is_empty() {
                    None
                } else {
                    Some(image_urls.join(","))
                };
                (joined, caption.clone())
            }
            PostKind::Video { video_url, caption } => (video_url.clone(), caption.clone()),
            PostKind::Answer { question, answer } => (question.clone(), answer.clone()),
            PostKind::Text { title, body } => (title.clone(), body.clone()),
            PostKind::Quote { text, source } => (text.clone(), source.clone()),
            PostKind::Link { title, url } => (title.clone(), url.clone()),
            PostKind::Audio { source_url, caption } => (source_url.clone(), caption.clone()),
            PostKind::Chat { title, body } => (title.clone(), body.clone()),
        }
    }
}

/// The normalized entity written exactly once to both sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Unique post id, stable across runs
    pub id: u64,

    /// Date exactly as returned by the source
    pub date: String,

    /// Note/engagement count
    pub notes: i64,

    /// Ordered tags. Serialized as one comma-joined string at the sinks,
    /// which is lossy if a tag itself contains a comma. Known limitation.
    pub tags: Vec<String>,

    /// True iff the raw post carried a reblog trail
    pub is_reblog: bool,

    /// Type-dependent payload
    pub kind: PostKind,
}

impl PostRecord {
    pub fn post_type(&self) -> PostType {
        self.kind.post_type()
    }

    /// Tags as stored: one comma-joined string.
    pub fn tags_joined(&self) -> String {
        self.tags.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_tag_round_trip() {
        for t in PostType::ALL {
            if t == PostType::Photoset {
                continue; // derived type, never a raw tag
            }
            assert_eq!(t.as_str().parse::<PostType>().unwrap(), t);
        }
    }

    #[test]
    fn photoset_is_not_a_raw_tag() {
        assert!("photoset".parse::<PostType>().is_err());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!("conversation".parse::<PostType>().is_err());
    }

    #[test]
    fn photoset_payload_joins_urls_in_order() {
        let kind = PostKind::Photoset {
            image_urls: vec!["https://a/1.jpg".into(), "https://a/2.jpg".into()],
            caption: Some("two".into()),
        };
        let (data_1, data_2) = kind.payload();
        assert_eq!(data_1.as_deref(), Some("https://a/1.jpg,https://a/2.jpg"));
        assert_eq!(data_2.as_deref(), Some("two"));
    }

    #[test]
    fn empty_kind_has_null_payload() {
        for t in PostType::ALL {
            let (data_1, data_2) = PostKind::empty(t).payload();
            assert_eq!(data_1, None, "{t}");
            assert_eq!(data_2, None, "{t}");
        }
    }

    #[test]
    fn deserialize_minimal_post() {
        let post: RawPost =
            serde_json::from_str(r#"{"type": "text", "id": 42}"#).unwrap();
        assert_eq!(post.post_type, "text");
        assert_eq!(post.id, 42);
        assert!(post.tags.is_empty());
        assert!(post.trail.is_none());
    }

    #[test]
    fn null_field_is_present_while_absent_field_is_not() {
        let post: RawPost = serde_json::from_str(
            r#"{"type": "text", "id": 1, "title": null, "body": "world"}"#,
        )
        .unwrap();
        assert_eq!(post.title, Some(None));
        assert_eq!(post.body, Some(Some("world".to_string())));
        assert_eq!(post.caption, None);
    }
}
