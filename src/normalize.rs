// src/normalize.rs

//! Schema normalizer.
//!
//! Maps one raw post object of any of the nine shapes into a uniform
//! `PostRecord`. A post missing a field its declared type requires is still
//! emitted, with both payload fields null (skip-and-continue at the field
//! level, never at the page level).

use crate::error::Result;
use crate::models::{PostKind, PostRecord, PostType, RawPost};

/// Normalize one raw post into a `PostRecord`.
///
/// Only a `type` tag outside the known raw tags is an error; any missing
/// payload field degrades to a null-payload record with a diagnostic.
pub fn normalize(raw: &RawPost) -> Result<PostRecord> {
    let declared: PostType = raw.post_type.parse()?;

    let kind = match payload(declared, raw) {
        Some(kind) => kind,
        None => {
            log::warn!(
                "couldn't find details for {} post #{}",
                raw.post_type,
                raw.id
            );
            PostKind::empty(declared)
        }
    };

    Ok(PostRecord {
        id: raw.id,
        date: raw.date.clone(),
        notes: raw.note_count,
        tags: raw.tags.clone(),
        is_reblog: raw.trail.is_some(),
        kind,
    })
}

/// Extract the type-specific payload, or None if a required key is absent.
///
/// The `?` operators unwrap key presence only: a key that is there with a
/// null value flows into the payload as null without discarding its
/// siblings.
fn payload(declared: PostType, raw: &RawPost) -> Option<PostKind> {
    match declared {
        PostType::Photo => photo_payload(raw),
        PostType::Video => video_payload(raw),
        PostType::Answer => Some(PostKind::Answer {
            question: raw.question.clone()?,
            answer: raw.answer.clone()?,
        }),
        PostType::Text => Some(PostKind::Text {
            title: raw.title.clone()?,
            body: raw.body.clone()?,
        }),
        PostType::Quote => Some(PostKind::Quote {
            text: raw.text.clone()?,
            source: raw.source.clone()?,
        }),
        PostType::Link => Some(PostKind::Link {
            title: raw.title.clone()?,
            url: raw.url.clone()?,
        }),
        PostType::Audio => Some(PostKind::Audio {
            source_url: raw.source_url.clone()?,
            caption: raw.caption.clone()?,
        }),
        PostType::Chat => Some(PostKind::Chat {
            title: raw.title.clone()?,
            body: raw.body.clone()?,
        }),
        // Never declared by the API; photo posts are promoted below.
        PostType::Photoset => None,
    }
}

/// Photo payload, promoting to a photoset when more than one image is
/// present. Image order is preserved.
fn photo_payload(raw: &RawPost) -> Option<PostKind> {
    let caption = raw.caption.clone()?;
    let photos = raw.photos.as_ref()?;

    let mut urls = Vec::with_capacity(photos.len());
    for photo in photos {
        urls.push(photo.original_size.as_ref()?.url.clone());
    }

    match urls.len() {
        0 => None,
        1 => Some(PostKind::Photo {
            image_url: urls.pop(),
            caption,
        }),
        _ => Some(PostKind::Photoset {
            image_urls: urls,
            caption,
        }),
    }
}

/// Video payload. The URL is resolved per sub-type; an unknown sub-type
/// yields a null URL but keeps the caption.
fn video_payload(raw: &RawPost) -> Option<PostKind> {
    let caption = raw.caption.clone()?;
    let video_type = raw.video_type.clone()?;

    let video_url = match video_type.as_deref() {
        Some("instagram") => raw.permalink_url.clone()?,
        Some("tumblr") => raw.video_url.clone()?,
        Some("youtube") => {
            let id = raw.video.as_ref()?.youtube.as_ref()?.video_id.clone()?;
            Some(format!("https://www.youtube.com/watch?v={id}"))
        }
        _ => None,
    };

    Some(PostKind::Video { video_url, caption })
}
