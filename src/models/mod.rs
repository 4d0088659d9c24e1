// src/models/mod.rs

//! Domain models for the backup application.

mod page;
mod post;

// Re-export all public types
pub use page::{ApiEnvelope, RawPage};
pub use post::{
    PhotoSize, PostKind, PostRecord, PostType, RawPhoto, RawPost, VideoEmbed, YoutubeEmbed,
};
