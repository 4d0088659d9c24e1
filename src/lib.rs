// src/lib.rs

//! Tumblr Blog Backup Library
//!
//! Fetches a blog's posts page by page through the v2 JSON API, normalizes
//! the nine post shapes into a uniform record, and persists every record
//! into a SQLite database plus a flat CSV log.

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod utils;
