// src/models/page.rs

//! One page of raw posts as returned by the API.

use serde::Deserialize;

use crate::models::RawPost;

/// Outer envelope of the posts endpoint: `{ "response": { "posts": [...] } }`.
///
/// Anything that fails to deserialize into this shape is treated as a
/// malformed response at the page level.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub response: RawPage,
}

/// The ordered posts of one offset.
#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub posts: Vec<RawPost>,
}

impl RawPage {
    /// Parse a raw response body into a page.
    pub fn parse(body: &str) -> serde_json::Result<Self> {
        let envelope: ApiEnvelope = serde_json::from_str(body)?;
        Ok(envelope.response)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_envelope() {
        let body = r#"{"response": {"posts": [
            {"type": "text", "id": 1, "date": "2019-01-01", "note_count": 0, "tags": []}
        ]}}"#;
        let page = RawPage::parse(body).unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn parse_rejects_missing_posts() {
        let body = r#"{"response": {"total_posts": 3}}"#;
        assert!(RawPage::parse(body).is_err());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(RawPage::parse("<html>rate limited</html>").is_err());
    }
}
