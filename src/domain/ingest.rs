use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::comment::{Comment, CommentId, PageUrl};

/// The non-identity fields of a comment. The digest is taken over this
/// struct's JSON, so field order here is part of the fingerprint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentContent<'a> {
    name: &'a str,
    text: &'a str,
    created_at: &'a DateTime<Utc>,
    url: &'a PageUrl,
    approved: bool,
    parent_comment_id: Option<&'a CommentId>,
}

/// Comment record handed to the static-site build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: CommentId,
    pub name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub url: PageUrl,
    pub approved: bool,
    pub parent_comment_id: Option<CommentId>,
    pub content_digest: String,
}

impl From<Comment> for CommentNode {
    fn from(comment: Comment) -> Self {
        let content_digest = content_digest(&comment);
        Self {
            id: comment.id,
            name: comment.name,
            text: comment.text,
            created_at: comment.created_at,
            url: comment.url,
            approved: comment.approved,
            parent_comment_id: comment.parent_comment_id,
            content_digest,
        }
    }
}

/// Lowercase hex SHA-256 over the comment's content fields.
pub fn content_digest(comment: &Comment) -> String {
    let content = CommentContent {
        name: &comment.name,
        text: &comment.text,
        created_at: &comment.created_at,
        url: &comment.url,
        approved: comment.approved,
        parent_comment_id: comment.parent_comment_id.as_ref(),
    };

    // Serializing borrowed strings and primitives cannot fail.
    let json = serde_json::to_vec(&content).unwrap_or_default();
    hex::encode(Sha256::digest(&json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comment() -> Comment {
        Comment {
            id: "1".into(),
            name: "Alice".to_string(),
            text: "<p>Nice article</p>".to_string(),
            created_at: Utc.with_ymd_and_hms(2019, 8, 1, 12, 0, 0).unwrap(),
            url: PageUrl::normalize("/articles/ddd"),
            approved: true,
            parent_comment_id: None,
        }
    }

    #[test]
    fn digest_is_deterministic_hex() {
        let digest = content_digest(&comment());
        assert_eq!(digest, content_digest(&comment()));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_ignores_identity() {
        let mut other = comment();
        other.id = "2".into();
        assert_eq!(content_digest(&comment()), content_digest(&other));
    }

    #[test]
    fn digest_tracks_content_changes() {
        let mut approved_later = comment();
        approved_later.approved = false;
        assert_ne!(content_digest(&comment()), content_digest(&approved_later));

        let mut edited = comment();
        edited.text.push('!');
        assert_ne!(content_digest(&comment()), content_digest(&edited));
    }

    #[test]
    fn node_exposes_text_field() {
        let json = serde_json::to_value(CommentNode::from(comment())).unwrap();
        assert_eq!(json["text"], "<p>Nice article</p>");
        assert_eq!(json["contentDigest"].as_str().map(str::len), Some(64));
        assert!(json["parentCommentId"].is_null());
    }
}
