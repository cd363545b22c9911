use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::*;
use crate::ports::RepositoryError;

// Naive timestamps are read as UTC
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// Comments API list wrapper
#[derive(Debug, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentDto>,
}

/// Ids arrive as strings from this client but as numbers from older records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Text(String),
    Number(i64),
}

impl From<RemoteId> for CommentId {
    fn from(id: RemoteId) -> Self {
        match id {
            RemoteId::Text(s) => CommentId(s),
            RemoteId::Number(n) => CommentId(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: RemoteId,
    pub name: String,
    #[serde(alias = "text")]
    pub comment: String,
    pub created_at: String,
    pub url: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub parent_comment_id: Option<RemoteId>,
}

// Request DTOs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateDto<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub comment: &'a str,
    pub created_at: DateTime<Utc>,
    pub url: &'a str,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<&'a str>,
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

// Conversion implementations
impl TryFrom<CommentDto> for Comment {
    type Error = RepositoryError;

    fn try_from(dto: CommentDto) -> Result<Self, Self::Error> {
        let id = CommentId::from(dto.id);
        let created_at = parse_timestamp(&dto.created_at).ok_or_else(|| {
            RepositoryError::Serialization(format!(
                "comment {} has an unreadable createdAt: {:?}",
                id, dto.created_at
            ))
        })?;

        Ok(Self {
            id,
            name: dto.name,
            text: dto.comment,
            created_at,
            url: PageUrl::normalize(&dto.url),
            approved: dto.approved,
            parent_comment_id: dto.parent_comment_id.map(CommentId::from),
        })
    }
}

impl CommentListResponse {
    /// Domain comments, skipping records that cannot be read.
    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
            .into_iter()
            .filter_map(|dto| match Comment::try_from(dto) {
                Ok(comment) => Some(comment),
                Err(e) => {
                    tracing::warn!("Skipping remote comment: {}", e);
                    None
                }
            })
            .collect()
    }
}

impl<'a> From<&'a Comment> for CommentCreateDto<'a> {
    fn from(comment: &'a Comment) -> Self {
        Self {
            id: &comment.id.0,
            name: &comment.name,
            comment: &comment.text,
            created_at: comment.created_at,
            url: comment.url.as_str(),
            approved: comment.approved,
            parent_comment_id: comment.parent_comment_id.as_ref().map(|p| p.0.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_string_ids() {
        let raw = r#"{"comments":[
            {"id":1,"name":"Ann","comment":"<p>First!</p>","createdAt":"2019-08-01T10:00:00.000Z","url":"/articles/ddd/","approved":true,"parentCommentId":null},
            {"id":"2","name":"Ben","comment":"Reply","createdAt":"2019-08-01T11:00:00Z","url":"/articles/ddd","approved":false,"parentCommentId":1}
        ]}"#;
        let response: CommentListResponse = serde_json::from_str(raw).unwrap();
        let comments = response.into_comments();

        assert_eq!(comments[0].id, "1".into());
        assert_eq!(comments[0].url.as_str(), "/articles/ddd");
        assert!(comments[0].parent_comment_id.is_none());
        assert_eq!(comments[1].parent_comment_id, Some("1".into()));
        assert!(!comments[1].approved);
        assert!(comments[0].created_at < comments[1].created_at);
    }

    #[test]
    fn accepts_naive_timestamps_as_utc() {
        let parsed = parse_timestamp("2019-08-01 10:00:00").unwrap();
        assert_eq!(parsed, parse_timestamp("2019-08-01T10:00:00Z").unwrap());
        assert!(parse_timestamp("2019-08-01T10:00:00.250").is_some());
        assert!(parse_timestamp("Thu Aug 01 2019").is_none());
    }

    #[test]
    fn unreadable_timestamp_skips_the_record() {
        let raw = r#"{"comments":[
            {"id":1,"name":"Ann","comment":"Dated","createdAt":"2019-08-01T10:00:00Z","url":"/a","approved":true},
            {"id":2,"name":"Ben","comment":"Undated","createdAt":"Thu Aug 01 2019","url":"/a","approved":true}
        ]}"#;
        let response: CommentListResponse = serde_json::from_str(raw).unwrap();
        let dto = serde_json::from_str::<CommentListResponse>(raw)
            .unwrap()
            .comments
            .remove(1);

        assert!(matches!(
            Comment::try_from(dto),
            Err(RepositoryError::Serialization(_))
        ));
        let comments = response.into_comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "1".into());

        // Repeated fetches of the same payload read the same comments
        let again = serde_json::from_str::<CommentListResponse>(raw)
            .unwrap()
            .into_comments();
        assert_eq!(comments, again);
    }

    #[test]
    fn create_dto_uses_wire_field_names() {
        let comment = Comment {
            id: "abc".into(),
            name: "Bob".to_string(),
            text: "Great write-up, thanks for sharing!".to_string(),
            created_at: Utc::now(),
            url: PageUrl::normalize("/articles/ddd"),
            approved: false,
            parent_comment_id: None,
        };
        let json = serde_json::to_value(CommentCreateDto::from(&comment)).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["comment"], "Great write-up, thanks for sharing!");
        assert_eq!(json["url"], "/articles/ddd");
        assert_eq!(json["approved"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("parentCommentId").is_none());
    }
}
