use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    /// Note title
    #[serde(default)]
    pub title: String,
    /// Note content
    #[serde(default)]
    pub content: String,
    /// Optional reminder timestamp
    #[serde(default)]
    pub reminder_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    /// Note title
    #[serde(default)]
    pub title: String,
    /// Note content
    #[serde(default)]
    pub content: String,
    /// Optional reminder timestamp, replaces the stored one
    #[serde(default)]
    pub reminder_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteReply {
    /// Whether the note was stored
    pub success: bool,
    /// ID of the new note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl CreateNoteReply {
    pub const fn created(id: i64) -> Self {
        Self {
            success: true,
            id: Some(id),
        }
    }

    pub const fn failed() -> Self {
        Self {
            success: false,
            id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessReply {
    /// Whether the operation completed without a storage failure
    pub success: bool,
}

impl SuccessReply {
    pub const fn ok() -> Self {
        Self { success: true }
    }

    pub const fn failed() -> Self {
        Self { success: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_missing_reminder() {
        let request: CreateNoteRequest =
            serde_json::from_str(r#"{"title":"T","content":"C"}"#).unwrap();
        assert_eq!(request.title, "T");
        assert_eq!(request.content, "C");
        assert!(request.reminder_date.is_none());
    }

    #[test]
    fn test_failed_create_reply_omits_id() {
        let json = serde_json::to_string(&CreateNoteReply::failed()).unwrap();
        assert_eq!(json, r#"{"success":false}"#);

        let json = serde_json::to_string(&CreateNoteReply::created(7)).unwrap();
        assert_eq!(json, r#"{"success":true,"id":7}"#);
    }
}
