use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Note ID, assigned by the store
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// Reminder timestamp as entered by the user
    pub reminder_date: Option<String>,
}

impl Note {
    pub fn has_reminder(&self) -> bool {
        self.reminder_date
            .as_deref()
            .is_some_and(|date| !date.trim().is_empty())
    }
}

/// Blank reminder dates mean "no reminder" and are stored as NULL.
pub fn normalize_reminder_date(value: Option<String>) -> Option<String> {
    value.filter(|date| !date.trim().is_empty())
}
