use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person sharing the budget. The messaging handle is an opaque address
/// for the notification layer; delivery itself lives outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_handle: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            messaging_handle: None,
        }
    }

    pub fn with_handle(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            messaging_handle: Some(handle.into()),
        }
    }
}
