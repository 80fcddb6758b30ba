use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorises spending for budgeting and supplies the icon shown on
/// bill-sourced scheduled items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Expense,
    Income,
}
