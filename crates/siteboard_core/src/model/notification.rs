//! Notification record appended by repository mutation paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Task,
    Project,
    Inventory,
    Finance,
    System,
}

impl NotificationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
            Self::Inventory => "inventory",
            Self::Finance => "finance",
            Self::System => "system",
        }
    }
}

impl Display for NotificationCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub timestamp: DateTime<Utc>,
    /// Older blobs omit the flag; those entries read as unread.
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        category: NotificationCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            category,
            timestamp: Utc::now(),
            read: false,
        }
    }
}
