use serde::{Deserialize, Serialize};

/// Severity classification of a toast, drives visual styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    /// Neutral informational toast (default)
    #[default]
    Info,
}

/// Content of a toast notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Short heading shown above the message (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body of the notification
    pub message: String,
    /// Identifier selecting a visual icon (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NotificationContent {
    /// Create content with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            icon: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the icon identifier
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Observable state of the notification store.
///
/// When the auto-hide fires, `show` flips to false but `content` and `kind`
/// keep their last values so a fade-out animation can still read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    /// Whether the notification is currently visible
    pub show: bool,
    pub content: NotificationContent,
    pub kind: NotificationKind,
}

impl NotificationState {
    /// Hidden state with an empty message, the state a store starts in
    pub fn hidden() -> Self {
        Self {
            show: false,
            content: NotificationContent::new(""),
            kind: NotificationKind::Info,
        }
    }
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::hidden()
    }
}
