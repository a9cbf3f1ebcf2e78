//! # Capabilities
//!
//! The checkout never reaches for ambient context. Whoever builds a
//! [`Checkout`](crate::Checkout) or [`OrderDraft`](crate::OrderDraft) hands it
//! a [`Notifier`] for toasts/banners and the [`CurrentUser`] at the register.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// =============================================================================
// Notices
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Presentation attributes for a notice level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeStyle {
    pub title: &'static str,
    /// Whether the UI keeps the notice until the cashier dismisses it.
    pub sticky: bool,
}

/// Indexed by `NoticeLevel as usize`.
const NOTICE_STYLES: [NoticeStyle; 4] = [
    NoticeStyle { title: "Success", sticky: false },
    NoticeStyle { title: "Info", sticky: false },
    NoticeStyle { title: "Warning", sticky: false },
    NoticeStyle { title: "Error", sticky: true },
];

impl NoticeLevel {
    pub fn style(&self) -> NoticeStyle {
        NOTICE_STYLES[*self as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Error, message)
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log. Used headless and by the demo binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let title = notice.level.style().title;
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => info!(title, "{}", notice.message),
            NoticeLevel::Warning => warn!(title, "{}", notice.message),
            NoticeLevel::Error => error!(title, "{}", notice.message),
        }
    }
}

// =============================================================================
// Current User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cashier,
    Manager,
    Admin,
}

/// The person operating the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        CurrentUser {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn can_approve_discounts(&self) -> bool {
        matches!(self.role, Role::Manager | Role::Admin)
    }
}
