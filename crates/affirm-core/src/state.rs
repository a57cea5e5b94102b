//! UI-agnostic view state
//!
//! Render targets the fetcher and the action handlers write into. A front end owns one
//! [`AffirmationPanel`] and draws it however it likes; nothing here depends on a
//! particular UI framework.

use std::time::{Duration, Instant};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::model::ActionType;

/// How long a transient notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(1);

/// Text shown when the selected filter matches nothing.
pub const NO_AFFIRMATIONS_TEXT: &str = "No affirmations found";

/// What the view showed when a request was issued.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewSnapshot {
    pub text: String,
    pub categories: String,
}

/// State of the pin-action control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinTarget {
    #[default]
    Disabled,
    Enabled(i64),
}

impl PinTarget {
    pub fn affirmation_id(&self) -> Option<i64> {
        match self {
            PinTarget::Enabled(id) => Some(*id),
            PinTarget::Disabled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

/// Render target for the random affirmation.
pub trait AffirmationView {
    fn snapshot(&self) -> ViewSnapshot;
    fn show(&mut self, text: &str, categories: &str);
    fn restore(&mut self, snapshot: &ViewSnapshot);
    fn set_pin_target(&mut self, target: PinTarget);
    fn flash_notice(&mut self, message: &str, expires_at: Instant);
}

/// In-memory affirmation display with its pin control and inline notice.
#[derive(Debug, Clone, Default)]
pub struct AffirmationPanel {
    pub text: String,
    pub categories: String,
    pub pin: PinTarget,
    pub notice: Option<Notice>,
    /// Count of text updates, for callers that redraw on change.
    pub revision: u64,
}

impl AffirmationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| n.expires_at > now)
            .map(|n| n.message.as_str())
    }

    /// Drop the notice once it has expired. Returns true if one was removed.
    pub fn expire_notice(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
            return true;
        }
        false
    }
}

impl AffirmationView for AffirmationPanel {
    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            text: self.text.clone(),
            categories: self.categories.clone(),
        }
    }

    fn show(&mut self, text: &str, categories: &str) {
        self.text = text.to_string();
        self.categories = categories.to_string();
        self.revision += 1;
    }

    fn restore(&mut self, snapshot: &ViewSnapshot) {
        self.text = snapshot.text.clone();
        self.categories = snapshot.categories.clone();
        self.revision += 1;
    }

    fn set_pin_target(&mut self, target: PinTarget) {
        self.pin = target;
    }

    fn flash_notice(&mut self, message: &str, expires_at: Instant) {
        self.notice = Some(Notice {
            message: message.to_string(),
            expires_at,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// User-facing outcome of a mutation. Banners are dismissable; dialogs block input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Banner { kind: BannerKind, message: String },
    Dialog { title: String, message: String },
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Feedback::Banner {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Feedback::Banner {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    /// Map a mutation reply to what the user sees. `done` is used when the server sends no message.
    pub fn from_reply(reply: &ApiResult<Option<String>>, done: &str) -> Self {
        match reply {
            Ok(message) => Feedback::success(message.clone().unwrap_or_else(|| done.to_string())),
            Err(ApiError::PinLimitReached) => Feedback::Dialog {
                title: "Pin limit reached".to_string(),
                message: format!(
                    "You can pin at most {} affirmations. Unpin one before pinning another.",
                    ActionType::Pin.limit()
                ),
            },
            Err(ApiError::Validation(message)) => Feedback::error(message.clone()),
            Err(err) => {
                warn!("request failed: {}", err);
                Feedback::error(err.to_string())
            }
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Feedback::Dialog { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires() {
        let now = Instant::now();
        let mut panel = AffirmationPanel::new();
        panel.flash_notice("Please wait", now + NOTICE_TTL);

        assert_eq!(panel.visible_notice(now), Some("Please wait"));
        assert!(!panel.expire_notice(now));
        assert!(panel.expire_notice(now + NOTICE_TTL));
        assert!(panel.notice.is_none());
    }

    #[test]
    fn test_feedback_from_reply() {
        assert_eq!(
            Feedback::from_reply(&Ok(None), "Saved"),
            Feedback::success("Saved")
        );
        assert_eq!(
            Feedback::from_reply(&Ok(Some("Affirmation saved".to_string())), "Saved"),
            Feedback::success("Affirmation saved")
        );
        assert_eq!(
            Feedback::from_reply(&Err(ApiError::Validation("Category doesn't exist".to_string())), "Saved"),
            Feedback::error("Category doesn't exist")
        );
        assert!(Feedback::from_reply(&Err(ApiError::PinLimitReached), "Pinned").is_blocking());
    }

    #[test]
    fn test_pin_limit_dialog_states_cap() {
        match Feedback::from_reply(&Err(ApiError::PinLimitReached), "Pinned") {
            Feedback::Dialog { title, message } => {
                assert_eq!(title, "Pin limit reached");
                assert!(message.starts_with("You can pin at most 3 affirmations"));
            }
            other => panic!("expected dialog, got {:?}", other),
        }
    }

    #[test]
    fn test_restore_bumps_revision() {
        let mut panel = AffirmationPanel::new();
        panel.show("I am calm", "Calm");
        let snapshot = panel.snapshot();
        panel.show("other", "Other");
        panel.restore(&snapshot);
        assert_eq!(panel.text, "I am calm");
        assert_eq!(panel.categories, "Calm");
        assert_eq!(panel.revision, 3);
    }
}
