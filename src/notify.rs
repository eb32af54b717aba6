// Toast notifications: one on screen at a time, newest wins, auto-dismissed.

use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::types::Timestamp;

pub const ENTER_DELAY_MS: f64 = 10.0;
pub const EXIT_MS: f64 = 300.0;

pub const COPY_SUCCESS_MESSAGE: &str = "Copied to clipboard!";
pub const COPY_FAILURE_MESSAGE: &str = "Failed to copy to clipboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            NotificationKind::Success => "notification success",
            NotificationKind::Error => "notification error",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            NotificationKind::Success => "linear-gradient(135deg, #27ae60, #2ecc71)",
            NotificationKind::Error => "linear-gradient(135deg, #e74c3c, #c0392b)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Notification {
            kind,
            message: message.into(),
        }
    }
}

impl From<&SiteError> for Notification {
    fn from(err: &SiteError) -> Self {
        Notification::new(NotificationKind::Error, err.to_string())
    }
}

/// Notification for a clipboard write.
pub fn clipboard_notification(result: &Result<(), SiteError>) -> Notification {
    match result {
        Ok(()) => Notification::new(NotificationKind::Success, COPY_SUCCESS_MESSAGE),
        Err(err) => {
            tracing::warn!(error = %err, "clipboard write failed");
            Notification::new(NotificationKind::Error, COPY_FAILURE_MESSAGE)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Mounted off-screen, waiting to slide in.
    Entering,
    Visible,
    /// Sliding out before removal.
    Leaving,
}

/// Presentation change for the toast with the given serial.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    Mount { serial: u64, notification: Notification },
    SlideIn { serial: u64 },
    SlideOut { serial: u64 },
    Remove { serial: u64 },
}

#[derive(Debug, Clone)]
struct Toast {
    serial: u64,
    notification: Notification,
    phase: ToastPhase,
    phase_due: Timestamp,
}

/// Owns the single on-screen notification.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    lifetime_ms: f64,
    current: Option<Toast>,
    next_serial: u64,
}

impl NotificationCenter {
    pub fn new(lifetime_ms: f64) -> Self {
        NotificationCenter {
            lifetime_ms: lifetime_ms.max(0.0),
            current: None,
            next_serial: 0,
        }
    }

    /// Show `notification`, removing whatever is on screen immediately.
    pub fn show(&mut self, notification: Notification, now: Timestamp) -> Vec<ToastEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(old) = self.current.take() {
            events.push(ToastEvent::Remove { serial: old.serial });
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        tracing::debug!(serial, kind = ?notification.kind, "notification shown");

        events.push(ToastEvent::Mount {
            serial,
            notification: notification.clone(),
        });
        self.current = Some(Toast {
            serial,
            notification,
            phase: ToastPhase::Entering,
            phase_due: now.offset(ENTER_DELAY_MS),
        });
        events
    }

    /// Advance the on-screen toast. A late tick may pass several phases at once.
    pub fn tick(&mut self, now: Timestamp) -> Vec<ToastEvent> {
        let mut events = Vec::new();

        while let Some(toast) = self.current.as_mut() {
            if now < toast.phase_due {
                break;
            }
            let serial = toast.serial;
            match toast.phase {
                ToastPhase::Entering => {
                    // Lifetime counts from when the toast was mounted.
                    toast.phase = ToastPhase::Visible;
                    toast.phase_due = toast.phase_due.offset(self.lifetime_ms - ENTER_DELAY_MS);
                    events.push(ToastEvent::SlideIn { serial });
                }
                ToastPhase::Visible => {
                    toast.phase = ToastPhase::Leaving;
                    toast.phase_due = toast.phase_due.offset(EXIT_MS);
                    events.push(ToastEvent::SlideOut { serial });
                }
                ToastPhase::Leaving => {
                    self.current = None;
                    events.push(ToastEvent::Remove { serial });
                }
            }
        }

        events
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|toast| &toast.notification)
    }

    pub fn phase(&self) -> Option<ToastPhase> {
        self.current.as_ref().map(|toast| toast.phase)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Drop the toast without animation.
    pub fn clear(&mut self) -> Option<ToastEvent> {
        self.current
            .take()
            .map(|toast| ToastEvent::Remove { serial: toast.serial })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: f64) -> Timestamp {
        Timestamp::from_millis(value)
    }

    #[test]
    fn toast_lifecycle() {
        let mut center = NotificationCenter::new(5000.0);
        let events = center.show(Notification::new(NotificationKind::Success, "Saved"), ms(0.0));
        assert_eq!(events.len(), 1);
        assert_eq!(center.phase(), Some(ToastPhase::Entering));

        assert!(center.tick(ms(5.0)).is_empty());
        assert_eq!(center.tick(ms(10.0)), vec![ToastEvent::SlideIn { serial: 0 }]);
        assert!(center.tick(ms(4999.0)).is_empty());
        assert_eq!(center.tick(ms(5000.0)), vec![ToastEvent::SlideOut { serial: 0 }]);
        assert_eq!(center.tick(ms(5300.0)), vec![ToastEvent::Remove { serial: 0 }]);
        assert!(!center.is_active());
    }

    #[test]
    fn newer_notification_replaces_older() {
        let mut center = NotificationCenter::new(5000.0);
        center.show(Notification::new(NotificationKind::Success, "first"), ms(0.0));
        let events = center.show(Notification::new(NotificationKind::Error, "second"), ms(100.0));
        assert_eq!(events[0], ToastEvent::Remove { serial: 0 });
        assert!(matches!(events[1], ToastEvent::Mount { serial: 1, .. }));
        assert_eq!(center.current().map(|n| n.message.as_str()), Some("second"));

        // The first toast's timers no longer apply.
        center.tick(ms(110.0));
        assert!(center.tick(ms(5000.0)).is_empty());
    }

    #[test]
    fn late_tick_passes_every_phase() {
        let mut center = NotificationCenter::new(5000.0);
        center.show(Notification::new(NotificationKind::Success, "Saved"), ms(0.0));
        let events = center.tick(ms(60_000.0));
        assert_eq!(
            events,
            vec![
                ToastEvent::SlideIn { serial: 0 },
                ToastEvent::SlideOut { serial: 0 },
                ToastEvent::Remove { serial: 0 },
            ]
        );
    }

    #[test]
    fn errors_become_error_toasts() {
        let err = SiteError::TransientIo("Network error. Please try again.".to_string());
        let notification = Notification::from(&err);
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "Network error. Please try again.");
        assert_eq!(notification.kind.class_name(), "notification error");
    }

    #[test]
    fn clipboard_messages() {
        assert_eq!(clipboard_notification(&Ok(())).message, COPY_SUCCESS_MESSAGE);
        let failed = Err(SiteError::IntegrationUnavailable {
            capability: "clipboard".to_string(),
            message: "permission denied".to_string(),
        });
        let notification = clipboard_notification(&failed);
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, COPY_FAILURE_MESSAGE);
    }
}
