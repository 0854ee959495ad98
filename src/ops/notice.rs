use std::fmt;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Info => write!(f, "info"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

/// A toast: short title plus one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// Sink for user-facing notices
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str);
}

/// Collects notices in order (used by the TUI toast row and by tests)
impl Notifier for Vec<Notice> {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str) {
        self.push(Notice {
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

/// Summary for a clear-completed result
pub fn cleared_message(removed: usize) -> String {
    if removed == 1 {
        "Removed 1 completed task.".to_string()
    } else {
        format!("Removed {} completed tasks.", removed)
    }
}
