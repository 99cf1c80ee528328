use std::collections::VecDeque;

use crate::error::PortalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A user-visible, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Pending notices, oldest first. The front end drains them after each
/// operation.
#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message.into());
    }

    pub fn error(&mut self, context: &str, err: &PortalError) {
        self.push(NoticeLevel::Error, format!("{}: {}", context, err));
    }

    fn push(&mut self, level: NoticeLevel, message: String) {
        tracing::debug!(?level, %message, "notice");
        self.queue.push_back(Notice { level, message });
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }
}
