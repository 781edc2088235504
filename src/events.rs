//! Event System
//!
//! Activity-log entries, built from the notices the dashboard client emits

use crate::dashboard::{Notice, NoticeLevel};
use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    pub fn new(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl From<Notice> for Event {
    fn from(notice: Notice) -> Self {
        let (event_type, log_level) = match notice.level {
            NoticeLevel::Info => (EventType::Info, LogLevel::Info),
            NoticeLevel::Success => (EventType::Success, LogLevel::Info),
            NoticeLevel::Error => (EventType::Error, LogLevel::Error),
        };
        Self::new(notice.message, event_type, log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}
