//! Log records and where they go.
//!
//! Handlers turn events into [`LogRecord`]s and hand them to a [`LogSink`].
//! The record keeps the raw event fields; rendering and file layout belong
//! to the sink. [`FileSink`] writes per-channel daily files, [`MemorySink`]
//! collects records for inspection.

mod file;

use std::io;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::casemap::{irc_to_lower, is_channel_name};
use crate::event::{Event, EventKind};
use crate::prefix::NickMask;

pub use self::file::{FileSink, DEFAULT_MAX_OPEN};

/// Context name for records that belong to no channel or nick.
pub const SERVER_CONTEXT: &str = "server";

/// How a [`FileSink`] renders records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[HH:MM:SS] text` lines in `.txt` files.
    #[default]
    Text,
    /// XHTML fragments in `.html` files.
    Html,
}

/// One structured log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// When the event was handled.
    pub timestamp: DateTime<Local>,
    /// Kind of the originating event.
    pub kind: EventKind,
    /// Raw event source.
    pub source: String,
    /// Raw event target.
    pub target: String,
    /// Raw event arguments.
    pub arguments: Vec<String>,
    /// Rendered sentence, for kinds that have one.
    pub text: Option<String>,
}

impl LogRecord {
    /// Verbatim record of `event`, stamped now.
    pub fn from_event(event: &Event) -> Self {
        Self::at(Local::now(), event)
    }

    /// Verbatim record of `event` with an explicit timestamp.
    pub fn at(timestamp: DateTime<Local>, event: &Event) -> Self {
        Self {
            timestamp,
            kind: event.kind,
            source: event.source.clone(),
            target: event.target.clone(),
            arguments: event.arguments.clone(),
            text: None,
        }
    }

    /// Attach the rendered sentence.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// The stream this record belongs to: a channel, a nick, or
    /// [`SERVER_CONTEXT`]. Case-folded.
    pub fn context(&self) -> String {
        if is_channel_name(&self.target) {
            return irc_to_lower(&self.target);
        }
        let nick = NickMask::parse(&self.source).nick;
        match self.kind {
            EventKind::PrivMsg | EventKind::Notice | EventKind::Ctcp if !nick.is_empty() => {
                irc_to_lower(nick)
            }
            _ => SERVER_CONTEXT.to_string(),
        }
    }

    /// Human-readable line: the attached sentence, or the raw fields.
    pub fn render(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => format!("{} {} {:?}", self.source, self.target, self.arguments),
        }
    }
}

/// Append-only destination for log records.
pub trait LogSink: Send {
    /// Append one record.
    fn write(&mut self, record: &LogRecord) -> io::Result<()>;

    /// Push buffered output to its destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: LogSink + ?Sized> LogSink for Box<T> {
    fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        (**self).write(record)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Shared in-memory sink. Clones see the same records.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Rendered lines of everything written so far.
    pub fn lines(&self) -> Vec<String> {
        self.records.lock().iter().map(LogRecord::render).collect()
    }
}

impl LogSink for MemorySink {
    fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
