//! Error types for the log bot.
//!
//! The taxonomy follows how far a failure reaches: decode and handler
//! errors are recovered per line or per event, while connect and send
//! errors break the single live connection and end the bot.

use thiserror::Error;

use crate::event::EventKind;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised by the line codec itself, as opposed to a single bad line.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Illegal control character in an outgoing message.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),
}

/// Errors encountered when decoding a single wire line.
///
/// These never end the connection: the receive loop logs and skips the line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Line was empty (or only whitespace and line terminators).
    #[error("empty message")]
    EmptyMessage,

    /// No command token after the optional tags and prefix.
    #[error("missing command in {0:?}")]
    MissingCommand(String),

    /// Line was not valid UTF-8.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(String),

    /// Line exceeded the maximum accepted length and was discarded.
    #[error("line too long: {0} bytes")]
    LineTooLong(usize),
}

/// Errors that prevent a connection from being established.
///
/// Fatal to the bot; there is no retry inside the crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectError {
    /// Host name did not resolve to any address.
    #[error("could not resolve {host}:{port}")]
    Resolve {
        /// Host that failed to resolve.
        host: String,
        /// Port requested.
        port: u16,
    },

    /// TCP connect or handshake I/O failed.
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    /// Handshake did not complete in time.
    #[error("registration timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Server rejected the nickname.
    #[error("nickname rejected: {0}")]
    NickRejected(String),

    /// Server sent ERROR during registration.
    #[error("server error: {0}")]
    ServerError(String),

    /// Server closed the stream before registration completed.
    #[error("connection closed during registration")]
    Closed,

    /// Writing a registration command failed.
    #[error("registration send failed: {0}")]
    Send(#[from] SendError),
}

/// Errors writing to the connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SendError {
    /// The transport has been closed.
    #[error("connection is closed")]
    Closed,

    /// A parameter carried CR, LF or NUL and would break line framing.
    #[error("illegal character {ch:?} in {command} parameter")]
    IllegalCharacter {
        /// Command being sent.
        command: String,
        /// Offending character.
        ch: char,
    },

    /// The underlying write failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtocolError> for SendError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => Self::Io(e),
            ProtocolError::IllegalControlChar(ch) => Self::IllegalCharacter {
                command: String::from("?"),
                ch,
            },
        }
    }
}

/// Terminal signal of the event sequence: why the read side ended.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionLost {
    /// Server closed the stream.
    #[error("connection closed by peer")]
    Eof,

    /// Read failed.
    #[error("connection reset: {0}")]
    Io(String),
}

/// Failure inside a single event handler. Logged, then dispatch continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandlerError {
    /// The event did not carry an argument the handler needs.
    #[error("{kind} event is missing argument {index}")]
    MissingArgument {
        /// Kind of the event being handled.
        kind: EventKind,
        /// Position of the missing argument.
        index: usize,
    },

    /// Writing the log record failed.
    #[error("log sink error: {0}")]
    Sink(#[from] std::io::Error),
}

/// Top-level errors ending a bot run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BotError {
    /// Log folder could not be created.
    #[error("cannot create log folder {path}: {source}")]
    LogFolder {
        /// Folder path.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Connection could not be established.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// A write to the live connection failed.
    #[error(transparent)]
    Send(#[from] SendError),
}
