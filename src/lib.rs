//! # logbot
//!
//! An IRC bot that joins channels and writes what it sees to daily log
//! files.
//!
//! ## Layers
//!
//! - [`message`], [`encode`], [`irc`]: line codec (decode, encode, framing)
//! - [`transport`], [`state`], [`connection`]: TCP session and registration
//! - [`event`], [`dispatch`]: typed events and per-kind handlers
//! - [`bot`], [`sink`], [`config`]: the log bot itself
//!
//! ## Quick Start
//!
//! ### Decoding a line
//!
//! ```rust
//! use logbot::{Event, EventKind};
//!
//! let event = Event::decode(b":alice!a@host PRIVMSG #rust :hello\r\n").unwrap();
//! assert_eq!(event.kind, EventKind::PubMsg);
//! assert_eq!(event.nick(), "alice");
//! assert_eq!(event.argument(0), Some("hello"));
//! ```
//!
//! ### Encoding a command
//!
//! ```rust
//! let bytes = logbot::encode::encode("PRIVMSG", &["#rust", "hello world"]);
//! assert_eq!(bytes, b"PRIVMSG #rust :hello world\r\n");
//! ```

#![deny(clippy::all)]

pub mod bot;
pub mod casemap;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod event;
pub mod irc;
pub mod message;
pub mod prefix;
pub mod sink;
pub mod state;
pub mod transport;

pub use self::bot::{LogBot, RunOutcome};
pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::config::{BotConfig, ConfigError};
pub use self::connection::{Connection, ConnectionConfig};
pub use self::dispatch::{Dispatched, Dispatcher};
pub use self::error::{
    BotError, ConnectError, ConnectionLost, DecodeError, HandlerError, ProtocolError, SendError,
};
pub use self::event::{Event, EventKind};
pub use self::irc::{IrcCodec, MAX_IRC_LINE_LEN};
pub use self::message::Message;
pub use self::prefix::NickMask;
pub use self::sink::{FileSink, LogFormat, LogRecord, LogSink, MemorySink};
pub use self::state::{HandshakeAction, HandshakeConfig, HandshakeMachine};
pub use self::transport::Transport;
