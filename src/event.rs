//! Typed protocol events.
//!
//! An [`Event`] is the dispatcher's view of one decoded line: what kind of
//! thing happened, who did it, to what, and the positional data. The
//! translation from [`Message`] follows the shape each command has on the
//! wire, so handlers never index raw params themselves.

use std::fmt;

use crate::casemap::is_channel_name;
use crate::error::DecodeError;
use crate::message::{self, Message};
use crate::prefix::NickMask;

/// Closed set of event kinds the dispatcher routes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Someone joined a channel.
    Join,
    /// Someone left a channel.
    Part,
    /// Message to a channel.
    PubMsg,
    /// Message to the bot.
    PrivMsg,
    /// NOTICE to a channel or to the bot.
    Notice,
    /// Someone was kicked from a channel.
    Kick,
    /// Channel or user mode change.
    Mode,
    /// The bot was invited to a channel.
    Invite,
    /// Someone disconnected.
    Quit,
    /// Someone changed nick.
    Nick,
    /// Channel topic changed.
    Topic,
    /// `\x01`-wrapped PRIVMSG or NOTICE.
    Ctcp,
    /// Server ERROR line.
    Error,
    /// Three-digit numeric reply.
    Numeric,
    /// Any other command.
    Other,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 15] = [
        EventKind::Join,
        EventKind::Part,
        EventKind::PubMsg,
        EventKind::PrivMsg,
        EventKind::Notice,
        EventKind::Kick,
        EventKind::Mode,
        EventKind::Invite,
        EventKind::Quit,
        EventKind::Nick,
        EventKind::Topic,
        EventKind::Ctcp,
        EventKind::Error,
        EventKind::Numeric,
        EventKind::Other,
    ];

    /// Lower-case name used in logs and rendered records.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::PubMsg => "pubmsg",
            EventKind::PrivMsg => "privmsg",
            EventKind::Notice => "notice",
            EventKind::Kick => "kick",
            EventKind::Mode => "mode",
            EventKind::Invite => "invite",
            EventKind::Quit => "quit",
            EventKind::Nick => "nick",
            EventKind::Topic => "topic",
            EventKind::Ctcp => "ctcp",
            EventKind::Error => "error",
            EventKind::Numeric => "numeric",
            EventKind::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One protocol event, immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Raw nick mask or server name; empty when the line had no prefix.
    pub source: String,
    /// Channel or nick the event applies to; empty when there is none.
    pub target: String,
    /// Command-specific positional data.
    pub arguments: Vec<String>,
}

impl Event {
    /// Build an event directly.
    pub fn new<S, T, I, A>(kind: EventKind, source: S, target: T, arguments: I) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            kind,
            source: source.into(),
            target: target.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode a raw wire line straight into an event.
    pub fn decode(raw_line: &[u8]) -> Result<Self, DecodeError> {
        message::decode(raw_line).map(Self::from)
    }

    /// Nick-mask view over [`Event::source`].
    pub fn nick_mask(&self) -> NickMask<'_> {
        NickMask::parse(&self.source)
    }

    /// Nick of whoever caused the event.
    pub fn nick(&self) -> &str {
        self.nick_mask().nick
    }

    /// Argument at `index`, if present.
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }
}

fn is_ctcp(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('\x01')
}

impl From<Message> for Event {
    fn from(msg: Message) -> Self {
        let source = msg.prefix.unwrap_or_default();
        let command = msg.command.to_ascii_uppercase();
        let mut params = msg.params.into_iter();

        let (kind, target, arguments): (EventKind, String, Vec<String>) = match command.as_str() {
            "QUIT" => (EventKind::Quit, String::new(), params.collect()),
            "ERROR" => (EventKind::Error, String::new(), params.collect()),
            "PRIVMSG" | "NOTICE" => {
                let target = params.next().unwrap_or_default();
                let arguments: Vec<String> = params.collect();
                let text = arguments.first().map(String::as_str).unwrap_or_default();
                let kind = if is_ctcp(text) {
                    EventKind::Ctcp
                } else if command == "NOTICE" {
                    EventKind::Notice
                } else if is_channel_name(&target) {
                    EventKind::PubMsg
                } else {
                    EventKind::PrivMsg
                };
                (kind, target, arguments)
            }
            other => {
                let kind = match other {
                    "JOIN" => EventKind::Join,
                    "PART" => EventKind::Part,
                    "KICK" => EventKind::Kick,
                    "MODE" => EventKind::Mode,
                    "INVITE" => EventKind::Invite,
                    "NICK" => EventKind::Nick,
                    "TOPIC" => EventKind::Topic,
                    c if c.len() == 3 && c.bytes().all(|b| b.is_ascii_digit()) => {
                        EventKind::Numeric
                    }
                    _ => EventKind::Other,
                };
                let target = params.next().unwrap_or_default();
                (kind, target, params.collect())
            }
        };

        Event {
            kind,
            source,
            target,
            arguments,
        }
    }
}
