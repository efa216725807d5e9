//! Owned IRC messages and line decoding.

mod nom_parser;

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

pub use self::nom_parser::{DetailedParseError, ParsedMessage};

/// A single decoded IRC line.
///
/// `command` keeps the case the server sent; comparisons go through
/// [`Message::is`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Raw IRCv3 tags (without `@`), if present.
    pub tags: Option<String>,
    /// Source of the line (without `:`), if present.
    pub prefix: Option<String>,
    /// Command name or three-digit numeric.
    pub command: String,
    /// Positional parameters, trailing included.
    pub params: Vec<String>,
}

impl Message {
    /// Build an outgoing message without tags or prefix.
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            tags: None,
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// `NICK <nick>`
    pub fn nick(nick: &str) -> Self {
        Self::new("NICK", [nick])
    }

    /// `USER <username> 0 * :<realname>`
    pub fn user(username: &str, realname: &str) -> Self {
        Self::new("USER", [username, "0", "*", realname])
    }

    /// `JOIN <channel>`
    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", [channel])
    }

    /// `PONG <token>`, echoing every PING parameter.
    pub fn pong(tokens: &[String]) -> Self {
        Self::new("PONG", tokens.iter().map(String::as_str))
    }

    /// `QUIT [:<reason>]`
    pub fn quit(reason: Option<&str>) -> Self {
        Self::new("QUIT", reason)
    }

    /// Case-insensitive command comparison.
    pub fn is(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    /// Parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Numeric reply code, when the command is three digits.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

/// Decode one raw wire line.
///
/// Trailing CR/LF is ignored. Malformed lines yield a [`DecodeError`] for
/// the caller to log and skip.
pub fn decode(raw_line: &[u8]) -> Result<Message, DecodeError> {
    let line =
        std::str::from_utf8(raw_line).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;
    line.parse()
}

impl FromStr for Message {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            return Err(DecodeError::EmptyMessage);
        }

        let parsed = ParsedMessage::parse(trimmed)
            .map_err(|_| DecodeError::MissingCommand(trimmed.to_string()))?;

        Ok(Message {
            tags: parsed.tags.map(str::to_string),
            prefix: parsed.prefix.map(str::to_string),
            command: parsed.command.to_string(),
            params: parsed.params.into_iter().map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = crate::encode::IrcEncode::to_bytes(self);
        let line = String::from_utf8_lossy(&bytes);
        f.write_str(line.trim_end_matches(['\r', '\n']))
    }
}
