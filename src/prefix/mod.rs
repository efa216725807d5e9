//! Nick-mask view over an event source.
//!
//! A source is either `nick!user@host` or a bare server name. Splitting
//! happens on the first `!`; anything without one has an unknown host mask.

use std::fmt;

/// Host mask used when the source carries no `!`.
pub const UNKNOWN_HOSTMASK: &str = "unknown";

/// Borrowed split of a source string into nick and host mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NickMask<'a> {
    /// Everything before the first `!` (the whole source if there is none).
    pub nick: &'a str,
    /// Everything after the first `!`, or [`UNKNOWN_HOSTMASK`].
    pub hostmask: &'a str,
}

impl<'a> NickMask<'a> {
    /// Split `source` on the first `!`. Never fails.
    pub fn parse(source: &'a str) -> Self {
        match source.split_once('!') {
            Some((nick, hostmask)) => Self { nick, hostmask },
            None => Self {
                nick: source,
                hostmask: UNKNOWN_HOSTMASK,
            },
        }
    }
}

impl fmt::Display for NickMask<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.nick, self.hostmask)
    }
}
