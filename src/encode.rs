//! Line encoding for outgoing IRC commands.
//!
//! [`encode`] turns a command and its params into one wire line. The
//! [`IrcEncode`] trait writes a [`Message`] straight into any [`Write`]
//! implementor (a `BytesMut` writer in the codec, a `Vec<u8>` in tests).
//!
//! # Example
//!
//! ```
//! use logbot::encode::encode;
//!
//! assert_eq!(encode("JOIN", &["#rust"]), b"JOIN #rust\r\n");
//! assert_eq!(encode("USER", &["bot", "0", "*", "Log Bot"]), b"USER bot 0 * :Log Bot\r\n");
//! ```

use std::io::{self, Write};

use crate::message::Message;

/// A trait for encoding IRC protocol elements directly to a byte stream.
pub trait IrcEncode {
    /// Encode this value to the given writer.
    ///
    /// Returns the number of bytes written on success.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize>;

    /// Encode this value to a new `Vec<u8>`.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512);
        let _ = self.encode(&mut buf);
        buf
    }
}

/// Check if a string needs colon-prefixing as a trailing IRC argument.
#[inline]
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

#[inline]
fn put<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<usize> {
    w.write_all(bytes)?;
    Ok(bytes.len())
}

/// Write a command with arguments. The last argument gets a `:` prefix if needed.
fn write_cmd<W: Write, S: AsRef<str>>(w: &mut W, cmd: &str, args: &[S]) -> io::Result<usize> {
    let mut written = put(w, cmd.as_bytes())?;

    let Some((trailing, middle)) = args.split_last() else {
        return Ok(written);
    };

    for param in middle {
        written += put(w, b" ")?;
        written += put(w, param.as_ref().as_bytes())?;
    }

    written += put(w, b" ")?;
    let trailing = trailing.as_ref();
    if needs_colon_prefix(trailing) {
        written += put(w, b":")?;
    }
    written += put(w, trailing.as_bytes())?;

    Ok(written)
}

/// Encode `command` and `params` as a single CRLF-terminated line.
pub fn encode<S: AsRef<str>>(command: &str, params: &[S]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let _ = write_cmd(&mut buf, command, params);
    buf.extend_from_slice(b"\r\n");
    buf
}

/// First CR, LF or NUL found in any param, if one would break framing.
pub fn find_illegal_char<S: AsRef<str>>(params: &[S]) -> Option<char> {
    params
        .iter()
        .flat_map(|p| p.as_ref().chars())
        .find(|c| matches!(c, '\r' | '\n' | '\0'))
}

impl IrcEncode for Message {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let mut written = 0;

        if let Some(ref tags) = self.tags {
            written += put(w, b"@")?;
            written += put(w, tags.as_bytes())?;
            written += put(w, b" ")?;
        }

        if let Some(ref prefix) = self.prefix {
            written += put(w, b":")?;
            written += put(w, prefix.as_bytes())?;
            written += put(w, b" ")?;
        }

        written += write_cmd(w, &self.command, self.params.as_slice())?;
        written += put(w, b"\r\n")?;

        Ok(written)
    }
}
