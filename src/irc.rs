//! Line codec for framing IRC over a byte stream.
//!
//! Each frame is one `\n`-terminated line. A line that fails to decode is
//! yielded as `Err(DecodeError)` inside the item, so one bad line never
//! terminates the framed stream; only I/O errors do.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::encode::IrcEncode;
use crate::error::{DecodeError, ProtocolError};
use crate::message::{self, Message};

/// Longest line accepted before it is discarded as garbage.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Tokio codec producing decoded [`Message`]s and accepting outgoing ones.
#[derive(Debug, Default)]
pub struct IrcCodec {
    /// Bytes already scanned for a newline.
    next_index: usize,
    /// Set while skipping the remainder of an over-long line.
    discarding: bool,
}

impl IrcCodec {
    /// Create a codec.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for IrcCodec {
    type Item = Result<Message, DecodeError>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (true, Some(pos)) => {
                    src.advance(pos + 1);
                    self.next_index = 0;
                    self.discarding = false;
                }
                (true, None) => {
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(pos)) => {
                    self.next_index = 0;
                    let line = src.split_to(pos + 1);
                    if line.len() > MAX_IRC_LINE_LEN {
                        return Ok(Some(Err(DecodeError::LineTooLong(line.len()))));
                    }
                    let trimmed = trim_line_end(&line);
                    if trimmed.is_empty() {
                        // Keep-alive blank lines carry nothing.
                        continue;
                    }
                    return Ok(Some(message::decode(trimmed)));
                }
                (false, None) if src.len() > MAX_IRC_LINE_LEN => {
                    let len = src.len();
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                    return Ok(Some(Err(DecodeError::LineTooLong(len))));
                }
                (false, None) => {
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(item) => Ok(Some(item)),
            None if buf.is_empty() || self.discarding => Ok(None),
            None => {
                // Unterminated final line.
                let line = buf.split();
                self.next_index = 0;
                let trimmed = trim_line_end(&line);
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(message::decode(trimmed)))
                }
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    &line[..end]
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if let Some(ch) = crate::encode::find_illegal_char(msg.params.as_slice()) {
            return Err(ProtocolError::IllegalControlChar(ch));
        }
        msg.encode(&mut dst.writer())?;
        Ok(())
    }
}
