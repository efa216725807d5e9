//! Framed transport over a byte stream.
//!
//! Wraps any `AsyncRead + AsyncWrite` stream in an [`IrcCodec`] frame.
//! Plain TCP gets socket-level keep-alive on construction so an idle but
//! healthy connection is not dropped by middleboxes between server PINGs.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::{DecodeError, ProtocolError};
use crate::irc::IrcCodec;
use crate::message::Message;

/// Idle time before the first TCP keep-alive packet.
pub const KEEPALIVE_TIME: Duration = Duration::from_secs(120);
/// Interval between TCP keep-alive packets.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// One decoded read: a message, or the decode failure for a single line.
pub type ReadItem = Result<Message, DecodeError>;

/// Line-framed IRC transport.
pub struct Transport<S> {
    framed: Framed<S, IrcCodec>,
}

impl Transport<TcpStream> {
    /// Wrap a TCP stream, enabling keep-alive.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Self::new(stream)
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(KEEPALIVE_TIME)
            .with_interval(KEEPALIVE_INTERVAL);

        sock.set_tcp_keepalive(&keepalive)
    }
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an arbitrary stream.
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, IrcCodec::new()),
        }
    }

    /// Read the next line.
    ///
    /// `Ok(None)` means the peer closed the stream. A line that fails to
    /// decode comes back as `Ok(Some(Err(_)))`; the stream stays usable.
    pub async fn read_message(&mut self) -> Result<Option<ReadItem>, ProtocolError> {
        self.framed.next().await.transpose()
    }

    /// Write and flush one message.
    pub async fn write_message(&mut self, message: Message) -> Result<(), ProtocolError> {
        self.framed.send(message).await
    }

    /// Flush and shut down the write half.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        SinkExt::<Message>::close(&mut self.framed).await
    }
}
