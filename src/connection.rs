//! The single live connection to an IRC server.
//!
//! A [`Connection`] is only ever handed out registered: [`Connection::connect`]
//! (TCP) and [`Connection::register`] (any stream) both run the NICK/USER
//! handshake to completion before returning. After that it is a source of
//! [`Event`]s and a sink for outgoing commands. Server PINGs are answered
//! here and never surface as events.

use std::time::Duration;

use futures_util::Stream;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::encode::find_illegal_char;
use crate::error::{ConnectError, ConnectionLost, ProtocolError, SendError};
use crate::event::Event;
use crate::message::Message;
use crate::state::{HandshakeAction, HandshakeConfig, HandshakeError, HandshakeMachine};
use crate::transport::Transport;

/// Default bound on DNS, TCP connect and registration, each.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to connect and who to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server host name.
    pub network: String,
    /// Server port.
    pub port: u16,
    /// Nickname to register.
    pub nick: String,
    /// Username (ident).
    pub username: String,
    /// Real name.
    pub realname: String,
    /// Bound on each connect phase.
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// Identity derived entirely from `nick`, default timeout.
    pub fn new(network: impl Into<String>, port: u16, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            network: network.into(),
            port,
            username: nick.clone(),
            realname: nick.clone(),
            nick,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    fn handshake(&self) -> HandshakeConfig {
        HandshakeConfig {
            nickname: self.nick.clone(),
            username: self.username.clone(),
            realname: self.realname.clone(),
        }
    }
}

/// A registered connection.
pub struct Connection<S = TcpStream> {
    network: String,
    port: u16,
    nick: String,
    transport: Option<Transport<S>>,
    lost: Option<ConnectionLost>,
}

impl Connection<TcpStream> {
    /// Resolve, connect over TCP and register.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, ConnectError> {
        let resolve_failed = || ConnectError::Resolve {
            host: config.network.clone(),
            port: config.port,
        };

        let addrs: Vec<_> = timeout(
            config.connect_timeout,
            lookup_host((config.network.as_str(), config.port)),
        )
        .await
        .map_err(|_| ConnectError::Timeout(config.connect_timeout))?
        .map_err(|e| {
            warn!(host = %config.network, error = %e, "DNS lookup failed");
            resolve_failed()
        })?
        .collect();

        if addrs.is_empty() {
            return Err(resolve_failed());
        }

        let stream = timeout(config.connect_timeout, TcpStream::connect(&addrs[..]))
            .await
            .map_err(|_| ConnectError::Timeout(config.connect_timeout))??;

        info!(
            network = %config.network,
            port = config.port,
            peer = ?stream.peer_addr().ok(),
            "TCP connection established"
        );

        Self::handshake(Transport::tcp(stream), config).await
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Register over an already-open stream.
    pub async fn register(stream: S, config: &ConnectionConfig) -> Result<Self, ConnectError> {
        Self::handshake(Transport::new(stream), config).await
    }

    async fn handshake(
        mut transport: Transport<S>,
        config: &ConnectionConfig,
    ) -> Result<Self, ConnectError> {
        let mut machine = HandshakeMachine::new(config.handshake());

        timeout(
            config.connect_timeout,
            drive_handshake(&mut transport, &mut machine),
        )
        .await
        .map_err(|_| ConnectError::Timeout(config.connect_timeout))??;

        info!(nick = %config.nick, network = %config.network, "registered");

        Ok(Self {
            network: config.network.clone(),
            port: config.port,
            nick: config.nick.clone(),
            transport: Some(transport),
            lost: None,
        })
    }

    /// Server host name.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Server port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Registered nickname.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Whether the transport is still open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Why the event sequence ended, once it has.
    pub fn lost(&self) -> Option<&ConnectionLost> {
        self.lost.as_ref()
    }

    /// Write one command.
    pub async fn send(&mut self, message: Message) -> Result<(), SendError> {
        if let Some(ch) = find_illegal_char(message.params.as_slice()) {
            return Err(SendError::IllegalCharacter {
                command: message.command,
                ch,
            });
        }

        let transport = self.transport.as_mut().ok_or(SendError::Closed)?;
        debug!(line = %message, "->");
        if let Err(e) = transport.write_message(message).await {
            self.transport = None;
            return Err(e.into());
        }
        Ok(())
    }

    /// `JOIN <channel>`
    pub async fn join(&mut self, channel: &str) -> Result<(), SendError> {
        info!(channel, "joining");
        self.send(Message::join(channel)).await
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the transport is closed; [`Connection::lost`]
    /// then says why. Undecodable lines are logged and skipped.
    pub async fn next_event(&mut self) -> Option<Event> {
        loop {
            let transport = self.transport.as_mut()?;

            match transport.read_message().await {
                Ok(Some(Ok(msg))) => {
                    debug!(line = %msg, "<-");
                    if msg.is("PING") {
                        if let Err(e) = self.send(Message::pong(&msg.params)).await {
                            self.mark_lost(ConnectionLost::Io(e.to_string()));
                            return None;
                        }
                        continue;
                    }
                    return Some(Event::from(msg));
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "dropping undecodable line");
                }
                Ok(None) => {
                    self.mark_lost(ConnectionLost::Eof);
                    return None;
                }
                Err(e) => {
                    self.mark_lost(ConnectionLost::Io(e.to_string()));
                    return None;
                }
            }
        }
    }

    /// The remaining events as a stream; ends when the connection is lost.
    ///
    /// Suits callers that only consume events, e.g. with
    /// [`Dispatcher::run`](crate::dispatch::Dispatcher::run). [`LogBot`]
    /// needs to send between events and calls [`next_event`](Self::next_event)
    /// itself.
    ///
    /// [`LogBot`]: crate::bot::LogBot
    pub fn events(&mut self) -> impl Stream<Item = Event> + '_ {
        futures_util::stream::unfold(self, |conn| async move {
            conn.next_event().await.map(|event| (event, conn))
        })
    }

    /// Send QUIT and close.
    pub async fn quit(&mut self, reason: Option<&str>) -> Result<(), SendError> {
        let sent = self.send(Message::quit(reason)).await;
        self.close().await;
        sent
    }

    /// Close the transport. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!(error = %e, "error while closing transport");
            }
            info!(network = %self.network, "connection closed");
        }
    }

    fn mark_lost(&mut self, reason: ConnectionLost) {
        warn!(network = %self.network, reason = %reason, "connection lost");
        self.transport = None;
        self.lost = Some(reason);
    }
}

async fn drive_handshake<S>(
    transport: &mut Transport<S>,
    machine: &mut HandshakeMachine,
) -> Result<(), ConnectError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut actions = machine.start();
    loop {
        for action in actions {
            match action {
                HandshakeAction::Send(msg) => {
                    debug!(line = %msg, "-> (registration)");
                    transport.write_message(*msg).await.map_err(connect_error)?;
                }
                HandshakeAction::Complete => return Ok(()),
                HandshakeAction::Error(e) => return Err(handshake_error(e)),
            }
        }

        actions = match transport.read_message().await.map_err(connect_error)? {
            Some(Ok(msg)) => {
                debug!(line = %msg, "<- (registration)");
                machine.feed(&msg)
            }
            Some(Err(e)) => {
                warn!(error = %e, "dropping undecodable line during registration");
                Vec::new()
            }
            None => return Err(ConnectError::Closed),
        };
    }
}

fn connect_error(err: ProtocolError) -> ConnectError {
    match err {
        ProtocolError::Io(e) => ConnectError::Io(e),
        other => ConnectError::Send(other.into()),
    }
}

fn handshake_error(err: HandshakeError) -> ConnectError {
    match err {
        HandshakeError::NicknameRejected(nick) => ConnectError::NickRejected(nick),
        HandshakeError::ServerError(reason) => ConnectError::ServerError(reason),
    }
}
