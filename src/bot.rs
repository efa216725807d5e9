//! The log bot controller.
//!
//! [`LogBot`] owns the immutable [`BotConfig`] and the log sink. Its
//! handlers turn events into log records; the invite handler is the only
//! one that acts, queueing JOINs for channels an owner invited it to.
//! Queued commands are flushed through the connection after each event,
//! so handlers themselves never touch I/O beyond the sink.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::casemap::irc_eq;
use crate::config::BotConfig;
use crate::connection::Connection;
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::error::{BotError, ConnectionLost, HandlerError};
use crate::event::{Event, EventKind};
use crate::message::Message;
use crate::sink::{LogRecord, LogSink};

/// Reason sent with QUIT on a requested shutdown.
pub const QUIT_MESSAGE: &str = "logbot shutting down";

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The shutdown signal fired.
    Shutdown,
    /// The server side went away.
    Lost(ConnectionLost),
}

/// Bot state: configuration, log sink, pending outgoing commands.
pub struct LogBot {
    config: BotConfig,
    sink: Box<dyn LogSink>,
    outbox: Vec<Message>,
    stats: DispatchStats,
}

impl LogBot {
    /// Create a bot writing to `sink`.
    pub fn new(config: BotConfig, sink: Box<dyn LogSink>) -> Self {
        Self {
            config,
            sink,
            outbox: Vec::new(),
            stats: DispatchStats::default(),
        }
    }

    /// The configuration the bot was built with.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Whether `nick` is a configured owner (RFC 1459 case-insensitive).
    pub fn is_owner(&self, nick: &str) -> bool {
        self.config.irc.owners.iter().any(|owner| irc_eq(owner, nick))
    }

    /// Dispatch outcomes counted over every run so far.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Commands queued by handlers and not yet sent.
    pub fn pending(&self) -> &[Message] {
        &self.outbox
    }

    /// Take every queued command, oldest first.
    pub fn take_outbox(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    /// A dispatcher with every bot handler registered.
    pub fn dispatcher() -> Dispatcher<LogBot> {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(EventKind::Join, LogBot::on_join);
        dispatcher.register(EventKind::PubMsg, LogBot::on_pubmsg);
        dispatcher.register(EventKind::Part, LogBot::on_part);
        dispatcher.register(EventKind::Invite, LogBot::on_invite);
        for kind in [
            EventKind::PrivMsg,
            EventKind::Notice,
            EventKind::Quit,
            EventKind::Kick,
            EventKind::Mode,
        ] {
            dispatcher.register(kind, LogBot::on_audit);
        }
        dispatcher
    }

    fn emit(&mut self, record: LogRecord) -> Result<(), HandlerError> {
        debug!(
            kind = %record.kind,
            context = %record.context(),
            line = %record.render(),
            "log record"
        );
        self.sink.write(&record)?;
        Ok(())
    }

    /// `nick (hostmask) has joined #channel`
    pub fn on_join(&mut self, event: &Event) -> Result<(), HandlerError> {
        let mask = event.nick_mask();
        let text = format!("{} ({}) has joined {}", mask.nick, mask.hostmask, event.target);
        self.emit(LogRecord::from_event(event).with_text(text))
    }

    /// `nick: message`
    pub fn on_pubmsg(&mut self, event: &Event) -> Result<(), HandlerError> {
        let message = event.argument(0).ok_or(HandlerError::MissingArgument {
            kind: event.kind,
            index: 0,
        })?;
        let text = format!("{}: {}", event.nick(), message);
        self.emit(LogRecord::from_event(event).with_text(text))
    }

    /// `nick has parted #channel`
    pub fn on_part(&mut self, event: &Event) -> Result<(), HandlerError> {
        let text = format!("{} has parted {}", event.nick(), event.target);
        self.emit(LogRecord::from_event(event).with_text(text))
    }

    /// Verbatim record of the event.
    pub fn on_audit(&mut self, event: &Event) -> Result<(), HandlerError> {
        self.emit(LogRecord::from_event(event))
    }

    /// Follow invites from owners; record and ignore the rest.
    pub fn on_invite(&mut self, event: &Event) -> Result<(), HandlerError> {
        let nick = event.nick();

        if !self.is_owner(nick) {
            info!(nick, "invite denied");
            let text = format!("Invite from {} denied", nick);
            return self.emit(LogRecord::from_event(event).with_text(text));
        }

        let channels: Vec<&str> = event
            .arguments
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .collect();
        for channel in &channels {
            info!(nick, channel, "invite accepted");
            self.outbox.push(Message::join(channel));
        }

        let text = format!("Invite from {} accepted: {}", nick, channels.join(", "));
        self.emit(LogRecord::from_event(event).with_text(text))
    }

    /// Create the log folder, connect, then [`run`](Self::run).
    pub async fn start<F>(&mut self, shutdown: F) -> Result<RunOutcome, BotError>
    where
        F: Future<Output = ()>,
    {
        let folder = &self.config.log.folder;
        std::fs::create_dir_all(folder).map_err(|source| BotError::LogFolder {
            path: folder.clone(),
            source,
        })?;

        let mut connection = Connection::connect(&self.config.connection()).await?;
        self.run(&mut connection, shutdown).await
    }

    /// Join the configured channels, then dispatch events until the
    /// connection is lost or `shutdown` resolves.
    pub async fn run<S, F>(
        &mut self,
        connection: &mut Connection<S>,
        shutdown: F,
    ) -> Result<RunOutcome, BotError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        for channel in &self.config.irc.channels {
            connection.join(channel).await?;
        }

        let mut dispatcher = Self::dispatcher();
        tokio::pin!(shutdown);

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                event = connection.next_event() => Some(event),
            };

            match next {
                None => {
                    info!("shutdown requested");
                    break RunOutcome::Shutdown;
                }
                Some(Some(event)) => {
                    let dispatched = dispatcher.dispatch(self, &event);
                    self.stats.record(dispatched);
                    self.flush_outbox(connection).await?;
                }
                Some(None) => {
                    let reason = connection.lost().cloned().unwrap_or(ConnectionLost::Eof);
                    warn!(reason = %reason, "connection lost");
                    break RunOutcome::Lost(reason);
                }
            }
        };

        info!(
            handled = self.stats.handled,
            unhandled = self.stats.unhandled,
            failed = self.stats.failed,
            "session ended"
        );

        if let Err(e) = self.sink.flush() {
            warn!(error = %e, "failed to flush log sink");
        }

        if outcome == RunOutcome::Shutdown {
            if let Err(e) = connection.quit(Some(QUIT_MESSAGE)).await {
                debug!(error = %e, "QUIT not delivered");
            }
        }

        Ok(outcome)
    }

    async fn flush_outbox<S>(&mut self, connection: &mut Connection<S>) -> Result<(), BotError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        for message in self.take_outbox() {
            connection.send(message).await?;
        }
        Ok(())
    }
}
