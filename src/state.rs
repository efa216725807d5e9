//! Sans-IO registration handshake.
//!
//! The machine does no I/O: it consumes decoded server lines and produces
//! actions (lines to send, completion, failure). [`Connection`] drives it
//! over a real transport; tests drive it directly.
//!
//! [`Connection`]: crate::connection::Connection
//!
//! # Example
//!
//! ```
//! use logbot::state::{HandshakeAction, HandshakeConfig, HandshakeMachine};
//! use logbot::Message;
//!
//! let mut machine = HandshakeMachine::new(HandshakeConfig::for_nick("logbot"));
//! let actions = machine.start(); // NICK, USER
//! assert_eq!(actions.len(), 2);
//!
//! let welcome: Message = ":srv 001 logbot :Welcome".parse().unwrap();
//! let actions = machine.feed(&welcome);
//! assert!(matches!(actions[0], HandshakeAction::Complete));
//! ```

use crate::message::Message;

/// Current state of the registration handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing sent yet.
    #[default]
    Disconnected,
    /// NICK/USER sent, awaiting welcome (001).
    Registering,
    /// Received 001, fully connected.
    Connected,
    /// Registration failed or the server sent ERROR.
    Terminated,
}

/// Identity presented to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Desired nickname.
    pub nickname: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
}

impl HandshakeConfig {
    /// Use `nick` for all three identity fields.
    pub fn for_nick(nick: &str) -> Self {
        Self {
            nickname: nick.to_string(),
            username: nick.to_string(),
            realname: nick.to_string(),
        }
    }
}

/// Actions produced by the handshake state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeAction {
    /// Send this message to the server.
    Send(Box<Message>),
    /// Registration is complete.
    Complete,
    /// Registration failed.
    Error(HandshakeError),
}

/// Reasons registration can fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeError {
    /// Server rejected the nickname (432, 433, 436).
    NicknameRejected(String),
    /// Server sent ERROR.
    ServerError(String),
}

impl std::fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NicknameRejected(nick) => write!(f, "nickname rejected: {}", nick),
            Self::ServerError(msg) => write!(f, "server error: {}", msg),
        }
    }
}

impl std::error::Error for HandshakeError {}

/// Sans-IO state machine for NICK/USER → 001.
#[derive(Clone, Debug)]
pub struct HandshakeMachine {
    config: HandshakeConfig,
    state: ConnectionState,
}

impl HandshakeMachine {
    /// Create a new handshake state machine with the given configuration.
    #[must_use]
    pub fn new(config: HandshakeConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
        }
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Start the handshake. Returns NICK and USER.
    #[must_use]
    pub fn start(&mut self) -> Vec<HandshakeAction> {
        self.state = ConnectionState::Registering;
        vec![
            HandshakeAction::Send(Box::new(Message::nick(&self.config.nickname))),
            HandshakeAction::Send(Box::new(Message::user(
                &self.config.username,
                &self.config.realname,
            ))),
        ]
    }

    /// Feed a decoded server line. Returns actions to perform.
    #[must_use]
    pub fn feed(&mut self, msg: &Message) -> Vec<HandshakeAction> {
        if self.state != ConnectionState::Registering {
            return vec![];
        }

        if msg.is("PING") {
            return vec![HandshakeAction::Send(Box::new(Message::pong(&msg.params)))];
        }

        if msg.is("ERROR") {
            let reason = msg.param(0).unwrap_or("connection closed").to_string();
            self.state = ConnectionState::Terminated;
            return vec![HandshakeAction::Error(HandshakeError::ServerError(reason))];
        }

        match msg.numeric() {
            // RPL_WELCOME
            Some(1) => {
                self.state = ConnectionState::Connected;
                vec![HandshakeAction::Complete]
            }
            // ERR_ERRONEUSNICKNAME, ERR_NICKNAMEINUSE, ERR_NICKCOLLISION
            Some(432 | 433 | 436) => {
                let nick = msg.param(1).unwrap_or(&self.config.nickname).to_string();
                self.state = ConnectionState::Terminated;
                vec![HandshakeAction::Error(HandshakeError::NicknameRejected(nick))]
            }
            _ => vec![],
        }
    }
}
