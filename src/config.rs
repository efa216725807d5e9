//! Bot configuration loaded from a TOML file.
//!
//! ```toml
//! [irc]
//! network = "irc.libera.chat"
//! port = 6667
//! channels = "#rust,#tokio"
//! nick = "logbot"
//! owners = "alice,bob"
//!
//! [log]
//! folder = "logs"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::connection::{ConnectionConfig, DEFAULT_CONNECT_TIMEOUT};
use crate::sink::{LogFormat, DEFAULT_MAX_OPEN};

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete bot configuration. Immutable once loaded.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BotConfig {
    /// Server and identity.
    pub irc: IrcConfig,
    /// Log destination.
    pub log: LogConfig,
}

/// The `[irc]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct IrcConfig {
    /// Server host name.
    pub network: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Channels joined at startup, in order.
    #[serde(default, deserialize_with = "comma_list")]
    pub channels: Vec<String>,
    /// Nickname.
    pub nick: String,
    /// Nicks whose invites are followed.
    #[serde(default, deserialize_with = "comma_list")]
    pub owners: Vec<String>,
    /// Username (ident); defaults to the nick.
    #[serde(default)]
    pub username: Option<String>,
    /// Real name; defaults to the nick.
    #[serde(default)]
    pub realname: Option<String>,
    /// Seconds allowed for each connect phase.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// The `[log]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Folder log files are written under.
    pub folder: PathBuf,
    /// File rendering.
    #[serde(default)]
    pub format: LogFormat,
    /// Log files held open at once.
    #[serde(default = "default_max_open_files")]
    pub max_open_files: usize,
}

fn default_port() -> u16 {
    6667
}

fn default_max_open_files() -> usize {
    DEFAULT_MAX_OPEN
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

/// Accept either `"a,b"` or `["a", "b"]`; trim, drop empties, dedupe in order.
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<String>),
    }

    let items: Vec<String> = match Raw::deserialize(deserializer)? {
        Raw::Joined(s) => s.split(',').map(str::to_string).collect(),
        Raw::List(v) => v,
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    Ok(out)
}

impl ConfigError {
    /// The file itself could not be read (missing, a directory, no permission).
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl BotConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.irc.network.trim().is_empty() {
            return Err(ConfigError::Invalid("irc.network is empty".into()));
        }
        if self.irc.nick.trim().is_empty() || self.irc.nick.contains(' ') {
            return Err(ConfigError::Invalid(format!(
                "irc.nick {:?} is not a valid nickname",
                self.irc.nick
            )));
        }
        if self.irc.port == 0 {
            return Err(ConfigError::Invalid("irc.port must be non-zero".into()));
        }
        if self.log.max_open_files == 0 {
            return Err(ConfigError::Invalid("log.max_open_files must be non-zero".into()));
        }
        if let Some(bad) = self.irc.channels.iter().find(|c| c.contains(' ')) {
            return Err(ConfigError::Invalid(format!("channel {:?} contains a space", bad)));
        }
        Ok(())
    }

    /// Connection parameters derived from the `[irc]` section.
    pub fn connection(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(&self.irc.network, self.irc.port, &self.irc.nick);
        if let Some(username) = &self.irc.username {
            config.username = username.clone();
        }
        if let Some(realname) = &self.irc.realname {
            config.realname = realname.clone();
        }
        config.connect_timeout = Duration::from_secs(self.irc.connect_timeout_secs);
        config
    }
}

impl std::str::FromStr for BotConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: BotConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
