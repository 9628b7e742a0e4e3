//! Configuration module - environment variable parsing

use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

use crate::game::formation::FormationKind;

/// Largest team the server accepts
pub const MAX_TEAM_SIZE: usize = 11;

/// One side's roster settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeamConfig {
    /// Agents launched for this side
    pub size: usize,
    pub formation: FormationKind,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            size: MAX_TEAM_SIZE,
            formation: FormationKind::F343,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Soccer server address, resolved once at startup
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    pub left: TeamConfig,
    pub right: TeamConfig,

    /// Candidate directions sampled when looking for a pass
    pub pass_directions: u32,
    /// Cosmetic jitter on the possession indicator
    pub possession_jitter: bool,
    /// Base seed; agent k uses `agent_seed + k`
    pub agent_seed: u64,

    /// Wait for the server's init per connect attempt
    pub handshake_timeout: Duration,
    pub handshake_attempts: u32,

    /// Teleport every agent home when a before-kick-off phase begins
    pub teleport_home_before_kick_off: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 7777)),
            log_level: "info".to_string(),
            left: TeamConfig::default(),
            right: TeamConfig::default(),
            pass_directions: 180,
            possession_jitter: false,
            agent_seed: 0,
            handshake_timeout: Duration::from_millis(1000),
            handshake_attempts: 60,
            teleport_home_before_kick_off: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key/value source; unset keys keep
    /// their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("SOCCER_SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_or(&lookup, "SOCCER_SERVER_PORT", 7777)?;
        let server_addr = resolve(&host, port)?;

        let pass_directions = parse_or(&lookup, "PASS_DIRECTIONS", defaults.pass_directions)?;
        if pass_directions == 0 {
            return Err(ConfigError::Invalid {
                key: "PASS_DIRECTIONS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            server_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            left: team(&lookup, "LEFT_TEAM_SIZE", "LEFT_FORMATION")?,
            right: team(&lookup, "RIGHT_TEAM_SIZE", "RIGHT_FORMATION")?,
            pass_directions,
            possession_jitter: parse_or(&lookup, "POSSESSION_JITTER", defaults.possession_jitter)?,
            agent_seed: parse_or(&lookup, "AGENT_SEED", defaults.agent_seed)?,
            handshake_timeout: Duration::from_millis(parse_or(&lookup, "HANDSHAKE_TIMEOUT_MS", 1000)?),
            handshake_attempts: parse_or(&lookup, "HANDSHAKE_ATTEMPTS", defaults.handshake_attempts)?,
            teleport_home_before_kick_off: parse_or(
                &lookup,
                "TELEPORT_HOME_BEFORE_KICKOFF",
                defaults.teleport_home_before_kick_off,
            )?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn team<F>(lookup: &F, size_key: &'static str, formation_key: &'static str) -> Result<TeamConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let size = parse_or(lookup, size_key, MAX_TEAM_SIZE)?;
    if size > MAX_TEAM_SIZE {
        return Err(ConfigError::TeamSize { key: size_key, size });
    }

    let formation = match lookup(formation_key) {
        Some(name) => name.parse().map_err(ConfigError::UnknownFormation)?,
        None => FormationKind::F343,
    };

    Ok(TeamConfig { size, formation })
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ConfigError::InvalidAddress(format!("{}:{}", host, port)))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Cannot resolve server address {0}")]
    InvalidAddress(String),

    #[error("{key} must be at most 11, got {size}")]
    TeamSize { key: &'static str, size: usize },

    #[error("Unknown formation {0:?} (expected 433, 523 or 343)")]
    UnknownFormation(String),
}
