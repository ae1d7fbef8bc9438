use std::collections::HashSet;
use std::str::FromStr;

use crate::error::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:6633";
pub const DEFAULT_RTMP_PORT: u16 = 1935;
pub const DEFAULT_NOTIFY_PORT: u16 = 42857;
pub const DEFAULT_STREAM_KEY: &str = "6829proj";

/// Port the broadcaster publishes to and the viewer listens on once both
/// have been notified. The hosts own this port; the controller only ever
/// sees it inside rewritten heartbeat payloads as part of the peer address
/// contract.
pub const PEER_PORT: u16 = 2000;

/// Fixed size of one notification-channel record.
pub const HEARTBEAT_LENGTH: usize = 15;
pub const HEARTBEAT_PADDING: u8 = b'|';
/// Records containing this substring are keep-alives; anything else is a
/// peer address.
pub const HEARTBEAT_CLUE: &[u8] = b"heartbeat";

/// Flow timeouts (idle, hard) used by the learning forwarder.
pub const DROP_RULE_TIMEOUTS: (u16, u16) = (10, 10);
pub const FORWARD_RULE_TIMEOUTS: (u16, u16) = (10, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Watch RTMP signaling and steer local peers together.
    Bypass,
    /// Plain learning switch; the CDN path is left alone.
    Direct,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bypass" => Ok(Mode::Bypass),
            "direct" => Ok(Mode::Direct),
            other => Err(Error::ErrInvalidArg(format!("unknown mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub rtmp_port: u16,
    pub notify_port: u16,
    pub stream_key: String,
    /// Forward link-local (LLDP, 802.1x) traffic instead of dropping it.
    pub transparent: bool,
    /// Datapath ids to leave unmanaged.
    pub ignore: HashSet<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Bypass,
            rtmp_port: DEFAULT_RTMP_PORT,
            notify_port: DEFAULT_NOTIFY_PORT,
            stream_key: DEFAULT_STREAM_KEY.to_owned(),
            transparent: false,
            ignore: HashSet::new(),
        }
    }
}
