
use std::fmt;
use std::net::Ipv4Addr;

use packet::EtherAddr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("{0} relearned with a different identity")]
    Conflict(&'static str),
}

/// Identity of the viewer or broadcaster: where it sits on the switch and
/// the ephemeral TCP port it opened toward the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSlot {
    pub port: u16,
    pub dl_addr: EtherAddr,
    pub nw_addr: Ipv4Addr,
    pub tp_port: u16,
}

/// Identity of the CDN service. Its TCP port is always the RTMP port, so
/// only the location is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSlot {
    pub port: u16,
    pub dl_addr: EtherAddr,
    pub nw_addr: Ipv4Addr,
}

/// Role slots learned from RTMP signaling. A slot, once set, may only be
/// confirmed by an identical observation, never replaced.
#[derive(Debug, Default)]
pub struct RoleRecord {
    pub viewer: Option<HostSlot>,
    pub broadcaster: Option<HostSlot>,
    pub service: Option<ServiceSlot>,
}

impl RoleRecord {
    pub fn record_viewer(&mut self, slot: HostSlot) -> Result<(), RoleError> {
        record(&mut self.viewer, slot, "viewer")
    }

    pub fn record_broadcaster(&mut self, slot: HostSlot) -> Result<(), RoleError> {
        record(&mut self.broadcaster, slot, "broadcaster")
    }

    /// The service is learned twice, once from the play path and once from
    /// the publish path; both observations must agree.
    pub fn record_service(&mut self, slot: ServiceSlot) -> Result<(), RoleError> {
        record(&mut self.service, slot, "service")
    }

    pub fn complete(&self) -> bool {
        self.viewer.is_some() && self.broadcaster.is_some() && self.service.is_some()
    }
}

fn record<T: PartialEq>(
    current: &mut Option<T>,
    observed: T,
    role: &'static str,
) -> Result<(), RoleError> {
    match current {
        Some(existing) if *existing != observed => Err(RoleError::Conflict(role)),
        Some(_) => Ok(()),
        None => {
            *current = Some(observed);
            Ok(())
        }
    }
}

impl fmt::Display for RoleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.viewer {
            Some(v) => write!(f, "viewer {}.{} ({}:{})", v.nw_addr, v.port, v.dl_addr, v.tp_port)?,
            None => write!(f, "viewer ?")?,
        }
        match &self.broadcaster {
            Some(b) => write!(f, " broadcaster {}.{} ({}:{})", b.nw_addr, b.port, b.dl_addr, b.tp_port)?,
            None => write!(f, " broadcaster ?")?,
        }
        match &self.service {
            Some(s) => write!(f, " service {}.{} ({})", s.nw_addr, s.port, s.dl_addr),
            None => write!(f, " service ?"),
        }
    }
}

/// The streaming phase flags. They only ever go from false to true, and
/// the decision rule in the brain keeps the two terminal flags mutually
/// exclusive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamPhase {
    pub viewer_play_sent: bool,
    pub viewer_play_started: bool,
    pub broadcaster_publish_sent: bool,
    pub broadcaster_publish_started: bool,
    pub stream_begin_seen: bool,
    pub p2p_enabled: bool,
    pub p2p_set_off: bool,
}

impl StreamPhase {
    /// A terminal decision was made; RTMP watching is over.
    pub fn terminal(&self) -> bool {
        self.p2p_enabled || self.p2p_set_off
    }

    /// Both peers are confirmed local to this switch.
    pub fn ready_to_steer(&self) -> bool {
        self.viewer_play_started && self.broadcaster_publish_started
    }

    /// The stream started but the broadcaster never showed up here, so it
    /// must live beyond this switch.
    pub fn begun_without_broadcaster(&self) -> bool {
        self.stream_begin_seen && !self.broadcaster_publish_started
    }
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn flag(v: bool) -> char {
            if v {
                'T'
            } else {
                'F'
            }
        }
        write!(
            f,
            "viewer:{}-{} broadcaster:{}-{} begin:{} p2p:{}/{}",
            flag(self.viewer_play_sent),
            flag(self.viewer_play_started),
            flag(self.broadcaster_publish_sent),
            flag(self.broadcaster_publish_started),
            flag(self.stream_begin_seen),
            flag(self.p2p_enabled),
            flag(self.p2p_set_off),
        )
    }
}
