
pub mod mac_table;
pub mod roles;

mod forwarder;
mod notify;
mod rtmp_control;

use std::sync::Arc;

use bytes::Bytes;
use openflow::action::{Action, PORT_FLOOD};
use openflow::message::{Message, PacketIn, PacketOut, NO_BUFFER};
use packet::Frame;

use crate::config::{Config, Mode};
use mac_table::MacTable;
use roles::{RoleRecord, StreamPhase};

/// What a packet-in turned out to be, decided once by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketClass {
    /// RTMP-port traffic while role discovery is still running.
    RtmpControl,
    /// Notification-channel traffic.
    NotifyHeartbeat,
    /// Everything else, including RTMP traffic after a terminal decision.
    Other,
}

/// All controller state for one connected switch.
///
/// Created when the switch's features reply arrives, mutated by every
/// packet-in on that switch, dropped with the connection. Handlers never
/// write to the southbound session themselves; they return the messages to
/// emit, in order, so one packet-in runs to completion before the next.
pub struct SwitchBrain {
    datapath_id: u64,
    config: Arc<Config>,
    mac_table: MacTable,
    roles: RoleRecord,
    phase: StreamPhase,
    /// Holding slot for the stray 12-byte RTMP fragment that must be glued
    /// onto the front of the next payload from the same flow.
    prepend: Option<Bytes>,
    /// Set when signaling contradicted the learned roles; role state is
    /// frozen from then on and traffic takes the plain path.
    poisoned: bool,
}

impl SwitchBrain {
    pub fn new(datapath_id: u64, config: Arc<Config>) -> Self {
        SwitchBrain {
            datapath_id,
            config,
            mac_table: MacTable::new(),
            roles: RoleRecord::default(),
            phase: StreamPhase::default(),
            prepend: None,
            poisoned: false,
        }
    }

    pub fn datapath_id(&self) -> u64 {
        self.datapath_id
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn roles(&self) -> &RoleRecord {
        &self.roles
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Dispatch one packet-in and return the southbound messages it
    /// produced, in emission order.
    pub fn handle_packet_in(&mut self, event: &PacketIn) -> Vec<Message> {
        let mut out = Vec::new();
        let frame = match Frame::parse(event.data.clone()) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!(
                    "[l2] unparseable frame on {:#018x}.{}: {}",
                    self.datapath_id,
                    event.in_port,
                    e
                );
                return out;
            }
        };

        self.mac_table.learn(frame.ethernet.src, event.in_port);

        match self.classify(&frame) {
            PacketClass::RtmpControl => self.handle_rtmp_control(event, &frame, &mut out),
            PacketClass::NotifyHeartbeat => self.handle_notify(event, &frame, &mut out),
            PacketClass::Other => match self.config.mode {
                Mode::Direct => self.forward_learning(event, &frame, &mut out),
                Mode::Bypass => self.forward_bypass(event, &frame, &mut out),
            },
        }
        out
    }

    fn classify(&self, frame: &Frame) -> PacketClass {
        if self.config.mode == Mode::Direct {
            return PacketClass::Other;
        }
        let tcp = match &frame.tcp {
            Some(tcp) => tcp,
            None => return PacketClass::Other,
        };
        let on_rtmp_port =
            tcp.src_port == self.config.rtmp_port || tcp.dst_port == self.config.rtmp_port;
        if on_rtmp_port && !self.phase.terminal() && !self.poisoned {
            PacketClass::RtmpControl
        } else if tcp.src_port == self.config.notify_port
            || tcp.dst_port == self.config.notify_port
        {
            PacketClass::NotifyHeartbeat
        } else {
            PacketClass::Other
        }
    }

    /// Send the packet out toward its destination (flooding when the port
    /// is unknown) without touching the flow table.
    pub(crate) fn normal_send(&self, event: &PacketIn, frame: &Frame, out: &mut Vec<Message>) {
        let port = self
            .mac_table
            .lookup(&frame.ethernet.dst)
            .unwrap_or(PORT_FLOOD);
        out.push(Message::PacketOut(
            self.packet_out(event, vec![Action::output(port)]),
        ));
    }

    /// A packet-out re-emitting the packet-in's packet: by buffer id when
    /// the switch buffered it, carrying the raw bytes otherwise.
    pub(crate) fn packet_out(&self, event: &PacketIn, actions: Vec<Action>) -> PacketOut {
        PacketOut {
            buffer_id: event.buffer_id,
            in_port: event.in_port,
            actions,
            data: if event.buffer_id == NO_BUFFER {
                event.data.clone()
            } else {
                Bytes::new()
            },
        }
    }

    /// Terminal decision rule, run after every RTMP handler pass. The two
    /// branches are mutually exclusive and each fires at most once.
    pub(crate) fn evaluate_stream_state(&mut self) {
        if self.phase.terminal() || self.poisoned {
            return;
        }
        if self.phase.ready_to_steer() {
            if !self.roles.complete() {
                self.poison("steering decision reached with an incomplete role record");
                return;
            }
            self.phase.p2p_enabled = true;
            log::info!(
                "[stream] {:#018x}: entering P2P stage",
                self.datapath_id
            );
        } else if self.phase.begun_without_broadcaster() {
            self.phase.p2p_set_off = true;
            log::info!(
                "[stream] {:#018x}: P2P is set to off, broadcaster is not local",
                self.datapath_id
            );
        }
    }

    /// Signaling contradicted the learned roles. Freeze role state; the
    /// plain forwarding path keeps the hosts connected through the CDN.
    pub(crate) fn poison(&mut self, why: &str) {
        log::error!(
            "[rtmp] {:#018x}: inconsistent signaling, leaving the stream alone: {}",
            self.datapath_id,
            why
        );
        self.poisoned = true;
    }
}
