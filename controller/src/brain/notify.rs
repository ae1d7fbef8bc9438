use std::net::Ipv4Addr;

use bytes::Bytes;
use openflow::action::Action;
use openflow::flow_match::Match;
use openflow::message::{FlowMod, Message, PacketIn, PacketOut, NO_BUFFER};
use packet::Frame;

use crate::config::{HEARTBEAT_LENGTH, HEARTBEAT_PADDING};

use super::SwitchBrain;

impl SwitchBrain {
    /// Notification-channel traffic. Until P2P is on this is a dumb relay;
    /// once it is on, the first heartbeat toward each endpoint is turned
    /// into that endpoint's peer address and the channel is then shut off
    /// inside the switch.
    pub(crate) fn handle_notify(&mut self, event: &PacketIn, frame: &Frame, out: &mut Vec<Message>) {
        let (ipv4, tcp) = match (&frame.ipv4, &frame.tcp) {
            (Some(ipv4), Some(tcp)) => (ipv4, tcp),
            _ => {
                self.normal_send(event, frame, out);
                return;
            }
        };
        log::debug!("[notify] heartbeat {} -> {}", ipv4.src, ipv4.dst);

        // Host-to-service segments (connection setup, ACKs) and every
        // heartbeat before the steering decision pass through untouched.
        if !self.phase.p2p_enabled || tcp.src_port != self.config.notify_port {
            self.normal_send(event, frame, out);
            return;
        }

        let (viewer, broadcaster, service) =
            match (&self.roles.viewer, &self.roles.broadcaster, &self.roles.service) {
                (Some(v), Some(b), Some(s)) => (*v, *b, *s),
                _ => {
                    log::error!(
                        "[notify] {:#018x}: P2P enabled with an incomplete role record",
                        self.datapath_id
                    );
                    self.normal_send(event, frame, out);
                    return;
                }
            };
        if ipv4.src != service.nw_addr {
            log::warn!(
                "[notify] heartbeat from {} which is not the service, forwarding",
                ipv4.src
            );
            self.normal_send(event, frame, out);
            return;
        }

        let peer = if ipv4.dst == viewer.nw_addr {
            broadcaster.nw_addr
        } else if ipv4.dst == broadcaster.nw_addr {
            viewer.nw_addr
        } else {
            self.normal_send(event, frame, out);
            return;
        };

        let mut rewritten = frame.clone();
        if let Err(e) = rewritten.set_tcp_payload(heartbeat_payload(peer)) {
            log::warn!("[notify] cannot rewrite heartbeat: {}", e);
            self.normal_send(event, frame, out);
            return;
        }
        let port = self
            .mac_table
            .lookup(&frame.ethernet.dst)
            .unwrap_or(openflow::action::PORT_FLOOD);
        out.push(Message::PacketOut(PacketOut {
            buffer_id: NO_BUFFER,
            in_port: event.in_port,
            actions: vec![Action::output(port)],
            data: rewritten.marshal(),
        }));
        log::info!("[notify] pushed '{}' to {}", peer, ipv4.dst);

        // One notification per endpoint is enough. An actionless entry
        // matching the heartbeat's headers drops the rest in the switch;
        // the match carries no payload fields, so it holds even if the
        // service varies the filler.
        out.push(Message::FlowMod(FlowMod {
            flow_match: Match::from_frame(frame, Some(event.in_port)),
            ..Default::default()
        }));
        log::info!("[notify] heartbeat drop entry installed for {}", ipv4.dst);
    }
}

/// A notification record: the peer address in dotted decimal, left
/// justified in the fixed-length field, padded with '|'. The absence of
/// the "heartbeat" substring is what tells the receiving host this record
/// is an address.
pub(crate) fn heartbeat_payload(addr: Ipv4Addr) -> Bytes {
    let mut record = addr.to_string().into_bytes();
    record.resize(HEARTBEAT_LENGTH, HEARTBEAT_PADDING);
    Bytes::from(record)
}
