use bytes::{BufMut, BytesMut};
use openflow::message::{Message, PacketIn};
use packet::ipv4::Ipv4Header;
use packet::tcp::TcpHeader;
use packet::{EtherAddr, Frame};
use rtmp::chunk::parse_payload;
use rtmp::ChunkMessage;

use super::roles::{HostSlot, ServiceSlot};
use super::SwitchBrain;

/// RTMP handshake payloads observed from the hosts in the wild. Not what
/// the protocol document says they should be, but what the broadcaster and
/// service actually exchange.
const HANDSHAKE_LENGTHS: [usize; 2] = [88, 89];

/// A bare 12-byte fragment one broadcaster implementation emits ahead of a
/// chunk; the next payload on the flow only parses with it glued back on
/// the front. No RTMP document accounts for it.
const PREPEND_FRAGMENT_LEN: usize = 12;

impl SwitchBrain {
    /// Watch one RTMP-port packet for signaling events, then send it along
    /// unchanged. Only a packet-out is ever emitted here; flow entries
    /// would take the remaining signaling out of our sight.
    pub(crate) fn handle_rtmp_control(
        &mut self,
        event: &PacketIn,
        frame: &Frame,
        out: &mut Vec<Message>,
    ) {
        let (ipv4, tcp) = match (&frame.ipv4, &frame.tcp) {
            (Some(ipv4), Some(tcp)) => (ipv4, tcp),
            _ => {
                self.normal_send(event, frame, out);
                return;
            }
        };

        let payload = frame.payload.clone();
        // A bare ACK or FIN riding the RTMP port.
        if payload.is_empty() {
            self.normal_send(event, frame, out);
            return;
        }
        if HANDSHAKE_LENGTHS.contains(&payload.len()) {
            log::info!("[rtmp] handshake");
            self.normal_send(event, frame, out);
            return;
        }
        if payload.len() == PREPEND_FRAGMENT_LEN {
            self.prepend = Some(payload);
            self.normal_send(event, frame, out);
            return;
        }

        let content = match self.prepend.take() {
            Some(fragment) => {
                let mut glued = BytesMut::with_capacity(fragment.len() + payload.len());
                glued.put_slice(&fragment);
                glued.put_slice(&payload);
                glued.freeze()
            }
            None => payload,
        };

        let (messages, all_parsed) = parse_payload(content);
        for message in &messages {
            log::debug!("[rtmp] {}", message);
        }
        if !all_parsed {
            // Not RTMP after all (or cut mid-message): forward untouched
            // and learn nothing from it.
            self.normal_send(event, frame, out);
            return;
        }

        for message in &messages {
            if self.poisoned {
                break;
            }
            self.observe_message(message, event.in_port, frame.ethernet.src, ipv4, tcp);
        }

        // The packet itself must reach its destination before any decision
        // takes effect; only the next packet sees a terminal state.
        self.normal_send(event, frame, out);
        self.evaluate_stream_state();
    }

    /// Apply the role transitions a parsed message triggers. Requests must
    /// travel toward the RTMP port and starts away from it; anything else
    /// contradicts the topology we have learned and poisons the brain.
    fn observe_message(
        &mut self,
        message: &ChunkMessage,
        in_port: u16,
        src_mac: EtherAddr,
        ipv4: &Ipv4Header,
        tcp: &TcpHeader,
    ) {
        let rtmp_port = self.config.rtmp_port;
        let is_play_request = message.is_play_request(self.config.stream_key.as_bytes());
        let is_publish_request = message.is_publish_request(self.config.stream_key.as_bytes());

        if is_play_request {
            if tcp.dst_port != rtmp_port {
                return self.poison("play request not addressed to the RTMP port");
            }
            let slot = HostSlot {
                port: in_port,
                dl_addr: src_mac,
                nw_addr: ipv4.src,
                tp_port: tcp.src_port,
            };
            if let Err(e) = self.roles.record_viewer(slot) {
                return self.poison(&e.to_string());
            }
            self.phase.viewer_play_sent = true;
            log::info!("[rtmp] play('{}')", self.config.stream_key);
            self.dump_record();
        }

        if message.is_play_start() {
            if tcp.src_port != rtmp_port {
                return self.poison("play start not sent from the RTMP port");
            }
            if !self.phase.viewer_play_sent {
                return self.poison("play start before any play request");
            }
            if let Err(e) = self.record_service_from(in_port, src_mac, ipv4) {
                return self.poison(&e);
            }
            self.phase.viewer_play_started = true;
            log::info!("[rtmp] NetStream.Play.Start");
            self.dump_record();
        }

        if is_publish_request {
            if tcp.dst_port != rtmp_port {
                return self.poison("publish request not addressed to the RTMP port");
            }
            let slot = HostSlot {
                port: in_port,
                dl_addr: src_mac,
                nw_addr: ipv4.src,
                tp_port: tcp.src_port,
            };
            if let Err(e) = self.roles.record_broadcaster(slot) {
                return self.poison(&e.to_string());
            }
            self.phase.broadcaster_publish_sent = true;
            log::info!("[rtmp] publish('{}')", self.config.stream_key);
            self.dump_record();
        }

        if message.is_publish_start() {
            if tcp.src_port != rtmp_port {
                return self.poison("publish start not sent from the RTMP port");
            }
            if !self.phase.broadcaster_publish_sent {
                return self.poison("publish start before any publish request");
            }
            if let Err(e) = self.record_service_from(in_port, src_mac, ipv4) {
                return self.poison(&e);
            }
            self.phase.broadcaster_publish_started = true;
            log::info!("[rtmp] NetStream.Publish.Start");
            self.dump_record();
        }

        if message.is_stream_begin() {
            if tcp.src_port != rtmp_port {
                return self.poison("stream begin not sent from the RTMP port");
            }
            if !self.phase.viewer_play_started {
                return self.poison("stream begin before the viewer was ready");
            }
            self.phase.stream_begin_seen = true;
            log::info!("[rtmp] Stream Begin");
        }
    }

    fn record_service_from(
        &mut self,
        in_port: u16,
        src_mac: EtherAddr,
        ipv4: &Ipv4Header,
    ) -> Result<(), String> {
        let slot = ServiceSlot {
            port: in_port,
            dl_addr: src_mac,
            nw_addr: ipv4.src,
        };
        self.roles.record_service(slot).map_err(|e| e.to_string())
    }

    fn dump_record(&self) {
        log::debug!("[rtmp] {}; {}", self.roles, self.phase);
    }
}
