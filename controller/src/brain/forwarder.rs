
use openflow::action::{Action, PORT_FLOOD};
use openflow::flow_match::Match;
use openflow::message::{FlowMod, Message, PacketIn, NO_BUFFER};
use packet::ethernet::ETHERTYPE_LLDP;
use packet::Frame;

use crate::config::{DROP_RULE_TIMEOUTS, FORWARD_RULE_TIMEOUTS};

use super::SwitchBrain;

impl SwitchBrain {
    /// The classic learning-switch algorithm, used for all traffic in
    /// direct mode. Flow entries carry timeouts so the table stays small
    /// and wrong guesses age out.
    pub(crate) fn forward_learning(
        &mut self,
        event: &PacketIn,
        frame: &Frame,
        out: &mut Vec<Message>,
    ) {
        let dst = frame.ethernet.dst;
        if !self.config.transparent
            && (frame.ethernet.ethertype == ETHERTYPE_LLDP || dst.is_bridge_filtered())
        {
            self.drop_packet(event, out);
            return;
        }
        if dst.is_multicast() {
            self.flood(event, out);
            return;
        }
        let port = match self.mac_table.lookup(&dst) {
            Some(port) => port,
            None => {
                self.flood(event, out);
                return;
            }
        };
        if port == event.in_port {
            log::warn!(
                "[l2] same port for {} -> {} on {:#018x}.{}, dropping for a while",
                frame.ethernet.src,
                dst,
                self.datapath_id,
                port
            );
            let (idle_timeout, hard_timeout) = DROP_RULE_TIMEOUTS;
            out.push(Message::FlowMod(FlowMod {
                // No ingress port in the match: similar packets from any
                // port are held back, as the lineage switch does.
                flow_match: Match::from_frame(frame, None),
                idle_timeout,
                hard_timeout,
                buffer_id: event.buffer_id,
                ..Default::default()
            }));
            return;
        }

        log::debug!(
            "[l2] installing flow for {}.{} -> {}.{}",
            frame.ethernet.src,
            event.in_port,
            dst,
            port
        );
        let (idle_timeout, hard_timeout) = FORWARD_RULE_TIMEOUTS;
        out.push(Message::FlowMod(FlowMod {
            flow_match: Match::from_frame(frame, Some(event.in_port)),
            idle_timeout,
            hard_timeout,
            buffer_id: event.buffer_id,
            actions: vec![Action::output(port)],
            ..Default::default()
        }));
        if event.buffer_id == NO_BUFFER {
            // The switch did not buffer the packet, so the flow mod alone
            // would lose it; re-emit it explicitly.
            out.push(Message::PacketOut(
                self.packet_out(event, vec![Action::output(port)]),
            ));
        }
    }

    /// The forwarder used around an active bypass experiment: permanent
    /// flow entries (the steered stream must outlive any timeout), the
    /// triggering packet always re-emitted in the same send, and no
    /// link-local or multicast suppression.
    pub(crate) fn forward_bypass(
        &mut self,
        event: &PacketIn,
        frame: &Frame,
        out: &mut Vec<Message>,
    ) {
        let dst = frame.ethernet.dst;
        let port = match self.mac_table.lookup(&dst) {
            Some(port) => port,
            None => {
                self.flood(event, out);
                return;
            }
        };
        if port == event.in_port {
            log::warn!(
                "[l2] same port for {} -> {} on {:#018x}.{}, dropping",
                frame.ethernet.src,
                dst,
                self.datapath_id,
                port
            );
            return;
        }

        log::debug!(
            "[l2] installing flow for {}.{} -> {}.{}",
            frame.ethernet.src,
            event.in_port,
            dst,
            port
        );
        out.push(Message::FlowMod(FlowMod {
            flow_match: Match::from_frame(frame, Some(event.in_port)),
            actions: vec![Action::output(port)],
            ..Default::default()
        }));
        out.push(Message::PacketOut(
            self.packet_out(event, vec![Action::output(port)]),
        ));
    }

    pub(crate) fn flood(&self, event: &PacketIn, out: &mut Vec<Message>) {
        out.push(Message::PacketOut(
            self.packet_out(event, vec![Action::output(PORT_FLOOD)]),
        ));
    }

    /// Drop just this packet: release the switch buffer with no actions,
    /// or do nothing at all when the packet was never buffered.
    pub(crate) fn drop_packet(&self, event: &PacketIn, out: &mut Vec<Message>) {
        if event.buffer_id != NO_BUFFER {
            out.push(Message::PacketOut(self.packet_out(event, Vec::new())));
        }
    }
}
