
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use openflow::message::{FeaturesReply, Message, OfMessage};
use openflow::OpenFlowCodec;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::brain::SwitchBrain;
use crate::config::Config;
use crate::error::Result;

/// One southbound connection to one switch.
///
/// The session is the only writer to its socket, and it handles events to
/// completion in arrival order, so everything the brain emits for a
/// packet-in is on the wire before the next packet-in is read.
pub struct Session<T> {
    framed: Framed<T, OpenFlowCodec>,
    config: Arc<Config>,
    peer: String,
    next_xid: u32,
    brain: Option<SwitchBrain>,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Session<T> {
    pub fn new(io: T, peer: String, config: Arc<Config>) -> Self {
        Session {
            framed: Framed::new(io, OpenFlowCodec::default()),
            config,
            peer,
            next_xid: 0,
            brain: None,
        }
    }

    /// Drive the connection until the switch hangs up or the stream turns
    /// out not to be OpenFlow at all.
    pub async fn run(mut self) -> Result<()> {
        self.send(Message::Hello).await?;

        while let Some(item) = self.framed.next().await {
            let OfMessage { xid, message } = item?;
            match message {
                Message::Hello => {
                    self.send(Message::FeaturesRequest).await?;
                }
                Message::EchoRequest(data) => {
                    self.send_with_xid(xid, Message::EchoReply(data)).await?;
                }
                Message::FeaturesReply(fr) => self.on_features_reply(fr),
                Message::PacketIn(event) => {
                    let effects = match self.brain.as_mut() {
                        Some(brain) => brain.handle_packet_in(&event),
                        None => {
                            log::warn!(
                                "[southbound] {}: packet-in before the features reply",
                                self.peer
                            );
                            continue;
                        }
                    };
                    for message in effects {
                        self.send(message).await?;
                    }
                }
                Message::Error(e) => {
                    // Includes rejected actions; nothing is retried, the
                    // installed rules are not idempotent to replay.
                    log::error!(
                        "[southbound] {}: switch reported error type {} code {} ({} bytes)",
                        self.peer,
                        e.error_type,
                        e.code,
                        e.data.len()
                    );
                }
                Message::PortStatus => {
                    log::debug!("[southbound] {}: port status change", self.peer);
                }
                Message::Unknown { message_type, .. } => {
                    log::debug!(
                        "[southbound] {}: skipping message type {}",
                        self.peer,
                        message_type
                    );
                }
                other => {
                    log::debug!(
                        "[southbound] {}: unexpected {:?} from a switch",
                        self.peer,
                        other.message_type()
                    );
                }
            }
        }

        if let Some(brain) = self.brain.take() {
            log::info!(
                "[southbound] connection down: datapath {:#018x} ({})",
                brain.datapath_id(),
                self.peer
            );
        }
        Ok(())
    }

    fn on_features_reply(&mut self, fr: FeaturesReply) {
        if self.brain.is_some() {
            return;
        }
        if self.config.ignore.contains(&fr.datapath_id) {
            log::info!(
                "[southbound] ignoring datapath {:#018x} ({})",
                fr.datapath_id,
                self.peer
            );
            return;
        }
        log::info!(
            "[southbound] connection up: datapath {:#018x} ({})",
            fr.datapath_id,
            self.peer
        );
        self.brain = Some(SwitchBrain::new(fr.datapath_id, self.config.clone()));
    }

    async fn send(&mut self, message: Message) -> Result<()> {
        self.next_xid = self.next_xid.wrapping_add(1);
        let xid = self.next_xid;
        self.send_with_xid(xid, message).await
    }

    async fn send_with_xid(&mut self, xid: u32, message: Message) -> Result<()> {
        self.framed.send(OfMessage::new(xid, message)).await?;
        Ok(())
    }
}
