#[cfg(test)]
mod message_test;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::action::{marshal_actions, unmarshal_actions, Action, PORT_NONE};
use crate::error::{Error, Result};
use crate::flow_match::Match;

pub const OFP_VERSION: u8 = 0x01;
pub const HEADER_LEN: usize = 8;

/// Sentinel buffer id: the packet bytes ride in the message itself.
pub const NO_BUFFER: u32 = 0xffff_ffff;

pub const OFPT_HELLO: u8 = 0;
pub const OFPT_ERROR: u8 = 1;
pub const OFPT_ECHO_REQUEST: u8 = 2;
pub const OFPT_ECHO_REPLY: u8 = 3;
pub const OFPT_VENDOR: u8 = 4;
pub const OFPT_FEATURES_REQUEST: u8 = 5;
pub const OFPT_FEATURES_REPLY: u8 = 6;
pub const OFPT_GET_CONFIG_REQUEST: u8 = 7;
pub const OFPT_GET_CONFIG_REPLY: u8 = 8;
pub const OFPT_SET_CONFIG: u8 = 9;
pub const OFPT_PACKET_IN: u8 = 10;
pub const OFPT_FLOW_REMOVED: u8 = 11;
pub const OFPT_PORT_STATUS: u8 = 12;
pub const OFPT_PACKET_OUT: u8 = 13;
pub const OFPT_FLOW_MOD: u8 = 14;

/// Flow-mod commands.
pub const OFPFC_ADD: u16 = 0;
pub const OFPFC_DELETE: u16 = 3;

/// Packet-in reasons.
pub const OFPR_NO_MATCH: u8 = 0;
pub const OFPR_ACTION: u8 = 1;

pub const DEFAULT_PRIORITY: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub message_type: u8,
    pub length: u16,
    pub xid: u32,
}

impl Header {
    pub fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < HEADER_LEN {
            return Err(Error::ErrShortHeader);
        }
        Ok(Header {
            version: buf.get_u8(),
            message_type: buf.get_u8(),
            length: buf.get_u16(),
            xid: buf.get_u32(),
        })
    }

    pub fn marshal_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.version);
        buf.put_u8(self.message_type);
        buf.put_u16(self.length);
        buf.put_u32(self.xid);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub error_type: u16,
    pub code: u16,
    pub data: Bytes,
}

/// The slice of `ofp_switch_features` the controller cares about. Port
/// descriptions are kept raw; nothing downstream reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesReply {
    pub datapath_id: u64,
    pub n_buffers: u32,
    pub n_tables: u8,
    pub capabilities: u32,
    pub actions: u32,
    pub ports: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub buffer_id: u32,
    pub total_len: u16,
    pub in_port: u16,
    pub reason: u8,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    pub buffer_id: u32,
    pub in_port: u16,
    pub actions: Vec<Action>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub flow_match: Match,
    pub cookie: u64,
    pub command: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: u32,
    pub out_port: u16,
    pub flags: u16,
    pub actions: Vec<Action>,
}

impl Default for FlowMod {
    fn default() -> Self {
        FlowMod {
            flow_match: Match::default(),
            cookie: 0,
            command: OFPFC_ADD,
            idle_timeout: 0,
            hard_timeout: 0,
            priority: DEFAULT_PRIORITY,
            buffer_id: NO_BUFFER,
            out_port: PORT_NONE,
            flags: 0,
            actions: Vec::new(),
        }
    }
}

/// One decoded OpenFlow message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello,
    Error(ErrorMsg),
    EchoRequest(Bytes),
    EchoReply(Bytes),
    FeaturesRequest,
    FeaturesReply(FeaturesReply),
    PacketIn(PacketIn),
    PacketOut(PacketOut),
    FlowMod(FlowMod),
    PortStatus,
    /// Anything this controller does not interpret, kept for logging.
    Unknown { message_type: u8, body: Bytes },
}

impl Message {
    pub fn message_type(&self) -> u8 {
        match self {
            Message::Hello => OFPT_HELLO,
            Message::Error(_) => OFPT_ERROR,
            Message::EchoRequest(_) => OFPT_ECHO_REQUEST,
            Message::EchoReply(_) => OFPT_ECHO_REPLY,
            Message::FeaturesRequest => OFPT_FEATURES_REQUEST,
            Message::FeaturesReply(_) => OFPT_FEATURES_REPLY,
            Message::PacketIn(_) => OFPT_PACKET_IN,
            Message::PacketOut(_) => OFPT_PACKET_OUT,
            Message::FlowMod(_) => OFPT_FLOW_MOD,
            Message::PortStatus => OFPT_PORT_STATUS,
            Message::Unknown { message_type, .. } => *message_type,
        }
    }
}

/// A message paired with its transaction id, the unit the codec moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfMessage {
    pub xid: u32,
    pub message: Message,
}

impl OfMessage {
    pub fn new(xid: u32, message: Message) -> Self {
        OfMessage { xid, message }
    }

    pub fn marshal(&self) -> Result<Bytes> {
        let mut body = BytesMut::new();
        match &self.message {
            Message::Hello | Message::FeaturesRequest | Message::PortStatus => {}
            Message::Error(e) => {
                body.put_u16(e.error_type);
                body.put_u16(e.code);
                body.put_slice(&e.data);
            }
            Message::EchoRequest(data) | Message::EchoReply(data) => {
                body.put_slice(data);
            }
            Message::FeaturesReply(fr) => {
                body.put_u64(fr.datapath_id);
                body.put_u32(fr.n_buffers);
                body.put_u8(fr.n_tables);
                body.put_slice(&[0u8; 3]);
                body.put_u32(fr.capabilities);
                body.put_u32(fr.actions);
                body.put_slice(&fr.ports);
            }
            Message::PacketIn(pi) => {
                body.put_u32(pi.buffer_id);
                body.put_u16(pi.total_len);
                body.put_u16(pi.in_port);
                body.put_u8(pi.reason);
                body.put_u8(0);
                body.put_slice(&pi.data);
            }
            Message::PacketOut(po) => {
                let actions = marshal_actions(&po.actions);
                body.put_u32(po.buffer_id);
                body.put_u16(po.in_port);
                body.put_u16(actions.len() as u16);
                body.put_slice(&actions);
                body.put_slice(&po.data);
            }
            Message::FlowMod(fm) => {
                fm.flow_match.marshal_to(&mut body);
                body.put_u64(fm.cookie);
                body.put_u16(fm.command);
                body.put_u16(fm.idle_timeout);
                body.put_u16(fm.hard_timeout);
                body.put_u16(fm.priority);
                body.put_u32(fm.buffer_id);
                body.put_u16(fm.out_port);
                body.put_u16(fm.flags);
                body.put_slice(&marshal_actions(&fm.actions));
            }
            Message::Unknown { body: raw, .. } => {
                body.put_slice(raw);
            }
        }

        let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
        Header {
            version: OFP_VERSION,
            message_type: self.message.message_type(),
            length: (HEADER_LEN + body.len()) as u16,
            xid: self.xid,
        }
        .marshal_to(&mut buf);
        buf.put_slice(&body);
        Ok(buf.freeze())
    }

    /// Decode one complete framed message (header included). The codec
    /// guarantees `raw` holds exactly the bytes the length field declared.
    pub fn unmarshal(mut raw: Bytes) -> Result<Self> {
        let header = Header::unmarshal(&mut raw)?;
        let xid = header.xid;
        let message_type = header.message_type;

        // A switch speaking a newer protocol revision still opens with a
        // HELLO whose header we can read; anything else from it is opaque.
        if header.version != OFP_VERSION && message_type != OFPT_HELLO {
            return Ok(OfMessage::new(
                xid,
                Message::Unknown { message_type, body: raw },
            ));
        }

        let message = match message_type {
            OFPT_HELLO => Message::Hello,
            OFPT_ERROR => {
                if raw.remaining() < 4 {
                    return Err(Error::ErrTruncatedBody(message_type));
                }
                Message::Error(ErrorMsg {
                    error_type: raw.get_u16(),
                    code: raw.get_u16(),
                    data: raw,
                })
            }
            OFPT_ECHO_REQUEST => Message::EchoRequest(raw),
            OFPT_ECHO_REPLY => Message::EchoReply(raw),
            OFPT_FEATURES_REQUEST => Message::FeaturesRequest,
            OFPT_FEATURES_REPLY => {
                if raw.remaining() < 24 {
                    return Err(Error::ErrTruncatedBody(message_type));
                }
                let datapath_id = raw.get_u64();
                let n_buffers = raw.get_u32();
                let n_tables = raw.get_u8();
                raw.advance(3);
                let capabilities = raw.get_u32();
                let actions = raw.get_u32();
                Message::FeaturesReply(FeaturesReply {
                    datapath_id,
                    n_buffers,
                    n_tables,
                    capabilities,
                    actions,
                    ports: raw,
                })
            }
            OFPT_PACKET_IN => {
                if raw.remaining() < 10 {
                    return Err(Error::ErrTruncatedBody(message_type));
                }
                let buffer_id = raw.get_u32();
                let total_len = raw.get_u16();
                let in_port = raw.get_u16();
                let reason = raw.get_u8();
                raw.advance(1);
                Message::PacketIn(PacketIn {
                    buffer_id,
                    total_len,
                    in_port,
                    reason,
                    data: raw,
                })
            }
            OFPT_PACKET_OUT => {
                if raw.remaining() < 8 {
                    return Err(Error::ErrTruncatedBody(message_type));
                }
                let buffer_id = raw.get_u32();
                let in_port = raw.get_u16();
                let actions_len = raw.get_u16() as usize;
                if raw.remaining() < actions_len {
                    return Err(Error::ErrTruncatedBody(message_type));
                }
                let actions = unmarshal_actions(raw.split_to(actions_len))?;
                Message::PacketOut(PacketOut {
                    buffer_id,
                    in_port,
                    actions,
                    data: raw,
                })
            }
            OFPT_FLOW_MOD => {
                let flow_match = Match::unmarshal(&mut raw)?;
                if raw.remaining() < 24 {
                    return Err(Error::ErrTruncatedBody(message_type));
                }
                let cookie = raw.get_u64();
                let command = raw.get_u16();
                let idle_timeout = raw.get_u16();
                let hard_timeout = raw.get_u16();
                let priority = raw.get_u16();
                let buffer_id = raw.get_u32();
                let out_port = raw.get_u16();
                let flags = raw.get_u16();
                let actions = unmarshal_actions(raw)?;
                Message::FlowMod(FlowMod {
                    flow_match,
                    cookie,
                    command,
                    idle_timeout,
                    hard_timeout,
                    priority,
                    buffer_id,
                    out_port,
                    flags,
                    actions,
                })
            }
            OFPT_PORT_STATUS => Message::PortStatus,
            other => Message::Unknown {
                message_type: other,
                body: raw,
            },
        };
        Ok(OfMessage::new(xid, message))
    }
}
