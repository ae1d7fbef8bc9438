
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Chunk header formats, picked by the top two bits of the basic header.
pub const FMT_FULL: u8 = 0;
pub const FMT_NO_STREAM_ID: u8 = 1;
pub const FMT_TIMESTAMP_ONLY: u8 = 2;
pub const FMT_EMPTY: u8 = 3;

const CSID_EXT_ONE: u32 = 0;
const CSID_EXT_TWO: u32 = 1;
const CSID_EXT_BASE: u32 = 64;
const MAX_U24: u32 = 0x00ff_ffff;

/// One RTMP chunk-framed message lifted out of a TCP payload.
///
/// Decoding never fails: a truncated or inconsistent buffer yields a value
/// with `parsed == false` and whatever fields were recovered before the
/// shortfall. Callers treat unparsed messages as "not RTMP, forward as-is".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkMessage {
    pub format: u8,
    pub chunk_stream_id: u32,
    pub timestamp: Option<u32>,
    pub message_length: Option<usize>,
    pub message_type: Option<u8>,
    pub message_stream_id: Option<u32>,
    pub payload: Bytes,
    pub parsed: bool,
}

impl ChunkMessage {
    /// Decode one message from the front of `content`.
    ///
    /// Returns the message and the remainder: bytes past this message that
    /// may open the next one. The remainder is only ever non-empty for a
    /// parsed message whose payload ran more than one byte past its
    /// declared length.
    pub fn parse(content: Bytes) -> (ChunkMessage, Bytes) {
        let mut msg = ChunkMessage::default();
        let data = &content[..];
        if data.is_empty() {
            return (msg, Bytes::new());
        }

        msg.format = data[0] >> 6;
        let mut pos = 1;
        match u32::from(data[0] & 0x3f) {
            CSID_EXT_ONE => {
                if data.len() < 2 {
                    return (msg, Bytes::new());
                }
                msg.chunk_stream_id = CSID_EXT_BASE + u32::from(data[1]);
                pos = 2;
            }
            CSID_EXT_TWO => {
                if data.len() < 3 {
                    return (msg, Bytes::new());
                }
                msg.chunk_stream_id = CSID_EXT_BASE + (u32::from(data[1]) << 8 | u32::from(data[2]));
                pos = 3;
            }
            csid => msg.chunk_stream_id = csid,
        }

        match msg.format {
            FMT_FULL => {
                if data.len() < pos + 11 {
                    return (msg, Bytes::new());
                }
                msg.timestamp = Some(be24(&data[pos..]));
                msg.message_length = Some(be24(&data[pos + 3..]) as usize);
                msg.message_type = Some(data[pos + 6]);
                // The message stream id is the lone little-endian field.
                msg.message_stream_id = Some(u32::from_le_bytes([
                    data[pos + 7],
                    data[pos + 8],
                    data[pos + 9],
                    data[pos + 10],
                ]));
                pos += 11;
            }
            FMT_NO_STREAM_ID => {
                if data.len() < pos + 7 {
                    return (msg, Bytes::new());
                }
                msg.timestamp = Some(be24(&data[pos..]));
                msg.message_length = Some(be24(&data[pos + 3..]) as usize);
                msg.message_type = Some(data[pos + 6]);
                pos += 7;
            }
            FMT_TIMESTAMP_ONLY => {
                if data.len() < pos + 3 {
                    return (msg, Bytes::new());
                }
                msg.timestamp = Some(be24(&data[pos..]));
                pos += 3;
            }
            _ => {}
        }

        let payload = content.slice(pos..);
        match msg.message_length {
            Some(len) if payload.len() > len + 1 => {
                msg.payload = payload.slice(..len);
                msg.parsed = true;
                (msg, payload.slice(len..))
            }
            Some(len) if payload.len() < len => {
                msg.payload = payload;
                (msg, Bytes::new())
            }
            _ => {
                // Declared length matched (give or take one trailing byte),
                // or no length was declared and the rest is the payload.
                msg.payload = payload;
                msg.parsed = true;
                (msg, Bytes::new())
            }
        }
    }

    /// Encode this message back to wire bytes.
    pub fn marshal(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();

        match self.chunk_stream_id {
            2..=63 => buf.put_u8(self.format << 6 | self.chunk_stream_id as u8),
            64..=319 => {
                buf.put_u8(self.format << 6);
                buf.put_u8((self.chunk_stream_id - CSID_EXT_BASE) as u8);
            }
            320..=65599 => {
                buf.put_u8(self.format << 6 | 1);
                buf.put_u16((self.chunk_stream_id - CSID_EXT_BASE) as u16);
            }
            csid => return Err(Error::ErrCsidOutOfRange(csid)),
        }

        let field = |v: Option<u32>| v.ok_or(Error::ErrMissingHeaderField(self.format));
        match self.format {
            FMT_FULL => {
                put_be24(&mut buf, field(self.timestamp)?)?;
                put_be24(&mut buf, field(self.message_length.map(|l| l as u32))?)?;
                buf.put_u8(self.message_type.ok_or(Error::ErrMissingHeaderField(self.format))?);
                buf.put_u32_le(field(self.message_stream_id)?);
            }
            FMT_NO_STREAM_ID => {
                put_be24(&mut buf, field(self.timestamp)?)?;
                put_be24(&mut buf, field(self.message_length.map(|l| l as u32))?)?;
                buf.put_u8(self.message_type.ok_or(Error::ErrMissingHeaderField(self.format))?);
            }
            FMT_TIMESTAMP_ONLY => {
                put_be24(&mut buf, field(self.timestamp)?)?;
            }
            _ => {}
        }

        if let Some(declared) = self.message_length {
            if declared != self.payload.len() {
                return Err(Error::ErrPayloadLengthMismatch {
                    declared,
                    payload: self.payload.len(),
                });
            }
        }
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }
}

impl fmt::Display for ChunkMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fmt:{} csid:{}", self.format, self.chunk_stream_id)?;
        if let Some(ts) = self.timestamp {
            write!(f, " ts:{ts}")?;
        }
        if let Some(len) = self.message_length {
            write!(f, " len:{len}")?;
        }
        if let Some(t) = self.message_type {
            write!(f, " type:{t:#04x}")?;
        }
        if let Some(msid) = self.message_stream_id {
            write!(f, " msid:{msid}")?;
        }
        write!(f, " payload_len:{}", self.payload.len())?;
        if !self.parsed {
            write!(f, " (unparsed)")?;
        }
        Ok(())
    }
}

/// Drive [`ChunkMessage::parse`] over a whole TCP payload.
///
/// Returns the messages in order and whether every one of them parsed.
/// Parsing stops at the first unparsed message; the caller is expected to
/// forward the original packet untouched in that case.
pub fn parse_payload(mut content: Bytes) -> (Vec<ChunkMessage>, bool) {
    let mut messages = Vec::new();
    while !content.is_empty() {
        let (msg, remainder) = ChunkMessage::parse(content);
        let parsed = msg.parsed;
        messages.push(msg);
        if !parsed {
            return (messages, false);
        }
        content = remainder;
    }
    (messages, true)
}

fn be24(data: &[u8]) -> u32 {
    u32::from(data[0]) << 16 | u32::from(data[1]) << 8 | u32::from(data[2])
}

fn put_be24(buf: &mut BytesMut, value: u32) -> Result<()> {
    if value > MAX_U24 {
        return Err(Error::ErrFieldTooWide(value));
    }
    buf.put_u8((value >> 16) as u8);
    buf.put_u8((value >> 8) as u8);
    buf.put_u8(value as u8);
    Ok(())
}
