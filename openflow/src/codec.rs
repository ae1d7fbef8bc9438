
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Error, Result};
use crate::message::{OfMessage, HEADER_LEN};

/// Length-prefixed framing for OpenFlow messages over a byte stream. The
/// length field in the fixed header covers the header itself, so a frame
/// is complete once `length` bytes have accumulated.
#[derive(Debug, Default)]
pub struct OpenFlowCodec;

impl Decoder for OpenFlowCodec {
    type Item = OfMessage;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<OfMessage>> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }
        let length = usize::from(u16::from_be_bytes([src[2], src[3]]));
        if length < HEADER_LEN {
            return Err(Error::ErrBadMessageLength(length));
        }
        if src.len() < length {
            src.reserve(length - src.len());
            return Ok(None);
        }
        let frame = src.split_to(length).freeze();
        OfMessage::unmarshal(frame).map(Some)
    }
}

impl Encoder<OfMessage> for OpenFlowCodec {
    type Error = Error;

    fn encode(&mut self, item: OfMessage, dst: &mut BytesMut) -> Result<()> {
        let raw = item.marshal()?;
        dst.reserve(raw.len());
        dst.extend_from_slice(&raw);
        Ok(())
    }
}
