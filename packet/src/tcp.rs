#[cfg(test)]
mod tcp_test;

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes};

use crate::error::{Error, Result};
use crate::ipv4::{ones_complement_sum, PROTOCOL_TCP};

pub const MIN_HEADER_LEN: usize = 20;

pub const FLAG_FIN: u8 = 0x01;
pub const FLAG_SYN: u8 = 0x02;
pub const FLAG_RST: u8 = 0x04;
pub const FLAG_PSH: u8 = 0x08;
pub const FLAG_ACK: u8 = 0x10;
pub const FLAG_URG: u8 = 0x20;

/// A TCP header including options. The data offset is derived from the
/// options length on marshal, so mutating `options` keeps the header
/// consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: u8,
    pub window: u16,
    pub checksum: u16,
    pub urgent: u16,
    pub options: Bytes,
}

impl Default for TcpHeader {
    fn default() -> Self {
        TcpHeader {
            src_port: 0,
            dst_port: 0,
            seq: 0,
            ack: 0,
            flags: 0,
            window: 0,
            checksum: 0,
            urgent: 0,
            options: Bytes::new(),
        }
    }
}

impl TcpHeader {
    pub fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < MIN_HEADER_LEN {
            return Err(Error::ErrShortTcp);
        }
        let src_port = buf.get_u16();
        let dst_port = buf.get_u16();
        let seq = buf.get_u32();
        let ack = buf.get_u32();
        let data_offset = buf.get_u8() >> 4;
        if data_offset < 5 {
            return Err(Error::ErrBadTcpOffset);
        }
        let flags = buf.get_u8();
        let window = buf.get_u16();
        let checksum = buf.get_u16();
        let urgent = buf.get_u16();
        let options_len = (data_offset as usize) * 4 - MIN_HEADER_LEN;
        if buf.remaining() < options_len {
            return Err(Error::ErrShortTcp);
        }
        let options = buf.copy_to_bytes(options_len);
        Ok(TcpHeader {
            src_port,
            dst_port,
            seq,
            ack,
            flags,
            window,
            checksum,
            urgent,
            options,
        })
    }

    pub fn marshal_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.src_port);
        buf.put_u16(self.dst_port);
        buf.put_u32(self.seq);
        buf.put_u32(self.ack);
        buf.put_u8((self.data_offset() as u8) << 4);
        buf.put_u8(self.flags);
        buf.put_u16(self.window);
        buf.put_u16(self.checksum);
        buf.put_u16(self.urgent);
        buf.put_slice(&self.options);
    }

    /// Header length in 32-bit words, recomputed from the options length.
    pub fn data_offset(&self) -> usize {
        (MIN_HEADER_LEN + self.options.len()) / 4
    }

    pub fn header_len(&self) -> usize {
        MIN_HEADER_LEN + self.options.len()
    }

    pub fn marshal_size(&self) -> usize {
        self.header_len()
    }

    /// Recompute the checksum over the IPv4 pseudo-header, this header,
    /// and `payload`.
    pub fn update_checksum(&mut self, src: Ipv4Addr, dst: Ipv4Addr, payload: &[u8]) {
        self.checksum = 0;
        let segment_len = self.header_len() + payload.len();
        let mut raw = Vec::with_capacity(12 + segment_len);
        raw.put_u32(u32::from(src));
        raw.put_u32(u32::from(dst));
        raw.put_u8(0);
        raw.put_u8(PROTOCOL_TCP);
        raw.put_u16(segment_len as u16);
        self.marshal_to(&mut raw);
        raw.put_slice(payload);
        self.checksum = ones_complement_sum(&raw);
    }
}
