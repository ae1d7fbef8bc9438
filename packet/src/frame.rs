
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::ethernet::{EthernetHeader, ETHERTYPE_IPV4};
use crate::ipv4::{Ipv4Header, PROTOCOL_TCP};
use crate::tcp::TcpHeader;

/// A parsed Ethernet frame, optionally carrying IPv4 and TCP.
///
/// `payload` is the innermost payload: the TCP payload when `tcp` is set,
/// the IPv4 payload when only `ipv4` is set, the Ethernet payload otherwise.
/// Frames whose inner layers are truncated or unrecognized still parse at
/// the outer level, so link-layer handling keeps working on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub ethernet: EthernetHeader,
    pub ipv4: Option<Ipv4Header>,
    pub tcp: Option<TcpHeader>,
    pub payload: Bytes,
}

impl Frame {
    pub fn parse(raw: Bytes) -> Result<Self> {
        let mut buf = raw.clone();
        let ethernet = EthernetHeader::unmarshal(&mut buf)?;
        let mut frame = Frame {
            ethernet,
            ipv4: None,
            tcp: None,
            payload: buf.clone(),
        };
        if ethernet.ethertype != ETHERTYPE_IPV4 {
            return Ok(frame);
        }

        let ipv4 = match Ipv4Header::unmarshal(&mut buf) {
            Ok(h) => h,
            Err(_) => return Ok(frame),
        };
        // Trim Ethernet trailer padding using the IP total length.
        let ip_payload_len = (ipv4.total_len as usize)
            .saturating_sub(ipv4.header_len())
            .min(buf.len());
        let mut ip_payload = buf.slice(..ip_payload_len);
        frame.payload = ip_payload.clone();
        let is_tcp = ipv4.protocol == PROTOCOL_TCP && ipv4.flags_fragment & 0x1fff == 0;
        frame.ipv4 = Some(ipv4);
        if !is_tcp {
            return Ok(frame);
        }

        let tcp = match TcpHeader::unmarshal(&mut ip_payload) {
            Ok(h) => h,
            Err(_) => return Ok(frame),
        };
        frame.tcp = Some(tcp);
        frame.payload = ip_payload;
        Ok(frame)
    }

    /// The TCP payload, or `None` when the frame carries no TCP segment.
    pub fn tcp_payload(&self) -> Option<&Bytes> {
        self.tcp.as_ref().map(|_| &self.payload)
    }

    /// Replace the TCP payload and fix up the IPv4 total length, the IPv4
    /// header checksum, and the TCP checksum.
    pub fn set_tcp_payload(&mut self, payload: Bytes) -> Result<()> {
        let ipv4 = self.ipv4.as_mut().ok_or(Error::ErrNotTcp)?;
        let tcp = self.tcp.as_mut().ok_or(Error::ErrNotTcp)?;
        ipv4.total_len = (ipv4.header_len() + tcp.header_len() + payload.len()) as u16;
        ipv4.update_checksum();
        tcp.update_checksum(ipv4.src, ipv4.dst, &payload);
        self.payload = payload;
        Ok(())
    }

    pub fn marshal(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.ethernet.marshal_to(&mut buf);
        if let Some(ipv4) = &self.ipv4 {
            ipv4.marshal_to(&mut buf);
        }
        if let Some(tcp) = &self.tcp {
            tcp.marshal_to(&mut buf);
        }
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    pub fn marshal_size(&self) -> usize {
        self.ethernet.marshal_size()
            + self.ipv4.as_ref().map_or(0, |h| h.marshal_size())
            + self.tcp.as_ref().map_or(0, |h| h.marshal_size())
            + self.payload.len()
    }
}
