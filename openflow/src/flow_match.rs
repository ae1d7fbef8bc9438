#[cfg(test)]
mod flow_match_test;

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut};
use packet::ethernet::ETHERTYPE_IPV4;
use packet::{EtherAddr, Frame};

use crate::error::{Error, Result};

pub const MATCH_LEN: usize = 40;

/// Exact-match value for `dl_vlan` on untagged frames.
pub const VLAN_NONE: u16 = 0xffff;

pub const OFPFW_IN_PORT: u32 = 1 << 0;
pub const OFPFW_DL_VLAN: u32 = 1 << 1;
pub const OFPFW_DL_SRC: u32 = 1 << 2;
pub const OFPFW_DL_DST: u32 = 1 << 3;
pub const OFPFW_DL_TYPE: u32 = 1 << 4;
pub const OFPFW_NW_PROTO: u32 = 1 << 5;
pub const OFPFW_TP_SRC: u32 = 1 << 6;
pub const OFPFW_TP_DST: u32 = 1 << 7;
pub const OFPFW_NW_SRC_SHIFT: u32 = 8;
pub const OFPFW_NW_SRC_ALL: u32 = 32 << OFPFW_NW_SRC_SHIFT;
pub const OFPFW_NW_SRC_MASK: u32 = 0x3f << OFPFW_NW_SRC_SHIFT;
pub const OFPFW_NW_DST_SHIFT: u32 = 14;
pub const OFPFW_NW_DST_ALL: u32 = 32 << OFPFW_NW_DST_SHIFT;
pub const OFPFW_NW_DST_MASK: u32 = 0x3f << OFPFW_NW_DST_SHIFT;
pub const OFPFW_DL_VLAN_PCP: u32 = 1 << 20;
pub const OFPFW_NW_TOS: u32 = 1 << 21;
pub const OFPFW_ALL: u32 = 0x003f_ffff;

/// The 40-byte OpenFlow 1.0 `ofp_match`. `None` fields are wildcarded on
/// the wire; IP prefixes narrower than all-or-nothing are not modeled
/// because the controller only ever installs exact matches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Match {
    pub in_port: Option<u16>,
    pub dl_src: Option<EtherAddr>,
    pub dl_dst: Option<EtherAddr>,
    pub dl_vlan: Option<u16>,
    pub dl_vlan_pcp: Option<u8>,
    pub dl_type: Option<u16>,
    pub nw_tos: Option<u8>,
    pub nw_proto: Option<u8>,
    pub nw_src: Option<Ipv4Addr>,
    pub nw_dst: Option<Ipv4Addr>,
    pub tp_src: Option<u16>,
    pub tp_dst: Option<u16>,
}

impl Match {
    /// Build an exact match covering every header the frame carries.
    /// Layers the frame does not have stay wildcarded. `in_port` of `None`
    /// leaves the ingress port wildcarded (used by the same-port drop
    /// rule).
    pub fn from_frame(frame: &Frame, in_port: Option<u16>) -> Self {
        let mut m = Match {
            in_port,
            dl_src: Some(frame.ethernet.src),
            dl_dst: Some(frame.ethernet.dst),
            dl_vlan: Some(VLAN_NONE),
            dl_vlan_pcp: Some(0),
            dl_type: Some(frame.ethernet.ethertype),
            ..Default::default()
        };
        if let Some(ipv4) = &frame.ipv4 {
            m.nw_tos = Some(ipv4.tos);
            m.nw_proto = Some(ipv4.protocol);
            m.nw_src = Some(ipv4.src);
            m.nw_dst = Some(ipv4.dst);
        }
        if let Some(tcp) = &frame.tcp {
            m.tp_src = Some(tcp.src_port);
            m.tp_dst = Some(tcp.dst_port);
        }
        m
    }

    pub fn wildcards(&self) -> u32 {
        let mut w = 0;
        if self.in_port.is_none() {
            w |= OFPFW_IN_PORT;
        }
        if self.dl_vlan.is_none() {
            w |= OFPFW_DL_VLAN;
        }
        if self.dl_src.is_none() {
            w |= OFPFW_DL_SRC;
        }
        if self.dl_dst.is_none() {
            w |= OFPFW_DL_DST;
        }
        if self.dl_type.is_none() {
            w |= OFPFW_DL_TYPE;
        }
        if self.nw_proto.is_none() {
            w |= OFPFW_NW_PROTO;
        }
        if self.tp_src.is_none() {
            w |= OFPFW_TP_SRC;
        }
        if self.tp_dst.is_none() {
            w |= OFPFW_TP_DST;
        }
        if self.nw_src.is_none() {
            w |= OFPFW_NW_SRC_ALL;
        }
        if self.nw_dst.is_none() {
            w |= OFPFW_NW_DST_ALL;
        }
        if self.dl_vlan_pcp.is_none() {
            w |= OFPFW_DL_VLAN_PCP;
        }
        if self.nw_tos.is_none() {
            w |= OFPFW_NW_TOS;
        }
        w
    }

    pub fn marshal_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.wildcards());
        buf.put_u16(self.in_port.unwrap_or(0));
        buf.put_slice(&self.dl_src.unwrap_or_default().0);
        buf.put_slice(&self.dl_dst.unwrap_or_default().0);
        buf.put_u16(self.dl_vlan.unwrap_or(0));
        buf.put_u8(self.dl_vlan_pcp.unwrap_or(0));
        buf.put_u8(0); // pad
        buf.put_u16(self.dl_type.unwrap_or(0));
        buf.put_u8(self.nw_tos.unwrap_or(0));
        buf.put_u8(self.nw_proto.unwrap_or(0));
        buf.put_u16(0); // pad
        buf.put_u32(self.nw_src.map_or(0, u32::from));
        buf.put_u32(self.nw_dst.map_or(0, u32::from));
        buf.put_u16(self.tp_src.unwrap_or(0));
        buf.put_u16(self.tp_dst.unwrap_or(0));
    }

    pub fn marshal_size(&self) -> usize {
        MATCH_LEN
    }

    pub fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < MATCH_LEN {
            return Err(Error::ErrShortMatch);
        }
        let wildcards = buf.get_u32();
        let in_port = buf.get_u16();
        let mut dl_src = [0u8; 6];
        buf.copy_to_slice(&mut dl_src);
        let mut dl_dst = [0u8; 6];
        buf.copy_to_slice(&mut dl_dst);
        let dl_vlan = buf.get_u16();
        let dl_vlan_pcp = buf.get_u8();
        buf.advance(1);
        let dl_type = buf.get_u16();
        let nw_tos = buf.get_u8();
        let nw_proto = buf.get_u8();
        buf.advance(2);
        let nw_src = buf.get_u32();
        let nw_dst = buf.get_u32();
        let tp_src = buf.get_u16();
        let tp_dst = buf.get_u16();

        let keep = |bit: u32| wildcards & bit == 0;
        Ok(Match {
            in_port: keep(OFPFW_IN_PORT).then(|| in_port),
            dl_src: keep(OFPFW_DL_SRC).then(|| EtherAddr(dl_src)),
            dl_dst: keep(OFPFW_DL_DST).then(|| EtherAddr(dl_dst)),
            dl_vlan: keep(OFPFW_DL_VLAN).then(|| dl_vlan),
            dl_vlan_pcp: keep(OFPFW_DL_VLAN_PCP).then(|| dl_vlan_pcp),
            dl_type: keep(OFPFW_DL_TYPE).then(|| dl_type),
            nw_tos: keep(OFPFW_NW_TOS).then(|| nw_tos),
            nw_proto: keep(OFPFW_NW_PROTO).then(|| nw_proto),
            nw_src: (wildcards & OFPFW_NW_SRC_MASK < OFPFW_NW_SRC_ALL)
                .then(|| Ipv4Addr::from(nw_src)),
            nw_dst: (wildcards & OFPFW_NW_DST_MASK < OFPFW_NW_DST_ALL)
                .then(|| Ipv4Addr::from(nw_dst)),
            tp_src: keep(OFPFW_TP_SRC).then(|| tp_src),
            tp_dst: keep(OFPFW_TP_DST).then(|| tp_dst),
        })
    }

    /// True when the match pins an IPv4/TCP five-tuple (plus ingress),
    /// which is what the heartbeat drop rule relies on.
    pub fn covers_tcp_flow(&self) -> bool {
        self.dl_type == Some(ETHERTYPE_IPV4)
            && self.nw_proto.is_some()
            && self.nw_src.is_some()
            && self.nw_dst.is_some()
            && self.tp_src.is_some()
            && self.tp_dst.is_some()
    }
}
