use bytes::BytesMut;
use packet::ethernet::EthernetHeader;
use packet::ipv4::{Ipv4Header, PROTOCOL_TCP};
use packet::tcp::TcpHeader;

use super::*;

fn tcp_frame() -> Frame {
    Frame {
        ethernet: EthernetHeader {
            dst: EtherAddr([0x02, 0, 0, 0, 0, 0x01]),
            src: EtherAddr([0x02, 0, 0, 0, 0, 0x02]),
            ethertype: ETHERTYPE_IPV4,
        },
        ipv4: Some(Ipv4Header {
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 2),
            dst: Ipv4Addr::new(10, 0, 0, 1),
            ..Default::default()
        }),
        tcp: Some(TcpHeader {
            src_port: 52000,
            dst_port: 1935,
            ..Default::default()
        }),
        payload: bytes::Bytes::new(),
    }
}

#[test]
fn test_from_frame_exact() {
    let m = Match::from_frame(&tcp_frame(), Some(3));
    assert_eq!(m.in_port, Some(3));
    assert_eq!(m.dl_type, Some(ETHERTYPE_IPV4));
    assert_eq!(m.dl_vlan, Some(VLAN_NONE));
    assert_eq!(m.nw_proto, Some(PROTOCOL_TCP));
    assert_eq!(m.nw_src, Some(Ipv4Addr::new(10, 0, 0, 2)));
    assert_eq!(m.nw_dst, Some(Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(m.tp_src, Some(52000));
    assert_eq!(m.tp_dst, Some(1935));
    assert_eq!(m.wildcards(), 0);
    assert!(m.covers_tcp_flow());
}

#[test]
fn test_from_frame_without_port_wildcards_ingress() {
    let m = Match::from_frame(&tcp_frame(), None);
    assert_eq!(m.in_port, None);
    assert_eq!(m.wildcards(), OFPFW_IN_PORT);
}

#[test]
fn test_from_frame_non_ip() {
    let mut frame = tcp_frame();
    frame.ethernet.ethertype = 0x0806;
    frame.ipv4 = None;
    frame.tcp = None;

    let m = Match::from_frame(&frame, Some(1));
    assert_eq!(m.nw_src, None);
    assert_eq!(m.tp_src, None);
    assert!(!m.covers_tcp_flow());
    let w = m.wildcards();
    assert_ne!(w & OFPFW_NW_SRC_MASK, 0);
    assert_ne!(w & OFPFW_TP_SRC, 0);
    assert_ne!(w & OFPFW_NW_TOS, 0);
}

#[test]
fn test_round_trip() -> Result<()> {
    let m = Match::from_frame(&tcp_frame(), Some(7));
    let mut raw = BytesMut::new();
    m.marshal_to(&mut raw);
    assert_eq!(raw.len(), MATCH_LEN);

    let mut buf = raw.freeze();
    assert_eq!(Match::unmarshal(&mut buf)?, m);
    Ok(())
}

#[test]
fn test_round_trip_all_wildcards() -> Result<()> {
    let m = Match::default();
    let w = m.wildcards();
    assert_eq!(w & 0xff, 0xff);
    assert!(w & OFPFW_NW_SRC_MASK >= OFPFW_NW_SRC_ALL);
    assert!(w & OFPFW_NW_DST_MASK >= OFPFW_NW_DST_ALL);
    assert_ne!(w & OFPFW_DL_VLAN_PCP, 0);
    assert_ne!(w & OFPFW_NW_TOS, 0);

    let mut raw = BytesMut::new();
    m.marshal_to(&mut raw);
    let mut buf = raw.freeze();
    assert_eq!(Match::unmarshal(&mut buf)?, m);
    Ok(())
}

#[test]
fn test_short_buffer() {
    let mut buf = bytes::Bytes::from_static(&[0u8; MATCH_LEN - 1]);
    assert_eq!(Match::unmarshal(&mut buf), Err(Error::ErrShortMatch));
}
