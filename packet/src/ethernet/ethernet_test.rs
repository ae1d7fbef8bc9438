use bytes::{Bytes, BytesMut};

use super::*;

#[test]
fn test_ether_addr_display() {
    let addr = EtherAddr([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
    assert_eq!(addr.to_string(), "00:1b:44:11:3a:b7");
}

#[test]
fn test_ether_addr_multicast() {
    assert!(EtherAddr::BROADCAST.is_multicast());
    assert!(EtherAddr([0x01, 0x00, 0x5e, 0x00, 0x00, 0x01]).is_multicast());
    assert!(!EtherAddr([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]).is_multicast());
}

#[test]
fn test_ether_addr_bridge_filtered() {
    assert!(EtherAddr([0x01, 0x80, 0xc2, 0x00, 0x00, 0x00]).is_bridge_filtered());
    assert!(EtherAddr([0x01, 0x80, 0xc2, 0x00, 0x00, 0x0e]).is_bridge_filtered());
    assert!(!EtherAddr([0x01, 0x80, 0xc2, 0x00, 0x00, 0x10]).is_bridge_filtered());
    assert!(!EtherAddr([0x01, 0x80, 0xc2, 0x00, 0x01, 0x00]).is_bridge_filtered());
}

#[test]
fn test_header_round_trip() -> Result<()> {
    let header = EthernetHeader {
        dst: EtherAddr([0x0a; 6]),
        src: EtherAddr([0x0b; 6]),
        ethertype: ETHERTYPE_IPV4,
    };
    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    assert_eq!(raw.len(), HEADER_LEN);

    let mut buf = raw.freeze();
    let decoded = EthernetHeader::unmarshal(&mut buf)?;
    assert_eq!(decoded, header);
    Ok(())
}

#[test]
fn test_header_short_buffer() {
    let mut buf = Bytes::from_static(&[0u8; HEADER_LEN - 1]);
    assert_eq!(
        EthernetHeader::unmarshal(&mut buf),
        Err(Error::ErrShortEthernet)
    );
}
