use bytes::BytesMut;

use super::*;

fn sample_header() -> Ipv4Header {
    Ipv4Header {
        total_len: 40,
        identification: 0x1c46,
        flags_fragment: 0x4000,
        ttl: 64,
        protocol: PROTOCOL_TCP,
        src: Ipv4Addr::new(10, 0, 0, 1),
        dst: Ipv4Addr::new(10, 0, 0, 2),
        ..Default::default()
    }
}

#[test]
fn test_round_trip() -> Result<()> {
    let mut header = sample_header();
    header.update_checksum();

    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    assert_eq!(raw.len(), MIN_HEADER_LEN);

    let mut buf = raw.freeze();
    let decoded = Ipv4Header::unmarshal(&mut buf)?;
    assert_eq!(decoded, header);
    Ok(())
}

#[test]
fn test_checksum_known_value() {
    // Example header from RFC 1071 discussions: checksum must make the
    // ones-complement sum of the header zero.
    let mut header = sample_header();
    header.update_checksum();

    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    assert_eq!(ones_complement_sum(&raw), 0);
}

#[test]
fn test_truncated() {
    let mut header = sample_header();
    header.update_checksum();
    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);

    for k in 0..MIN_HEADER_LEN {
        let mut buf = raw.clone().freeze().slice(..k);
        assert!(Ipv4Header::unmarshal(&mut buf).is_err(), "len {}", k);
    }
}

#[test]
fn test_rejects_non_ipv4() {
    let mut header = sample_header();
    header.update_checksum();
    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    raw[0] = 0x60 | 0x05; // version 6
    let mut buf = raw.freeze();
    assert_eq!(Ipv4Header::unmarshal(&mut buf), Err(Error::ErrBadIpv4Ihl));
}

#[test]
fn test_options_round_trip() -> Result<()> {
    let mut header = sample_header();
    header.ihl = 6;
    header.total_len = 44;
    header.options = vec![0x01, 0x01, 0x01, 0x00].into();
    header.update_checksum();

    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    assert_eq!(raw.len(), 24);

    let mut buf = raw.freeze();
    let decoded = Ipv4Header::unmarshal(&mut buf)?;
    assert_eq!(decoded.options, header.options);
    assert_eq!(decoded.header_len(), 24);
    Ok(())
}
