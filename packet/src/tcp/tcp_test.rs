use bytes::BytesMut;

use super::*;

fn sample_header() -> TcpHeader {
    TcpHeader {
        src_port: 42857,
        dst_port: 51000,
        seq: 0x1000_0000,
        ack: 0x2000_0000,
        flags: FLAG_PSH | FLAG_ACK,
        window: 29200,
        ..Default::default()
    }
}

#[test]
fn test_round_trip() -> Result<()> {
    let header = sample_header();
    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    assert_eq!(raw.len(), MIN_HEADER_LEN);

    let mut buf = raw.freeze();
    let decoded = TcpHeader::unmarshal(&mut buf)?;
    assert_eq!(decoded, header);
    Ok(())
}

#[test]
fn test_options_change_data_offset() -> Result<()> {
    let mut header = sample_header();
    header.options = vec![0x02, 0x04, 0x05, 0xb4].into();
    assert_eq!(header.data_offset(), 6);

    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    assert_eq!(raw[12] >> 4, 6);

    let mut buf = raw.freeze();
    let decoded = TcpHeader::unmarshal(&mut buf)?;
    assert_eq!(decoded.options, header.options);
    Ok(())
}

#[test]
fn test_truncated() {
    let header = sample_header();
    let mut raw = BytesMut::new();
    header.marshal_to(&mut raw);
    for k in 0..MIN_HEADER_LEN {
        let mut buf = raw.clone().freeze().slice(..k);
        assert_eq!(TcpHeader::unmarshal(&mut buf), Err(Error::ErrShortTcp));
    }
}

#[test]
fn test_checksum_zeroes_sum() {
    let src = Ipv4Addr::new(10, 0, 0, 3);
    let dst = Ipv4Addr::new(10, 0, 0, 2);
    let payload = b"xxxheartbeatxxx";

    let mut header = sample_header();
    header.update_checksum(src, dst, payload);

    // Verifying a segment: the ones-complement sum over pseudo-header,
    // header, and payload must come out zero.
    let mut raw = Vec::new();
    raw.put_u32(u32::from(src));
    raw.put_u32(u32::from(dst));
    raw.put_u8(0);
    raw.put_u8(PROTOCOL_TCP);
    raw.put_u16((header.header_len() + payload.len()) as u16);
    header.marshal_to(&mut raw);
    raw.put_slice(payload);
    assert_eq!(crate::ipv4::ones_complement_sum(&raw), 0);
}
