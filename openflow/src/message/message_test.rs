use super::*;
use crate::action::PORT_FLOOD;

#[test]
fn test_hello_round_trip() -> Result<()> {
    let msg = OfMessage::new(1, Message::Hello);
    let raw = msg.marshal()?;
    assert_eq!(&raw[..], &[0x01, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(OfMessage::unmarshal(raw)?, msg);
    Ok(())
}

#[test]
fn test_echo_round_trip() -> Result<()> {
    let msg = OfMessage::new(7, Message::EchoRequest(Bytes::from_static(b"ping")));
    let decoded = OfMessage::unmarshal(msg.marshal()?)?;
    assert_eq!(decoded, msg);

    let reply = OfMessage::new(7, Message::EchoReply(Bytes::from_static(b"ping")));
    assert_eq!(OfMessage::unmarshal(reply.marshal()?)?, reply);
    Ok(())
}

#[test]
fn test_features_reply_round_trip() -> Result<()> {
    let msg = OfMessage::new(
        2,
        Message::FeaturesReply(FeaturesReply {
            datapath_id: 0x0000_0000_0000_0042,
            n_buffers: 256,
            n_tables: 1,
            capabilities: 0xc7,
            actions: 0xfff,
            ports: Bytes::from_static(&[0u8; 48]),
        }),
    );
    let decoded = OfMessage::unmarshal(msg.marshal()?)?;
    assert_eq!(decoded, msg);
    Ok(())
}

#[test]
fn test_packet_in_round_trip() -> Result<()> {
    let msg = OfMessage::new(
        3,
        Message::PacketIn(PacketIn {
            buffer_id: NO_BUFFER,
            total_len: 4,
            in_port: 2,
            reason: OFPR_NO_MATCH,
            data: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        }),
    );
    let decoded = OfMessage::unmarshal(msg.marshal()?)?;
    assert_eq!(decoded, msg);
    Ok(())
}

#[test]
fn test_packet_out_round_trip() -> Result<()> {
    let msg = OfMessage::new(
        4,
        Message::PacketOut(PacketOut {
            buffer_id: NO_BUFFER,
            in_port: 2,
            actions: vec![Action::output(PORT_FLOOD)],
            data: Bytes::from_static(&[0xca, 0xfe]),
        }),
    );
    let raw = msg.marshal()?;
    // header + buffer_id/in_port/actions_len + one action + data
    assert_eq!(raw.len(), 8 + 8 + 8 + 2);
    assert_eq!(OfMessage::unmarshal(raw)?, msg);
    Ok(())
}

#[test]
fn test_flow_mod_round_trip() -> Result<()> {
    let msg = OfMessage::new(
        5,
        Message::FlowMod(FlowMod {
            idle_timeout: 10,
            hard_timeout: 30,
            actions: vec![Action::output(4)],
            ..Default::default()
        }),
    );
    let raw = msg.marshal()?;
    assert_eq!(raw.len(), 8 + 40 + 24 + 8);
    assert_eq!(OfMessage::unmarshal(raw)?, msg);
    Ok(())
}

#[test]
fn test_drop_flow_mod_has_no_actions() -> Result<()> {
    let msg = OfMessage::new(6, Message::FlowMod(FlowMod::default()));
    let raw = msg.marshal()?;
    assert_eq!(raw.len(), 8 + 40 + 24);

    if let Message::FlowMod(fm) = OfMessage::unmarshal(raw)?.message {
        assert!(fm.actions.is_empty());
        assert_eq!(fm.buffer_id, NO_BUFFER);
    } else {
        panic!("expected a flow mod");
    }
    Ok(())
}

#[test]
fn test_unknown_type_passes_through() -> Result<()> {
    let msg = OfMessage::new(
        8,
        Message::Unknown {
            message_type: OFPT_GET_CONFIG_REPLY,
            body: Bytes::from_static(&[1, 2, 3, 4]),
        },
    );
    assert_eq!(OfMessage::unmarshal(msg.marshal()?)?, msg);
    Ok(())
}

#[test]
fn test_foreign_version_decodes_as_unknown() -> Result<()> {
    // An OpenFlow 1.3 packet-in must not be parsed with the 1.0 layout.
    let mut raw = OfMessage::new(9, Message::PacketIn(PacketIn {
        buffer_id: NO_BUFFER,
        total_len: 0,
        in_port: 1,
        reason: OFPR_NO_MATCH,
        data: Bytes::new(),
    }))
    .marshal()?
    .to_vec();
    raw[0] = 0x04;

    let decoded = OfMessage::unmarshal(Bytes::from(raw))?;
    assert!(matches!(
        decoded.message,
        Message::Unknown {
            message_type: OFPT_PACKET_IN,
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_truncated_body() {
    let raw = Bytes::from_static(&[0x01, OFPT_PACKET_IN, 0x00, 0x0c, 0, 0, 0, 1, 0, 0, 0, 0]);
    assert_eq!(
        OfMessage::unmarshal(raw),
        Err(Error::ErrTruncatedBody(OFPT_PACKET_IN))
    );
}
