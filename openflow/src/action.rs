
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

pub const OFPAT_OUTPUT: u16 = 0;
const OUTPUT_ACTION_LEN: u16 = 8;

/// Reserved output ports.
pub const PORT_IN_PORT: u16 = 0xfff8;
pub const PORT_TABLE: u16 = 0xfff9;
pub const PORT_NORMAL: u16 = 0xfffa;
pub const PORT_FLOOD: u16 = 0xfffb;
pub const PORT_ALL: u16 = 0xfffc;
pub const PORT_CONTROLLER: u16 = 0xfffd;
pub const PORT_LOCAL: u16 = 0xfffe;
pub const PORT_NONE: u16 = 0xffff;

/// The one action family this controller emits. The header-rewrite actions
/// of the abandoned flow-steering design are deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Output { port: u16, max_len: u16 },
}

impl Action {
    pub fn output(port: u16) -> Self {
        Action::Output { port, max_len: 0 }
    }

    pub fn marshal_to<B: BufMut>(&self, buf: &mut B) {
        match self {
            Action::Output { port, max_len } => {
                buf.put_u16(OFPAT_OUTPUT);
                buf.put_u16(OUTPUT_ACTION_LEN);
                buf.put_u16(*port);
                buf.put_u16(*max_len);
            }
        }
    }

    pub fn marshal_size(&self) -> usize {
        match self {
            Action::Output { .. } => OUTPUT_ACTION_LEN as usize,
        }
    }

    pub fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < 4 {
            return Err(Error::ErrShortAction);
        }
        let action_type = buf.get_u16();
        let len = buf.get_u16();
        if len < 8 || len % 8 != 0 {
            return Err(Error::ErrBadActionLength(len));
        }
        if buf.remaining() < len as usize - 4 {
            return Err(Error::ErrShortAction);
        }
        match action_type {
            OFPAT_OUTPUT => {
                let port = buf.get_u16();
                let max_len = buf.get_u16();
                Ok(Action::Output { port, max_len })
            }
            other => Err(Error::ErrUnsupportedAction(other)),
        }
    }
}

pub(crate) fn marshal_actions(actions: &[Action]) -> Bytes {
    let mut buf = BytesMut::with_capacity(actions.iter().map(Action::marshal_size).sum());
    for action in actions {
        action.marshal_to(&mut buf);
    }
    buf.freeze()
}

pub(crate) fn unmarshal_actions(mut raw: Bytes) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    while raw.has_remaining() {
        actions.push(Action::unmarshal(&mut raw)?);
    }
    Ok(actions)
}
