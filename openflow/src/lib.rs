#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod action;
pub mod codec;
pub mod error;
pub mod flow_match;
pub mod message;

pub use action::Action;
pub use codec::OpenFlowCodec;
pub use error::Error;
pub use flow_match::Match;
pub use message::{FlowMod, Message, OfMessage, PacketIn, PacketOut};
