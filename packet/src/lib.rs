#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod error;
pub mod ethernet;
pub mod frame;
pub mod ipv4;
pub mod tcp;

pub use error::Error;
pub use ethernet::{EtherAddr, EthernetHeader};
pub use frame::Frame;
pub use ipv4::Ipv4Header;
pub use tcp::TcpHeader;
