use std::io;
use std::net::AddrParseError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid argument: {0}")]
    ErrInvalidArg(String),
    #[error("southbound: {0}")]
    Southbound(#[from] openflow::Error),
    #[error("frame: {0}")]
    Frame(#[from] packet::Error),
    #[error("address: {0}")]
    Addr(#[from] AddrParseError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
