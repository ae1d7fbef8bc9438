use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("not enough bytes for an openflow header")]
    ErrShortHeader,
    #[error("openflow length field {0} is shorter than the header")]
    ErrBadMessageLength(usize),
    #[error("message body truncated for type {0}")]
    ErrTruncatedBody(u8),
    #[error("not enough bytes for an ofp_match")]
    ErrShortMatch,
    #[error("action list truncated")]
    ErrShortAction,
    #[error("unsupported action type {0}")]
    ErrUnsupportedAction(u16),
    #[error("action length field {0} is invalid")]
    ErrBadActionLength(u16),
    #[error("{0}")]
    Io(#[source] IoError),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}
