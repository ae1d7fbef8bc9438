use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("chunk stream id {0} cannot be encoded in a basic header")]
    ErrCsidOutOfRange(u32),
    #[error("header format {0} requires a field the message does not carry")]
    ErrMissingHeaderField(u8),
    #[error("payload length {payload} disagrees with declared message length {declared}")]
    ErrPayloadLengthMismatch { declared: usize, payload: usize },
    #[error("field value {0} does not fit in 24 bits")]
    ErrFieldTooWide(u32),
}
