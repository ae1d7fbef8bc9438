use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("not enough bytes for an ethernet header")]
    ErrShortEthernet,
    #[error("not enough bytes for an ipv4 header")]
    ErrShortIpv4,
    #[error("not enough bytes for a tcp header")]
    ErrShortTcp,
    #[error("ipv4 header length field out of range")]
    ErrBadIpv4Ihl,
    #[error("tcp data offset field out of range")]
    ErrBadTcpOffset,
    #[error("frame carries no tcp segment")]
    ErrNotTcp,
}
