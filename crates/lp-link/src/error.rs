use std::io;

use lp_encode::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("invalid MAC address {0:?}")]
    InvalidMac(String),

    #[error("no network interface named {0:?}")]
    InterfaceNotFound(String),

    #[error("interface {0:?} does not offer an ethernet channel")]
    UnsupportedChannel(String),

    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),

    #[error("unexpected ethertype {actual:#06x}, expected {expected:#06x}")]
    EtherType { expected: u16, actual: u16 },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
