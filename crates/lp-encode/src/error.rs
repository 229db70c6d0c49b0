use thiserror::Error;

/// Errors from decoding commands or parsing COE/TRAJ/CSV text.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid control byte {0:#04x}")]
    InvalidControl(u8),

    #[error("command record must be {expected} bytes, got {actual}")]
    RecordLength { expected: usize, actual: usize },

    #[error("line {line}: {reason}: {text:?}")]
    Parse {
        line: usize,
        reason: &'static str,
        text: String,
    },

    #[error("missing header line {expected:?}")]
    MissingHeader { expected: &'static str },

    #[error("memory vector is not terminated with ';'")]
    Unterminated,

    #[error("line {line}: entry after the terminating ';'")]
    TrailingEntry { line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn parse(line: usize, reason: &'static str, text: &str) -> Self {
        Self::Parse {
            line,
            reason,
            text: text.to_owned(),
        }
    }
}
