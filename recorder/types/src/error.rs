/*!
    Error types shared by every crate in the pipeline.
*/

use thiserror::Error;

/**
    Result alias used throughout the pipeline.
*/
pub type Result<T> = std::result::Result<T, Error>;

/**
    Errors produced while configuring, encoding or muxing a recording.
*/
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder could not be resolved, allocated, configured or opened.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The output could not be created, or its container format could not be inferred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The codec rejected a frame or failed while producing packets.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The container header, trailer or a packet could not be written.
    #[error("mux error: {0}")]
    Mux(String),

    /// Input data did not match what the pipeline was configured for.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/**
    Coarse classification of an [`Error`], for callers that only need to
    branch on the failure class.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Io,
    Encoding,
    Mux,
    InvalidData,
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /**
        Build an I/O error from a message, for failures reported by FFmpeg
        rather than by the standard library.
    */
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(msg.into()))
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Mux(_) => ErrorKind::Mux,
            Self::InvalidData(_) => ErrorKind::InvalidData,
        }
    }
}

/**
    Error returned by `FromStr` implementations on enum types.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            Error::configuration("x").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(Error::io("x").kind(), ErrorKind::Io);
        assert_eq!(Error::encoding("x").kind(), ErrorKind::Encoding);
        assert_eq!(Error::mux("x").kind(), ErrorKind::Mux);
        assert_eq!(Error::invalid_data("x").kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn io_error_converts() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn parse_error_message() {
        let err = ParseError {
            kind: "codec",
            value: "foo".into(),
        };
        assert_eq!(err.to_string(), "unknown codec 'foo'");
    }
}
