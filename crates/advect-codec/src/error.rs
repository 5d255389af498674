//! Error types for the particle wire format.

use std::fmt;
use std::io;

/// Errors that can occur while encoding or decoding particle records.
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with the expected `b"ADVP"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// The stream header names a record kind this build does not know.
    UnknownRecordKind {
        /// The unrecognized kind tag.
        tag: u8,
    },
    /// The stream holds a different record kind than the one requested.
    RecordKindMismatch {
        /// Kind tag the caller asked for.
        expected: u8,
        /// Kind tag found in the header.
        found: u8,
    },
    /// A status byte carries bits outside the defined flag set.
    InvalidStatus {
        /// The raw status byte.
        bits: u8,
    },
    /// A record could not be decoded (truncated or corrupt data).
    MalformedRecord {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"ADVP\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::UnknownRecordKind { tag } => write!(f, "unknown record kind tag {tag}"),
            Self::RecordKindMismatch { expected, found } => {
                write!(f, "record kind mismatch: expected {expected}, found {found}")
            }
            Self::InvalidStatus { bits } => {
                write!(f, "status byte {bits:#04x} has undefined flag bits")
            }
            Self::MalformedRecord { detail } => write!(f, "malformed record: {detail}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
