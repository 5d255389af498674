//! Binary wire format for Advect particle records.
//!
//! Every record is encoded as its stored fields in declaration order,
//! little-endian, unpadded. The encoded length of a record equals the
//! `sizeof()` its type reports.
//!
//! # Architecture
//!
//! - [`WireRecord`] encodes and decodes one record; implemented for
//!   [`Particle`](advect_core::Particle) and
//!   [`ChargedParticle`](advect_core::ChargedParticle)
//! - [`encode_sequence`] / [`decode_sequence`] frame a record slice with a
//!   `u64` count, for embedding in larger payloads
//! - [`RecordWriter`] / [`RecordReader`] stream records behind a header
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Stream format
//!
//! ```text
//! [MAGIC "ADVP"] [VERSION u8] [KIND u8]
//! [Record 1] [Record 2] ... [Record N]
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod types;
pub mod writer;

pub use codec::{
    decode_record, decode_sequence, encode_record, encode_sequence, WireRecord,
};
pub use error::CodecError;
pub use reader::{RecordIter, RecordReader};
pub use types::{RecordKind, StreamHeader};
pub use writer::RecordWriter;

/// Magic bytes at the start of every particle stream.
pub const MAGIC: [u8; 4] = *b"ADVP";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
