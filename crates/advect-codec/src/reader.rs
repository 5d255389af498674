//! Particle stream reader.
//!
//! [`RecordReader`] reads records from any `Read` source. The header is
//! validated on construction.

use std::io::Read;
use std::marker::PhantomData;

use crate::codec::{decode_header, decode_next, WireRecord};
use crate::error::CodecError;
use crate::types::StreamHeader;

/// Reads records of type `P` from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct RecordReader<R: Read, P: WireRecord> {
    reader: R,
    header: StreamHeader,
    records_read: u64,
    _record: PhantomData<fn() -> P>,
}

impl<R: Read, P: WireRecord> RecordReader<R, P> {
    /// Open a stream, reading and validating the header.
    ///
    /// # Errors
    ///
    /// [`CodecError::RecordKindMismatch`] if the stream holds a different
    /// record kind than `P`, plus any header error from
    /// [`decode_header`](crate::codec::decode_header).
    pub fn open(mut reader: R) -> Result<Self, CodecError> {
        let header = decode_header(&mut reader)?;
        if header.kind != P::KIND {
            return Err(CodecError::RecordKindMismatch {
                expected: P::KIND.tag(),
                found: header.kind.tag(),
            });
        }
        Ok(Self {
            reader,
            header,
            records_read: 0,
            _record: PhantomData,
        })
    }

    /// The validated stream header.
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// Read the next record, or `None` if the stream is exhausted.
    pub fn next_record(&mut self) -> Result<Option<P>, CodecError> {
        let record = decode_next(&mut self.reader)?;
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Convert into a record iterator.
    pub fn records(self) -> RecordIter<R, P> {
        RecordIter {
            reader: self.reader,
            done: false,
            _record: PhantomData,
        }
    }
}

/// Iterator adapter over stream records. Stops after the first error.
pub struct RecordIter<R: Read, P: WireRecord> {
    reader: R,
    done: bool,
    _record: PhantomData<fn() -> P>,
}

impl<R: Read, P: WireRecord> Iterator for RecordIter<R, P> {
    type Item = Result<P, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_next(&mut self.reader) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
