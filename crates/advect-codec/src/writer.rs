//! Particle stream writer.
//!
//! [`RecordWriter`] streams records of one kind to any `Write` sink. The
//! header is written immediately on construction.

use std::io::Write;
use std::marker::PhantomData;

use crate::codec::{encode_header, WireRecord};
use crate::error::CodecError;

/// Writes a header followed by any number of records of type `P`.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use advect_codec::{RecordReader, RecordWriter};
/// use advect_core::{Particle, ParticleId, Vec3};
///
/// let mut buf = Vec::new();
/// let mut writer = RecordWriter::<_, Particle>::new(&mut buf).unwrap();
/// for i in 0..3 {
///     writer.write(&Particle::new(Vec3::new(i as f64, 0.0, 0.0), ParticleId(i))).unwrap();
/// }
/// assert_eq!(writer.records_written(), 3);
/// drop(writer);
///
/// let reader = RecordReader::<_, Particle>::open(buf.as_slice()).unwrap();
/// let back: Vec<Particle> = reader.records().collect::<Result<_, _>>().unwrap();
/// assert_eq!(back[2].id, ParticleId(2));
/// ```
pub struct RecordWriter<W: Write, P: WireRecord> {
    writer: W,
    records_written: u64,
    _record: PhantomData<fn(&P)>,
}

impl<W: Write, P: WireRecord> RecordWriter<W, P> {
    /// Create a new writer, immediately writing the header.
    pub fn new(mut writer: W) -> Result<Self, CodecError> {
        encode_header(&mut writer, P::KIND)?;
        Ok(Self {
            writer,
            records_written: 0,
            _record: PhantomData,
        })
    }

    /// Append one record.
    pub fn write(&mut self, record: &P) -> Result<(), CodecError> {
        record.encode(&mut self.writer)?;
        self.records_written += 1;
        Ok(())
    }

    /// Append every record of `records`, in order.
    pub fn write_all(&mut self, records: &[P]) -> Result<(), CodecError> {
        records.iter().try_for_each(|r| self.write(r))
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
