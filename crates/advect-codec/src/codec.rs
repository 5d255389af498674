//! Binary encode/decode for particle records.
//!
//! All integers and floats are little-endian. Records are written field by
//! field in declaration order with no padding, so a record's encoded length
//! equals its `sizeof()`:
//!
//! ```text
//! Particle        pos.x pos.y pos.z  id  num_steps  status  time
//!                 f64   f64   f64    i64 i64        u8      f64
//! ChargedParticle <Particle fields>  mass charge weighting  mom.x mom.y mom.z
//!                                    f64  f64    f64        f64   f64   f64
//! ```
//!
//! The speed of light is a constant of the build and never appears on the
//! wire.
//!
//! The status byte is [`ParticleStatus::bits`] as is, so it shares the
//! execution-side layout where `ERROR` owns bit 4:
//!
//! ```text
//! 0x01 OK  0x02 TERMINATED  0x04 SPATIAL_BOUNDS  0x08 TEMPORAL_BOUNDS
//! 0x10 ERROR  0x20 TOOK_ANY_STEPS  0x40 IN_GHOST_CELL  (0x80 rejected)
//! ```
//!
//! Record bitsets that put `TOOK_ANY_STEPS` at 0x10 and `IN_GHOST_CELL` at
//! 0x20 are a different format and must be remapped before decoding.

use std::io::{Read, Write};

use advect_core::{ChargedParticle, Particle, ParticleId, ParticleStatus, Species, Vec3};

use crate::error::CodecError;
use crate::types::{RecordKind, StreamHeader};
use crate::{FORMAT_VERSION, MAGIC};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CodecError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write three little-endian f64 components, x first.
pub fn write_vec3(w: &mut dyn Write, v: &Vec3) -> Result<(), CodecError> {
    write_f64_le(w, v.x)?;
    write_f64_le(w, v.y)?;
    write_f64_le(w, v.z)
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read three little-endian f64 components, x first.
pub fn read_vec3(r: &mut dyn Read) -> Result<Vec3, CodecError> {
    let x = read_f64_le(r)?;
    let y = read_f64_le(r)?;
    let z = read_f64_le(r)?;
    Ok(Vec3::new(x, y, z))
}

/// Read a status byte, rejecting undefined bits.
pub fn read_status(r: &mut dyn Read) -> Result<ParticleStatus, CodecError> {
    let bits = read_u8(r)?;
    ParticleStatus::from_bits(bits).ok_or(CodecError::InvalidStatus { bits })
}

// ── Records ─────────────────────────────────────────────────────

/// A particle record with a fixed-size wire encoding.
pub trait WireRecord: Sized {
    /// Kind tag written into stream headers.
    const KIND: RecordKind;

    /// Encoded length in bytes.
    const WIRE_SIZE: usize;

    /// Append this record to `w`.
    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError>;

    /// Read one record from `r`.
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError>;
}

struct BaseFields {
    pos: Vec3,
    id: ParticleId,
    num_steps: i64,
    status: ParticleStatus,
    time: f64,
}

fn encode_base(
    w: &mut dyn Write,
    pos: &Vec3,
    id: ParticleId,
    num_steps: i64,
    status: ParticleStatus,
    time: f64,
) -> Result<(), CodecError> {
    write_vec3(w, pos)?;
    write_i64_le(w, id.0)?;
    write_i64_le(w, num_steps)?;
    write_u8(w, status.bits())?;
    write_f64_le(w, time)
}

fn decode_base(r: &mut dyn Read) -> Result<BaseFields, CodecError> {
    Ok(BaseFields {
        pos: read_vec3(r)?,
        id: ParticleId(read_i64_le(r)?),
        num_steps: read_i64_le(r)?,
        status: read_status(r)?,
        time: read_f64_le(r)?,
    })
}

impl WireRecord for Particle {
    const KIND: RecordKind = RecordKind::Tracer;
    const WIRE_SIZE: usize = Particle::sizeof();

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        encode_base(w, &self.pos, self.id, self.num_steps, self.status, self.time)
    }

    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let b = decode_base(r)?;
        Ok(Particle {
            pos: b.pos,
            id: b.id,
            num_steps: b.num_steps,
            status: b.status,
            time: b.time,
        })
    }
}

impl WireRecord for ChargedParticle {
    const KIND: RecordKind = RecordKind::Charged;
    const WIRE_SIZE: usize = ChargedParticle::sizeof();

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        encode_base(w, &self.pos, self.id, self.num_steps, self.status, self.time)?;
        write_f64_le(w, self.mass())?;
        write_f64_le(w, self.charge())?;
        write_f64_le(w, self.weighting())?;
        write_vec3(w, &self.momentum())
    }

    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let b = decode_base(r)?;
        let mass = read_f64_le(r)?;
        let charge = read_f64_le(r)?;
        let weighting = read_f64_le(r)?;
        let momentum = read_vec3(r)?;
        let mut p = ChargedParticle::new(b.pos, b.id, Species::new(mass, charge, weighting), momentum);
        p.num_steps = b.num_steps;
        p.status = b.status;
        p.time = b.time;
        Ok(p)
    }
}

/// Encode a single record into a fresh buffer.
pub fn encode_record<P: WireRecord>(record: &P) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(P::WIRE_SIZE);
    record.encode(&mut buf)?;
    Ok(buf)
}

/// Decode a single record from the front of `bytes`.
pub fn decode_record<P: WireRecord>(mut bytes: &[u8]) -> Result<P, CodecError> {
    P::decode(&mut bytes)
}

/// Read the next record, or `None` on a clean end of stream.
///
/// A stream that ends part-way through a record is
/// [`CodecError::MalformedRecord`].
pub fn decode_next<P: WireRecord>(r: &mut dyn Read) -> Result<Option<P>, CodecError> {
    let mut buf = vec![0u8; P::WIRE_SIZE];
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(CodecError::MalformedRecord {
                    detail: format!("truncated record: got {filled} of {} bytes", buf.len()),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
    P::decode(&mut buf.as_slice()).map(Some)
}

// ── Sequences ───────────────────────────────────────────────────

/// Encode a count-prefixed sequence: `u64` record count, then the records.
pub fn encode_sequence<P: WireRecord>(w: &mut dyn Write, records: &[P]) -> Result<(), CodecError> {
    write_u64_le(w, records.len() as u64)?;
    for record in records {
        record.encode(w)?;
    }
    Ok(())
}

/// Decode a count-prefixed sequence written by [`encode_sequence`].
pub fn decode_sequence<P: WireRecord>(r: &mut dyn Read) -> Result<Vec<P>, CodecError> {
    let count = read_u64_le(r)?;
    let count = usize::try_from(count).map_err(|_| CodecError::MalformedRecord {
        detail: format!("sequence length {count} exceeds addressable memory"),
    })?;
    // The count is untrusted; grow on demand past a modest reservation.
    let mut out = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        out.push(P::decode(r)?);
    }
    Ok(out)
}

// ── Stream header ───────────────────────────────────────────────

/// Encode the stream header: magic, version, record kind.
pub fn encode_header(w: &mut dyn Write, kind: RecordKind) -> Result<(), CodecError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u8(w, kind.tag())
}

/// Decode and validate the stream header.
pub fn decode_header(r: &mut dyn Read) -> Result<StreamHeader, CodecError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CodecError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion { found: version });
    }
    let tag = read_u8(r)?;
    let kind = RecordKind::from_tag(tag).ok_or(CodecError::UnknownRecordKind { tag })?;
    Ok(StreamHeader { version, kind })
}
