//! Streams of generated particles through the writer and reader.

use advect_codec::{
    decode_sequence, encode_sequence, CodecError, RecordKind, RecordReader, RecordWriter,
    WireRecord, FORMAT_VERSION,
};
use advect_core::{ChargedParticle, Particle, ParticleStatus, Vec3};
use advect_test_utils::{
    electron, proton, random_charged_particles, random_particles, ParticleCloud,
};
use proptest::prelude::*;

fn write_stream<P: WireRecord>(records: &[P]) -> Vec<u8> {
    let mut writer = RecordWriter::<_, P>::new(Vec::new()).unwrap();
    writer.write_all(records).unwrap();
    assert_eq!(writer.records_written(), records.len() as u64);
    writer.into_inner()
}

fn read_stream<P: WireRecord>(bytes: &[u8]) -> Result<Vec<P>, CodecError> {
    RecordReader::<_, P>::open(bytes)?.records().collect()
}

#[test]
fn charged_cloud_survives_a_stream() {
    let mut ps = random_charged_particles(17, 500, ParticleCloud::cube(2.0), electron(), 0.9);
    for (i, p) in ps.iter_mut().enumerate() {
        p.num_steps = i as i64;
        p.time = i as f64 * 1.0e-9;
        if i % 4 == 0 {
            p.status.mark_exit_spatial_boundary();
        }
    }
    let bytes = write_stream(&ps);
    assert_eq!(bytes.len(), 6 + ps.len() * ChargedParticle::sizeof());
    assert_eq!(read_stream::<ChargedParticle>(&bytes).unwrap(), ps);
}

#[test]
fn header_reports_kind_and_version() {
    let bytes = write_stream(&random_particles(1, 3, ParticleCloud::cube(1.0)));
    let reader = RecordReader::<_, Particle>::open(bytes.as_slice()).unwrap();
    assert_eq!(reader.header().version, FORMAT_VERSION);
    assert_eq!(reader.header().kind, RecordKind::Tracer);
}

#[test]
fn reading_the_wrong_kind_is_rejected() {
    let bytes = write_stream(&random_charged_particles(
        2,
        4,
        ParticleCloud::cube(1.0),
        proton(),
        0.1,
    ));
    assert!(matches!(
        RecordReader::<_, Particle>::open(bytes.as_slice()),
        Err(CodecError::RecordKindMismatch { expected: 0, found: 1 })
    ));
}

#[test]
fn truncated_stream_yields_records_then_one_error() {
    let ps = random_particles(3, 5, ParticleCloud::cube(1.0));
    let mut bytes = write_stream(&ps);
    bytes.truncate(bytes.len() - 10);

    let mut iter = RecordReader::<_, Particle>::open(bytes.as_slice())
        .unwrap()
        .records();
    for expected in &ps[..4] {
        assert_eq!(&iter.next().unwrap().unwrap(), expected);
    }
    assert!(matches!(iter.next(), Some(Err(CodecError::MalformedRecord { .. }))));
    assert!(iter.next().is_none());
}

#[test]
fn empty_stream_is_just_a_header() {
    let bytes = write_stream::<Particle>(&[]);
    assert_eq!(bytes.len(), 6);
    let mut reader = RecordReader::<_, Particle>::open(bytes.as_slice()).unwrap();
    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(reader.records_read(), 0);
}

#[test]
fn sequences_concatenate() {
    let tracers = random_particles(4, 7, ParticleCloud::cube(3.0));
    let charged = random_charged_particles(5, 9, ParticleCloud::cube(3.0), proton(), 0.5);
    let mut buf = Vec::new();
    encode_sequence(&mut buf, &tracers).unwrap();
    encode_sequence(&mut buf, &charged).unwrap();

    let mut r = buf.as_slice();
    let a: Vec<Particle> = decode_sequence(&mut r).unwrap();
    let b: Vec<ChargedParticle> = decode_sequence(&mut r).unwrap();
    assert_eq!(a, tracers);
    assert_eq!(b, charged);
    assert!(r.is_empty());
}

#[test]
fn non_finite_values_keep_their_bits() {
    let mut p = random_particles(6, 1, ParticleCloud::cube(1.0))[0];
    p.pos = Vec3::new(f64::NAN, f64::INFINITY, -0.0);
    p.time = f64::NEG_INFINITY;
    let back: Vec<Particle> = read_stream(&write_stream(&[p])).unwrap();
    assert!(back[0].pos.x.is_nan());
    assert_eq!(back[0].pos.y, f64::INFINITY);
    assert_eq!(back[0].pos.z.to_bits(), (-0.0f64).to_bits());
    assert_eq!(back[0].time, f64::NEG_INFINITY);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_valid_status_roundtrips(bits in 0u8..=ParticleStatus::all().bits(), seed in any::<u64>()) {
        let mut ps = random_particles(seed, 3, ParticleCloud::cube(10.0));
        for p in &mut ps {
            p.status = ParticleStatus::from_bits_truncate(bits);
        }
        let back: Vec<Particle> = read_stream(&write_stream(&ps)).unwrap();
        prop_assert_eq!(back, ps);
    }
}
