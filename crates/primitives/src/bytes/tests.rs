use proptest::prelude::*;

use super::{ByteReader, ByteWriter, LengthWidth};
use crate::error::ByteError;

#[test]
fn test_fixed_width_big_endian_layout() {
	let mut w = ByteWriter::new();
	w.write_u16(0x000A);
	w.write_i32(30);
	w.write_i64(-2);
	assert_eq!(
		w.as_slice(),
		&[0x00, 0x0A, 0, 0, 0, 30, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]
	);
}

#[test]
fn test_capacity_doubles_on_overflow() {
	let mut w = ByteWriter::with_capacity(4);
	w.write_u32(1);
	let before = w.capacity();
	w.write_u8(2);
	assert!(w.capacity() >= before * 2);

	let mut w = ByteWriter::with_capacity(2);
	w.write_bytes(&[0u8; 100]);
	assert!(w.capacity() >= 100);
}

#[test]
fn test_floats_use_raw_bits() {
	let mut w = ByteWriter::new();
	w.write_f32(1.5);
	w.write_f64(f64::MIN_POSITIVE);
	let bytes = w.finish();
	assert_eq!(&bytes[..4], &1.5f32.to_bits().to_be_bytes());

	let mut r = ByteReader::new(&bytes);
	assert_eq!(r.read_f32().unwrap(), 1.5);
	assert_eq!(r.read_f64().unwrap(), f64::MIN_POSITIVE);
	assert_eq!(r.available(), 0);
}

#[test]
fn test_ascii_replaces_non_ascii_chars() {
	let mut w = ByteWriter::new();
	w.write_ascii("né").unwrap();
	let bytes = w.finish();
	assert_eq!(bytes, vec![0, 2, b'n', b'?']);
	assert_eq!(ByteReader::new(&bytes).read_ascii().unwrap(), "n?");
}

#[test]
fn test_utf_round_trip() {
	let mut w = ByteWriter::new();
	w.write_utf("hello 世界").unwrap();
	let bytes = w.finish();
	assert_eq!(ByteReader::new(&bytes).read_utf().unwrap(), "hello 世界");
}

#[test]
fn test_length_width_switch() {
	let mut w = ByteWriter::with_width(LengthWidth::Long);
	w.write_blob(&[1, 2, 3]).unwrap();
	assert_eq!(w.as_slice(), &[0, 0, 0, 3, 1, 2, 3]);

	let mut r = ByteReader::new(w.as_slice());
	r.set_width(LengthWidth::Long);
	assert_eq!(r.read_blob().unwrap(), &[1, 2, 3]);
}

#[test]
fn test_short_width_rejects_long_blobs() {
	let mut w = ByteWriter::new();
	let err = w.write_blob(&vec![0u8; 70_000]).unwrap_err();
	assert_eq!(
		err,
		ByteError::LengthOverflow {
			len: 70_000,
			max: u16::MAX as usize
		}
	);
}

#[test]
fn test_underflow_reports_counts() {
	let mut r = ByteReader::new(&[0, 1, 2]);
	assert_eq!(
		r.read_i32().unwrap_err(),
		ByteError::Underflow {
			needed: 4,
			available: 3
		}
	);
	// A failed read does not consume anything.
	assert_eq!(r.position(), 0);
}

#[test]
fn test_bounded_reader() {
	let buf = [9, 9, 0, 5, 9];
	let mut r = ByteReader::with_bounds(&buf, 2, 2).unwrap();
	assert_eq!(r.len(), 2);
	assert_eq!(r.read_u16().unwrap(), 5);
	assert!(ByteReader::with_bounds(&buf, 4, 2).is_err());
}

#[test]
fn test_patch_len_back_fills_count() {
	let mut w = ByteWriter::new();
	let at = w.len();
	w.write_len(0).unwrap();
	w.write_u8(7);
	w.write_u8(8);
	w.patch_len(at, 2).unwrap();
	assert_eq!(w.as_slice(), &[0, 2, 7, 8]);
}

#[test]
fn test_invalid_utf8_is_rejected() {
	let bytes = [0, 2, 0xC3, 0x28];
	assert_eq!(
		ByteReader::new(&bytes).read_utf().unwrap_err(),
		ByteError::InvalidUtf8
	);
}

proptest! {
	#[test]
	fn prop_mixed_sequence_reads_back(
		a in any::<i16>(),
		b in any::<i64>(),
		s in "\\PC{0,40}",
		blob in proptest::collection::vec(any::<u8>(), 0..300),
		long in any::<bool>(),
	) {
		let width = if long { LengthWidth::Long } else { LengthWidth::Short };
		let mut w = ByteWriter::with_width(width);
		w.write_i16(a);
		w.write_utf(&s).unwrap();
		w.write_i64(b);
		w.write_blob(&blob).unwrap();
		let bytes = w.finish();

		let mut r = ByteReader::new(&bytes);
		r.set_width(width);
		prop_assert_eq!(r.read_i16().unwrap(), a);
		prop_assert_eq!(r.read_utf().unwrap(), s);
		prop_assert_eq!(r.read_i64().unwrap(), b);
		prop_assert_eq!(r.read_blob().unwrap(), &blob[..]);
		prop_assert_eq!(r.available(), 0);
	}
}
