mod common;

use std::sync::Arc;

use bio_codec::{BioCodec, EncodeOptions, ParserError, Payload, StatsSnapshot};
use bio_dictionary::{BioObject, DictionaryError, DictionaryRegistry, TagDef, Value};
use bio_primitives::{BioType, ByteError};
use common::*;
use pretty_assertions::assert_eq;

fn encode(codec: &BioCodec, rec: BioObject) -> Vec<u8> {
	codec.encode(&Payload::Record(rec), EncodeOptions::default()).unwrap()
}

#[test]
fn test_reader_skips_tags_it_does_not_know() {
	let writer = BioCodec::new(registry());
	let bytes = encode(&writer, person("Ann", 30));

	let (old_schema, _) = registry_with(person_def(0, false));
	let reader = BioCodec::new(old_schema);
	let Some(Payload::Record(back)) = reader.decode(&bytes).unwrap() else {
		panic!("expected a record");
	};
	assert_eq!(back.get("name"), Some(&Value::from("Ann")));
	assert!(back.get("age").is_none());
	assert_eq!(reader.stats().snapshot().skipped_fields, 1);
}

#[test]
fn test_strict_reader_rejects_unknown_tag_codes() {
	let bytes = encode(&BioCodec::new(registry()), person("Ann", 30));
	let (old_schema, _) = registry_with(person_def(0, false));
	let err = strict(old_schema).decode(&bytes).unwrap_err();
	assert!(matches!(err, ParserError::UnknownTagCode { code: 2, .. }), "{err}");
}

#[test]
fn test_unknown_sequence_tags_are_skipped_whole() {
	let mut newer = person_def(0, true);
	newer
		.add_tag(TagDef::new(7, "aliases", BioType::UtfString).array())
		.unwrap();
	newer.add_tag(TagDef::object(8, "pets", "Cat").list()).unwrap();
	let (new_schema, _) = registry_with(newer);
	let mut rec = person("Ann", 30);
	rec.set("aliases", Value::Array(vec!["A".into(), "Annie".into()])).unwrap();
	rec.set("pets", Value::List(vec![Value::Object(named(CAT, "Tom"))])).unwrap();
	let bytes = encode(&BioCodec::new(new_schema), rec);

	let reader = BioCodec::new(registry());
	let Some(Payload::Record(back)) = reader.decode(&bytes).unwrap() else {
		panic!("expected a record");
	};
	assert_eq!(back, person("Ann", 30));
	assert_eq!(reader.stats().snapshot().skipped_fields, 2);
}

#[test]
fn test_decoded_version_is_the_writers() {
	let (newer, _) = registry_with(person_def(4, true));
	let bytes = encode(&BioCodec::new(newer), person("Ann", 30));
	let (older, _) = registry_with(person_def(2, true));
	let Some(Payload::Record(back)) = BioCodec::new(older).decode(&bytes).unwrap() else {
		panic!("expected a record");
	};
	assert_eq!(back.version(), 4);
}

#[test]
fn test_lenient_encode_drops_unknown_fields() {
	let codec = BioCodec::new(registry());
	let mut rec = person("Ann", 30);
	rec.set("nickname", "Annie").unwrap();
	rec.set("age", "thirty").unwrap();
	let bytes = encode(&codec, rec);

	let Some(Payload::Record(back)) = codec.decode(&bytes).unwrap() else {
		panic!("expected a record");
	};
	assert_eq!(back.len(), 1);
	assert_eq!(
		codec.stats().snapshot(),
		StatsSnapshot {
			dropped_records: 0,
			skipped_fields: 2,
			skipped_elements: 0,
		}
	);
}

#[test]
fn test_strict_encode_rejects_unknown_fields() {
	let codec = strict(registry());
	let mut rec = person("Ann", 30);
	rec.set("nickname", "Annie").unwrap();
	let err = codec.encode(&rec.into(), EncodeOptions::default()).unwrap_err();
	assert!(matches!(err, ParserError::UnknownTag { ref tag, .. } if tag == "nickname"), "{err}");
}

#[test]
fn test_non_ascii_text_is_not_written_to_ascii_tags() {
	let err = strict(registry())
		.encode(&person("Zoë", 3).into(), EncodeOptions::default())
		.unwrap_err();
	assert!(
		matches!(err, ParserError::TypeMismatch { ref tag, expected: BioType::String, .. } if tag == "name"),
		"{err}"
	);

	let codec = BioCodec::new(registry());
	let bytes = encode(&codec, person("Zoë", 3));
	let Some(Payload::Record(back)) = codec.decode(&bytes).unwrap() else {
		panic!("expected a record");
	};
	assert!(back.get("name").is_none());
	assert_eq!(back.get("age"), Some(&Value::Integer(3)));
	assert_eq!(codec.stats().snapshot().skipped_fields, 1);
}

#[test]
fn test_strict_encode_requires_mandatory_tags() {
	let codec = strict(registry());
	let mut rec = BioObject::with_code(0, ACCOUNT);
	rec.set("owner", "ann").unwrap();
	let err = codec.encode(&rec.clone().into(), EncodeOptions::default()).unwrap_err();
	assert!(matches!(err, ParserError::MissingMandatory { ref tag, .. } if tag == "id"), "{err}");

	rec.set("id", 7i64).unwrap();
	assert!(codec.encode(&rec.into(), EncodeOptions::default()).is_ok());
	// lenient mode does not check
	let mut bare = BioObject::with_code(0, ACCOUNT);
	bare.set("owner", "bob").unwrap();
	assert!(BioCodec::new(registry()).encode(&bare.into(), EncodeOptions::default()).is_ok());
}

#[test]
fn test_unknown_enum_constant() {
	let mut rec = person("Ann", 30);
	rec.set("mood", "Sleepy").unwrap();
	let err = strict(registry())
		.encode(&rec.clone().into(), EncodeOptions::default())
		.unwrap_err();
	assert!(matches!(err, ParserError::UnknownEnumConstant { enum_code: 1, .. }), "{err}");

	let lenient = BioCodec::new(registry());
	let bytes = encode(&lenient, rec);
	let Some(Payload::Record(back)) = lenient.decode(&bytes).unwrap() else {
		panic!("expected a record");
	};
	assert!(back.get("mood").is_none());
}

#[test]
fn test_unknown_records_are_dropped_or_rejected() {
	let codec = BioCodec::new(registry());
	let list = Payload::List(vec![person("a", 1), BioObject::with_code(0, 99), person("b", 2)]);
	let bytes = codec.encode(&list, EncodeOptions::default()).unwrap();
	let Some(Payload::List(items)) = codec.decode(&bytes).unwrap() else {
		panic!("expected a list");
	};
	assert_eq!(items, vec![person("a", 1), person("b", 2)]);
	assert_eq!(codec.stats().snapshot().dropped_records, 1);

	let err = strict(registry()).encode(&list, EncodeOptions::default()).unwrap_err();
	assert!(matches!(
		err,
		ParserError::Dictionary(DictionaryError::ObjNotFound { code: 99, .. })
	));
}

#[test]
fn test_single_record_of_unknown_dictionary_decodes_to_none() {
	let mut rec = person("Ann", 30);
	rec.stamp(3, 10, "Person").unwrap();
	let other = Arc::new(DictionaryRegistry::new());
	other.get_or_create(3).add_obj(person_def(0, true)).unwrap();
	let bytes = encode(&BioCodec::new(other), rec);

	let codec = BioCodec::new(registry());
	assert_eq!(codec.decode(&bytes).unwrap(), None);
	assert!(matches!(
		strict(registry()).decode(&bytes),
		Err(ParserError::Dictionary(DictionaryError::DictionaryNotFound(3)))
	));
}

#[test]
fn test_truncated_input() {
	let codec = BioCodec::new(registry());
	let bytes = encode(&codec, person("Ann", 30));
	let err = codec.decode(&bytes[..bytes.len() - 3]).unwrap_err();
	assert!(matches!(err, ParserError::Bytes(ByteError::Underflow { .. })), "{err}");
	assert!(codec.decode(&[]).is_err());
}

#[test]
fn test_bad_envelope_flags() {
	let codec = BioCodec::new(registry());
	assert!(matches!(codec.decode(&[0x20, 0, 0]), Err(ParserError::Unsupported(_))));
	assert!(matches!(codec.decode(&[0x06, 0, 0]), Err(ParserError::BadFlags(6))));
	assert!(matches!(codec.decode(&[0x80, 0, 0]), Err(ParserError::BadFlags(0x80))));
}

#[test]
fn test_original_length_is_checked() {
	let codec = BioCodec::new(registry());
	let mut bytes = codec
		.encode(&person("Ann", 30).into(), EncodeOptions::default().compressed())
		.unwrap();
	// flag, pool count, then the original length
	bytes[6] = bytes[6].wrapping_add(1);
	assert!(matches!(
		codec.decode(&bytes),
		Err(ParserError::LengthMismatch { .. })
	));
	bytes[3..7].copy_from_slice(&u32::MAX.to_be_bytes());
	assert!(matches!(
		codec.decode(&bytes),
		Err(ParserError::LengthMismatch { .. })
	));
}

#[test]
fn test_encryption_needs_an_encrypter() {
	let codec = BioCodec::new(registry());
	let err = codec
		.encode(&person("Ann", 30).into(), EncodeOptions::default().encrypted())
		.unwrap_err();
	assert!(matches!(err, ParserError::MissingCollaborator("encrypter")));

	let sealed = with_key(registry())
		.encode(&person("Ann", 30).into(), EncodeOptions::default().encrypted())
		.unwrap();
	assert!(codec.decode(&sealed).is_err());
}

#[test]
fn test_bad_key_fails_build() {
	let config = bio_codec::CodecConfig {
		encryption: Some(bio_codec::EncrypterConfig { key: "short".into() }),
		..Default::default()
	};
	assert!(matches!(
		BioCodec::builder(registry()).config(config).build(),
		Err(ParserError::EncrypterInit)
	));
}

#[test]
fn test_non_record_values_are_rejected() {
	let codec = BioCodec::new(registry());
	assert!(matches!(
		codec.encode_value(&Value::Integer(3), EncodeOptions::default()),
		Err(ParserError::Unsupported(_))
	));
	assert!(matches!(
		codec.encode_value(&Value::Array(vec![Value::Integer(3)]), EncodeOptions::default()),
		Err(ParserError::Unsupported(_))
	));
}
