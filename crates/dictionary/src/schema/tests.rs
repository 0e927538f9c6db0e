use bio_primitives::{BioType, Shape};

use super::*;
use crate::error::DictionaryError;

fn person() -> ObjDef {
	ObjDef::new(10, "Person")
		.with_tag(TagDef::new(1, "name", BioType::String))
		.and_then(|o| o.with_tag(TagDef::new(2, "age", BioType::Integer).mandatory(true)))
		.unwrap()
}

#[test]
fn test_tag_lookup_by_code_and_name() {
	let obj = person();
	assert_eq!(obj.own_tag(2).map(|t| t.name()), Some("age"));
	assert_eq!(obj.own_tag_by_name("name").map(|t| t.code()), Some(1));
	assert!(obj.own_tag(3).is_none());
	assert_eq!(obj.name(), "Person");
}

#[test]
fn test_tag_code_conflict() {
	let mut obj = person();
	let err = obj.add_tag(TagDef::new(1, "nickname", BioType::String)).unwrap_err();
	assert!(matches!(err, DictionaryError::TagCodeConflict { code: 1, .. }));
}

#[test]
fn test_tag_name_conflict() {
	let mut obj = person();
	let err = obj.add_tag(TagDef::new(7, "name", BioType::String)).unwrap_err();
	assert!(matches!(
		err,
		DictionaryError::TagNameConflict {
			existing_code: 1,
			new_code: 7,
			..
		}
	));
}

#[test]
fn test_exact_tag_reregistration_is_idempotent() {
	let mut obj = person();
	let action = obj.add_tag(TagDef::new(1, "name", BioType::String)).unwrap();
	assert_eq!(action, InsertAction::KeptExisting);
	assert_eq!(obj.tags().count(), 2);
}

#[test]
fn test_negative_tag_code_rejected() {
	let mut obj = person();
	assert!(matches!(
		obj.add_tag(TagDef::new(-1, "bad", BioType::Integer)),
		Err(DictionaryError::TagCode { code: -1, .. })
	));
}

#[test]
fn test_mandatory_tags() {
	let obj = person();
	let names: Vec<_> = obj.mandatory_tags().map(|t| t.name().to_string()).collect();
	assert_eq!(names, ["age"]);
}

#[test]
fn test_remove_tag_frees_name() {
	let mut obj = person();
	obj.remove_tag(2);
	assert!(obj.own_tag_by_name("age").is_none());
	obj.add_tag(TagDef::new(3, "age", BioType::Long)).unwrap();
}

#[test]
fn test_tag_shapes() {
	let t = TagDef::new(4, "scores", BioType::Integer).list();
	assert_eq!(t.shape(), Shape::List);
	assert!(t.is_list() && !t.is_array());
	assert!(!TagDef::new(5, "f", BioType::Dynamic).is_encodable());
	assert!(!TagDef::new(5, "f", BioType::Integer).encodable(false).is_encodable());
}

#[test]
fn test_enum_constants() {
	let e = EnumDef::new(3, "Color")
		.with_constant(0, "RED")
		.and_then(|e| e.with_constant(1, "GREEN"))
		.unwrap();
	assert_eq!(e.by_name("GREEN").map(|c| c.ordinal), Some(1));
	assert_eq!(e.value(0).map(|v| v.name), Some("RED".to_string()));
	assert!(e.value(9).is_none());
}

#[test]
fn test_enum_constant_conflicts() {
	let mut e = EnumDef::new(3, "Color").with_constant(0, "RED").unwrap();
	e.add_constant(0, "RED").unwrap();
	assert!(e.add_constant(0, "BLUE").is_err());
	assert!(e.add_constant(2, "RED").is_err());
	assert_eq!(e.constants().count(), 1);
}
