use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::{BioObject, RecordArray};
use crate::native::NativeType;
use crate::value::Value;

fn person() -> BioObject {
	let mut r = BioObject::with_code(0, 10);
	r.set("name", Value::String("Ann".into())).unwrap();
	r.set("age", 30).unwrap();
	r
}

#[test]
fn test_equality_ignores_field_order() {
	let a = person();
	let mut b = BioObject::with_code(0, 10);
	b.set("age", 30).unwrap();
	b.set("name", "Ann").unwrap();
	assert_eq!(a, b);
}

#[test]
fn test_equality_requires_same_identity_and_keys() {
	let a = person();
	let mut other_code = person();
	other_code.stamp(0, 11, "").unwrap();
	assert_ne!(a, other_code);

	let mut extra = person();
	extra.set("nick", "A").unwrap();
	assert_ne!(a, extra);
	assert_ne!(extra, a);
}

#[test]
fn test_nested_equality_is_deep() {
	let mut a = person();
	let mut b = person();
	a.set("friends", Value::List(vec![person().into()])).unwrap();
	b.set("friends", Value::List(vec![person().into()])).unwrap();
	assert_eq!(a, b);

	let mut changed = person();
	changed.set("age", 31).unwrap();
	b.set("friends", Value::List(vec![changed.into()])).unwrap();
	assert_ne!(a, b);
}

#[test]
fn test_sealed_record_rejects_every_mutator() {
	let mut r = person();
	r.seal();
	let before = r.clone();

	let err = r.set("age", 31).unwrap_err();
	assert_eq!(err.operation, "set");
	assert_eq!(err.key.as_deref(), Some("age"));
	assert!(r.remove("name").is_err());
	assert!(r.clear().is_err());
	assert!(r.extend([("a", 1), ("b", 2)]).is_err());
	assert!(r.stamp(1, 2, "x").is_err());
	assert!(r.set_version(3).is_err());

	assert_eq!(r, before);
	assert_eq!(r.get("age"), Some(&Value::Integer(30)));
	assert_eq!(r.version(), 0);
}

#[test]
fn test_immutable_error_message() {
	let mut r = person();
	r.seal();
	let err = r.set("age", 1).unwrap_err();
	assert_eq!(err.to_string(), "record (code 10) is immutable: cannot set \"age\"");
}

#[test]
fn test_remove_keeps_order() {
	let mut r: BioObject = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
	r.remove("b").unwrap();
	assert_eq!(r.keys().collect::<Vec<_>>(), ["a", "c"]);
}

#[test]
fn test_record_array_push_widens_type() {
	let base = NativeType::new("Shape").build();
	let circle = NativeType::new("Circle").extends(&base).build();
	let square = NativeType::new("Square").extends(&base).build();

	let mut c = BioObject::new();
	c.set_native_type(Some(Arc::clone(&circle)));
	let mut s = BioObject::new();
	s.set_native_type(Some(Arc::clone(&square)));

	let mut arr = RecordArray::typed(Some(Arc::clone(&circle)), 2);
	arr.push(c.clone());
	assert_eq!(arr.element_type(), Some(&circle));
	arr.push(s);
	assert_eq!(arr.element_type(), Some(&base));
	arr.push(BioObject::new());
	assert_eq!(arr.element_type(), None);
	assert_eq!(arr.len(), 3);
}

#[test]
fn test_record_array_narrow() {
	let base = NativeType::new("Shape").build();
	let circle = NativeType::new("Circle").extends(&base).build();
	let mut c = BioObject::new();
	c.set_native_type(Some(Arc::clone(&circle)));

	let mut empty = RecordArray::typed(Some(Arc::clone(&base)), 0);
	empty.narrow();
	assert_eq!(empty.element_type(), Some(&base));

	let mut arr = RecordArray::typed(Some(Arc::clone(&base)), 2);
	arr.push(c.clone());
	arr.push(c);
	assert_eq!(arr.element_type(), Some(&base));
	arr.narrow();
	assert_eq!(arr.element_type(), Some(&circle));
}
