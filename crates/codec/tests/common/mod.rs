//! Shared schema fixtures.
#![allow(dead_code)]

use std::sync::Arc;

use bio_codec::{BioCodec, CodecConfig, EncrypterConfig};
use bio_dictionary::{BioObject, DictionaryRegistry, EnumDef, EnumValue, NativeType, ObjDef, TagDef, Value};
use bio_primitives::{BioType, Shape};
use chrono::DateTime;

pub const PERSON: u16 = 10;
pub const BLOB: u16 = 20;
pub const ANIMAL: u16 = 29;
pub const CAT: u16 = 30;
pub const DOG: u16 = 31;
pub const ACCOUNT: u16 = 40;
pub const BASE: u16 = 49;
pub const SAMPLE: u16 = 50;
pub const SAMPLE_LARGE: u16 = 51;
pub const ZOO: u16 = 60;

/// Every kind with a wire form.
pub const WIRE_KINDS: [BioType; 16] = [
	BioType::Integer,
	BioType::String,
	BioType::UtfString,
	BioType::Byte,
	BioType::Short,
	BioType::Boolean,
	BioType::Float,
	BioType::Long,
	BioType::Double,
	BioType::Time,
	BioType::JavaObject,
	BioType::Raw,
	BioType::BioObject,
	BioType::Alias,
	BioType::JavaEnum,
	BioType::BioEnum,
];

/// 32 bytes `0..32`, base64 encoded.
pub const KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

pub struct Animals {
	pub animal: Arc<NativeType>,
	pub cat: Arc<NativeType>,
	pub dog: Arc<NativeType>,
}

/// `Person` at `version`; `age` (tag 2) is left out when `with_age` is false.
pub fn person_def(version: u16, with_age: bool) -> ObjDef {
	let mut def = ObjDef::new(PERSON, "Person")
		.version(version)
		.with_tag(TagDef::new(1, "name", BioType::String))
		.and_then(|o| o.with_tag(TagDef::enumeration(3, "mood", "Mood")))
		.and_then(|o| o.with_tag(TagDef::object(4, "friends", "Person").array()))
		.and_then(|o| o.with_tag(TagDef::new(5, "tags", BioType::UtfString).list()))
		.and_then(|o| o.with_tag(TagDef::new(6, "scratch", BioType::Integer).encodable(false)))
		.unwrap();
	if with_age {
		def.add_tag(TagDef::new(2, "age", BioType::Integer)).unwrap();
	}
	def
}

/// Field of a sample record holding `ty` in `shape`.
pub fn sample_key(ty: BioType, shape: Shape) -> String {
	format!("{ty}_{shape}")
}

fn sample_tag(code: i16, ty: BioType, shape: Shape) -> TagDef {
	let name = sample_key(ty, shape);
	let tag = match ty {
		BioType::BioObject => TagDef::object(code, name, "Cat"),
		BioType::BioEnum => TagDef::enumeration(code, name, "Mood"),
		_ => TagDef::new(code, name, ty),
	};
	match shape {
		Shape::Scalar => tag,
		Shape::Array => tag.array(),
		Shape::List => tag.list(),
	}
}

/// One tag per wire kind and shape, under `Base` which contributes the
/// inherited `level` tag.
pub fn sample_def(code: u16, name: &str, large: bool) -> ObjDef {
	let mut def = ObjDef::new(code, name).large(large).extends(BASE);
	for (i, ty) in (0i16..).zip(WIRE_KINDS) {
		for (offset, shape) in [(10, Shape::Scalar), (40, Shape::Array), (70, Shape::List)] {
			def.add_tag(sample_tag(offset + i, ty, shape)).unwrap();
		}
	}
	def
}

pub fn registry_with(person: ObjDef) -> (Arc<DictionaryRegistry>, Animals) {
	let registry = Arc::new(DictionaryRegistry::new());
	let dict = registry.get_or_create(0);
	let animal = NativeType::new("Animal").build();
	let cat = NativeType::new("Cat").extends(&animal).build();
	let dog = NativeType::new("Dog").extends(&animal).build();

	dict.add_enum(
		EnumDef::new(1, "Mood")
			.with_constant(0, "Calm")
			.and_then(|e| e.with_constant(1, "Angry"))
			.unwrap(),
	)
	.unwrap();
	dict.add_obj(person).unwrap();
	dict.add_obj(
		ObjDef::new(BLOB, "Blob")
			.large(true)
			.with_tag(TagDef::new(1, "data", BioType::Raw))
			.unwrap(),
	)
	.unwrap();
	dict.add_obj(ObjDef::new(ANIMAL, "Animal").native(&animal)).unwrap();
	dict.add_obj(
		ObjDef::new(CAT, "Cat")
			.native(&cat)
			.with_tag(TagDef::new(1, "name", BioType::UtfString))
			.unwrap(),
	)
	.unwrap();
	dict.add_obj(
		ObjDef::new(DOG, "Dog")
			.native(&dog)
			.with_tag(TagDef::new(1, "name", BioType::UtfString))
			.unwrap(),
	)
	.unwrap();
	dict.add_obj(
		ObjDef::new(ACCOUNT, "Account")
			.with_tag(TagDef::new(1, "id", BioType::Long).mandatory(true))
			.and_then(|o| o.with_tag(TagDef::new(2, "owner", BioType::String)))
			.unwrap(),
	)
	.unwrap();
	dict.add_obj(
		ObjDef::new(BASE, "Base")
			.with_tag(TagDef::new(1, "level", BioType::Byte))
			.unwrap(),
	)
	.unwrap();
	dict.add_obj(sample_def(SAMPLE, "Sample", false)).unwrap();
	dict.add_obj(sample_def(SAMPLE_LARGE, "SampleLarge", true)).unwrap();
	dict.add_obj(
		ObjDef::new(ZOO, "Zoo")
			.with_tag(TagDef::object(1, "pets", "Animal").array())
			.unwrap(),
	)
	.unwrap();
	dict.add_super_tag(TagDef::new(-3, "note", BioType::UtfString)).unwrap();
	dict.validate().unwrap();
	(registry, Animals { animal, cat, dog })
}

pub fn registry() -> Arc<DictionaryRegistry> {
	registry_with(person_def(0, true)).0
}

pub fn person(name: &str, age: i32) -> BioObject {
	let mut rec = BioObject::with_code(0, PERSON);
	rec.set("name", name).unwrap();
	rec.set("age", age).unwrap();
	rec
}

pub fn named(code: u16, name: &str) -> BioObject {
	let mut rec = BioObject::with_code(0, code);
	rec.set("name", name).unwrap();
	rec
}

pub fn strict(registry: Arc<DictionaryRegistry>) -> BioCodec {
	BioCodec::builder(registry).validated(true).build().unwrap()
}

pub fn with_key(registry: Arc<DictionaryRegistry>) -> BioCodec {
	let config = CodecConfig {
		encryption: Some(EncrypterConfig { key: KEY.into() }),
		..CodecConfig::default()
	};
	BioCodec::builder(registry).config(config).build().unwrap()
}

pub fn field<'a>(rec: &'a BioObject, key: &str) -> &'a Value {
	rec.get(key).unwrap_or_else(|| panic!("missing field {key}"))
}

/// One value per wire kind; sequence fields repeat it `len` times.
#[derive(Debug, Clone)]
pub struct SampleValues {
	pub int: i32,
	pub ascii: String,
	pub text: String,
	pub byte: i8,
	pub short: i16,
	pub flag: bool,
	pub float: f32,
	pub long: i64,
	pub double: f64,
	pub millis: i64,
	pub blob: Vec<u8>,
	pub alias: String,
	pub constant: String,
	pub angry: bool,
	pub len: usize,
}

impl SampleValues {
	pub fn fixed() -> Self {
		Self {
			int: -70_000,
			ascii: "plain".into(),
			text: "grüße".into(),
			byte: -5,
			short: 1234,
			flag: true,
			float: 0.25,
			long: i64::MIN + 1,
			double: -1.5e300,
			millis: 1_700_000_000_123,
			blob: vec![0, 255, 7],
			alias: "text_scalar".into(),
			constant: "SECONDS".into(),
			angry: true,
			len: 2,
		}
	}

	pub fn of(&self, ty: BioType) -> Value {
		match ty {
			BioType::Integer => Value::Integer(self.int),
			BioType::String => Value::String(self.ascii.clone()),
			BioType::UtfString => Value::UtfString(self.text.clone()),
			BioType::Byte => Value::Byte(self.byte),
			BioType::Short => Value::Short(self.short),
			BioType::Boolean => Value::Boolean(self.flag),
			BioType::Float => Value::Float(self.float),
			BioType::Long => Value::Long(self.long),
			BioType::Double => Value::Double(self.double),
			BioType::Time => Value::Time(DateTime::from_timestamp_millis(self.millis).unwrap()),
			BioType::JavaObject => Value::Blob(self.blob.clone()),
			BioType::Raw => Value::Raw(self.blob.clone()),
			BioType::BioObject => Value::Object(named(CAT, &self.text)),
			BioType::Alias => Value::Alias(self.alias.clone()),
			BioType::JavaEnum => Value::NativeEnum(self.constant.clone()),
			BioType::BioEnum => Value::Enum(EnumValue {
				enum_code: 1,
				ordinal: i32::from(self.angry),
				name: if self.angry { "Angry" } else { "Calm" }.into(),
			}),
			other => panic!("{other} has no wire form"),
		}
	}
}

/// Record of object `code` with every sample field set, plus the inherited
/// `level` and the super-tag `note`.
pub fn sample(code: u16, values: &SampleValues) -> BioObject {
	let mut rec = BioObject::with_code(0, code);
	rec.set("level", values.byte).unwrap();
	rec.set("note", Value::UtfString(values.text.clone())).unwrap();
	for ty in WIRE_KINDS {
		let v = values.of(ty);
		rec.set(sample_key(ty, Shape::Array), Value::Array(vec![v.clone(); values.len]))
			.unwrap();
		rec.set(sample_key(ty, Shape::List), Value::List(vec![v.clone(); values.len]))
			.unwrap();
		rec.set(sample_key(ty, Shape::Scalar), v).unwrap();
	}
	rec
}
