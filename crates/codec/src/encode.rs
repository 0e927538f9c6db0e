//! Binary encode path.

use std::borrow::Cow;
use std::sync::Arc;

use bio_dictionary::{BioObject, Dictionary, DictionaryError, DictionaryRegistry, ObjDef, TagDef, Value};
use bio_primitives::{BioType, ByteError, ByteWriter, LengthWidth, Shape};
use tracing::debug;

use crate::codec::{CodecStats, Dropped, Payload};
use crate::error::{ParserError, Result};
use crate::pool::AdHocPool;

/// Schema context of the field being written; `None` fields mean ad-hoc.
#[derive(Clone, Copy)]
struct FieldCtx<'a> {
	dict: Option<&'a Dictionary>,
	tag: Option<&'a TagDef>,
	name: &'a str,
}

/// One encode call.
pub(crate) struct Encoder<'a> {
	registry: &'a DictionaryRegistry,
	strict: bool,
	stats: &'a CodecStats,
	pool: AdHocPool,
}

impl<'a> Encoder<'a> {
	pub(crate) fn new(registry: &'a DictionaryRegistry, strict: bool, stats: &'a CodecStats) -> Self {
		Self {
			registry,
			strict,
			stats,
			pool: AdHocPool::default(),
		}
	}

	pub(crate) fn pool(&self) -> &AdHocPool {
		&self.pool
	}

	/// Lenient mode counts and swallows `err`; strict mode raises it.
	fn reject(&self, err: ParserError, what: Dropped) -> Result<()> {
		if self.strict {
			return Err(err);
		}
		debug!(error = %err, ?what, "dropped while encoding");
		self.stats.count(what);
		Ok(())
	}

	pub(crate) fn encode_payload(&mut self, payload: &Payload) -> Result<Vec<u8>> {
		let mut w = ByteWriter::new();
		match payload {
			Payload::Record(rec) => {
				self.write_record(&mut w, rec)?;
			}
			Payload::Array(arr) => self.write_sequence(&mut w, arr.items())?,
			Payload::List(items) => self.write_sequence(&mut w, items)?,
		}
		Ok(w.finish())
	}

	/// `count:u16, {len:u32, record}*`; dropped records are left out of the count.
	fn write_sequence(&mut self, w: &mut ByteWriter, items: &[BioObject]) -> Result<()> {
		if items.len() > usize::from(u16::MAX) {
			return Err(ByteError::LengthOverflow {
				len: items.len(),
				max: usize::from(u16::MAX),
			}
			.into());
		}
		let at = w.len();
		w.write_u16(0);
		let mut written = 0u16;
		for rec in items {
			if self.write_framed(w, rec)? {
				written += 1;
			}
		}
		w.patch_u16(at, written);
		Ok(())
	}

	/// Writes `len:u32` and the record; returns false if it was dropped.
	fn write_framed(&mut self, w: &mut ByteWriter, rec: &BioObject) -> Result<bool> {
		let mut sub = ByteWriter::new();
		if !self.write_record(&mut sub, rec)? {
			return Ok(false);
		}
		let len = u32::try_from(sub.len()).map_err(|_| ByteError::LengthOverflow {
			len: sub.len(),
			max: u32::MAX as usize,
		})?;
		w.write_u32(len);
		w.write_bytes(sub.as_slice());
		Ok(true)
	}

	/// Writes one record; returns false if it was dropped.
	pub(crate) fn write_record(&mut self, w: &mut ByteWriter, rec: &BioObject) -> Result<bool> {
		if rec.is_ad_hoc() {
			self.write_ad_hoc(w, rec)?;
			return Ok(true);
		}
		let Some(dict) = self.registry.try_get(rec.dictionary_id()) else {
			self.reject(DictionaryError::DictionaryNotFound(rec.dictionary_id()).into(), Dropped::Record)?;
			return Ok(false);
		};
		let obj = match dict.obj(rec.code()) {
			Ok(obj) => obj,
			Err(err) => {
				self.reject(err.into(), Dropped::Record)?;
				return Ok(false);
			}
		};
		if self.strict {
			check_mandatory(&dict, &obj, rec)?;
		}

		let prev = w.set_width(LengthWidth::for_large(obj.is_large()));
		w.write_u8(rec.dictionary_id());
		w.write_u16(rec.code());
		w.write_u16(obj.current_version());
		for (key, value) in rec.iter() {
			if value.is_expression() {
				continue;
			}
			let Some(tag) = dict.tag_by_name(&obj, key) else {
				let err = ParserError::UnknownTag {
					obj: obj.type_name().to_string(),
					tag: key.to_string(),
				};
				self.reject(err, Dropped::Field)?;
				continue;
			};
			if !tag.is_encodable() {
				continue;
			}
			let ctx = FieldCtx {
				dict: Some(&*dict),
				tag: Some(&*tag),
				name: key,
			};
			let code = tag.code() as u16;
			self.write_field(w, ctx, tag.value_type(), tag.shape(), code, value)?;
		}
		w.set_width(prev);
		Ok(true)
	}

	/// Ad-hoc records: every field is described through the envelope pool.
	fn write_ad_hoc(&mut self, w: &mut ByteWriter, rec: &BioObject) -> Result<()> {
		let prev = w.set_width(LengthWidth::Short);
		w.write_u8(rec.dictionary_id());
		w.write_u16(0);
		w.write_u16(0);
		for (key, value) in rec.iter() {
			let Some(ty) = ad_hoc_type(value) else {
				continue;
			};
			let code = self.pool.code_for(key)?;
			let ctx = FieldCtx {
				dict: None,
				tag: None,
				name: key,
			};
			self.write_field(w, ctx, ty, value.shape(), code, value)?;
		}
		w.set_width(prev);
		Ok(())
	}

	/// Writes `wire:u8, shape:u8, code:u16, payload`, or nothing if the value
	/// cannot be represented.
	fn write_field(
		&mut self,
		w: &mut ByteWriter,
		ctx: FieldCtx<'_>,
		ty: BioType,
		shape: Shape,
		code: u16,
		value: &Value,
	) -> Result<()> {
		let Some(wire) = ty.wire_byte() else {
			return Ok(());
		};
		let mut body = ByteWriter::with_width(w.width());
		let written = match (shape.is_sequence(), value) {
			(true, Value::Records(arr)) if ty == BioType::BioObject || arr.is_empty() => {
				self.write_records(&mut body, arr.items())?;
				true
			}
			(true, Value::Array(items) | Value::List(items)) => {
				self.write_items(&mut body, ctx, ty, items)?;
				true
			}
			(false, _) if value.shape() == Shape::Scalar => {
				self.write_scalar(&mut body, ctx, ty, value, Dropped::Field)?
			}
			_ => {
				self.reject(mismatch(ctx, ty, value), Dropped::Field)?;
				false
			}
		};
		if written {
			w.write_u8(wire);
			w.write_u8(shape.wire_byte());
			w.write_u16(code);
			w.write_bytes(body.as_slice());
		}
		Ok(())
	}

	/// `count, element*`; the count is back-filled to the elements written.
	fn write_items(&mut self, w: &mut ByteWriter, ctx: FieldCtx<'_>, ty: BioType, items: &[Value]) -> Result<()> {
		let at = w.len();
		w.write_len(items.len())?;
		let mut written = 0;
		for item in items {
			if item.is_expression() {
				continue;
			}
			if self.write_scalar(w, ctx, ty, item, Dropped::Element)? {
				written += 1;
			}
		}
		w.patch_len(at, written)?;
		Ok(())
	}

	/// `count, {len:u32, record}*` for a typed record array.
	fn write_records(&mut self, w: &mut ByteWriter, items: &[BioObject]) -> Result<()> {
		let at = w.len();
		w.write_len(items.len())?;
		let mut written = 0;
		for rec in items {
			if self.write_framed(w, rec)? {
				written += 1;
			}
		}
		w.patch_len(at, written)?;
		Ok(())
	}

	/// Writes one value as `ty`; returns false if it was dropped.
	fn write_scalar(
		&mut self,
		w: &mut ByteWriter,
		ctx: FieldCtx<'_>,
		ty: BioType,
		value: &Value,
		what: Dropped,
	) -> Result<bool> {
		match ty {
			BioType::BioObject => match value {
				Value::Object(rec) => self.write_framed(w, rec),
				other => {
					self.reject(mismatch(ctx, ty, other), what)?;
					Ok(false)
				}
			},
			BioType::BioEnum => match self.enum_ordinal(ctx, value)? {
				Some(ordinal) => {
					w.write_i32(ordinal);
					Ok(true)
				}
				None => {
					self.reject(mismatch(ctx, ty, value), what)?;
					Ok(false)
				}
			},
			_ => match value.coerce_to(ty) {
				Some(v) => {
					write_plain(w, &v)?;
					Ok(true)
				}
				None => {
					self.reject(mismatch(ctx, ty, value), what)?;
					Ok(false)
				}
			},
		}
	}

	/// Ordinal of a dictionary enum value.
	///
	/// Constant names are looked up in the tag's referenced enum.
	fn enum_ordinal(&self, ctx: FieldCtx<'_>, value: &Value) -> Result<Option<i32>> {
		match value {
			Value::Enum(e) => Ok(Some(e.ordinal)),
			Value::Integer(i) => Ok(Some(*i)),
			Value::String(name) | Value::UtfString(name) | Value::NativeEnum(name) => {
				let def = ctx
					.tag
					.and_then(TagDef::referenced_enum)
					.and_then(|code| ctx.dict.and_then(|d| d.enum_by_code(code)));
				let Some(def) = def else {
					return Ok(None);
				};
				match def.by_name(name) {
					Some(c) => Ok(Some(c.ordinal)),
					None if self.strict => Err(ParserError::UnknownEnumConstant {
						enum_code: def.code(),
						constant: name.clone(),
					}),
					None => Ok(None),
				}
			}
			_ => Ok(None),
		}
	}
}

/// Strict mode: every mandatory tag must be present.
fn check_mandatory(dict: &Dictionary, obj: &Arc<ObjDef>, rec: &BioObject) -> Result<()> {
	match dict
		.mandatory_tags(obj)
		.into_iter()
		.find(|t| !rec.contains_key(t.name()))
	{
		Some(tag) => Err(ParserError::MissingMandatory {
			obj: obj.type_name().to_string(),
			tag: tag.name().to_string(),
		}),
		None => Ok(()),
	}
}

fn mismatch(ctx: FieldCtx<'_>, expected: BioType, value: &Value) -> ParserError {
	ParserError::TypeMismatch {
		tag: ctx.name.to_string(),
		expected,
		found: value.bio_type(),
	}
}

/// Wire type of an ad-hoc value; `None` for values that never reach the wire.
///
/// Dictionary enums travel by name since no tag links them to a definition.
fn ad_hoc_type(value: &Value) -> Option<BioType> {
	let first = match value.as_sequence() {
		Some(items) => match items.iter().find(|v| !v.is_expression()) {
			Some(item) => item,
			None => return Some(BioType::Unknown),
		},
		None => value,
	};
	match first {
		Value::Expression(_) => None,
		Value::Enum(_) => Some(BioType::UtfString),
		Value::Array(_) | Value::List(_) => None,
		other => Some(other.bio_type()),
	}
}

/// Payload of a value already coerced to its wire type.
fn write_plain(w: &mut ByteWriter, value: &Cow<'_, Value>) -> Result<()> {
	match value.as_ref() {
		Value::Integer(v) => w.write_i32(*v),
		Value::String(s) => w.write_ascii(s)?,
		Value::UtfString(s) | Value::Alias(s) | Value::NativeEnum(s) => w.write_utf(s)?,
		Value::Byte(v) => w.write_i8(*v),
		Value::Short(v) => w.write_i16(*v),
		Value::Boolean(v) => w.write_bool(*v),
		Value::Float(v) => w.write_f32(*v),
		Value::Long(v) => w.write_i64(*v),
		Value::Double(v) => w.write_f64(*v),
		Value::Time(t) => w.write_i64(t.timestamp_millis()),
		Value::Blob(b) | Value::Raw(b) => w.write_blob(b)?,
		other => {
			return Err(ParserError::Unsupported(format!(
				"plain value of kind {}",
				other.bio_type()
			)));
		}
	}
	Ok(())
}
