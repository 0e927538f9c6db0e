//! Binary decode path.
//!
//! Fields whose tag the reader's schema does not know are skipped using
//! their wire type and shape alone, so newer writers stay readable.

use bio_dictionary::{
	AD_HOC_CODE, BioObject, Dictionary, DictionaryError, DictionaryRegistry, Factory, RecordArray, TagDef, Value,
};
use bio_primitives::{BioType, ByteReader, LengthWidth, Shape};
use chrono::DateTime;
use tracing::debug;

use crate::codec::{CodecStats, Dropped};
use crate::error::{ParserError, Result};
use crate::pool::PoolNames;

#[derive(Clone, Copy)]
struct FieldCtx<'a> {
	dict: Option<&'a Dictionary>,
	tag: Option<&'a TagDef>,
}

impl FieldCtx<'_> {
	const AD_HOC: FieldCtx<'static> = FieldCtx { dict: None, tag: None };
}

/// One decode call.
pub(crate) struct Decoder<'a> {
	registry: &'a DictionaryRegistry,
	strict: bool,
	stats: &'a CodecStats,
	pool: &'a PoolNames,
}

fn read_header(r: &mut ByteReader<'_>) -> Result<(BioType, Shape, u16)> {
	let wire = r.read_u8()?;
	let ty = BioType::from_wire(wire).ok_or(ParserError::UnknownWireType(wire))?;
	let shape_byte = r.read_u8()?;
	let shape = Shape::from_wire(shape_byte).ok_or(ParserError::UnknownShape(shape_byte))?;
	Ok((ty, shape, r.read_u16()?))
}

fn skip_scalar(r: &mut ByteReader<'_>, ty: BioType) -> Result<()> {
	if ty == BioType::BioObject {
		let len = r.read_u32()? as usize;
		return Ok(r.skip(len)?);
	}
	if let Some(width) = ty.fixed_width() {
		return Ok(r.skip(width)?);
	}
	if ty.is_length_prefixed() {
		let len = r.read_len()?;
		return Ok(r.skip(len)?);
	}
	Err(ParserError::Unsupported(format!("cannot skip a value of kind {ty}")))
}

/// Reads past a field's payload without interpreting it.
fn skip_value(r: &mut ByteReader<'_>, ty: BioType, shape: Shape) -> Result<()> {
	if !shape.is_sequence() {
		return skip_scalar(r, ty);
	}
	let count = r.read_len()?;
	for _ in 0..count {
		skip_scalar(r, ty)?;
	}
	Ok(())
}

impl<'a> Decoder<'a> {
	pub(crate) fn new(
		registry: &'a DictionaryRegistry,
		strict: bool,
		stats: &'a CodecStats,
		pool: &'a PoolNames,
	) -> Self {
		Self {
			registry,
			strict,
			stats,
			pool,
		}
	}

	fn reject(&self, err: ParserError, what: Dropped) -> Result<()> {
		if self.strict {
			return Err(err);
		}
		debug!(error = %err, ?what, "dropped while decoding");
		self.stats.count(what);
		Ok(())
	}

	/// `count:u16, {len:u32, record}*`.
	pub(crate) fn decode_sequence(&self, r: &mut ByteReader<'_>) -> Result<Vec<BioObject>> {
		let count = usize::from(r.read_u16()?);
		let mut out = Vec::with_capacity(count.min(r.available() / 4));
		for _ in 0..count {
			if let Some(rec) = self.read_framed(r)? {
				out.push(rec);
			}
		}
		Ok(out)
	}

	fn read_framed(&self, r: &mut ByteReader<'_>) -> Result<Option<BioObject>> {
		let len = r.read_u32()? as usize;
		let mut sub = r.sub_reader(len)?;
		self.read_record(&mut sub)
	}

	/// Reads one record spanning the rest of `r`.
	///
	/// Returns `None` when the record's dictionary or object is unknown under
	/// lenient validation.
	pub(crate) fn read_record(&self, r: &mut ByteReader<'_>) -> Result<Option<BioObject>> {
		let dictionary_id = r.read_u8()?;
		let code = r.read_u16()?;
		let version = r.read_u16()?;
		if code == AD_HOC_CODE {
			return self.read_ad_hoc(r, dictionary_id, version).map(Some);
		}
		let Some(dict) = self.registry.try_get(dictionary_id) else {
			self.reject(DictionaryError::DictionaryNotFound(dictionary_id).into(), Dropped::Record)?;
			return Ok(None);
		};
		let obj = match dict.obj(code) {
			Ok(obj) => obj,
			Err(err) => {
				self.reject(err.into(), Dropped::Record)?;
				return Ok(None);
			}
		};

		r.set_width(LengthWidth::for_large(obj.is_large()));
		let mut rec = Factory::record_of(&obj);
		rec.set_version(version)?;
		while r.available() > 0 {
			let (ty, shape, raw_code) = read_header(r)?;
			let tag_code = raw_code as i16;
			let Some(tag) = dict.tag_by_code(&obj, tag_code) else {
				let err = ParserError::UnknownTagCode {
					obj: obj.type_name().to_string(),
					code: tag_code,
				};
				self.reject(err, Dropped::Field)?;
				skip_value(r, ty, shape)?;
				continue;
			};
			let ctx = FieldCtx {
				dict: Some(&*dict),
				tag: Some(&*tag),
			};
			let Some(value) = self.read_value(r, ctx, ty, shape)? else {
				continue;
			};
			if let Some(value) = self.conform(&tag, ty, value)? {
				rec.set(tag.name(), value)?;
			}
		}
		Ok(Some(rec))
	}

	fn read_ad_hoc(&self, r: &mut ByteReader<'_>, dictionary_id: u8, version: u16) -> Result<BioObject> {
		r.set_width(LengthWidth::Short);
		let mut rec = BioObject::with_code(dictionary_id, AD_HOC_CODE);
		rec.set_version(version)?;
		while r.available() > 0 {
			let (ty, shape, code) = read_header(r)?;
			let name = self.pool.name(code)?;
			if let Some(value) = self.read_value(r, FieldCtx::AD_HOC, ty, shape)? {
				rec.set(name, value)?;
			}
		}
		Ok(rec)
	}

	fn read_value(&self, r: &mut ByteReader<'_>, ctx: FieldCtx<'_>, ty: BioType, shape: Shape) -> Result<Option<Value>> {
		if !shape.is_sequence() {
			return self.read_scalar(r, ctx, ty, Dropped::Field);
		}
		let count = r.read_len()?;
		if ty == BioType::BioObject && shape == Shape::Array {
			return self.read_records(r, ctx, count).map(|arr| Some(Value::Records(arr)));
		}
		let mut items = Vec::with_capacity(count.min(r.available()));
		for _ in 0..count {
			if let Some(item) = self.read_scalar(r, ctx, ty, Dropped::Element)? {
				items.push(item);
			}
		}
		Ok(Some(match shape {
			Shape::List => Value::List(items),
			_ => Value::Array(items),
		}))
	}

	/// Seeded with the tag's declared object type, then narrowed to the common
	/// type of the records actually read.
	fn read_records(&self, r: &mut ByteReader<'_>, ctx: FieldCtx<'_>, count: usize) -> Result<RecordArray> {
		let capacity = count.min(r.available() / 4);
		let declared = ctx
			.tag
			.and_then(TagDef::referenced_obj)
			.and_then(|code| ctx.dict?.obj_by_code(code));
		let mut arr = declared
			.and_then(|obj| Factory::array_of(&obj, capacity))
			.unwrap_or_else(|| RecordArray::typed(None, capacity));
		for _ in 0..count {
			if let Some(rec) = self.read_framed(r)? {
				arr.push(rec);
			}
		}
		arr.narrow();
		Ok(arr)
	}

	fn read_scalar(&self, r: &mut ByteReader<'_>, ctx: FieldCtx<'_>, ty: BioType, what: Dropped) -> Result<Option<Value>> {
		let value = match ty {
			BioType::Integer => Value::Integer(r.read_i32()?),
			BioType::String => Value::String(r.read_ascii()?),
			BioType::UtfString => Value::UtfString(r.read_utf()?),
			BioType::Byte => Value::Byte(r.read_i8()?),
			BioType::Short => Value::Short(r.read_i16()?),
			BioType::Boolean => Value::Boolean(r.read_bool()?),
			BioType::Float => Value::Float(r.read_f32()?),
			BioType::Long => Value::Long(r.read_i64()?),
			BioType::Double => Value::Double(r.read_f64()?),
			BioType::Time => {
				let ms = r.read_i64()?;
				Value::Time(DateTime::from_timestamp_millis(ms).ok_or(ParserError::InvalidTime(ms))?)
			}
			BioType::JavaObject => Value::Blob(r.read_blob()?.to_vec()),
			BioType::Raw => Value::Raw(r.read_blob()?.to_vec()),
			BioType::Alias => Value::Alias(r.read_utf()?),
			BioType::JavaEnum => Value::NativeEnum(r.read_utf()?),
			BioType::BioObject => return Ok(self.read_framed(r)?.map(Value::Object)),
			BioType::BioEnum => return self.read_enum(r, ctx, what),
			BioType::Unknown | BioType::Dynamic | BioType::Conditional | BioType::Formatted => {
				return Err(ParserError::Unsupported(format!("value of kind {ty}")));
			}
		};
		Ok(Some(value))
	}

	/// Ordinal resolved against the tag's enum; bare integers without one.
	fn read_enum(&self, r: &mut ByteReader<'_>, ctx: FieldCtx<'_>, what: Dropped) -> Result<Option<Value>> {
		let ordinal = r.read_i32()?;
		let def = ctx
			.tag
			.and_then(TagDef::referenced_enum)
			.and_then(|code| ctx.dict.and_then(|d| d.enum_by_code(code)));
		let Some(def) = def else {
			return Ok(Some(Value::Integer(ordinal)));
		};
		match def.value(ordinal) {
			Some(v) => Ok(Some(Value::Enum(v))),
			None => {
				let err = ParserError::UnknownEnumConstant {
					enum_code: def.code(),
					constant: ordinal.to_string(),
				};
				self.reject(err, what)?;
				Ok(None)
			}
		}
	}

	/// Converts a value read as wire type `ty` to the tag's declared type.
	fn conform(&self, tag: &TagDef, ty: BioType, value: Value) -> Result<Option<Value>> {
		let expected = tag.value_type();
		let shape_ok = value.shape().is_sequence() == tag.shape().is_sequence();
		if ty == expected && shape_ok {
			return Ok(Some(value));
		}
		let converted = if !shape_ok || matches!(expected, BioType::BioObject | BioType::BioEnum) {
			None
		} else {
			match value {
				Value::Array(ref items) | Value::List(ref items) => items
					.iter()
					.map(|v| v.coerce_to(expected).map(|c| c.into_owned()))
					.collect::<Option<Vec<_>>>()
					.map(|items| match value.shape() {
						Shape::List => Value::List(items),
						_ => Value::Array(items),
					}),
				ref scalar => scalar.coerce_to(expected).map(|c| c.into_owned()),
			}
		};
		match converted {
			Some(v) => Ok(Some(v)),
			None => {
				let err = ParserError::TypeMismatch {
					tag: tag.name().to_string(),
					expected,
					found: ty,
				};
				self.reject(err, Dropped::Field)?;
				Ok(None)
			}
		}
	}
}
