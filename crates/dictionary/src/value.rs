//! Dynamically typed field values.

use std::borrow::Cow;

use bio_primitives::{BioType, Shape};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{BioObject, RecordArray};

/// A constant of a dictionary enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
	/// Code of the owning enum definition.
	pub enum_code: u16,
	/// Wire ordinal of the constant.
	pub ordinal: i32,
	/// Constant name.
	pub name: String,
}

/// An unevaluated schema-time expression.
///
/// Placeholders are never written to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
	/// Expression source text.
	pub source: String,
}

impl Expression {
	pub fn new(source: impl Into<String>) -> Self {
		Self { source: source.into() }
	}
}

/// A record field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
	Integer(i32),
	/// Text restricted to one byte per char on the wire.
	String(String),
	UtfString(String),
	Byte(i8),
	Short(i16),
	Boolean(bool),
	Float(f32),
	Long(i64),
	Double(f64),
	/// Millisecond precision on the wire.
	Time(DateTime<Utc>),
	/// Opaque application blob.
	Blob(Vec<u8>),
	Raw(Vec<u8>),
	Object(BioObject),
	/// Name of another field.
	Alias(String),
	/// Native enum constant name.
	NativeEnum(String),
	Enum(EnumValue),
	Array(Vec<Value>),
	List(Vec<Value>),
	/// Array of records typed by their common native type.
	Records(RecordArray),
	Expression(Expression),
}

impl Value {
	/// Returns true for unresolved expression placeholders.
	#[inline]
	pub fn is_expression(&self) -> bool {
		matches!(self, Value::Expression(_))
	}

	/// Shape implied by the variant.
	pub fn shape(&self) -> Shape {
		match self {
			Value::Array(_) | Value::Records(_) => Shape::Array,
			Value::List(_) => Shape::List,
			_ => Shape::Scalar,
		}
	}

	/// Items of an array or list. Typed record arrays answer through
	/// [`Value::as_records`] instead.
	pub fn as_sequence(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) | Value::List(items) => Some(items),
			_ => None,
		}
	}

	/// Records of a typed record array.
	pub fn as_records(&self) -> Option<&RecordArray> {
		match self {
			Value::Records(arr) => Some(arr),
			_ => None,
		}
	}

	/// Kind of a scalar value; sequences report their first element's kind.
	///
	/// Empty sequences and expressions report [`BioType::Unknown`].
	pub fn bio_type(&self) -> BioType {
		match self {
			Value::Integer(_) => BioType::Integer,
			Value::String(_) => BioType::String,
			Value::UtfString(_) => BioType::UtfString,
			Value::Byte(_) => BioType::Byte,
			Value::Short(_) => BioType::Short,
			Value::Boolean(_) => BioType::Boolean,
			Value::Float(_) => BioType::Float,
			Value::Long(_) => BioType::Long,
			Value::Double(_) => BioType::Double,
			Value::Time(_) => BioType::Time,
			Value::Blob(_) => BioType::JavaObject,
			Value::Raw(_) => BioType::Raw,
			Value::Object(_) => BioType::BioObject,
			Value::Alias(_) => BioType::Alias,
			Value::NativeEnum(_) => BioType::JavaEnum,
			Value::Enum(_) => BioType::BioEnum,
			Value::Array(items) | Value::List(items) => {
				items.first().map_or(BioType::Unknown, Value::bio_type)
			}
			Value::Records(arr) if arr.is_empty() => BioType::Unknown,
			Value::Records(_) => BioType::BioObject,
			Value::Expression(_) => BioType::Unknown,
		}
	}

	fn as_i64(&self) -> Option<i64> {
		match *self {
			Value::Integer(v) => Some(v.into()),
			Value::Byte(v) => Some(v.into()),
			Value::Short(v) => Some(v.into()),
			Value::Long(v) => Some(v),
			_ => None,
		}
	}

	fn as_f64(&self) -> Option<f64> {
		match *self {
			Value::Float(v) => Some(v.into()),
			Value::Double(v) => Some(v),
			_ => self.as_i64().map(|v| v as f64),
		}
	}

	fn as_text(&self) -> Option<&str> {
		match self {
			Value::String(s) | Value::UtfString(s) | Value::Alias(s) | Value::NativeEnum(s) => Some(s),
			Value::Enum(e) => Some(&e.name),
			_ => None,
		}
	}

	/// Converts a scalar to `ty` when the two kinds are compatible.
	///
	/// Integral kinds convert when the value fits, integral and single
	/// precision values widen to floating point, text kinds convert among
	/// themselves, `Time` and `Long` convert via epoch milliseconds and the two
	/// blob kinds are interchangeable. Anything else yields `None`; that
	/// includes text with non-ASCII chars bound for [`BioType::String`].
	pub fn coerce_to(&self, ty: BioType) -> Option<Cow<'_, Value>> {
		if ty == BioType::String && !self.as_text().is_some_and(str::is_ascii) {
			return None;
		}
		if self.bio_type() == ty && !matches!(self, Value::Array(_) | Value::List(_) | Value::Records(_)) {
			return Some(Cow::Borrowed(self));
		}
		let converted = match ty {
			BioType::Integer => Value::Integer(i32::try_from(self.as_i64()?).ok()?),
			BioType::Short => Value::Short(i16::try_from(self.as_i64()?).ok()?),
			BioType::Byte => Value::Byte(i8::try_from(self.as_i64()?).ok()?),
			BioType::Long => match self {
				Value::Time(t) => Value::Long(t.timestamp_millis()),
				_ => Value::Long(self.as_i64()?),
			},
			BioType::Double => Value::Double(self.as_f64()?),
			BioType::Float => match self {
				Value::Double(_) | Value::Long(_) => return None,
				_ => Value::Float(self.as_f64()? as f32),
			},
			BioType::String => Value::String(self.as_text()?.to_owned()),
			BioType::UtfString => Value::UtfString(self.as_text()?.to_owned()),
			BioType::Alias => Value::Alias(self.as_text()?.to_owned()),
			BioType::JavaEnum => Value::NativeEnum(self.as_text()?.to_owned()),
			BioType::Time => match *self {
				Value::Long(ms) => Value::Time(DateTime::from_timestamp_millis(ms)?),
				_ => return None,
			},
			BioType::JavaObject => match self {
				Value::Raw(b) => Value::Blob(b.clone()),
				_ => return None,
			},
			BioType::Raw => match self {
				Value::Blob(b) => Value::Raw(b.clone()),
				_ => return None,
			},
			_ => return None,
		};
		Some(Cow::Owned(converted))
	}
}

/// Scalars compare by value; `String` and `UtfString` compare by text and
/// `Time` compares at millisecond precision. A typed record array equals a
/// plain array holding the same records.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		use Value::*;
		match (self, other) {
			(String(a) | UtfString(a), String(b) | UtfString(b)) => a == b,
			(Integer(a), Integer(b)) => a == b,
			(Byte(a), Byte(b)) => a == b,
			(Short(a), Short(b)) => a == b,
			(Boolean(a), Boolean(b)) => a == b,
			(Float(a), Float(b)) => a == b,
			(Long(a), Long(b)) => a == b,
			(Double(a), Double(b)) => a == b,
			(Time(a), Time(b)) => a.timestamp_millis() == b.timestamp_millis(),
			(Blob(a), Blob(b)) | (Raw(a), Raw(b)) => a == b,
			(Object(a), Object(b)) => a == b,
			(Alias(a), Alias(b)) | (NativeEnum(a), NativeEnum(b)) => a == b,
			(Enum(a), Enum(b)) => a == b,
			(Array(a), Array(b)) | (List(a), List(b)) => a == b,
			(Records(a), Records(b)) => a == b,
			(Records(arr), Array(items)) | (Array(items), Records(arr)) => {
				arr.len() == items.len()
					&& arr
						.items()
						.iter()
						.zip(items)
						.all(|(rec, v)| matches!(v, Object(o) if o == rec))
			}
			(Expression(a), Expression(b)) => a == b,
			_ => false,
		}
	}
}

macro_rules! impl_from_scalar {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$ty> for Value {
				fn from(v: $ty) -> Self {
					Value::$variant(v)
				}
			}
		)*
	};
}

impl_from_scalar! {
	i32 => Integer,
	i8 => Byte,
	i16 => Short,
	bool => Boolean,
	f32 => Float,
	i64 => Long,
	f64 => Double,
	BioObject => Object,
	RecordArray => Records,
	EnumValue => Enum,
	Expression => Expression,
}

/// Truncates to the millisecond, the precision the wire keeps.
impl From<DateTime<Utc>> for Value {
	fn from(t: DateTime<Utc>) -> Self {
		Value::Time(t.trunc_subsecs(3))
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::UtfString(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::UtfString(v)
	}
}
