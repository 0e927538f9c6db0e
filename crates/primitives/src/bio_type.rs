use std::fmt;

/// Closed set of tag value kinds.
///
/// Every kind that can travel on the wire owns a stable byte (see
/// [`BioType::wire_byte`]). `Dynamic`, `Conditional` and `Formatted` only exist
/// at the schema level and are never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BioType {
	/// 32-bit signed integer.
	Integer,
	/// Single-byte-per-char string.
	String,
	/// UTF-8 string.
	UtfString,
	/// 8-bit signed integer.
	Byte,
	/// 16-bit signed integer.
	Short,
	/// Boolean stored as one byte.
	Boolean,
	/// IEEE 754 single precision.
	Float,
	/// 64-bit signed integer.
	Long,
	/// IEEE 754 double precision.
	Double,
	/// Timestamp as epoch milliseconds.
	Time,
	/// Opaque application blob.
	JavaObject,
	/// Uninterpreted bytes.
	Raw,
	/// Nested record.
	BioObject,
	/// Name of another field.
	Alias,
	/// Native enum constant carried by name.
	JavaEnum,
	/// Dictionary enum constant carried by ordinal.
	BioEnum,
	/// Kind could not be determined.
	Unknown,
	/// Schema-only: value type chosen at runtime.
	Dynamic,
	/// Schema-only: value computed from a condition.
	Conditional,
	/// Schema-only: value produced by a formatter.
	Formatted,
}

impl BioType {
	/// All kinds that have a wire byte, in wire order.
	pub const WIRE: [BioType; 17] = [
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
		BioType::Unknown,
	];

	/// Returns the wire byte, or `None` for schema-only kinds.
	pub const fn wire_byte(self) -> Option<u8> {
		Some(match self {
			BioType::Integer => 0,
			BioType::String => 1,
			BioType::UtfString => 2,
			BioType::Byte => 3,
			BioType::Short => 4,
			BioType::Boolean => 5,
			BioType::Float => 6,
			BioType::Long => 7,
			BioType::Double => 8,
			BioType::Time => 9,
			BioType::JavaObject => 10,
			BioType::Raw => 11,
			BioType::BioObject => 12,
			BioType::Alias => 13,
			BioType::JavaEnum => 15,
			BioType::BioEnum => 16,
			BioType::Unknown => 17,
			BioType::Dynamic | BioType::Conditional | BioType::Formatted => return None,
		})
	}

	/// Maps a wire byte back to its kind.
	pub const fn from_wire(byte: u8) -> Option<Self> {
		Some(match byte {
			0 => BioType::Integer,
			1 => BioType::String,
			2 => BioType::UtfString,
			3 => BioType::Byte,
			4 => BioType::Short,
			5 => BioType::Boolean,
			6 => BioType::Float,
			7 => BioType::Long,
			8 => BioType::Double,
			9 => BioType::Time,
			10 => BioType::JavaObject,
			11 => BioType::Raw,
			12 => BioType::BioObject,
			13 => BioType::Alias,
			15 => BioType::JavaEnum,
			16 => BioType::BioEnum,
			17 => BioType::Unknown,
			_ => return None,
		})
	}

	/// Returns true if this kind can be serialized.
	#[inline]
	pub const fn is_wire(self) -> bool {
		self.wire_byte().is_some()
	}

	/// Payload width for fixed-size kinds.
	///
	/// Length-prefixed kinds, nested records and non-wire kinds return `None`.
	pub const fn fixed_width(self) -> Option<usize> {
		match self {
			BioType::Byte | BioType::Boolean => Some(1),
			BioType::Short => Some(2),
			BioType::Integer | BioType::Float | BioType::BioEnum => Some(4),
			BioType::Long | BioType::Double | BioType::Time => Some(8),
			_ => None,
		}
	}

	/// Returns true for kinds whose payload is `length, bytes`.
	pub const fn is_length_prefixed(self) -> bool {
		matches!(
			self,
			BioType::String
				| BioType::UtfString
				| BioType::JavaObject
				| BioType::Raw
				| BioType::Alias
				| BioType::JavaEnum
		)
	}

	/// Returns true for the integral and floating point kinds.
	pub const fn is_numeric(self) -> bool {
		matches!(
			self,
			BioType::Integer
				| BioType::Byte
				| BioType::Short
				| BioType::Long
				| BioType::Float
				| BioType::Double
		)
	}

	/// Human-readable kind name.
	pub const fn name(self) -> &'static str {
		match self {
			BioType::Integer => "Integer",
			BioType::String => "String",
			BioType::UtfString => "UtfString",
			BioType::Byte => "Byte",
			BioType::Short => "Short",
			BioType::Boolean => "Boolean",
			BioType::Float => "Float",
			BioType::Long => "Long",
			BioType::Double => "Double",
			BioType::Time => "Time",
			BioType::JavaObject => "JavaObject",
			BioType::Raw => "Raw",
			BioType::BioObject => "BioObject",
			BioType::Alias => "Alias",
			BioType::JavaEnum => "JavaEnum",
			BioType::BioEnum => "BioEnum",
			BioType::Unknown => "Unknown",
			BioType::Dynamic => "Dynamic",
			BioType::Conditional => "Conditional",
			BioType::Formatted => "Formatted",
		}
	}
}

impl fmt::Display for BioType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Field cardinality as encoded in the field header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
	/// A single value.
	#[default]
	Scalar,
	/// A fixed sequence of values.
	Array,
	/// A growable sequence of values.
	List,
}

impl Shape {
	/// Returns the wire byte.
	#[inline]
	pub const fn wire_byte(self) -> u8 {
		match self {
			Shape::Scalar => 0,
			Shape::Array => 1,
			Shape::List => 2,
		}
	}

	/// Maps a wire byte back to its shape.
	pub const fn from_wire(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Shape::Scalar),
			1 => Some(Shape::Array),
			2 => Some(Shape::List),
			_ => None,
		}
	}

	/// Returns true for arrays and lists.
	#[inline]
	pub const fn is_sequence(self) -> bool {
		!matches!(self, Shape::Scalar)
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Shape::Scalar => f.write_str("scalar"),
			Shape::Array => f.write_str("array"),
			Shape::List => f.write_str("list"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_wire_bytes_are_stable() {
		for ty in BioType::WIRE {
			let byte = ty.wire_byte().expect("wire kind has a byte");
			assert_eq!(BioType::from_wire(byte), Some(ty));
		}
		assert_eq!(BioType::JavaEnum.wire_byte(), Some(15));
		assert_eq!(BioType::from_wire(14), None);
	}

	#[test]
	fn test_schema_only_kinds_have_no_wire_byte() {
		assert!(!BioType::Dynamic.is_wire());
		assert!(!BioType::Conditional.is_wire());
		assert!(!BioType::Formatted.is_wire());
	}

	#[test]
	fn test_shape_bytes() {
		assert_eq!(Shape::from_wire(2), Some(Shape::List));
		assert_eq!(Shape::from_wire(3), None);
		assert!(Shape::Array.is_sequence());
	}
}
