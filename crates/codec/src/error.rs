//! Codec failures.

use bio_dictionary::{DictionaryError, ImmutableError};
use bio_primitives::{BioType, ByteError};
use thiserror::Error;

/// Error returned by pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure raised while encoding or decoding.
///
/// Lower-level failures are wrapped with their original cause as the source.
#[derive(Debug, Error)]
pub enum ParserError {
	/// Truncated or malformed bytes.
	#[error(transparent)]
	Bytes(#[from] ByteError),

	/// Unknown dictionary or object under strict validation.
	#[error(transparent)]
	Dictionary(#[from] DictionaryError),

	/// A decoded value could not be stored on a sealed record.
	#[error(transparent)]
	Immutable(#[from] ImmutableError),

	#[error("compression failed")]
	Compression(#[source] BoxError),

	#[error("encryption failed")]
	Encryption(#[source] BoxError),

	#[error("text codec failed")]
	Text(#[source] BoxError),

	/// The encrypter rejected its configuration.
	#[error("encrypter rejected its configuration")]
	EncrypterInit,

	/// The envelope asks for a collaborator that is not installed.
	#[error("no {0} installed")]
	MissingCollaborator(&'static str),

	/// Input shape the codec cannot represent.
	#[error("unsupported payload: {0}")]
	Unsupported(String),

	/// Strict mode: a record field names no tag of its object.
	#[error("object {obj:?} has no tag {tag:?}")]
	UnknownTag { obj: String, tag: String },

	/// Strict mode: a wire field carries a tag code its object does not know.
	#[error("object {obj:?} has no tag with code {code}")]
	UnknownTagCode { obj: String, code: i16 },

	/// Strict mode: a record lacks a mandatory field.
	#[error("object {obj:?} is missing mandatory tag {tag:?}")]
	MissingMandatory { obj: String, tag: String },

	/// A value cannot be represented as its tag's type.
	#[error("tag {tag:?} expects {expected} but the value is {found}")]
	TypeMismatch {
		tag: String,
		expected: BioType,
		found: BioType,
	},

	/// A dictionary enum has no such constant.
	#[error("enum {enum_code} has no constant {constant}")]
	UnknownEnumConstant { enum_code: u16, constant: String },

	#[error("unknown wire type byte {0}")]
	UnknownWireType(u8),

	#[error("unknown shape byte {0}")]
	UnknownShape(u8),

	#[error("unknown envelope flag bits {0:#04x}")]
	BadFlags(u8),

	/// Ad-hoc field names travel as one byte per char.
	#[error("ad-hoc field name {0:?} is not ASCII")]
	NonAsciiName(String),

	/// The ad-hoc pool ran out of codes.
	#[error("ad-hoc tag pool exceeds {max} names")]
	PoolOverflow { max: usize },

	/// An ad-hoc field refers to a code missing from the envelope's pool.
	#[error("ad-hoc tag code {0} is not in the envelope pool")]
	UnknownPoolCode(u16),

	#[error("decompressed {actual} bytes, envelope declared {expected}")]
	LengthMismatch { expected: usize, actual: usize },

	#[error("time value {0} ms is out of range")]
	InvalidTime(i64),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, ParserError>;
