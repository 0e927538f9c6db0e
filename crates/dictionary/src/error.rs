//! Error types for schema registration and record mutation.

use std::fmt;

use thiserror::Error;

/// The independent namespaces a dictionary owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
	/// Object definitions.
	Object,
	/// Enum definitions.
	Enum,
	/// Dictionary-level tags.
	SuperTag,
}

impl fmt::Display for NamespaceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NamespaceKind::Object => write!(f, "object"),
			NamespaceKind::Enum => write!(f, "enum"),
			NamespaceKind::SuperTag => write!(f, "super-tag"),
		}
	}
}

/// Schema registration and lookup failures.
///
/// Registration errors are fatal to the load phase: a dictionary that raised
/// one must not be used for encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
	/// No dictionary exists under this id.
	#[error("dictionary {0} not found")]
	DictionaryNotFound(u8),

	/// A code is already bound to a different name.
	#[error(
		"dictionary {dictionary_id}: {kind} code {code} is registered as {existing_name:?}, cannot register it as {new_name:?}"
	)]
	CodeConflict {
		dictionary_id: u8,
		kind: NamespaceKind,
		code: i32,
		existing_name: String,
		new_name: String,
	},

	/// A name is already bound to a different code.
	#[error(
		"dictionary {dictionary_id}: {kind} {name:?} is registered with code {existing_code}, cannot register it with code {new_code}"
	)]
	NameConflict {
		dictionary_id: u8,
		kind: NamespaceKind,
		name: String,
		existing_code: i32,
		new_code: i32,
	},

	/// An object display name is already bound to a different object code.
	#[error(
		"dictionary {dictionary_id}: display name {name:?} belongs to object code {existing_code}, cannot give it to code {new_code}"
	)]
	DisplayNameConflict {
		dictionary_id: u8,
		name: String,
		existing_code: u16,
		new_code: u16,
	},

	/// Same code and name, but the new definition does not upgrade the old one.
	#[error(
		"dictionary {dictionary_id}: {kind} {name:?} (code {code}) re-registered with incompatible type {new} (was {existing})"
	)]
	IncompatibleUpgrade {
		dictionary_id: u8,
		kind: NamespaceKind,
		code: i32,
		name: String,
		existing: String,
		new: String,
	},

	/// A tag code inside an object is already bound to a different name.
	#[error("object {obj:?}: tag code {code} is registered as {existing_name:?}, cannot register it as {new_name:?}")]
	TagCodeConflict {
		obj: String,
		code: i16,
		existing_name: String,
		new_name: String,
	},

	/// A tag name inside an object is already bound to a different code.
	#[error("object {obj:?}: tag {name:?} is registered with code {existing_code}, cannot register it with code {new_code}")]
	TagNameConflict {
		obj: String,
		name: String,
		existing_code: i16,
		new_code: i16,
	},

	/// An enum constant collides with another constant of the same enum.
	#[error("enum {enum_name:?}: constant {name:?} (ordinal {ordinal}) conflicts with an existing constant")]
	ConstantConflict {
		enum_name: String,
		name: String,
		ordinal: i32,
	},

	/// Super-tag codes must be negative.
	#[error("super-tag {name:?} must have a negative code, got {code}")]
	SuperTagCode { name: String, code: i16 },

	/// Object tag codes must not be negative.
	#[error("object {obj:?}: tag {name:?} must have a non-negative code, got {code}")]
	TagCode { obj: String, name: String, code: i16 },

	/// Object code 0 marks ad-hoc records and cannot be registered.
	#[error("object code 0 is reserved for ad-hoc records, cannot register {type_name:?}")]
	ReservedObjCode { type_name: String },

	/// No object with this code exists in the dictionary.
	#[error("dictionary {dictionary_id}: object code {code} not found")]
	ObjNotFound { dictionary_id: u8, code: u16 },

	/// An object names a parent that was never registered.
	#[error("dictionary {dictionary_id}: object {obj:?} names missing parent code {parent}")]
	ParentNotFound {
		dictionary_id: u8,
		obj: String,
		parent: u16,
	},

	/// An object's parent chain loops back on itself.
	#[error("dictionary {dictionary_id}: parent chain of object {obj:?} is cyclic")]
	ParentCycle { dictionary_id: u8, obj: String },

	/// A function name is already bound to a different signature.
	#[error("dictionary {dictionary_id}: function {name:?} is already registered with a different signature")]
	FuncConflict { dictionary_id: u8, name: String },

	/// A native initializer sealed a record before its defaults were applied.
	#[error(transparent)]
	Immutable(#[from] ImmutableError),
}

/// Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, DictionaryError>;

/// A mutation was attempted on a sealed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record (code {code}) is immutable: cannot {operation}{}", key.as_ref().map(|k| format!(" {k:?}")).unwrap_or_default())]
pub struct ImmutableError {
	/// Object code of the sealed record.
	pub code: u16,
	/// The rejected operation.
	pub operation: &'static str,
	/// Key the operation targeted, if any.
	pub key: Option<String>,
}
