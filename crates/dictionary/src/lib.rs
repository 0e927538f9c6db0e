//! Schema dictionaries and the dynamically typed record model.
//!
//! Records ([`BioObject`]) are ordered key/value maps whose shape is described
//! by object, tag, enum and super-tag definitions held in a [`Dictionary`].
//! Dictionaries live in a [`DictionaryRegistry`], are filled by
//! [`SchemaLoader`]s and must be [validated](Dictionary::validate) before a
//! codec reads them.

pub mod dictionary;
pub mod error;
pub mod factory;
pub mod native;
pub mod record;
pub mod schema;
pub mod value;

pub use dictionary::{Dictionary, DictionaryRegistry, SchemaLoader, TagPath, ValidationReport};
pub use error::{DictionaryError, ImmutableError, NamespaceKind, Result};
pub use factory::Factory;
pub use native::{Initializer, NativeType, narrowest_common_type};
pub use record::{AD_HOC_CODE, BioObject, RecordArray};
pub use schema::{EnumConstant, EnumDef, FuncDef, InsertAction, ObjDef, TagDef, TypeRef};
pub use value::{EnumValue, Expression, Value};
