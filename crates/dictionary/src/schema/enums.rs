use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::{DictionaryError, Result};
use crate::native::NativeType;
use crate::value::EnumValue;

/// One constant of an enum definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
	/// Wire ordinal.
	pub ordinal: i32,
	pub name: String,
}

/// Schema definition of a dictionary enum.
#[derive(Debug, Clone)]
pub struct EnumDef {
	dictionary_id: u8,
	code: u16,
	type_name: String,
	native_type: Option<Arc<NativeType>>,
	by_ordinal: IndexMap<i32, EnumConstant, FxBuildHasher>,
	by_name: FxHashMap<String, i32>,
}

impl EnumDef {
	pub fn new(code: u16, type_name: impl Into<String>) -> Self {
		Self {
			dictionary_id: 0,
			code,
			type_name: type_name.into(),
			native_type: None,
			by_ordinal: IndexMap::default(),
			by_name: FxHashMap::default(),
		}
	}

	pub fn native(mut self, ty: &Arc<NativeType>) -> Self {
		self.native_type = Some(Arc::clone(ty));
		self
	}

	/// Builder form of [`EnumDef::add_constant`].
	pub fn with_constant(mut self, ordinal: i32, name: impl Into<String>) -> Result<Self> {
		self.add_constant(ordinal, name)?;
		Ok(self)
	}

	/// Adds a constant. Ordinals and names are unique within the enum.
	pub fn add_constant(&mut self, ordinal: i32, name: impl Into<String>) -> Result<()> {
		let name = name.into();
		match (self.by_ordinal.get(&ordinal), self.by_name.get(&name)) {
			(Some(c), _) if c.name == name => return Ok(()),
			(None, None) => {}
			_ => {
				return Err(DictionaryError::ConstantConflict {
					enum_name: self.type_name.clone(),
					name,
					ordinal,
				});
			}
		}
		self.by_name.insert(name.clone(), ordinal);
		self.by_ordinal.insert(ordinal, EnumConstant { ordinal, name });
		Ok(())
	}

	#[inline]
	pub fn dictionary_id(&self) -> u8 {
		self.dictionary_id
	}

	#[inline]
	pub fn code(&self) -> u16 {
		self.code
	}

	#[inline]
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	pub fn native_type(&self) -> Option<&Arc<NativeType>> {
		self.native_type.as_ref()
	}

	pub fn by_ordinal(&self, ordinal: i32) -> Option<&EnumConstant> {
		self.by_ordinal.get(&ordinal)
	}

	pub fn by_name(&self, name: &str) -> Option<&EnumConstant> {
		self.by_name.get(name).and_then(|o| self.by_ordinal.get(o))
	}

	/// Constants in registration order.
	pub fn constants(&self) -> impl Iterator<Item = &EnumConstant> {
		self.by_ordinal.values()
	}

	/// Runtime value for the constant with `ordinal`.
	pub fn value(&self, ordinal: i32) -> Option<EnumValue> {
		self.by_ordinal(ordinal).map(|c| self.to_value(c))
	}

	/// Runtime value for the constant named `name`.
	pub fn value_by_name(&self, name: &str) -> Option<EnumValue> {
		self.by_name(name).map(|c| self.to_value(c))
	}

	fn to_value(&self, c: &EnumConstant) -> EnumValue {
		EnumValue {
			enum_code: self.code,
			ordinal: c.ordinal,
			name: c.name.clone(),
		}
	}

	pub(crate) fn set_dictionary_id(&mut self, id: u8) {
		self.dictionary_id = id;
	}
}
