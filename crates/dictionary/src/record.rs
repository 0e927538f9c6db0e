//! Runtime records.
//!
//! A [`BioObject`] is an ordered string-to-value map stamped with the identity
//! of the object definition it instantiates. Records with code `0` carry no
//! schema and describe themselves through the codec's ad-hoc tag pool.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ImmutableError;
use crate::native::{NativeType, narrowest_common_type};
use crate::value::Value;

/// Object code of schema-free records.
pub const AD_HOC_CODE: u16 = 0;

/// A dynamically typed record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BioObject {
	dictionary_id: u8,
	code: u16,
	#[serde(default)]
	display_name: String,
	#[serde(default)]
	version: u16,
	#[serde(skip)]
	immutable: bool,
	#[serde(skip)]
	native_type: Option<Arc<NativeType>>,
	fields: IndexMap<String, Value>,
}

impl BioObject {
	/// Creates an empty ad-hoc record in dictionary 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty record for the given object code.
	pub fn with_code(dictionary_id: u8, code: u16) -> Self {
		Self {
			dictionary_id,
			code,
			..Self::default()
		}
	}

	/// Creates an empty record stamped with a definition's identity.
	pub(crate) fn stamped(
		dictionary_id: u8,
		code: u16,
		display_name: &str,
		version: u16,
		native_type: Option<Arc<NativeType>>,
	) -> Self {
		Self {
			dictionary_id,
			code,
			display_name: display_name.to_owned(),
			version,
			native_type,
			..Self::default()
		}
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
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	#[inline]
	pub fn version(&self) -> u16 {
		self.version
	}

	/// Returns true for records without a registered schema.
	#[inline]
	pub fn is_ad_hoc(&self) -> bool {
		self.code == AD_HOC_CODE
	}

	#[inline]
	pub fn is_immutable(&self) -> bool {
		self.immutable
	}

	/// Native type this record was instantiated as.
	#[inline]
	pub fn native_type(&self) -> Option<&Arc<NativeType>> {
		self.native_type.as_ref()
	}

	/// Seals the record; every later mutation fails.
	pub fn seal(&mut self) {
		self.immutable = true;
	}

	fn guard(&self, operation: &'static str, key: Option<&str>) -> Result<(), ImmutableError> {
		if self.immutable {
			return Err(ImmutableError {
				code: self.code,
				operation,
				key: key.map(str::to_owned),
			});
		}
		Ok(())
	}

	/// Stamps the identity fields.
	pub fn stamp(&mut self, dictionary_id: u8, code: u16, display_name: &str) -> Result<(), ImmutableError> {
		self.guard("stamp identity", None)?;
		self.dictionary_id = dictionary_id;
		self.code = code;
		display_name.clone_into(&mut self.display_name);
		Ok(())
	}

	pub fn set_version(&mut self, version: u16) -> Result<(), ImmutableError> {
		self.guard("set version", None)?;
		self.version = version;
		Ok(())
	}

	pub(crate) fn set_native_type(&mut self, ty: Option<Arc<NativeType>>) {
		self.native_type = ty;
	}

	/// Value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.fields.contains_key(key)
	}

	/// Sets `key`, returning the previous value.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>, ImmutableError> {
		let key = key.into();
		self.guard("set", Some(&key))?;
		Ok(self.fields.insert(key, value.into()))
	}

	/// Removes `key`, keeping the order of the remaining fields.
	pub fn remove(&mut self, key: &str) -> Result<Option<Value>, ImmutableError> {
		self.guard("remove", Some(key))?;
		Ok(self.fields.shift_remove(key))
	}

	/// Removes every field.
	pub fn clear(&mut self) -> Result<(), ImmutableError> {
		self.guard("clear", None)?;
		self.fields.clear();
		Ok(())
	}

	/// Sets every pair; nothing is applied if the record is sealed.
	pub fn extend<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<(), ImmutableError>
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.guard("extend", None)?;
		self.fields
			.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
		Ok(())
	}

	/// Fields in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

/// Structural equality: same dictionary and code, and the same keys with
/// deep-equal values. Field order, display name, version, sealing and native
/// type do not participate.
impl PartialEq for BioObject {
	fn eq(&self, other: &Self) -> bool {
		self.dictionary_id == other.dictionary_id
			&& self.code == other.code
			&& self.fields.len() == other.fields.len()
			&& self
				.fields
				.iter()
				.all(|(k, v)| other.fields.get(k).is_some_and(|o| o == v))
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for BioObject {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
			..Self::default()
		}
	}
}

/// A homogeneous array of records typed by their common native type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordArray {
	#[serde(skip)]
	element_type: Option<Arc<NativeType>>,
	items: Vec<BioObject>,
}

impl RecordArray {
	/// Creates an empty array of `element_type` with room for `capacity` records.
	pub fn typed(element_type: Option<Arc<NativeType>>, capacity: usize) -> Self {
		Self {
			element_type,
			items: Vec::with_capacity(capacity),
		}
	}

	/// Builds an array typed by the narrowest type covering every record.
	pub fn inferred(items: Vec<BioObject>) -> Self {
		Self {
			element_type: narrowest_common_type(&items),
			items,
		}
	}

	/// Element type; `None` is the generic record type.
	pub fn element_type(&self) -> Option<&Arc<NativeType>> {
		self.element_type.as_ref()
	}

	/// Appends a record, widening the element type if it no longer covers it.
	pub fn push(&mut self, record: BioObject) {
		let fits = match (&self.element_type, record.native_type()) {
			(None, _) => true,
			(Some(elem), Some(ty)) => elem.is_assignable_from(ty),
			(Some(_), None) => false,
		};
		self.items.push(record);
		if !fits {
			self.element_type = narrowest_common_type(&self.items);
		}
	}

	/// Re-infers the element type from the records held. An empty array keeps
	/// the type it was created with.
	pub fn narrow(&mut self) {
		if !self.items.is_empty() {
			self.element_type = narrowest_common_type(&self.items);
		}
	}

	pub fn items(&self) -> &[BioObject] {
		&self.items
	}

	pub fn into_items(self) -> Vec<BioObject> {
		self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl PartialEq for RecordArray {
	fn eq(&self, other: &Self) -> bool {
		self.items == other.items
	}
}

impl From<Vec<BioObject>> for RecordArray {
	fn from(items: Vec<BioObject>) -> Self {
		Self::inferred(items)
	}
}

#[cfg(test)]
mod tests;
