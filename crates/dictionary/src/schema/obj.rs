use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use super::{InsertAction, TagDef};
use crate::error::{DictionaryError, Result};
use crate::native::NativeType;

/// Schema definition of one record shape.
#[derive(Debug, Clone)]
pub struct ObjDef {
	dictionary_id: u8,
	code: u16,
	type_name: String,
	display_name: String,
	version: u16,
	native_type: Option<Arc<NativeType>>,
	is_large: bool,
	parent: Option<u16>,
	tags: IndexMap<i16, Arc<TagDef>, FxBuildHasher>,
	tag_names: FxHashMap<String, i16>,
}

impl ObjDef {
	/// Creates an empty definition; the display name defaults to `type_name`.
	pub fn new(code: u16, type_name: impl Into<String>) -> Self {
		let type_name = type_name.into();
		Self {
			dictionary_id: 0,
			code,
			display_name: type_name.clone(),
			type_name,
			version: 0,
			native_type: None,
			is_large: false,
			parent: None,
			tags: IndexMap::default(),
			tag_names: FxHashMap::default(),
		}
	}

	pub fn display_name(mut self, name: impl Into<String>) -> Self {
		self.display_name = name.into();
		self
	}

	pub fn version(mut self, version: u16) -> Self {
		self.version = version;
		self
	}

	pub fn native(mut self, ty: &Arc<NativeType>) -> Self {
		self.native_type = Some(Arc::clone(ty));
		self
	}

	/// Switches this object's length fields to four bytes.
	pub fn large(mut self, on: bool) -> Self {
		self.is_large = on;
		self
	}

	/// Sets the parent object code; resolved through the owning dictionary.
	pub fn extends(mut self, parent: u16) -> Self {
		self.parent = Some(parent);
		self
	}

	/// Builder form of [`ObjDef::add_tag`].
	pub fn with_tag(mut self, tag: TagDef) -> Result<Self> {
		self.add_tag(tag)?;
		Ok(self)
	}

	/// Registers a tag.
	///
	/// A code bound to another name, or a name bound to another code, is
	/// rejected. Registering an identical `(code, name)` pair again keeps the
	/// first definition.
	pub fn add_tag(&mut self, tag: TagDef) -> Result<InsertAction> {
		if tag.code() < 0 {
			return Err(DictionaryError::TagCode {
				obj: self.type_name.clone(),
				name: tag.name().to_string(),
				code: tag.code(),
			});
		}
		if let Some(existing) = self.tags.get(&tag.code()) {
			if existing.name() != tag.name() {
				return Err(DictionaryError::TagCodeConflict {
					obj: self.type_name.clone(),
					code: tag.code(),
					existing_name: existing.name().to_string(),
					new_name: tag.name().to_string(),
				});
			}
			return Ok(InsertAction::KeptExisting);
		}
		if let Some(&existing_code) = self.tag_names.get(tag.name()) {
			return Err(DictionaryError::TagNameConflict {
				obj: self.type_name.clone(),
				name: tag.name().to_string(),
				existing_code,
				new_code: tag.code(),
			});
		}
		self.tag_names.insert(tag.name().to_string(), tag.code());
		self.tags.insert(tag.code(), Arc::new(tag));
		Ok(InsertAction::InsertedNew)
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

	#[inline]
	pub fn name(&self) -> &str {
		&self.display_name
	}

	#[inline]
	pub fn current_version(&self) -> u16 {
		self.version
	}

	pub fn native_type(&self) -> Option<&Arc<NativeType>> {
		self.native_type.as_ref()
	}

	#[inline]
	pub fn is_large(&self) -> bool {
		self.is_large
	}

	#[inline]
	pub fn parent(&self) -> Option<u16> {
		self.parent
	}

	/// Own tag by code, ignoring the parent chain and super-tags.
	pub fn own_tag(&self, code: i16) -> Option<&Arc<TagDef>> {
		self.tags.get(&code)
	}

	/// Own tag by name, ignoring the parent chain and super-tags.
	pub fn own_tag_by_name(&self, name: &str) -> Option<&Arc<TagDef>> {
		self.tag_names.get(name).and_then(|code| self.tags.get(code))
	}

	/// Own tags in registration order.
	pub fn tags(&self) -> impl Iterator<Item = &Arc<TagDef>> {
		self.tags.values()
	}

	/// Own mandatory tags.
	pub fn mandatory_tags(&self) -> impl Iterator<Item = &Arc<TagDef>> {
		self.tags.values().filter(|t| t.is_mandatory())
	}

	pub(crate) fn set_dictionary_id(&mut self, id: u8) {
		self.dictionary_id = id;
	}

	pub(crate) fn tag_mut(&mut self, code: i16) -> Option<&mut TagDef> {
		self.tags.get_mut(&code).map(Arc::make_mut)
	}

	pub(crate) fn remove_tag(&mut self, code: i16) -> Option<Arc<TagDef>> {
		let tag = self.tags.shift_remove(&code)?;
		self.tag_names.remove(tag.name());
		Some(tag)
	}
}
