//! Per-id schema dictionaries and the process-wide registry.
//!
//! A [`Dictionary`] owns four independent namespaces: objects, enums,
//! super-tags and functions. Definitions are registered during a
//! single-threaded load phase, cross-linked by [`Dictionary::validate`] and
//! then read concurrently by codecs.

mod namespace;
mod registry;
mod validate;

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

pub use registry::{DictionaryRegistry, SchemaLoader};
pub use validate::{TagPath, ValidationReport};

use self::namespace::Namespace;
use crate::error::{DictionaryError, Result};
use crate::record::AD_HOC_CODE;
use crate::schema::{EnumDef, FuncDef, InsertAction, ObjDef, TagDef};

/// Longest parent chain followed during tag lookup.
const MAX_PARENT_DEPTH: usize = 64;

#[derive(Default)]
struct Tables {
	objs: Namespace<ObjDef>,
	obj_display: FxHashMap<String, u16>,
	enums: Namespace<EnumDef>,
	super_tags: Namespace<TagDef>,
	funcs: FxHashMap<String, Arc<FuncDef>>,
}

impl Tables {
	fn obj(&self, code: u16) -> Option<&Arc<ObjDef>> {
		self.objs.by_code(code.into())
	}

	/// Walks the parent chain of `obj` looking for an inheritable tag.
	fn inherited<'a>(
		&'a self,
		obj: &ObjDef,
		find: impl Fn(&'a ObjDef) -> Option<&'a Arc<TagDef>>,
	) -> Option<Arc<TagDef>> {
		let mut parent = obj.parent();
		for _ in 0..MAX_PARENT_DEPTH {
			let p: &'a ObjDef = self.obj(parent?)?;
			if let Some(tag) = find(p).filter(|t| t.is_inheritable()) {
				return Some(Arc::clone(tag));
			}
			parent = p.parent();
		}
		None
	}
}

/// A schema dictionary.
pub struct Dictionary {
	id: u8,
	tables: RwLock<Tables>,
}

impl Dictionary {
	/// Creates an empty dictionary.
	pub fn new(id: u8) -> Self {
		Self {
			id,
			tables: RwLock::new(Tables::default()),
		}
	}

	#[inline]
	pub fn id(&self) -> u8 {
		self.id
	}

	/// Registers an object definition.
	///
	/// Re-registering an existing `(code, type_name)` pair supersedes the old
	/// definition only when its native type is the same or a subtype. Display
	/// names are unique across codes; a superseded definition's display name
	/// is released.
	pub fn add_obj(&self, mut def: ObjDef) -> Result<InsertAction> {
		if def.code() == AD_HOC_CODE {
			return Err(DictionaryError::ReservedObjCode {
				type_name: def.type_name().to_string(),
			});
		}
		def.set_dictionary_id(self.id);
		let mut tables = self.tables.write();
		tables.objs.check(self.id, &def)?;
		if let Some(&existing_code) = tables
			.obj_display
			.get(def.name())
			.filter(|&&owner| owner != def.code())
		{
			return Err(DictionaryError::DisplayNameConflict {
				dictionary_id: self.id,
				name: def.name().to_string(),
				existing_code,
				new_code: def.code(),
			});
		}
		let previous = tables.obj(def.code()).map(|old| old.name().to_string());
		let (action, def) = tables.objs.insert(self.id, def)?;
		if let Some(old) = previous.filter(|old| old != def.name()) {
			tables.obj_display.remove(&old);
		}
		tables.obj_display.insert(def.name().to_string(), def.code());
		debug!(
			dictionary = self.id,
			code = def.code(),
			name = def.type_name(),
			?action,
			"registered object"
		);
		Ok(action)
	}

	/// Registers an enum definition.
	pub fn add_enum(&self, mut def: EnumDef) -> Result<InsertAction> {
		def.set_dictionary_id(self.id);
		let (action, def) = self.tables.write().enums.insert(self.id, def)?;
		debug!(
			dictionary = self.id,
			code = def.code(),
			name = def.type_name(),
			?action,
			"registered enum"
		);
		Ok(action)
	}

	/// Registers a dictionary-level tag. Super-tag codes must be negative.
	pub fn add_super_tag(&self, def: TagDef) -> Result<InsertAction> {
		if def.code() >= 0 {
			return Err(DictionaryError::SuperTagCode {
				name: def.name().to_string(),
				code: def.code(),
			});
		}
		let (action, def) = self.tables.write().super_tags.insert(self.id, def)?;
		debug!(
			dictionary = self.id,
			code = def.code(),
			name = def.name(),
			?action,
			"registered super-tag"
		);
		Ok(action)
	}

	/// Registers a function signature.
	pub fn add_func(&self, def: FuncDef) -> Result<InsertAction> {
		let mut tables = self.tables.write();
		if let Some(existing) = tables.funcs.get(&def.name) {
			if **existing != def {
				return Err(DictionaryError::FuncConflict {
					dictionary_id: self.id,
					name: def.name,
				});
			}
			return Ok(InsertAction::KeptExisting);
		}
		debug!(dictionary = self.id, name = %def.name, "registered function");
		tables.funcs.insert(def.name.clone(), Arc::new(def));
		Ok(InsertAction::InsertedNew)
	}

	pub fn obj_by_code(&self, code: u16) -> Option<Arc<ObjDef>> {
		self.tables.read().obj(code).cloned()
	}

	/// Like [`Dictionary::obj_by_code`], failing with `ObjNotFound`.
	pub fn obj(&self, code: u16) -> Result<Arc<ObjDef>> {
		self.obj_by_code(code).ok_or(DictionaryError::ObjNotFound {
			dictionary_id: self.id,
			code,
		})
	}

	pub fn obj_by_type_name(&self, type_name: &str) -> Option<Arc<ObjDef>> {
		self.tables.read().objs.by_name(type_name).cloned()
	}

	pub fn obj_by_display_name(&self, display_name: &str) -> Option<Arc<ObjDef>> {
		let tables = self.tables.read();
		let code = *tables.obj_display.get(display_name)?;
		tables.obj(code).cloned()
	}

	pub fn enum_by_code(&self, code: u16) -> Option<Arc<EnumDef>> {
		self.tables.read().enums.by_code(code.into()).cloned()
	}

	pub fn enum_by_type_name(&self, type_name: &str) -> Option<Arc<EnumDef>> {
		self.tables.read().enums.by_name(type_name).cloned()
	}

	pub fn super_tag_by_code(&self, code: i16) -> Option<Arc<TagDef>> {
		self.tables.read().super_tags.by_code(code.into()).cloned()
	}

	pub fn super_tag_by_name(&self, name: &str) -> Option<Arc<TagDef>> {
		self.tables.read().super_tags.by_name(name).cloned()
	}

	pub fn func(&self, name: &str) -> Option<Arc<FuncDef>> {
		self.tables.read().funcs.get(name).cloned()
	}

	/// Resolves a tag of `obj` by name: own tags, then inheritable tags of
	/// the parent chain, then super-tags.
	pub fn tag_by_name(&self, obj: &ObjDef, name: &str) -> Option<Arc<TagDef>> {
		if let Some(tag) = obj.own_tag_by_name(name) {
			return Some(Arc::clone(tag));
		}
		let tables = self.tables.read();
		tables
			.inherited(obj, |p| p.own_tag_by_name(name))
			.or_else(|| tables.super_tags.by_name(name).cloned())
	}

	/// Resolves a tag of `obj` by code, in the same order as
	/// [`Dictionary::tag_by_name`].
	pub fn tag_by_code(&self, obj: &ObjDef, code: i16) -> Option<Arc<TagDef>> {
		if let Some(tag) = obj.own_tag(code) {
			return Some(Arc::clone(tag));
		}
		let tables = self.tables.read();
		tables
			.inherited(obj, |p| p.own_tag(code))
			.or_else(|| tables.super_tags.by_code(code.into()).cloned())
	}

	/// Every tag visible on `obj` through itself and its parent chain.
	///
	/// Child tags shadow inherited tags of the same name. Super-tags are not
	/// included.
	pub fn visible_tags(&self, obj: &ObjDef) -> Vec<Arc<TagDef>> {
		let tables = self.tables.read();
		let mut seen = FxHashSet::default();
		let mut out = Vec::new();
		for tag in obj.tags() {
			seen.insert(tag.name().to_string());
			out.push(Arc::clone(tag));
		}
		let mut parent = obj.parent();
		for _ in 0..MAX_PARENT_DEPTH {
			let Some(p) = parent.and_then(|code| tables.obj(code)) else {
				break;
			};
			for tag in p.tags().filter(|t| t.is_inheritable()) {
				if seen.insert(tag.name().to_string()) {
					out.push(Arc::clone(tag));
				}
			}
			parent = p.parent();
		}
		out
	}

	/// Mandatory tags of `obj`, own and inherited.
	pub fn mandatory_tags(&self, obj: &ObjDef) -> Vec<Arc<TagDef>> {
		self.visible_tags(obj)
			.into_iter()
			.filter(|t| t.is_mandatory())
			.collect()
	}

	/// Object definitions sorted by code.
	pub fn objs(&self) -> Vec<Arc<ObjDef>> {
		self.tables.read().objs.sorted()
	}

	/// Enum definitions sorted by code.
	pub fn enums(&self) -> Vec<Arc<EnumDef>> {
		self.tables.read().enums.sorted()
	}

	/// Super-tags sorted by code.
	pub fn super_tags(&self) -> Vec<Arc<TagDef>> {
		self.tables.read().super_tags.sorted()
	}

	/// Function signatures sorted by name.
	pub fn funcs(&self) -> Vec<Arc<FuncDef>> {
		let mut out: Vec<_> = self.tables.read().funcs.values().cloned().collect();
		out.sort_by(|a, b| a.name.cmp(&b.name));
		out
	}

	/// Number of registered objects.
	pub fn len(&self) -> usize {
		self.tables.read().objs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for Dictionary {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let tables = self.tables.read();
		f.debug_struct("Dictionary")
			.field("id", &self.id)
			.field("objs", &tables.objs.len())
			.field("enums", &tables.enums.len())
			.field("super_tags", &tables.super_tags.len())
			.field("funcs", &tables.funcs.len())
			.finish()
	}
}
