use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DictionaryError, NamespaceKind, Result};
use crate::native::{is_upgrade, type_label};
use crate::schema::{EnumDef, InsertAction, ObjDef, TagDef};

/// A definition that lives in a code/name keyed namespace.
pub(crate) trait Entry {
	const KIND: NamespaceKind;

	fn code(&self) -> i32;

	fn name(&self) -> &str;

	/// Returns true if `self` may supersede `existing` under the same key.
	fn upgrades(&self, existing: &Self) -> bool;

	/// Type description used in upgrade errors.
	fn type_label(&self) -> String;
}

impl Entry for ObjDef {
	const KIND: NamespaceKind = NamespaceKind::Object;

	fn code(&self) -> i32 {
		self.code().into()
	}

	fn name(&self) -> &str {
		self.type_name()
	}

	fn upgrades(&self, existing: &Self) -> bool {
		is_upgrade(existing.native_type(), self.native_type())
	}

	fn type_label(&self) -> String {
		type_label(self.native_type())
	}
}

impl Entry for EnumDef {
	const KIND: NamespaceKind = NamespaceKind::Enum;

	fn code(&self) -> i32 {
		self.code().into()
	}

	fn name(&self) -> &str {
		self.type_name()
	}

	fn upgrades(&self, existing: &Self) -> bool {
		is_upgrade(existing.native_type(), self.native_type())
	}

	fn type_label(&self) -> String {
		type_label(self.native_type())
	}
}

impl Entry for TagDef {
	const KIND: NamespaceKind = NamespaceKind::SuperTag;

	fn code(&self) -> i32 {
		self.code().into()
	}

	fn name(&self) -> &str {
		self.name()
	}

	fn upgrades(&self, existing: &Self) -> bool {
		self.same_wire_shape(existing)
	}

	fn type_label(&self) -> String {
		format!("{}/{:?}", self.value_type(), self.shape())
	}
}

/// Two-way index enforcing consistent `(code, name)` pairs.
pub(crate) struct Namespace<T> {
	by_code: FxHashMap<i32, Arc<T>>,
	by_name: FxHashMap<String, i32>,
}

impl<T> Default for Namespace<T> {
	fn default() -> Self {
		Self {
			by_code: FxHashMap::default(),
			by_name: FxHashMap::default(),
		}
	}
}

impl<T: Entry> Namespace<T> {
	/// Checks `def` against the registration invariants without inserting it.
	pub(crate) fn check(&self, dictionary_id: u8, def: &T) -> Result<InsertAction> {
		let code = def.code();
		if let Some(existing) = self.by_code.get(&code) {
			if existing.name() != def.name() {
				return Err(DictionaryError::CodeConflict {
					dictionary_id,
					kind: T::KIND,
					code,
					existing_name: existing.name().to_string(),
					new_name: def.name().to_string(),
				});
			}
			if !def.upgrades(existing) {
				return Err(DictionaryError::IncompatibleUpgrade {
					dictionary_id,
					kind: T::KIND,
					code,
					name: def.name().to_string(),
					existing: existing.type_label(),
					new: def.type_label(),
				});
			}
			return Ok(InsertAction::ReplacedExisting);
		}
		if let Some(&existing_code) = self.by_name.get(def.name()) {
			return Err(DictionaryError::NameConflict {
				dictionary_id,
				kind: T::KIND,
				name: def.name().to_string(),
				existing_code,
				new_code: code,
			});
		}
		Ok(InsertAction::InsertedNew)
	}

	/// Inserts `def`, enforcing the registration invariants.
	pub(crate) fn insert(&mut self, dictionary_id: u8, def: T) -> Result<(InsertAction, Arc<T>)> {
		let action = self.check(dictionary_id, &def)?;
		let code = def.code();
		if action == InsertAction::InsertedNew {
			self.by_name.insert(def.name().to_string(), code);
		}
		let def = Arc::new(def);
		self.by_code.insert(code, Arc::clone(&def));
		Ok((action, def))
	}

	/// Swaps in a rewritten definition under an existing code.
	pub(crate) fn replace(&mut self, def: T) {
		self.by_code.insert(def.code(), Arc::new(def));
	}

	pub(crate) fn remove(&mut self, code: i32) -> Option<Arc<T>> {
		let def = self.by_code.remove(&code)?;
		self.by_name.remove(def.name());
		Some(def)
	}

	pub(crate) fn by_code(&self, code: i32) -> Option<&Arc<T>> {
		self.by_code.get(&code)
	}

	pub(crate) fn by_name(&self, name: &str) -> Option<&Arc<T>> {
		self.by_name.get(name).and_then(|code| self.by_code.get(code))
	}

	pub(crate) fn len(&self) -> usize {
		self.by_code.len()
	}

	/// Definitions sorted by code.
	pub(crate) fn sorted(&self) -> Vec<Arc<T>> {
		let mut out: Vec<_> = self.by_code.values().cloned().collect();
		out.sort_by_key(|d| d.code());
		out
	}
}
