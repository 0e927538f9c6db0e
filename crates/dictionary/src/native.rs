//! Explicit native type lattice.
//!
//! Records can be instantiated as a registered *native type*: a named node in
//! a single-inheritance chain, optionally carrying an initializer that runs on
//! every fresh instance. Assignability and the narrowest-common-ancestor search
//! used when decoding heterogeneous record arrays walk these parent pointers
//! instead of inspecting runtime types.

use std::fmt;
use std::sync::Arc;

use crate::record::BioObject;

/// Initializer run on every new instance of a native type.
pub type Initializer = Arc<dyn Fn(&mut BioObject) + Send + Sync>;

/// A registered native record type.
pub struct NativeType {
	name: String,
	parent: Option<Arc<NativeType>>,
	initializer: Option<Initializer>,
}

impl NativeType {
	/// Creates a root type.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			parent: None,
			initializer: None,
		}
	}

	/// Sets the supertype.
	pub fn extends(mut self, parent: &Arc<NativeType>) -> Self {
		self.parent = Some(Arc::clone(parent));
		self
	}

	/// Sets the per-instance initializer.
	pub fn with_initializer(mut self, init: impl Fn(&mut BioObject) + Send + Sync + 'static) -> Self {
		self.initializer = Some(Arc::new(init));
		self
	}

	/// Finishes the type as a shared handle.
	pub fn build(self) -> Arc<NativeType> {
		Arc::new(self)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parent(&self) -> Option<&Arc<NativeType>> {
		self.parent.as_ref()
	}

	/// Runs the initializer, if any.
	pub(crate) fn initialize(&self, record: &mut BioObject) {
		if let Some(parent) = &self.parent {
			parent.initialize(record);
		}
		if let Some(init) = &self.initializer {
			init(record);
		}
	}

	/// Iterates `this` followed by each of its ancestors.
	pub fn ancestors(this: &Arc<NativeType>) -> Ancestors<'_> {
		Ancestors { next: Some(this) }
	}

	/// Returns true if `other` is this type or one of its descendants.
	pub fn is_assignable_from(&self, other: &NativeType) -> bool {
		let mut cursor = Some(other);
		while let Some(ty) = cursor {
			if ty.name == self.name {
				return true;
			}
			cursor = ty.parent.as_deref();
		}
		false
	}
}

impl PartialEq for NativeType {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl Eq for NativeType {}

impl fmt::Debug for NativeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeType")
			.field("name", &self.name)
			.field("parent", &self.parent.as_ref().map(|p| p.name()))
			.finish_non_exhaustive()
	}
}

impl fmt::Display for NativeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// Iterator over a native type and its supertypes.
pub struct Ancestors<'a> {
	next: Option<&'a Arc<NativeType>>,
}

impl<'a> Iterator for Ancestors<'a> {
	type Item = &'a Arc<NativeType>;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next?;
		self.next = current.parent.as_ref();
		Some(current)
	}
}

/// Returns true when a registration may replace `existing` with `new`.
///
/// Replacing is allowed when nothing was registered before, or when the new
/// type is the old one or a subtype of it.
pub(crate) fn is_upgrade(existing: Option<&Arc<NativeType>>, new: Option<&Arc<NativeType>>) -> bool {
	match (existing, new) {
		(None, _) => true,
		(Some(_), None) => false,
		(Some(old), Some(new)) => old.is_assignable_from(new),
	}
}

/// Display helper for an optional native type in error messages.
pub(crate) fn type_label(ty: Option<&Arc<NativeType>>) -> String {
	ty.map_or_else(|| "<generic>".to_string(), |t| t.name().to_string())
}

/// Finds the narrowest native type every record can be assigned to.
///
/// Starts from the first record's concrete type and walks up its chain. Returns
/// `None` (the generic record type) when the slice is empty, when any record
/// has no native type, or when no ancestor covers every record.
pub fn narrowest_common_type(records: &[BioObject]) -> Option<Arc<NativeType>> {
	let first = records.first()?.native_type()?;
	NativeType::ancestors(first)
		.find(|candidate| {
			records
				.iter()
				.all(|r| r.native_type().is_some_and(|t| candidate.is_assignable_from(t)))
		})
		.cloned()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lattice() -> (Arc<NativeType>, Arc<NativeType>, Arc<NativeType>, Arc<NativeType>) {
		let root = NativeType::new("Entity").build();
		let c = NativeType::new("Shape").extends(&root).build();
		let a = NativeType::new("Circle").extends(&c).build();
		let b = NativeType::new("Square").extends(&c).build();
		(root, c, a, b)
	}

	fn typed(ty: &Arc<NativeType>) -> BioObject {
		let mut r = BioObject::new();
		r.set_native_type(Some(Arc::clone(ty)));
		r
	}

	#[test]
	fn test_assignability_walks_parents() {
		let (root, c, a, b) = lattice();
		assert!(c.is_assignable_from(&a));
		assert!(root.is_assignable_from(&b));
		assert!(!a.is_assignable_from(&c));
		assert!(!a.is_assignable_from(&b));
	}

	#[test]
	fn test_ancestors_order() {
		let (_, _, a, _) = lattice();
		let names: Vec<_> = NativeType::ancestors(&a).map(|t| t.name().to_string()).collect();
		assert_eq!(names, ["Circle", "Shape", "Entity"]);
	}

	#[test]
	fn test_common_type_of_siblings_is_parent() {
		let (_, c, a, b) = lattice();
		let records = [typed(&a), typed(&b), typed(&a)];
		assert_eq!(narrowest_common_type(&records), Some(c));
	}

	#[test]
	fn test_common_type_of_homogeneous_is_concrete() {
		let (_, _, a, _) = lattice();
		let records = [typed(&a), typed(&a)];
		assert_eq!(narrowest_common_type(&records), Some(a));
	}

	#[test]
	fn test_unrelated_types_fall_back_to_generic() {
		let (_, _, a, _) = lattice();
		let other = NativeType::new("Invoice").build();
		assert_eq!(narrowest_common_type(&[typed(&a), typed(&other)]), None);
		assert_eq!(narrowest_common_type(&[typed(&a), BioObject::new()]), None);
		assert_eq!(narrowest_common_type(&[]), None);
	}

	#[test]
	fn test_upgrade_rules() {
		let (_, c, a, _) = lattice();
		assert!(is_upgrade(None, Some(&a)));
		assert!(is_upgrade(Some(&c), Some(&a)));
		assert!(is_upgrade(Some(&a), Some(&a)));
		assert!(!is_upgrade(Some(&a), Some(&c)));
		assert!(!is_upgrade(Some(&a), None));
	}

	#[test]
	fn test_initializer_runs_parent_first() {
		let root = NativeType::new("Base")
			.with_initializer(|r| {
				r.set("kind", "base").unwrap();
				r.set("level", 1).unwrap();
			})
			.build();
		let child = NativeType::new("Child")
			.extends(&root)
			.with_initializer(|r| {
				r.set("level", 2).unwrap();
			})
			.build();
		let mut rec = BioObject::new();
		child.initialize(&mut rec);
		assert_eq!(rec.get("level"), Some(&2.into()));
		assert_eq!(rec.get("kind"), Some(&"base".into()));
	}
}
