//! Instantiation of records from their schema definitions.

use std::sync::Arc;

use crate::dictionary::{Dictionary, DictionaryRegistry};
use crate::error::Result;
use crate::record::{BioObject, RecordArray};
use crate::schema::ObjDef;
use crate::value::Value;

/// Creates records for registered object definitions.
#[derive(Clone)]
pub struct Factory {
	registry: Arc<DictionaryRegistry>,
}

impl Factory {
	pub fn new(registry: Arc<DictionaryRegistry>) -> Self {
		Self { registry }
	}

	/// Creates a native instance of object `code`.
	///
	/// Returns `None` when no native type is registered for the object; the
	/// caller then falls back to a generic record.
	pub fn new_instance(&self, dictionary_id: u8, code: u16) -> Result<Option<BioObject>> {
		let obj = self.registry.get(dictionary_id)?.obj(code)?;
		Ok(Self::instance_of(&obj))
	}

	/// Allocates an empty array typed by object `code`'s native type.
	pub fn new_instance_array(&self, dictionary_id: u8, code: u16, size: usize) -> Result<Option<RecordArray>> {
		let obj = self.registry.get(dictionary_id)?.obj(code)?;
		Ok(Self::array_of(&obj, size))
	}

	/// Empty array typed by `obj`'s native type, if it has one.
	pub fn array_of(obj: &ObjDef, size: usize) -> Option<RecordArray> {
		obj.native_type()
			.map(|ty| RecordArray::typed(Some(Arc::clone(ty)), size))
	}

	/// Creates a record of object `code` with every schema default applied.
	///
	/// Runs the native initializer when one is registered, then stores each
	/// visible tag's initial value and, for tags computed by an expression, an
	/// unevaluated placeholder.
	pub fn new_with_defaults(&self, dictionary_id: u8, code: u16) -> Result<BioObject> {
		let dict = self.registry.get(dictionary_id)?;
		let obj = dict.obj(code)?;
		let mut record = Self::record_of(&obj);
		apply_defaults(&dict, &obj, &mut record)?;
		Ok(record)
	}

	/// Native instance of `obj`, stamped and initialized.
	pub fn instance_of(obj: &ObjDef) -> Option<BioObject> {
		let ty = obj.native_type()?;
		let mut record = BioObject::stamped(
			obj.dictionary_id(),
			obj.code(),
			obj.name(),
			obj.current_version(),
			Some(Arc::clone(ty)),
		);
		ty.initialize(&mut record);
		Some(record)
	}

	/// Attaches `obj`'s native type to a record built without the factory,
	/// such as one read back from text. The initializer does not run.
	pub fn bind(obj: &ObjDef, record: &mut BioObject) {
		record.set_native_type(obj.native_type().cloned());
	}

	/// Native instance of `obj` if it has a native type, otherwise a generic
	/// record stamped with its identity.
	pub fn record_of(obj: &ObjDef) -> BioObject {
		Self::instance_of(obj).unwrap_or_else(|| {
			BioObject::stamped(
				obj.dictionary_id(),
				obj.code(),
				obj.name(),
				obj.current_version(),
				None,
			)
		})
	}
}

fn apply_defaults(dict: &Dictionary, obj: &ObjDef, record: &mut BioObject) -> Result<()> {
	for tag in dict.visible_tags(obj) {
		if let Some(initial) = tag.initial_value() {
			record.set(tag.name(), initial.clone())?;
		} else if let Some(expr) = tag.default_expression() {
			record.set(tag.name(), Value::Expression(expr.clone()))?;
		}
	}
	Ok(())
}
