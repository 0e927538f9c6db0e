//! Lossless text form backed by `serde_json`.

use std::sync::Arc;

use bio_dictionary::{BioObject, Dictionary, DictionaryRegistry, Factory, ImmutableError, ObjDef, RecordArray, Value};

use super::TextCodec;
use crate::codec::Payload;
use crate::error::BoxError;

/// JSON text form of a payload.
///
/// Export leaves out fields whose tag is not exportable. Import re-attaches
/// the native type of every record whose object is registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTextCodec;

impl TextCodec for JsonTextCodec {
	fn export(&self, payload: &Payload, registry: &DictionaryRegistry) -> Result<Vec<u8>, BoxError> {
		let filtered = match payload {
			Payload::Record(rec) => Payload::Record(exportable(rec, registry)?),
			Payload::Array(arr) => Payload::Array(RecordArray::inferred(exportable_all(arr.items(), registry)?)),
			Payload::List(items) => Payload::List(exportable_all(items, registry)?),
		};
		Ok(serde_json::to_vec(&filtered)?)
	}

	fn import(&self, text: &[u8], registry: &DictionaryRegistry) -> Result<Payload, BoxError> {
		let payload = match serde_json::from_slice::<Payload>(text)? {
			Payload::Record(mut rec) => {
				bind(&mut rec, registry)?;
				Payload::Record(rec)
			}
			Payload::Array(arr) => {
				let mut items = arr.into_items();
				for rec in &mut items {
					bind(rec, registry)?;
				}
				Payload::Array(RecordArray::inferred(items))
			}
			Payload::List(mut items) => {
				for rec in &mut items {
					bind(rec, registry)?;
				}
				Payload::List(items)
			}
		};
		Ok(payload)
	}
}

fn schema_of(rec: &BioObject, registry: &DictionaryRegistry) -> Option<(Arc<Dictionary>, Arc<ObjDef>)> {
	if rec.is_ad_hoc() {
		return None;
	}
	let dict = registry.try_get(rec.dictionary_id())?;
	let obj = dict.obj_by_code(rec.code())?;
	Some((dict, obj))
}

fn exportable_all(items: &[BioObject], registry: &DictionaryRegistry) -> Result<Vec<BioObject>, ImmutableError> {
	items.iter().map(|rec| exportable(rec, registry)).collect()
}

fn exportable(rec: &BioObject, registry: &DictionaryRegistry) -> Result<BioObject, ImmutableError> {
	let schema = schema_of(rec, registry);
	let mut out = BioObject::new();
	out.stamp(rec.dictionary_id(), rec.code(), rec.display_name())?;
	out.set_version(rec.version())?;
	for (key, value) in rec.iter() {
		let hidden = schema.as_ref().is_some_and(|(dict, obj)| {
			dict.tag_by_name(obj, key)
				.is_some_and(|tag| !tag.is_exportable())
		});
		if !hidden {
			out.set(key, export_value(value, registry)?)?;
		}
	}
	Ok(out)
}

fn export_value(value: &Value, registry: &DictionaryRegistry) -> Result<Value, ImmutableError> {
	let exported = match value {
		Value::Object(rec) => Value::Object(exportable(rec, registry)?),
		Value::Array(items) => Value::Array(
			items
				.iter()
				.map(|v| export_value(v, registry))
				.collect::<Result<_, _>>()?,
		),
		Value::List(items) => Value::List(
			items
				.iter()
				.map(|v| export_value(v, registry))
				.collect::<Result<_, _>>()?,
		),
		Value::Records(arr) => Value::Records(RecordArray::inferred(exportable_all(arr.items(), registry)?)),
		other => other.clone(),
	};
	Ok(exported)
}

fn holds_records(value: &Value) -> bool {
	match value {
		Value::Object(_) => true,
		Value::Array(items) | Value::List(items) => items.iter().any(holds_records),
		Value::Records(arr) => !arr.is_empty(),
		_ => false,
	}
}

fn bind(rec: &mut BioObject, registry: &DictionaryRegistry) -> Result<(), ImmutableError> {
	if let Some((_, obj)) = schema_of(rec, registry) {
		Factory::bind(&obj, rec);
	}
	let nested: Vec<(String, Value)> = rec
		.iter()
		.filter(|(_, v)| holds_records(v))
		.map(|(k, v)| (k.to_owned(), v.clone()))
		.collect();
	for (key, mut value) in nested {
		bind_value(&mut value, registry)?;
		rec.set(key, value)?;
	}
	Ok(())
}

fn bind_value(value: &mut Value, registry: &DictionaryRegistry) -> Result<(), ImmutableError> {
	match value {
		Value::Object(rec) => bind(rec, registry),
		Value::Array(items) | Value::List(items) => items.iter_mut().try_for_each(|v| bind_value(v, registry)),
		Value::Records(arr) => {
			let mut items = std::mem::take(arr).into_items();
			items.iter_mut().try_for_each(|rec| bind(rec, registry))?;
			*arr = RecordArray::inferred(items);
			Ok(())
		}
		_ => Ok(()),
	}
}
