use bio_primitives::BioType;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::{Dictionary, Tables};
use crate::error::{DictionaryError, Result};
use crate::schema::{ObjDef, TagDef, TypeRef};

/// Location of a tag touched by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath {
	/// Owning object type name, or `None` for super-tags.
	pub owner: Option<String>,
	pub tag: String,
}

/// Outcome of [`Dictionary::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
	/// Type references bound to an object or enum.
	pub resolved: usize,
	/// `BioObject` tags whose type name turned out to be an enum.
	pub retyped: Vec<TagPath>,
	/// Tags naming a type the dictionary no longer knows.
	pub dropped: Vec<TagPath>,
}

enum Resolution {
	Obj(u16),
	Enum(u16),
	Drop,
}

fn resolve(tables: &Tables, tag: &TagDef) -> Option<Resolution> {
	let Some(TypeRef::Unresolved(name)) = tag.type_ref() else {
		return None;
	};
	let obj = tables.objs.by_name(name).map(|o| o.code());
	let en = tables.enums.by_name(name).map(|e| e.code());
	Some(match (tag.value_type(), obj, en) {
		(BioType::BioEnum, _, Some(code)) => Resolution::Enum(code),
		(BioType::BioEnum, _, None) => Resolution::Drop,
		(_, Some(code), _) => Resolution::Obj(code),
		(_, None, Some(code)) => Resolution::Enum(code),
		(_, None, None) => Resolution::Drop,
	})
}

impl ValidationReport {
	fn record(&mut self, owner: Option<&str>, tag: &TagDef, resolution: &Resolution) {
		let path = || TagPath {
			owner: owner.map(str::to_owned),
			tag: tag.name().to_string(),
		};
		match *resolution {
			Resolution::Obj(_) => self.resolved += 1,
			Resolution::Enum(_) if tag.value_type() == BioType::BioEnum => self.resolved += 1,
			Resolution::Enum(code) => {
				warn!(owner, tag = tag.name(), enum_code = code, "object tag retyped to enum");
				self.resolved += 1;
				self.retyped.push(path());
			}
			Resolution::Drop => {
				warn!(owner, tag = tag.name(), "tag names an unknown type; dropped");
				self.dropped.push(path());
			}
		}
	}
}

fn apply(tag: &mut TagDef, resolution: &Resolution) {
	match *resolution {
		Resolution::Obj(code) => tag.resolve_obj(code),
		Resolution::Enum(code) => tag.resolve_enum(code),
		Resolution::Drop => {}
	}
}

impl Dictionary {
	/// Cross-links the dictionary after loading.
	///
	/// Checks that every parent exists and no parent chain is cyclic, then
	/// binds every tag type reference still held as a bare type name: object
	/// names win, enum names retype the tag to `BioEnum`, and tags naming
	/// neither are dropped from their owner.
	pub fn validate(&self) -> Result<ValidationReport> {
		let mut tables = self.tables.write();
		self.check_parents(&tables)?;

		let mut report = ValidationReport::default();
		for obj in tables.objs.sorted() {
			let pending: Vec<_> = obj
				.tags()
				.filter_map(|t| resolve(&tables, t).map(|r| (t.code(), r)))
				.collect();
			if pending.is_empty() {
				continue;
			}
			let mut updated: ObjDef = (*obj).clone();
			for (code, resolution) in &pending {
				if let Some(tag) = obj.own_tag(*code) {
					report.record(Some(obj.type_name()), tag, resolution);
				}
				match resolution {
					Resolution::Drop => {
						updated.remove_tag(*code);
					}
					_ => {
						if let Some(tag) = updated.tag_mut(*code) {
							apply(tag, resolution);
						}
					}
				}
			}
			tables.objs.replace(updated);
		}

		for tag in tables.super_tags.sorted() {
			let Some(resolution) = resolve(&tables, &tag) else {
				continue;
			};
			report.record(None, &tag, &resolution);
			if let Resolution::Drop = resolution {
				tables.super_tags.remove(tag.code().into());
			} else {
				let mut updated = (*tag).clone();
				apply(&mut updated, &resolution);
				tables.super_tags.replace(updated);
			}
		}

		debug!(
			dictionary = self.id,
			resolved = report.resolved,
			retyped = report.retyped.len(),
			dropped = report.dropped.len(),
			"dictionary validated"
		);
		Ok(report)
	}

	fn check_parents(&self, tables: &Tables) -> Result<()> {
		for obj in tables.objs.sorted() {
			let mut seen = FxHashSet::default();
			seen.insert(obj.code());
			let mut parent = obj.parent();
			while let Some(code) = parent {
				let Some(p) = tables.obj(code) else {
					return Err(DictionaryError::ParentNotFound {
						dictionary_id: self.id,
						obj: obj.type_name().to_string(),
						parent: code,
					});
				};
				if !seen.insert(code) {
					return Err(DictionaryError::ParentCycle {
						dictionary_id: self.id,
						obj: obj.type_name().to_string(),
					});
				}
				parent = p.parent();
			}
		}
		Ok(())
	}
}
