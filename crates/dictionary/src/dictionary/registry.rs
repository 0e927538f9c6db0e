use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::{Dictionary, ValidationReport};
use crate::error::{DictionaryError, Result};

type Snapshot = FxHashMap<u8, Arc<Dictionary>>;

static GLOBAL: LazyLock<Arc<DictionaryRegistry>> = LazyLock::new(|| Arc::new(DictionaryRegistry::new()));

/// Source of schema definitions.
///
/// Loaders feed fully formed definitions into a dictionary; where they come
/// from is of no concern to the dictionary.
pub trait SchemaLoader {
	/// Dictionary this loader populates.
	fn dictionary_id(&self) -> u8 {
		0
	}

	/// Registers every definition this loader knows about.
	fn load(&self, dictionary: &Dictionary) -> Result<()>;
}

/// Table of dictionaries keyed by id.
///
/// Readers load a lock-free snapshot; creation publishes a new snapshot with
/// a compare-and-swap loop so concurrent first access yields a single winner.
pub struct DictionaryRegistry {
	snap: ArcSwap<Snapshot>,
}

impl Default for DictionaryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl DictionaryRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(Snapshot::default()),
		}
	}

	/// The process-wide registry.
	pub fn global() -> Arc<DictionaryRegistry> {
		Arc::clone(&GLOBAL)
	}

	/// Returns the dictionary for `id`, creating it on first access.
	pub fn get_or_create(&self, id: u8) -> Arc<Dictionary> {
		loop {
			let cur = self.snap.load_full();
			if let Some(dict) = cur.get(&id) {
				return Arc::clone(dict);
			}

			let dict = Arc::new(Dictionary::new(id));
			let mut next = Snapshot::clone(&cur);
			next.insert(id, Arc::clone(&dict));

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&*prev, &cur) {
				debug!(dictionary = id, "created dictionary");
				return dict;
			}
		}
	}

	/// Returns the dictionary for `id`, failing if it was never created.
	pub fn get(&self, id: u8) -> Result<Arc<Dictionary>> {
		self.try_get(id).ok_or(DictionaryError::DictionaryNotFound(id))
	}

	pub fn try_get(&self, id: u8) -> Option<Arc<Dictionary>> {
		self.snap.load().get(&id).cloned()
	}

	/// Ids of every dictionary, ascending.
	pub fn ids(&self) -> Vec<u8> {
		let mut ids: Vec<_> = self.snap.load().keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Runs every loader, then validates every dictionary.
	///
	/// Reports are returned in ascending dictionary id order.
	pub fn load(&self, loaders: &[&dyn SchemaLoader]) -> Result<Vec<(u8, ValidationReport)>> {
		for loader in loaders {
			loader.load(&self.get_or_create(loader.dictionary_id()))?;
		}
		self.ids()
			.into_iter()
			.map(|id| Ok((id, self.get(id)?.validate()?)))
			.collect()
	}
}
