//! Per-call ad-hoc tag pool.
//!
//! Records without a schema (code `0`) describe their fields through a
//! name/code table written in the envelope header. A pool lives for exactly
//! one encode or decode call.

use bio_primitives::{ByteReader, ByteWriter, LengthWidth};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::{ParserError, Result};

/// Encoder side: names in allocation order, code `n` is the `n`th name.
#[derive(Debug, Default)]
pub(crate) struct AdHocPool {
	names: IndexSet<String, FxBuildHasher>,
}

impl AdHocPool {
	/// Returns the code for `name`, allocating the next one on first use.
	pub(crate) fn code_for(&mut self, name: &str) -> Result<u16> {
		if let Some(index) = self.names.get_index_of(name) {
			return Ok(index as u16 + 1);
		}
		if !name.is_ascii() {
			return Err(ParserError::NonAsciiName(name.to_string()));
		}
		if self.names.len() >= usize::from(u16::MAX) {
			return Err(ParserError::PoolOverflow {
				max: usize::from(u16::MAX),
			});
		}
		self.names.insert(name.to_string());
		Ok(self.names.len() as u16)
	}

	/// Writes `count:u16` then `(ascii name, code:u16)` per entry.
	pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
		let prev = w.set_width(LengthWidth::Short);
		w.write_u16(self.names.len() as u16);
		for (index, name) in self.names.iter().enumerate() {
			w.write_ascii(name)?;
			w.write_u16(index as u16 + 1);
		}
		w.set_width(prev);
		Ok(())
	}
}

/// Decoder side: code to name.
#[derive(Debug, Default)]
pub(crate) struct PoolNames {
	names: FxHashMap<u16, String>,
}

impl PoolNames {
	pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
		let prev = r.set_width(LengthWidth::Short);
		let count = usize::from(r.read_u16()?);
		let mut names = FxHashMap::with_capacity_and_hasher(count.min(r.available()), FxBuildHasher);
		for _ in 0..count {
			let name = r.read_ascii()?;
			let code = r.read_u16()?;
			names.insert(code, name);
		}
		r.set_width(prev);
		Ok(Self { names })
	}

	pub(crate) fn name(&self, code: u16) -> Result<&str> {
		self.names
			.get(&code)
			.map(String::as_str)
			.ok_or(ParserError::UnknownPoolCode(code))
	}
}
