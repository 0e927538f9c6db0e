use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bio_dictionary::{BioObject, DictionaryRegistry, RecordArray, Value};
use bio_primitives::{ByteReader, ByteWriter};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collab::{BrotliCompressor, Compressor, Encrypter, JsonTextCodec, TextCodec, XChaChaEncrypter};
use crate::config::CodecConfig;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{ParserError, Result};
use crate::flags::EnvelopeFlags;
use crate::pool::PoolNames;

/// What an envelope carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
	Record(BioObject),
	/// Records typed by their narrowest common native type.
	Array(RecordArray),
	List(Vec<BioObject>),
}

impl Payload {
	fn shape_flags(&self) -> EnvelopeFlags {
		match self {
			Payload::Record(_) => EnvelopeFlags::empty(),
			Payload::Array(_) => EnvelopeFlags::ARRAY,
			Payload::List(_) => EnvelopeFlags::LIST,
		}
	}

	/// Wraps a value that is a record or a sequence of records.
	pub fn from_value(value: &Value) -> Result<Self> {
		fn records(items: &[Value]) -> Result<Vec<BioObject>> {
			items
				.iter()
				.map(|v| match v {
					Value::Object(rec) => Ok(rec.clone()),
					other => Err(ParserError::Unsupported(format!(
						"sequence element of kind {}",
						other.bio_type()
					))),
				})
				.collect()
		}
		match value {
			Value::Object(rec) => Ok(Payload::Record(rec.clone())),
			Value::Array(items) => Ok(Payload::Array(RecordArray::inferred(records(items)?))),
			Value::Records(arr) => Ok(Payload::Array(arr.clone())),
			Value::List(items) => Ok(Payload::List(records(items)?)),
			other => Err(ParserError::Unsupported(format!(
				"top-level value of kind {}",
				other.bio_type()
			))),
		}
	}
}

impl From<BioObject> for Payload {
	fn from(rec: BioObject) -> Self {
		Payload::Record(rec)
	}
}

impl From<RecordArray> for Payload {
	fn from(arr: RecordArray) -> Self {
		Payload::Array(arr)
	}
}

/// Per-call encoding switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
	pub compress: bool,
	/// Emit the text form instead of the binary layout.
	pub lossless: bool,
	pub encrypt: bool,
}

impl EncodeOptions {
	pub fn compressed(mut self) -> Self {
		self.compress = true;
		self
	}

	pub fn encrypted(mut self) -> Self {
		self.encrypt = true;
		self
	}

	pub fn lossless(mut self) -> Self {
		self.lossless = true;
		self
	}
}

/// Counters of data dropped under lenient validation.
#[derive(Debug, Default)]
pub struct CodecStats {
	dropped_records: AtomicU64,
	skipped_fields: AtomicU64,
	skipped_elements: AtomicU64,
}

/// Point-in-time copy of [`CodecStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
	/// Records whose dictionary or object was unknown.
	pub dropped_records: u64,
	/// Fields without a tag or with an unrepresentable value.
	pub skipped_fields: u64,
	/// Sequence elements with an unrepresentable value.
	pub skipped_elements: u64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Dropped {
	Record,
	Field,
	Element,
}

impl CodecStats {
	pub(crate) fn count(&self, what: Dropped) {
		let counter = match what {
			Dropped::Record => &self.dropped_records,
			Dropped::Field => &self.skipped_fields,
			Dropped::Element => &self.skipped_elements,
		};
		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> StatsSnapshot {
		StatsSnapshot {
			dropped_records: self.dropped_records.load(Ordering::Relaxed),
			skipped_fields: self.skipped_fields.load(Ordering::Relaxed),
			skipped_elements: self.skipped_elements.load(Ordering::Relaxed),
		}
	}
}

/// Binary codec bound to a dictionary registry.
///
/// Every call is self-contained; a codec can be shared between threads.
pub struct BioCodec {
	registry: Arc<DictionaryRegistry>,
	config: CodecConfig,
	compressor: Option<Box<dyn Compressor>>,
	encrypter: Option<Box<dyn Encrypter>>,
	text: Option<Box<dyn TextCodec>>,
	stats: CodecStats,
}

/// Builder for [`BioCodec`].
pub struct BioCodecBuilder {
	registry: Arc<DictionaryRegistry>,
	config: CodecConfig,
	compressor: Option<Box<dyn Compressor>>,
	encrypter: Option<Box<dyn Encrypter>>,
	text: Option<Box<dyn TextCodec>>,
}

impl BioCodecBuilder {
	pub fn config(mut self, config: CodecConfig) -> Self {
		self.config = config;
		self
	}

	/// Shorthand for toggling strict validation.
	pub fn validated(mut self, on: bool) -> Self {
		self.config.validated = on;
		self
	}

	pub fn compressor(mut self, compressor: impl Compressor + 'static) -> Self {
		self.compressor = Some(Box::new(compressor));
		self
	}

	/// Installs an encrypter. It is initialized from the configuration's
	/// encryption section when one is present, and used as is otherwise.
	pub fn encrypter(mut self, encrypter: impl Encrypter + 'static) -> Self {
		self.encrypter = Some(Box::new(encrypter));
		self
	}

	pub fn text_codec(mut self, text: impl TextCodec + 'static) -> Self {
		self.text = Some(Box::new(text));
		self
	}

	/// Finishes the codec, filling in the bundled collaborators.
	pub fn build(self) -> Result<BioCodec> {
		let compressor = self
			.compressor
			.unwrap_or_else(|| Box::new(BrotliCompressor::new(&self.config.compression)));
		let text = self.text.unwrap_or_else(|| Box::new(JsonTextCodec));
		let encrypter = match (&self.config.encryption, self.encrypter) {
			(Some(cfg), encrypter) => {
				let mut encrypter = encrypter.unwrap_or_else(|| Box::new(XChaChaEncrypter::default()));
				if !encrypter.init(cfg) {
					return Err(ParserError::EncrypterInit);
				}
				Some(encrypter)
			}
			(None, encrypter) => encrypter,
		};
		Ok(BioCodec {
			registry: self.registry,
			config: self.config,
			compressor: Some(compressor),
			encrypter,
			text: Some(text),
			stats: CodecStats::default(),
		})
	}
}

impl BioCodec {
	pub fn builder(registry: Arc<DictionaryRegistry>) -> BioCodecBuilder {
		BioCodecBuilder {
			registry,
			config: CodecConfig::default(),
			compressor: None,
			encrypter: None,
			text: None,
		}
	}

	/// Lenient codec with the bundled collaborators and no encrypter.
	pub fn new(registry: Arc<DictionaryRegistry>) -> Self {
		BioCodec {
			registry,
			config: CodecConfig::default(),
			compressor: Some(Box::new(BrotliCompressor::default())),
			encrypter: None,
			text: Some(Box::new(JsonTextCodec)),
			stats: CodecStats::default(),
		}
	}

	pub fn registry(&self) -> &Arc<DictionaryRegistry> {
		&self.registry
	}

	pub fn config(&self) -> &CodecConfig {
		&self.config
	}

	pub fn stats(&self) -> &CodecStats {
		&self.stats
	}

	fn compressor(&self) -> Result<&dyn Compressor> {
		self.compressor
			.as_deref()
			.ok_or(ParserError::MissingCollaborator("compressor"))
	}

	fn encrypter(&self) -> Result<&dyn Encrypter> {
		self.encrypter
			.as_deref()
			.ok_or(ParserError::MissingCollaborator("encrypter"))
	}

	fn text(&self) -> Result<&dyn TextCodec> {
		self.text
			.as_deref()
			.ok_or(ParserError::MissingCollaborator("text codec"))
	}

	/// Encodes a record or a sequence of records.
	///
	/// Layout: `flag:u8, pool_count:u16, (name, code:u16)*, [original_len:u32], payload`.
	pub fn encode(&self, payload: &Payload, opts: EncodeOptions) -> Result<Vec<u8>> {
		let mut flags = payload.shape_flags();
		let mut encoder = Encoder::new(&self.registry, self.config.validated, &self.stats);
		let mut body = if opts.lossless {
			flags |= EnvelopeFlags::LOSSLESS;
			self.text()?
				.export(payload, &self.registry)
				.map_err(ParserError::Text)?
		} else {
			encoder.encode_payload(payload)?
		};

		let original_len = body.len();
		if opts.compress {
			flags |= EnvelopeFlags::COMPRESSED;
			body = self.compressor()?
				.compress(&body)
				.map_err(ParserError::Compression)?;
		}
		if opts.encrypt {
			flags |= EnvelopeFlags::ENCRYPTED;
			body = self.encrypter()?
				.encrypt(&body)
				.map_err(ParserError::Encryption)?;
		}

		let mut out = ByteWriter::with_capacity(body.len() + 16);
		out.write_u8(flags.bits());
		encoder.pool().write(&mut out)?;
		if opts.compress {
			let len = u32::try_from(original_len).map_err(|_| bio_primitives::ByteError::LengthOverflow {
				len: original_len,
				max: u32::MAX as usize,
			})?;
			out.write_u32(len);
		}
		out.write_bytes(&body);
		trace!(flags = flags.bits(), len = out.len(), "encoded envelope");
		Ok(out.finish())
	}

	/// Encodes a value that is a record or a sequence of records.
	pub fn encode_value(&self, value: &Value, opts: EncodeOptions) -> Result<Vec<u8>> {
		self.encode(&Payload::from_value(value)?, opts)
	}

	/// Decodes an envelope.
	///
	/// Returns `None` when the only record was dropped under lenient
	/// validation.
	pub fn decode(&self, bytes: &[u8]) -> Result<Option<Payload>> {
		let mut r = ByteReader::new(bytes);
		let bits = r.read_u8()?;
		let flags = EnvelopeFlags::from_bits(bits).ok_or(ParserError::BadFlags(bits))?;
		if flags.contains(EnvelopeFlags::PORTABLE) {
			return Err(ParserError::Unsupported(
				"portable envelopes with an embedded dictionary".into(),
			));
		}
		if flags.contains(EnvelopeFlags::ARRAY | EnvelopeFlags::LIST) {
			return Err(ParserError::BadFlags(bits));
		}
		let pool = PoolNames::read(&mut r)?;
		let original_len = if flags.contains(EnvelopeFlags::COMPRESSED) {
			Some(r.read_u32()? as usize)
		} else {
			None
		};

		let mut body = r.rest().to_vec();
		if flags.contains(EnvelopeFlags::ENCRYPTED) {
			body = self.encrypter()?
				.decrypt(&body)
				.map_err(ParserError::Encryption)?;
		}
		if let Some(expected) = original_len {
			body = self.compressor()?
				.decompress(&body, expected)
				.map_err(ParserError::Compression)?;
			if body.len() != expected {
				return Err(ParserError::LengthMismatch {
					expected,
					actual: body.len(),
				});
			}
		}
		trace!(flags = bits, len = bytes.len(), "decoding envelope");

		if flags.contains(EnvelopeFlags::LOSSLESS) {
			let payload = self.text()?
				.import(&body, &self.registry)
				.map_err(ParserError::Text)?;
			return Ok(Some(payload));
		}

		let decoder = Decoder::new(&self.registry, self.config.validated, &self.stats, &pool);
		let mut r = ByteReader::new(&body);
		if flags.contains(EnvelopeFlags::ARRAY) {
			let items = decoder.decode_sequence(&mut r)?;
			Ok(Some(Payload::Array(RecordArray::inferred(items))))
		} else if flags.contains(EnvelopeFlags::LIST) {
			Ok(Some(Payload::List(decoder.decode_sequence(&mut r)?)))
		} else if r.available() == 0 {
			Ok(None)
		} else {
			Ok(decoder.read_record(&mut r)?.map(Payload::Record))
		}
	}
}
