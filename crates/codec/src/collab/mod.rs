//! Pluggable collaborators: compression, encryption and the lossless text form.

mod brotli;
mod json;
mod xchacha;

use bio_dictionary::DictionaryRegistry;

pub use self::brotli::BrotliCompressor;
pub use self::json::JsonTextCodec;
pub use self::xchacha::XChaChaEncrypter;
use crate::codec::Payload;
use crate::config::EncrypterConfig;
use crate::error::BoxError;

/// Block compressor.
///
/// Must be deterministic and must accept anything its own `compress` produced.
pub trait Compressor: Send + Sync {
	fn compress(&self, input: &[u8]) -> Result<Vec<u8>, BoxError>;

	/// Restores `input`; `original_len` is the size before compression.
	fn decompress(&self, input: &[u8], original_len: usize) -> Result<Vec<u8>, BoxError>;
}

/// Symmetric payload encrypter.
pub trait Encrypter: Send + Sync {
	/// Configures the encrypter, returning false if the configuration is unusable.
	fn init(&mut self, config: &EncrypterConfig) -> bool;

	fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>, BoxError>;

	fn decrypt(&self, input: &[u8]) -> Result<Vec<u8>, BoxError>;
}

/// Text form used by lossless envelopes.
pub trait TextCodec: Send + Sync {
	fn export(&self, payload: &Payload, registry: &DictionaryRegistry) -> Result<Vec<u8>, BoxError>;

	fn import(&self, text: &[u8], registry: &DictionaryRegistry) -> Result<Payload, BoxError>;
}
