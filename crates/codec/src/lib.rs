//! Compact, versioned binary codec for bio records.
//!
//! [`BioCodec`] turns records (or arrays and lists of records) into a
//! self-describing envelope and back, using the schemas held in a
//! [`DictionaryRegistry`](bio_dictionary::DictionaryRegistry). Fields are
//! addressed by tag code, so readers built against an older schema skip what
//! they do not know. Compression, encryption and the lossless text form are
//! pluggable collaborators.

mod codec;
pub mod collab;
pub mod config;
mod decode;
mod encode;
pub mod error;
pub mod flags;
mod pool;

pub use codec::{BioCodec, BioCodecBuilder, CodecStats, EncodeOptions, Payload, StatsSnapshot};
pub use collab::{BrotliCompressor, Compressor, Encrypter, JsonTextCodec, TextCodec, XChaChaEncrypter};
pub use config::{CodecConfig, CompressionConfig, EncrypterConfig};
pub use error::{BoxError, ParserError, Result};
pub use flags::EnvelopeFlags;
