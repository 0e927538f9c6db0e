use std::io::{Read, Write};

use super::Compressor;
use crate::config::CompressionConfig;
use crate::error::BoxError;

/// Upper bound on the expansion trusted when reserving decompression space.
const MAX_RATIO: usize = 64;

/// Brotli block compressor.
#[derive(Debug, Clone)]
pub struct BrotliCompressor {
	quality: u32,
	window: u32,
	buffer_size: usize,
}

impl BrotliCompressor {
	pub fn new(config: &CompressionConfig) -> Self {
		Self {
			quality: config.quality.min(11),
			window: config.window.clamp(10, 24),
			buffer_size: config.buffer_size.max(1),
		}
	}
}

impl Default for BrotliCompressor {
	fn default() -> Self {
		Self::new(&CompressionConfig::default())
	}
}

impl Compressor for BrotliCompressor {
	fn compress(&self, input: &[u8]) -> Result<Vec<u8>, BoxError> {
		let mut out = Vec::with_capacity(input.len() / 2 + 16);
		let mut writer = ::brotli::CompressorWriter::new(&mut out, self.buffer_size, self.quality, self.window);
		writer.write_all(input)?;
		drop(writer);
		Ok(out)
	}

	fn decompress(&self, input: &[u8], original_len: usize) -> Result<Vec<u8>, BoxError> {
		let mut out = Vec::with_capacity(original_len.min(input.len().saturating_mul(MAX_RATIO)));
		::brotli::Decompressor::new(input, self.buffer_size).read_to_end(&mut out)?;
		Ok(out)
	}
}
