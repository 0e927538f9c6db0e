//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Top-level codec settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
	/// Raise on unknown dictionaries, objects and tags instead of dropping them.
	pub validated: bool,
	pub compression: CompressionConfig,
	/// Installs the bundled encrypter when present.
	pub encryption: Option<EncrypterConfig>,
}

impl CodecConfig {
	/// Parses a TOML document.
	pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(src)
	}

	/// Strict configuration with defaults elsewhere.
	pub fn strict() -> Self {
		Self {
			validated: true,
			..Self::default()
		}
	}
}

/// Settings for the bundled brotli compressor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
	/// Brotli quality, 0 to 11.
	pub quality: u32,
	/// Base-2 logarithm of the sliding window, 10 to 24.
	pub window: u32,
	/// Internal buffer size in bytes.
	pub buffer_size: usize,
}

fn default_quality() -> u32 {
	5
}

fn default_window() -> u32 {
	22
}

fn default_buffer_size() -> usize {
	4096
}

impl Default for CompressionConfig {
	fn default() -> Self {
		Self {
			quality: default_quality(),
			window: default_window(),
			buffer_size: default_buffer_size(),
		}
	}
}

/// Settings handed to [`Encrypter::init`](crate::Encrypter::init).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncrypterConfig {
	/// Base64 encoded key.
	pub key: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = CodecConfig::from_toml_str("").unwrap();
		assert_eq!(config, CodecConfig::default());
		assert!(!config.validated);
		assert_eq!(config.compression.quality, 5);
		assert_eq!(config.compression.window, 22);
		assert_eq!(config.compression.buffer_size, 4096);
		assert!(config.encryption.is_none());
	}

	#[test]
	fn test_parse_full() {
		let config = CodecConfig::from_toml_str(
			r#"
validated = true

[compression]
quality = 9

[encryption]
key = "AAAA"
"#,
		)
		.unwrap();
		assert!(config.validated);
		assert_eq!(config.compression.quality, 9);
		assert_eq!(config.compression.window, 22);
		assert_eq!(config.encryption.unwrap().key, "AAAA");
	}

	#[test]
	fn test_unknown_type_rejected() {
		assert!(CodecConfig::from_toml_str("validated = 3").is_err());
	}
}
