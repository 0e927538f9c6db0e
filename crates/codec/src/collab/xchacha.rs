use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use tracing::warn;

use super::Encrypter;
use crate::config::EncrypterConfig;
use crate::error::BoxError;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305 authenticated encryption.
///
/// Output is `nonce (24 bytes) || ciphertext || tag (16 bytes)`. The key is a
/// base64 encoded 32-byte secret.
#[derive(Default)]
pub struct XChaChaEncrypter {
	cipher: Option<XChaCha20Poly1305>,
}

impl XChaChaEncrypter {
	fn cipher(&self) -> Result<&XChaCha20Poly1305, BoxError> {
		self.cipher.as_ref().ok_or_else(|| "encrypter used before init".into())
	}
}

impl Encrypter for XChaChaEncrypter {
	fn init(&mut self, config: &EncrypterConfig) -> bool {
		let key = match STANDARD.decode(config.key.trim()) {
			Ok(key) => key,
			Err(error) => {
				warn!(%error, "encryption key is not valid base64");
				return false;
			}
		};
		match XChaCha20Poly1305::new_from_slice(&key) {
			Ok(cipher) => {
				self.cipher = Some(cipher);
				true
			}
			Err(_) => {
				warn!(len = key.len(), "encryption key must be 32 bytes");
				false
			}
		}
	}

	fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>, BoxError> {
		let cipher = self.cipher()?;
		let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
		let ciphertext = cipher
			.encrypt(&nonce, input)
			.map_err(|_| "encryption failed")?;
		let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
		out.extend_from_slice(&nonce);
		out.extend_from_slice(&ciphertext);
		Ok(out)
	}

	fn decrypt(&self, input: &[u8]) -> Result<Vec<u8>, BoxError> {
		let cipher = self.cipher()?;
		if input.len() < NONCE_LEN + TAG_LEN {
			return Err("ciphertext shorter than nonce and tag".into());
		}
		let (nonce, body) = input.split_at(NONCE_LEN);
		Ok(cipher
			.decrypt(XNonce::from_slice(nonce), body)
			.map_err(|_| "decryption failed: corrupted data or wrong key")?)
	}
}
