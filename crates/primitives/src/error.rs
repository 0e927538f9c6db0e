use thiserror::Error;

/// Failures raised while reading or writing wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteError {
	/// The read cursor ran out of bytes.
	#[error("buffer underflow: need {needed} bytes, have {available}")]
	Underflow {
		/// Bytes required by the pending read.
		needed: usize,
		/// Bytes left in the cursor.
		available: usize,
	},

	/// A length does not fit in the active length width.
	#[error("length {len} exceeds the {max} maximum of the active length width")]
	LengthOverflow {
		/// The length that was about to be written.
		len: usize,
		/// Largest length representable by the active width.
		max: usize,
	},

	/// A UTF-8 string field held invalid bytes.
	#[error("invalid UTF-8 in string field")]
	InvalidUtf8,
}

/// Result type for byte cursor operations.
pub type Result<T> = std::result::Result<T, ByteError>;
