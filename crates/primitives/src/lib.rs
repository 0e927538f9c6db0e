//! Wire-level primitives for the bio record format.
//!
//! Everything here is independent of the dictionary: fixed-width big-endian
//! codecs over growable write buffers and bounded read cursors, plus the closed
//! set of value kinds ([`BioType`]) and field shapes ([`Shape`]) that appear in
//! field headers.

/// Value kinds and field shapes with their stable wire bytes.
pub mod bio_type;
/// Growable write cursor and bounded read cursor.
pub mod bytes;
/// Errors raised by the byte cursors.
pub mod error;

pub use bio_type::{BioType, Shape};
pub use bytes::{ByteReader, ByteWriter, LengthWidth};
pub use error::{ByteError, Result};
