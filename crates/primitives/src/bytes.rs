use crate::error::{ByteError, Result};

/// Width of every "length" field (string, blob and sequence counts).
///
/// Objects flagged as large switch their fields to four-byte lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthWidth {
	/// Two-byte lengths, up to `u16::MAX`.
	#[default]
	Short,
	/// Four-byte lengths, up to `u32::MAX`.
	Long,
}

impl LengthWidth {
	/// Picks the width for an object's `is_large` flag.
	#[inline]
	pub const fn for_large(is_large: bool) -> Self {
		if is_large { LengthWidth::Long } else { LengthWidth::Short }
	}

	/// Largest length this width can carry.
	#[inline]
	pub const fn max_len(self) -> usize {
		match self {
			LengthWidth::Short => u16::MAX as usize,
			LengthWidth::Long => u32::MAX as usize,
		}
	}

	/// Number of bytes a length occupies.
	#[inline]
	pub const fn bytes(self) -> usize {
		match self {
			LengthWidth::Short => 2,
			LengthWidth::Long => 4,
		}
	}
}

/// Growable big-endian write cursor.
///
/// Capacity doubles (or grows to fit the pending write, whichever is larger)
/// whenever a write would overflow it.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
	buf: Vec<u8>,
	width: LengthWidth,
}

impl ByteWriter {
	/// Creates an empty writer with short lengths.
	#[must_use]
	pub fn new() -> Self {
		Self::with_capacity(32)
	}

	/// Creates an empty writer with the given initial capacity.
	#[must_use]
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			buf: Vec::with_capacity(capacity),
			width: LengthWidth::Short,
		}
	}

	/// Creates an empty writer using `width` for length fields.
	#[must_use]
	pub fn with_width(width: LengthWidth) -> Self {
		Self {
			width,
			..Self::new()
		}
	}

	/// Active length width.
	#[inline]
	pub fn width(&self) -> LengthWidth {
		self.width
	}

	/// Switches the length width, returning the previous one.
	pub fn set_width(&mut self, width: LengthWidth) -> LengthWidth {
		std::mem::replace(&mut self.width, width)
	}

	/// Number of bytes written so far.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Current buffer capacity.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.buf.capacity()
	}

	/// Bytes written so far.
	#[inline]
	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	/// Consumes the writer and returns its bytes.
	#[inline]
	#[must_use]
	pub fn finish(self) -> Vec<u8> {
		self.buf
	}

	fn grow_for(&mut self, additional: usize) {
		let needed = self.buf.len() + additional;
		if needed > self.buf.capacity() {
			let target = (self.buf.capacity() * 2).max(needed);
			self.buf.reserve_exact(target - self.buf.len());
		}
	}

	/// Appends raw bytes without a length prefix.
	pub fn write_bytes(&mut self, bytes: &[u8]) {
		self.grow_for(bytes.len());
		self.buf.extend_from_slice(bytes);
	}

	#[inline]
	pub fn write_u8(&mut self, v: u8) {
		self.write_bytes(&[v]);
	}

	#[inline]
	pub fn write_i8(&mut self, v: i8) {
		self.write_bytes(&v.to_be_bytes());
	}

	#[inline]
	pub fn write_bool(&mut self, v: bool) {
		self.write_u8(u8::from(v));
	}

	#[inline]
	pub fn write_u16(&mut self, v: u16) {
		self.write_bytes(&v.to_be_bytes());
	}

	#[inline]
	pub fn write_i16(&mut self, v: i16) {
		self.write_bytes(&v.to_be_bytes());
	}

	#[inline]
	pub fn write_u32(&mut self, v: u32) {
		self.write_bytes(&v.to_be_bytes());
	}

	#[inline]
	pub fn write_i32(&mut self, v: i32) {
		self.write_bytes(&v.to_be_bytes());
	}

	#[inline]
	pub fn write_i64(&mut self, v: i64) {
		self.write_bytes(&v.to_be_bytes());
	}

	/// Writes the raw IEEE 754 bit pattern.
	#[inline]
	pub fn write_f32(&mut self, v: f32) {
		self.write_u32(v.to_bits());
	}

	/// Writes the raw IEEE 754 bit pattern.
	#[inline]
	pub fn write_f64(&mut self, v: f64) {
		self.write_bytes(&v.to_bits().to_be_bytes());
	}

	/// Writes a length (or count) in the active width.
	pub fn write_len(&mut self, len: usize) -> Result<()> {
		let max = self.width.max_len();
		if len > max {
			return Err(ByteError::LengthOverflow { len, max });
		}
		match self.width {
			LengthWidth::Short => self.write_u16(len as u16),
			LengthWidth::Long => self.write_u32(len as u32),
		}
		Ok(())
	}

	/// Writes a one-byte-per-char string; chars outside ASCII become `?`.
	pub fn write_ascii(&mut self, s: &str) -> Result<()> {
		let count = s.chars().count();
		self.write_len(count)?;
		self.grow_for(count);
		self.buf
			.extend(s.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }));
		Ok(())
	}

	/// Writes a UTF-8 string prefixed with its byte length.
	pub fn write_utf(&mut self, s: &str) -> Result<()> {
		self.write_blob(s.as_bytes())
	}

	/// Writes an opaque blob prefixed with its length.
	pub fn write_blob(&mut self, bytes: &[u8]) -> Result<()> {
		self.write_len(bytes.len())?;
		self.write_bytes(bytes);
		Ok(())
	}

	/// Overwrites two bytes at `pos`, used to back-fill counts.
	pub fn patch_u16(&mut self, pos: usize, v: u16) {
		self.buf[pos..pos + 2].copy_from_slice(&v.to_be_bytes());
	}

	/// Overwrites a length written earlier at `pos` in the active width.
	pub fn patch_len(&mut self, pos: usize, len: usize) -> Result<()> {
		let max = self.width.max_len();
		if len > max {
			return Err(ByteError::LengthOverflow { len, max });
		}
		match self.width {
			LengthWidth::Short => self.patch_u16(pos, len as u16),
			LengthWidth::Long => self.buf[pos..pos + 4].copy_from_slice(&(len as u32).to_be_bytes()),
		}
		Ok(())
	}
}

/// Bounded big-endian read cursor over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	buf: &'a [u8],
	pos: usize,
	width: LengthWidth,
}

impl<'a> ByteReader<'a> {
	/// Creates a cursor over the whole buffer.
	#[must_use]
	pub fn new(buf: &'a [u8]) -> Self {
		Self {
			buf,
			pos: 0,
			width: LengthWidth::Short,
		}
	}

	/// Creates a cursor over `buf[position..position + length]`.
	pub fn with_bounds(buf: &'a [u8], position: usize, length: usize) -> Result<Self> {
		let end = position.checked_add(length).filter(|&end| end <= buf.len());
		match end {
			Some(end) => Ok(Self::new(&buf[position..end])),
			None => Err(ByteError::Underflow {
				needed: length,
				available: buf.len().saturating_sub(position),
			}),
		}
	}

	/// Bytes consumed so far.
	#[inline]
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Total length of the bounded region.
	#[inline]
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Bytes left to read.
	#[inline]
	pub fn available(&self) -> usize {
		self.buf.len() - self.pos
	}

	/// Active length width.
	#[inline]
	pub fn width(&self) -> LengthWidth {
		self.width
	}

	/// Switches the length width, returning the previous one.
	pub fn set_width(&mut self, width: LengthWidth) -> LengthWidth {
		std::mem::replace(&mut self.width, width)
	}

	/// Reads `n` bytes, failing with the available-vs-needed counts.
	pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.available() {
			return Err(ByteError::Underflow {
				needed: n,
				available: self.available(),
			});
		}
		let start = self.pos;
		self.pos += n;
		Ok(&self.buf[start..start + n])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut out = [0u8; N];
		out.copy_from_slice(self.read_bytes(N)?);
		Ok(out)
	}

	/// Advances past `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		self.read_bytes(n).map(|_| ())
	}

	/// Consumes and returns everything left.
	pub fn rest(&mut self) -> &'a [u8] {
		let start = self.pos;
		self.pos = self.buf.len();
		&self.buf[start..]
	}

	/// Splits off a sub-cursor over the next `n` bytes, inheriting the width.
	pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>> {
		let bytes = self.read_bytes(n)?;
		Ok(ByteReader {
			buf: bytes,
			pos: 0,
			width: self.width,
		})
	}

	#[inline]
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	#[inline]
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(i8::from_be_bytes(self.read_array()?))
	}

	/// Any non-zero byte reads as `true`.
	#[inline]
	pub fn read_bool(&mut self) -> Result<bool> {
		Ok(self.read_u8()? != 0)
	}

	#[inline]
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.read_array()?))
	}

	#[inline]
	pub fn read_i16(&mut self) -> Result<i16> {
		Ok(i16::from_be_bytes(self.read_array()?))
	}

	#[inline]
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.read_array()?))
	}

	#[inline]
	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(i32::from_be_bytes(self.read_array()?))
	}

	#[inline]
	pub fn read_i64(&mut self) -> Result<i64> {
		Ok(i64::from_be_bytes(self.read_array()?))
	}

	#[inline]
	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(f32::from_bits(self.read_u32()?))
	}

	#[inline]
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
	}

	/// Reads a length (or count) in the active width.
	pub fn read_len(&mut self) -> Result<usize> {
		match self.width {
			LengthWidth::Short => self.read_u16().map(usize::from),
			LengthWidth::Long => self.read_u32().map(|v| v as usize),
		}
	}

	/// Reads a one-byte-per-char string.
	pub fn read_ascii(&mut self) -> Result<String> {
		let len = self.read_len()?;
		Ok(self.read_bytes(len)?.iter().map(|&b| char::from(b)).collect())
	}

	/// Reads a length-prefixed UTF-8 string.
	pub fn read_utf(&mut self) -> Result<String> {
		let bytes = self.read_blob()?;
		std::str::from_utf8(bytes)
			.map(str::to_owned)
			.map_err(|_| ByteError::InvalidUtf8)
	}

	/// Reads a length-prefixed opaque blob.
	pub fn read_blob(&mut self) -> Result<&'a [u8]> {
		let len = self.read_len()?;
		self.read_bytes(len)
	}
}

#[cfg(test)]
mod tests;
