use bitflags::bitflags;

bitflags! {
	/// Leading byte of every envelope.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct EnvelopeFlags: u8 {
		/// Payload is compressed; a four-byte original length precedes it.
		const COMPRESSED = 1 << 0;
		/// Payload is an array of records.
		const ARRAY = 1 << 1;
		/// Payload is a list of records.
		const LIST = 1 << 2;
		const ENCRYPTED = 1 << 3;
		/// Payload is text produced by the lossless text codec.
		const LOSSLESS = 1 << 4;
		/// Payload embeds its own dictionary.
		const PORTABLE = 1 << 5;
	}
}
