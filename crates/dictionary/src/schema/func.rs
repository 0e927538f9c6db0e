use bio_primitives::BioType;

/// Signature of a named dictionary function.
///
/// Functions are opaque to the codec; the dictionary only keeps their
/// signatures for the expression evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncDef {
	pub name: String,
	pub params: Vec<BioType>,
	pub returns: BioType,
}

impl FuncDef {
	pub fn new(name: impl Into<String>, params: Vec<BioType>, returns: BioType) -> Self {
		Self {
			name: name.into(),
			params,
			returns,
		}
	}
}
