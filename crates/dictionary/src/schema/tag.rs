use bio_primitives::{BioType, Shape};
use rustc_hash::FxHashSet;

use crate::value::{Expression, Value};

/// Target of a `BioObject` or `BioEnum` tag.
///
/// Loaders register tags with a bare type name; the dictionary's validation
/// pass rewrites it to the resolved object or enum code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
	/// Type name not yet resolved.
	Unresolved(String),
	/// Resolved object code.
	Obj(u16),
	/// Resolved enum code.
	Enum(u16),
}

/// Schema definition of one field.
#[derive(Debug, Clone)]
pub struct TagDef {
	code: i16,
	name: String,
	value_type: BioType,
	shape: Shape,
	is_mandatory: bool,
	is_encodable: bool,
	is_exportable: bool,
	is_inheritable: bool,
	type_ref: Option<TypeRef>,
	use_key: Option<String>,
	sort_key: Option<String>,
	trim_keys: FxHashSet<String>,
	initial: Option<Value>,
	expression: Option<Expression>,
}

impl TagDef {
	/// Creates an encodable, exportable, inheritable scalar tag.
	pub fn new(code: i16, name: impl Into<String>, value_type: BioType) -> Self {
		Self {
			code,
			name: name.into(),
			value_type,
			shape: Shape::Scalar,
			is_mandatory: false,
			is_encodable: true,
			is_exportable: true,
			is_inheritable: true,
			type_ref: None,
			use_key: None,
			sort_key: None,
			trim_keys: FxHashSet::default(),
			initial: None,
			expression: None,
		}
	}

	/// Creates a `BioObject` tag pointing at an object type by name.
	pub fn object(code: i16, name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self::new(code, name, BioType::BioObject).references(type_name)
	}

	/// Creates a `BioEnum` tag pointing at an enum type by name.
	pub fn enumeration(code: i16, name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self::new(code, name, BioType::BioEnum).references(type_name)
	}

	/// Marks the tag as an array.
	pub fn array(mut self) -> Self {
		self.shape = Shape::Array;
		self
	}

	/// Marks the tag as a list.
	pub fn list(mut self) -> Self {
		self.shape = Shape::List;
		self
	}

	pub fn mandatory(mut self, on: bool) -> Self {
		self.is_mandatory = on;
		self
	}

	pub fn encodable(mut self, on: bool) -> Self {
		self.is_encodable = on;
		self
	}

	pub fn exportable(mut self, on: bool) -> Self {
		self.is_exportable = on;
		self
	}

	pub fn inheritable(mut self, on: bool) -> Self {
		self.is_inheritable = on;
		self
	}

	/// Sets the referenced type name, resolved during validation.
	pub fn references(mut self, type_name: impl Into<String>) -> Self {
		self.type_ref = Some(TypeRef::Unresolved(type_name.into()));
		self
	}

	pub fn use_key(mut self, key: impl Into<String>) -> Self {
		self.use_key = Some(key.into());
		self
	}

	pub fn sort_key(mut self, key: impl Into<String>) -> Self {
		self.sort_key = Some(key.into());
		self
	}

	pub fn trim_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.trim_keys = keys.into_iter().map(Into::into).collect();
		self
	}

	/// Value stamped on fresh instances.
	pub fn initial(mut self, value: impl Into<Value>) -> Self {
		self.initial = Some(value.into());
		self
	}

	/// Expression computing the default; stored on fresh instances as a placeholder.
	pub fn expression(mut self, source: impl Into<String>) -> Self {
		self.expression = Some(Expression::new(source));
		self
	}

	#[inline]
	pub fn code(&self) -> i16 {
		self.code
	}

	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn value_type(&self) -> BioType {
		self.value_type
	}

	#[inline]
	pub fn shape(&self) -> Shape {
		self.shape
	}

	#[inline]
	pub fn is_array(&self) -> bool {
		self.shape == Shape::Array
	}

	#[inline]
	pub fn is_list(&self) -> bool {
		self.shape == Shape::List
	}

	#[inline]
	pub fn is_mandatory(&self) -> bool {
		self.is_mandatory
	}

	/// Non-encodable tags never reach the wire.
	#[inline]
	pub fn is_encodable(&self) -> bool {
		self.is_encodable && self.value_type.is_wire()
	}

	#[inline]
	pub fn is_exportable(&self) -> bool {
		self.is_exportable
	}

	#[inline]
	pub fn is_inheritable(&self) -> bool {
		self.is_inheritable
	}

	pub fn type_ref(&self) -> Option<&TypeRef> {
		self.type_ref.as_ref()
	}

	/// Resolved object code, once validated.
	pub fn referenced_obj(&self) -> Option<u16> {
		match self.type_ref {
			Some(TypeRef::Obj(code)) => Some(code),
			_ => None,
		}
	}

	/// Resolved enum code, once validated.
	pub fn referenced_enum(&self) -> Option<u16> {
		match self.type_ref {
			Some(TypeRef::Enum(code)) => Some(code),
			_ => None,
		}
	}

	pub fn use_key_name(&self) -> Option<&str> {
		self.use_key.as_deref()
	}

	pub fn sort_key_name(&self) -> Option<&str> {
		self.sort_key.as_deref()
	}

	pub fn trimmed_keys(&self) -> &FxHashSet<String> {
		&self.trim_keys
	}

	pub fn initial_value(&self) -> Option<&Value> {
		self.initial.as_ref()
	}

	pub fn default_expression(&self) -> Option<&Expression> {
		self.expression.as_ref()
	}

	/// Points the tag at a resolved object.
	pub(crate) fn resolve_obj(&mut self, code: u16) {
		self.type_ref = Some(TypeRef::Obj(code));
		self.value_type = BioType::BioObject;
	}

	/// Points the tag at a resolved enum, retyping it to `BioEnum`.
	pub(crate) fn resolve_enum(&mut self, code: u16) {
		self.type_ref = Some(TypeRef::Enum(code));
		self.value_type = BioType::BioEnum;
	}

	/// Two definitions describe the same wire field.
	pub(crate) fn same_wire_shape(&self, other: &TagDef) -> bool {
		self.value_type == other.value_type && self.shape == other.shape
	}
}
