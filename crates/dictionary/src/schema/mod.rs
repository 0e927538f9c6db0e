//! Schema entities.
//!
//! Definitions are built by schema loaders and become immutable once handed
//! to a [`Dictionary`](crate::Dictionary); the only later rewrite is the
//! validation pass resolving tag type references.

mod enums;
mod func;
mod obj;
mod tag;

pub use enums::{EnumConstant, EnumDef};
pub use func::FuncDef;
pub use obj::ObjDef;
pub use tag::{TagDef, TypeRef};

/// Result of a successful registration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertAction {
	/// Key was new; definition inserted.
	InsertedNew,
	/// Identical definition already present; kept it.
	KeptExisting,
	/// Compatible upgrade; the new definition superseded the old one.
	ReplacedExisting,
}

#[cfg(test)]
mod tests;
