//! The surface representation of the NGQL graph query language: the
//! sentence tree an external parser produces, the expression algebra inside
//! it, and the runtime value model expressions evaluate to.
//!
//! Semantic validation and plan lowering live in the `ngqlc` crate.

pub mod error;
pub mod expr;
pub mod span;
pub mod stmt;
pub mod types;
pub mod value;

pub use error::{Error, ErrorCode, ErrorKind, NotFoundKind, Result, WithErrorInfo};
pub use expr::{Expr, ExprKind};
pub use span::Span;
pub use stmt::{Sentence, SentenceKind};
pub use types::ValueType;
pub use value::{NullKind, Value};
