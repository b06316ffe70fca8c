//! Semantic validator and logical planner for the NGQL graph query
//! language.
//!
//! The external parser produces a [Sentence] tree (`ngqlc-ast`); this
//! crate resolves it against a [catalog::Catalog] and a [session::Session]
//! and lowers it into an [ir::ExecutionPlan] for the executor. Expression
//! evaluation ([eval]) and the builtin function registry ([functions]) are
//! the runtime half of the same algebra.

pub mod catalog;
pub mod codegen;
pub mod context;
pub mod eval;
pub mod functions;
pub mod ir;
pub mod semantic;
pub mod session;
pub mod time;

pub use catalog::{Catalog, MemCatalog};
pub use context::QueryContext;
pub use ir::ExecutionPlan;
pub use ngqlc_ast::{
    Error, ErrorCode, ErrorKind, Expr, ExprKind, NotFoundKind, Result, Sentence, SentenceKind,
    Span, Value, ValueType,
};
pub use semantic::validate;
pub use session::Session;
