//! Per-query scratch state: the expression arena, the symbol table and the
//! id wells. One context per query; nothing here is shared across queries.

use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use ngqlc_ast::error::{Error, NotFoundKind, Result};
use ngqlc_ast::expr::Expr;
use ngqlc_ast::types::ValueType;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::functions::FunctionRegistry;
use crate::session::Session;

/// A named, typed output column of a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColDef {
    pub name: String,
    pub vtype: ValueType,
}

impl ColDef {
    pub fn new(name: &str, vtype: ValueType) -> Self {
        ColDef {
            name: name.to_string(),
            vtype,
        }
    }
}

pub type ColsDef = Vec<ColDef>;

/// The anonymous variable a pipe's right side reads from.
pub const INPUT_VAR: &str = "-";

/// Maps `$var` to the column schema of the sentence that defined it.
/// Variables may only reference previously defined ones, which rules out
/// reference cycles by construction.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    vars: IndexMap<String, ColsDef>,
}

impl SymbolTable {
    pub fn register(&mut self, var: &str, cols: ColsDef) {
        self.vars.insert(var.to_string(), cols);
    }

    pub fn lookup(&self, var: &str) -> Result<&ColsDef> {
        self.vars
            .get(var)
            .ok_or_else(|| Error::not_found(NotFoundKind::Variable, var))
    }

    pub fn exists(&self, var: &str) -> bool {
        self.vars.contains_key(var)
    }
}

/// Handle into the query's expression arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprId(u32);

/// Bump arena for validator-constructed expressions. Expressions the
/// parser produced stay owned by the sentence tree; everything the
/// validator builds or clones lands here and dies with the query.
#[derive(Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    /// Cloning stays inside the same arena.
    pub fn clone_expr(&mut self, id: ExprId) -> ExprId {
        let cloned = self.get(id).clone();
        self.alloc(cloned)
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IdGenerator<T: From<i64>> {
    next_id: i64,
    phantom: PhantomData<T>,
}

impl<T: From<i64>> IdGenerator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> T {
        let id = self.next_id;
        self.next_id += 1;
        T::from(id)
    }
}

impl<T: From<i64>> Default for IdGenerator<T> {
    fn default() -> Self {
        IdGenerator {
            next_id: 0,
            phantom: PhantomData,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    prefix: &'static str,
    id: IdGenerator<i64>,
}

impl NameGenerator {
    pub fn new(prefix: &'static str) -> Self {
        NameGenerator {
            prefix,
            id: IdGenerator::new(),
        }
    }

    pub fn next(&mut self) -> String {
        format!("{}{}", self.prefix, self.id.next())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub sentences_validated: usize,
    pub exprs_allocated: usize,
}

pub struct QueryContext {
    pub catalog: Arc<dyn Catalog>,
    pub registry: Arc<FunctionRegistry>,
    pub session: Session,
    pub symbols: SymbolTable,
    pub arena: ExprArena,
    pub counters: Counters,
    node_ids: IdGenerator<i64>,
    anon_vars: NameGenerator,
}

impl QueryContext {
    pub fn new(catalog: Arc<dyn Catalog>, session: Session) -> Self {
        QueryContext {
            catalog,
            registry: Arc::new(FunctionRegistry::new()),
            session,
            symbols: SymbolTable::default(),
            arena: ExprArena::default(),
            counters: Counters::default(),
            node_ids: IdGenerator::new(),
            anon_vars: NameGenerator::new("__var_"),
        }
    }

    pub fn next_node_id(&mut self) -> i64 {
        self.node_ids.next()
    }

    pub fn anon_var(&mut self) -> String {
        self.anon_vars.next()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.counters.exprs_allocated += 1;
        self.arena.alloc(expr)
    }
}
