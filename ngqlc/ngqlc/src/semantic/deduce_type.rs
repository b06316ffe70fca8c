//! Bottom-up type inference over expressions.
//!
//! Every reachable expression gets a type; `Any` marks the ones that can
//! only be checked at runtime (input properties before their schema is
//! known, container elements). A rule failure aborts validation with a
//! semantic error.

use std::collections::HashMap;

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::expr::{
    ArithmeticOp, Expr, ExprKind, RelationalOp, UnaryOp,
};
use ngqlc_ast::types::ValueType;

use crate::context::{ColsDef, QueryContext};
use crate::functions::AggFunction;

/// Which reference scopes the surrounding sentence admits.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scopes {
    pub graph: bool,
    /// Error text used when a graph-scope reference shows up while
    /// `graph` is off.
    pub graph_error: Option<&'static str>,
    pub allow_aggregate: bool,
    /// LOOKUP restricts `schema.prop` references to the scanned schema.
    pub restrict_to_schema: Option<String>,
}

pub(crate) struct TypeDeducer<'a> {
    pub qctx: &'a QueryContext,
    pub inputs: &'a ColsDef,
    /// Edge alias -> schema name, from the OVER clause.
    pub edge_aliases: &'a HashMap<String, String>,
    pub scopes: Scopes,
    locals: Vec<String>,
}

impl<'a> TypeDeducer<'a> {
    pub fn new(
        qctx: &'a QueryContext,
        inputs: &'a ColsDef,
        edge_aliases: &'a HashMap<String, String>,
        scopes: Scopes,
    ) -> Self {
        TypeDeducer {
            qctx,
            inputs,
            edge_aliases,
            scopes,
            locals: Vec::new(),
        }
    }

    fn space_name(&self) -> Result<&str> {
        self.qctx
            .session
            .space
            .as_ref()
            .map(|s| s.name.as_str())
            .ok_or_else(|| Error::semantic("Space was not chosen."))
    }

    fn graph_scope_allowed(&self) -> Result<()> {
        if self.scopes.graph {
            return Ok(());
        }
        Err(Error::semantic(
            self.scopes
                .graph_error
                .unwrap_or("Graph scope references are not allowed here."),
        ))
    }

    fn tag_prop_type(&self, tag: &str, prop: &str) -> Result<ValueType> {
        let space = self.space_name()?;
        let schema = self.qctx.catalog.tag_schema(space, tag)?;
        match schema.column(prop) {
            Some(col) => Ok(col.value_type()),
            None => Err(Error::semantic(format!(
                "`{prop}' not found in tag `{tag}'."
            ))),
        }
    }

    fn edge_prop_type(&self, alias: &str, prop: &str) -> Result<ValueType> {
        match prop {
            "_src" | "_dst" => return Ok(ValueType::Any),
            "_rank" | "_type" => return Ok(ValueType::Int),
            _ => {}
        }
        let space = self.space_name()?.to_string();
        let edge_name = self
            .edge_aliases
            .get(alias)
            .cloned()
            .unwrap_or_else(|| alias.to_string());
        let schema = self.qctx.catalog.edge_schema(&space, &edge_name)?;
        match schema.column(prop) {
            Some(col) => Ok(col.value_type()),
            None => Err(Error::semantic(format!(
                "`{prop}' not found in edge `{edge_name}'."
            ))),
        }
    }

    fn input_col_type(&self, col: &str) -> Result<ValueType> {
        if col == "*" {
            return Ok(ValueType::Any);
        }
        self.inputs
            .iter()
            .find(|c| c.name == col)
            .map(|c| c.vtype)
            .ok_or_else(|| Error::semantic(format!("column '{col}' not exist in input.")))
    }

    fn var_col_type(&self, var: &str, col: &str) -> Result<ValueType> {
        let cols = self.qctx.symbols.lookup(var)?;
        if col == "*" {
            return Ok(ValueType::Any);
        }
        cols.iter()
            .find(|c| c.name == col)
            .map(|c| c.vtype)
            .ok_or_else(|| {
                Error::semantic(format!("column '{col}' not exist in variable '{var}'."))
            })
    }

    pub fn deduce(&mut self, expr: &Expr) -> Result<ValueType> {
        use ExprKind::*;
        let ty = match &expr.kind {
            Constant(v) => v.value_type(),
            Label(name) => {
                if self.locals.iter().any(|l| l == name) {
                    ValueType::Any
                } else {
                    return Err(Error::semantic(format!(
                        "Invalid label identifiers: {name}"
                    )));
                }
            }
            LabelAttribute { label, attr } => {
                // reaches type inference only when the rewrite pass had no
                // scope to pin it to
                return Err(Error::semantic(format!(
                    "Invalid label identifiers: {label}.{attr}"
                )));
            }
            Variable(var) => {
                self.qctx.symbols.lookup(var)?;
                ValueType::DataSet
            }
            InputProperty(col) => self.input_col_type(col)?,
            VariableProperty { var, prop } => self.var_col_type(var, prop)?,
            SourceProperty { tag, prop } => {
                self.graph_scope_allowed()?;
                self.check_schema_restriction(tag)?;
                self.tag_prop_type(tag, prop)?
            }
            DestProperty { tag, prop } => {
                self.graph_scope_allowed()?;
                self.check_schema_restriction(tag)?;
                self.tag_prop_type(tag, prop)?
            }
            EdgeProperty { edge, prop } => {
                self.graph_scope_allowed()?;
                self.check_schema_restriction(edge)?;
                self.edge_prop_type(edge, prop)?
            }
            TagProperty { tag, prop } => {
                self.graph_scope_allowed()?;
                self.check_schema_restriction(tag)?;
                self.tag_prop_type(tag, prop)?
            }
            EdgeSrc(alias) | EdgeDst(alias) => {
                self.graph_scope_allowed()?;
                self.check_schema_restriction(alias)?;
                ValueType::Any
            }
            EdgeRank(alias) | EdgeTypeId(alias) => {
                self.graph_scope_allowed()?;
                self.check_schema_restriction(alias)?;
                ValueType::Int
            }
            VertexRef(_) => {
                self.graph_scope_allowed()?;
                ValueType::Vertex
            }
            EdgeRef => {
                self.graph_scope_allowed()?;
                ValueType::Edge
            }
            Column(idx) => {
                let idx = *idx;
                if idx < 0 || idx as usize >= self.inputs.len() {
                    return Err(Error::semantic(format!(
                        "Out of range column index: {idx}."
                    )));
                }
                self.inputs[idx as usize].vtype
            }

            Unary { op, operand } => {
                let t = self.deduce(operand)?;
                match op {
                    UnaryOp::Plus | UnaryOp::Negate => {
                        if t.is_numeric() || wild(t) {
                            t
                        } else {
                            return Err(type_error(expr, "a numeric", t));
                        }
                    }
                    UnaryOp::Not => {
                        if matches!(t, ValueType::Bool) || wild(t) {
                            ValueType::Bool
                        } else {
                            return Err(type_error(expr, "Boolean", t));
                        }
                    }
                    UnaryOp::IsNull
                    | UnaryOp::IsNotNull
                    | UnaryOp::IsEmpty
                    | UnaryOp::IsNotEmpty => ValueType::Bool,
                }
            }
            Arithmetic { op, left, right } => {
                let l = self.deduce(left)?;
                let r = self.deduce(right)?;
                self.arithmetic_type(expr, *op, l, r)?
            }
            Relational { op, left, right } => {
                let l = self.deduce(left)?;
                let r = self.deduce(right)?;
                self.relational_check(expr, *op, l, r)?;
                ValueType::Bool
            }
            Logical { left, right, .. } => {
                for side in [left, right] {
                    let t = self.deduce(side)?;
                    if !matches!(t, ValueType::Bool) && !wild(t) {
                        return Err(type_error(expr, "Boolean", t));
                    }
                }
                ValueType::Bool
            }
            TypeCasting { target, operand } => {
                let t = self.deduce(operand)?;
                if !matches!(
                    target,
                    ValueType::Bool | ValueType::Int | ValueType::Float | ValueType::String
                ) {
                    return Err(Error::not_supported(format!(
                        "Casting to {target} is not supported."
                    )));
                }
                if t.is_container() {
                    return Err(type_error(expr, "a scalar", t));
                }
                *target
            }
            FunctionCall { name, args } => {
                if AggFunction::is_agg_name(name) {
                    return Err(Error::semantic(format!(
                        "Invalid use of aggregating function `{name}' in this context."
                    )));
                }
                let mut arg_types = Vec::with_capacity(args.len());
                for arg in args {
                    arg_types.push(self.deduce(arg)?);
                }
                self.qctx.registry.return_type(name, &arg_types)?
            }
            Aggregate {
                func,
                arg,
                distinct: _,
            } => {
                if !self.scopes.allow_aggregate {
                    return Err(Error::semantic(format!(
                        "Invalid use of aggregating function `{func}' in this context."
                    )));
                }
                let agg = AggFunction::from_name(func).ok_or_else(|| {
                    Error::semantic(format!("Unknown aggregate function `{func}'"))
                })?;
                let arg_type = match arg {
                    Some(arg) => {
                        if arg.has_aggregate() {
                            return Err(Error::semantic(
                                "Aggregate function nesting is not allowed.",
                            ));
                        }
                        // the argument itself is a per-row expression
                        let was = self.scopes.allow_aggregate;
                        self.scopes.allow_aggregate = false;
                        let t = self.deduce(arg)?;
                        self.scopes.allow_aggregate = was;
                        t
                    }
                    None => ValueType::Any,
                };
                agg.return_type(arg_type)
                    .ok_or_else(|| Error::semantic("Parameter's type error"))?
            }
            Subscript { collection, index } => {
                let c = self.deduce(collection)?;
                let i = self.deduce(index)?;
                match c {
                    ValueType::List | ValueType::DataSet => {
                        if !matches!(i, ValueType::Int) && !wild(i) {
                            return Err(type_error(expr, "an integer index", i));
                        }
                    }
                    ValueType::Map => {
                        if !matches!(i, ValueType::String) && !wild(i) {
                            return Err(type_error(expr, "a string key", i));
                        }
                    }
                    t if wild(t) => {}
                    t => return Err(type_error(expr, "a container", t)),
                }
                ValueType::Any
            }
            SubscriptRange { collection, lo, hi } => {
                let c = self.deduce(collection)?;
                if !matches!(c, ValueType::List) && !wild(c) {
                    return Err(type_error(expr, "a list", c));
                }
                for bound in [lo, hi].into_iter().flatten() {
                    let t = self.deduce(bound)?;
                    if !matches!(t, ValueType::Int) && !wild(t) {
                        return Err(type_error(expr, "an integer bound", t));
                    }
                }
                ValueType::List
            }
            Attribute { collection, .. } => {
                let c = self.deduce(collection)?;
                match c {
                    ValueType::Map
                    | ValueType::Vertex
                    | ValueType::Edge
                    | ValueType::Date
                    | ValueType::Time
                    | ValueType::DateTime => ValueType::Any,
                    t if wild(t) => ValueType::Any,
                    t => return Err(type_error(expr, "a map, vertex or edge", t)),
                }
            }
            Case(case) => {
                if let Some(cond) = &case.condition {
                    self.deduce(cond)?;
                }
                let mut result = None;
                for (when, then) in &case.when_thens {
                    let w = self.deduce(when)?;
                    if case.condition.is_none() && !matches!(w, ValueType::Bool) && !wild(w) {
                        return Err(type_error(expr, "Boolean", w));
                    }
                    let t = self.deduce(then)?;
                    result = Some(unify(result, t));
                }
                if let Some(default) = &case.default {
                    let t = self.deduce(default)?;
                    result = Some(unify(result, t));
                }
                result.unwrap_or(ValueType::Any)
            }
            Predicate(pred) => {
                let c = self.deduce(&pred.collection)?;
                if !matches!(c, ValueType::List) && !wild(c) {
                    return Err(type_error(expr, "a list", c));
                }
                self.locals.push(pred.var.clone());
                let f = self.deduce(&pred.filter);
                self.locals.pop();
                let f = f?;
                if !matches!(f, ValueType::Bool) && !wild(f) {
                    return Err(type_error(expr, "Boolean", f));
                }
                ValueType::Bool
            }
            Reduce(reduce) => {
                let c = self.deduce(&reduce.collection)?;
                if !matches!(c, ValueType::List) && !wild(c) {
                    return Err(type_error(expr, "a list", c));
                }
                self.deduce(&reduce.initial)?;
                self.locals.push(reduce.accumulator.clone());
                self.locals.push(reduce.var.clone());
                let m = self.deduce(&reduce.mapping);
                self.locals.pop();
                self.locals.pop();
                m?;
                ValueType::Any
            }
            ListComprehension(lc) => {
                let c = self.deduce(&lc.collection)?;
                if !matches!(c, ValueType::List) && !wild(c) {
                    return Err(type_error(expr, "a list", c));
                }
                self.locals.push(lc.var.clone());
                let mut check = || -> Result<()> {
                    if let Some(filter) = &lc.filter {
                        let f = self.deduce(filter)?;
                        if !matches!(f, ValueType::Bool) && !wild(f) {
                            return Err(type_error(filter, "Boolean", f));
                        }
                    }
                    if let Some(mapping) = &lc.mapping {
                        self.deduce(mapping)?;
                    }
                    Ok(())
                };
                let res = check();
                self.locals.pop();
                res?;
                ValueType::List
            }
            ListCtor(items) | SetCtor(items) | PathBuild(items) => {
                for item in items {
                    self.deduce(item)?;
                }
                match &expr.kind {
                    ListCtor(_) => ValueType::List,
                    SetCtor(_) => ValueType::Set,
                    _ => ValueType::Path,
                }
            }
            MapCtor(items) => {
                for (_, v) in items {
                    self.deduce(v)?;
                }
                ValueType::Map
            }
            Uuid => ValueType::String,
        };
        Ok(ty)
    }

    fn check_schema_restriction(&self, schema: &str) -> Result<()> {
        if let Some(allowed) = &self.scopes.restrict_to_schema {
            if schema != allowed {
                return Err(Error::semantic(format!(
                    "Schema name error: {schema}"
                )));
            }
        }
        Ok(())
    }

    fn arithmetic_type(
        &self,
        expr: &Expr,
        op: ArithmeticOp,
        l: ValueType,
        r: ValueType,
    ) -> Result<ValueType> {
        use ValueType::*;
        if wild(l) || wild(r) {
            return Ok(Any);
        }
        let ty = match (op, l, r) {
            (_, Int, Int) => Int,
            (_, Int, Float) | (_, Float, Int) | (_, Float, Float) => {
                if op == ArithmeticOp::Modulo {
                    return Err(type_error(expr, "integers", Float));
                }
                Float
            }
            (ArithmeticOp::Add, String, String) => String,
            (ArithmeticOp::Add, List, List) => List,
            (ArithmeticOp::Add, Date, Duration) | (ArithmeticOp::Add, Duration, Date) => Date,
            (ArithmeticOp::Add, Time, Duration) | (ArithmeticOp::Add, Duration, Time) => Time,
            (ArithmeticOp::Add, DateTime, Duration) | (ArithmeticOp::Add, Duration, DateTime) => {
                DateTime
            }
            (ArithmeticOp::Add, Duration, Duration)
            | (ArithmeticOp::Subtract, Duration, Duration) => Duration,
            (ArithmeticOp::Subtract, Date, Duration) => Date,
            (ArithmeticOp::Subtract, Time, Duration) => Time,
            (ArithmeticOp::Subtract, DateTime, Duration) => DateTime,
            _ => {
                return Err(Error::semantic(format!(
                    "`{expr}' is not a valid expression: can not apply `{op}' to `{l}' and `{r}'."
                )))
            }
        };
        Ok(ty)
    }

    fn relational_check(
        &self,
        expr: &Expr,
        op: RelationalOp,
        l: ValueType,
        r: ValueType,
    ) -> Result<()> {
        use RelationalOp::*;
        match op {
            In | NotIn => {
                if !matches!(r, ValueType::List | ValueType::Set) && !wild(r) {
                    return Err(type_error(expr, "a list or set", r));
                }
            }
            Contains | NotContains | StartsWith | NotStartsWith | EndsWith | NotEndsWith
            | RegexMatch => {
                for t in [l, r] {
                    if !matches!(t, ValueType::String) && !wild(t) {
                        return Err(type_error(expr, "String", t));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn wild(t: ValueType) -> bool {
    matches!(t, ValueType::Any | ValueType::Null | ValueType::Empty)
}

fn unify(acc: Option<ValueType>, t: ValueType) -> ValueType {
    match acc {
        None => t,
        Some(a) if a == t => a,
        Some(_) => ValueType::Any,
    }
}

fn type_error(expr: &Expr, expected: &str, was: ValueType) -> Error {
    Error::semantic(format!("`{expr}', expected {expected}, but was `{was}'"))
}
