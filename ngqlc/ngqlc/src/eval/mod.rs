//! Total evaluation of expressions over an [ExprContext].
//!
//! Every rule returns a [Value]; invalid input produces a `Null` sentinel.
//! Binding correctness is the validator's job, so every context getter
//! falls back to NULL for unbound references.

mod context;

pub use context::{GraphContext, NullContext, RowContext};
use ngqlc_ast::expr::{
    ArithmeticOp, CaseExpr, Expr, ExprKind, ListComprehensionExpr, LogicalOp, PredicateExpr,
    PredicateFn, ReduceExpr, RelationalOp, UnaryOp, VertexRole,
};
use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::{List, Map, Path, Set, Step, Value};
use regex::Regex;

use crate::functions::hash::hash_bytes;
use crate::functions::FunctionRegistry;

/// The runtime bag of getters expressions read from. Everything defaults
/// to NULL so a context only implements the scopes it actually binds.
pub trait ExprContext {
    fn get_input(&self, _col: &str) -> Value {
        Value::NULL
    }
    fn get_var(&self, _var: &str) -> Value {
        Value::NULL
    }
    fn get_var_prop(&self, _var: &str, _col: &str) -> Value {
        Value::NULL
    }
    fn get_src_prop(&self, _tag: &str, _prop: &str) -> Value {
        Value::NULL
    }
    fn get_dst_prop(&self, _tag: &str, _prop: &str) -> Value {
        Value::NULL
    }
    /// Also serves the `_src`/`_dst`/`_rank`/`_type` pseudo properties,
    /// which arrive under those reserved names.
    fn get_edge_prop(&self, _edge: &str, _prop: &str) -> Value {
        Value::NULL
    }
    fn get_tag_prop(&self, _tag: &str, _prop: &str) -> Value {
        Value::NULL
    }
    fn get_vertex(&self, _role: VertexRole) -> Value {
        Value::NULL
    }
    fn get_edge(&self) -> Value {
        Value::NULL
    }
    fn get_column(&self, _idx: i64) -> Value {
        Value::NULL
    }
}

pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    ctx: &'a dyn ExprContext,
    /// Scope stack for predicate/reduce/comprehension variables.
    locals: Vec<(String, Value)>,
    uuid_counter: u64,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, ctx: &'a dyn ExprContext) -> Self {
        Evaluator {
            registry,
            ctx,
            locals: Vec::new(),
            uuid_counter: 0,
        }
    }

    fn local(&self, name: &str) -> Option<Value> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn eval(&mut self, expr: &Expr) -> Value {
        use ExprKind::*;
        match &expr.kind {
            Constant(v) => v.clone(),
            Label(name) => self.local(name).unwrap_or(Value::NULL),
            LabelAttribute { .. } => Value::BAD_TYPE,
            Variable(var) => self.ctx.get_var(var),
            InputProperty(prop) => self.ctx.get_input(prop),
            VariableProperty { var, prop } => self.ctx.get_var_prop(var, prop),
            SourceProperty { tag, prop } => self.ctx.get_src_prop(tag, prop),
            DestProperty { tag, prop } => self.ctx.get_dst_prop(tag, prop),
            EdgeProperty { edge, prop } => self.ctx.get_edge_prop(edge, prop),
            TagProperty { tag, prop } => self.ctx.get_tag_prop(tag, prop),
            EdgeSrc(alias) => self.ctx.get_edge_prop(alias, "_src"),
            EdgeDst(alias) => self.ctx.get_edge_prop(alias, "_dst"),
            EdgeRank(alias) => self.ctx.get_edge_prop(alias, "_rank"),
            EdgeTypeId(alias) => self.ctx.get_edge_prop(alias, "_type"),
            VertexRef(role) => self.ctx.get_vertex(*role),
            EdgeRef => self.ctx.get_edge(),
            Column(idx) => self.ctx.get_column(*idx),

            Unary { op, operand } => self.eval_unary(*op, operand),
            Arithmetic { op, left, right } => {
                let l = self.eval(left);
                let r = self.eval(right);
                match op {
                    ArithmeticOp::Add => l.add(&r),
                    ArithmeticOp::Subtract => l.subtract(&r),
                    ArithmeticOp::Multiply => l.multiply(&r),
                    ArithmeticOp::Divide => l.divide(&r),
                    ArithmeticOp::Modulo => l.modulo(&r),
                }
            }
            Relational { op, left, right } => self.eval_relational(*op, left, right),
            Logical { op, left, right } => self.eval_logical(*op, left, right),
            TypeCasting { target, operand } => {
                let v = self.eval(operand);
                match target {
                    ValueType::Bool => v.to_bool(),
                    ValueType::Int => v.to_int(),
                    ValueType::Float => v.to_float(),
                    ValueType::String => v.to_string_val(),
                    _ => Value::BAD_TYPE,
                }
            }
            FunctionCall { name, args } => {
                let def = match self.registry.get(name, args.len()) {
                    Ok(def) => def,
                    Err(_) => return Value::BAD_TYPE,
                };
                let body = def.body;
                let values: Vec<Value> = args.iter().map(|a| self.eval(a)).collect();
                body(&values)
            }
            // aggregates apply per group in the executor, not per row
            Aggregate { .. } => Value::BAD_TYPE,
            Subscript { collection, index } => self.eval_subscript(collection, index),
            SubscriptRange { collection, lo, hi } => {
                self.eval_subscript_range(collection, lo.as_deref(), hi.as_deref())
            }
            Attribute { collection, attr } => self.eval_attribute(collection, attr),
            Case(case) => self.eval_case(case),
            Predicate(pred) => self.eval_predicate(pred),
            Reduce(reduce) => self.eval_reduce(reduce),
            ListComprehension(lc) => self.eval_comprehension(lc),
            ListCtor(items) => Value::List(List {
                values: items.iter().map(|i| self.eval(i)).collect(),
            }),
            SetCtor(items) => {
                Value::Set(Set::from_values(items.iter().map(|i| self.eval(i))))
            }
            MapCtor(items) => {
                let mut kvs = indexmap::IndexMap::new();
                for (k, v) in items {
                    kvs.insert(k.clone(), self.eval(v));
                }
                Value::Map(Map { kvs })
            }
            PathBuild(items) => self.eval_path_build(items),
            Uuid => self.eval_uuid(),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Value {
        let v = self.eval(operand);
        match op {
            UnaryOp::Plus => match v {
                Value::Int(_) | Value::Float(_) | Value::Null(_) => v,
                _ => Value::BAD_TYPE,
            },
            UnaryOp::Negate => v.negate(),
            UnaryOp::Not => v.not_op(),
            UnaryOp::IsNull => Value::Bool(v.is_null()),
            UnaryOp::IsNotNull => Value::Bool(!v.is_null()),
            UnaryOp::IsEmpty => Value::Bool(v.is_empty()),
            UnaryOp::IsNotEmpty => Value::Bool(!v.is_empty()),
        }
    }

    fn eval_relational(&mut self, op: RelationalOp, left: &Expr, right: &Expr) -> Value {
        let l = self.eval(left);
        let r = self.eval(right);
        match op {
            RelationalOp::Lt => l.less_than(&r),
            RelationalOp::Le => l.less_equal(&r),
            RelationalOp::Gt => l.greater_than(&r),
            RelationalOp::Ge => l.greater_equal(&r),
            RelationalOp::Eq => l.equal(&r),
            RelationalOp::Ne => l.not_equal(&r),
            RelationalOp::In => l.contained_in(&r),
            RelationalOp::NotIn => l.contained_in(&r).not_op(),
            RelationalOp::Contains => l.contains_str(&r),
            RelationalOp::NotContains => l.contains_str(&r).not_op(),
            RelationalOp::StartsWith => l.starts_with(&r),
            RelationalOp::NotStartsWith => l.starts_with(&r).not_op(),
            RelationalOp::EndsWith => l.ends_with(&r),
            RelationalOp::NotEndsWith => l.ends_with(&r).not_op(),
            RelationalOp::RegexMatch => match (&l, &r) {
                (Value::Null(_), _) => l,
                (_, Value::Null(_)) => r,
                (Value::String(s), Value::String(pat)) => {
                    // `=~` matches the whole string, not a substring
                    match Regex::new(&format!("^(?:{pat})$")) {
                        Ok(re) => Value::Bool(re.is_match(s)),
                        Err(_) => Value::BAD_DATA,
                    }
                }
                _ => Value::BAD_TYPE,
            },
        }
    }

    fn eval_logical(&mut self, op: LogicalOp, left: &Expr, right: &Expr) -> Value {
        let l = self.eval(left);
        match op {
            LogicalOp::And => {
                if matches!(l, Value::Bool(false)) {
                    return Value::Bool(false);
                }
                l.and_op(&self.eval(right))
            }
            LogicalOp::Or => {
                if matches!(l, Value::Bool(true)) {
                    return Value::Bool(true);
                }
                l.or_op(&self.eval(right))
            }
            LogicalOp::Xor => l.xor_op(&self.eval(right)),
        }
    }

    fn eval_subscript(&mut self, collection: &Expr, index: &Expr) -> Value {
        let coll = self.eval(collection);
        let idx = self.eval(index);
        if coll.is_null() {
            return coll;
        }
        if idx.is_null() {
            return idx;
        }
        match (&coll, &idx) {
            (Value::List(l), Value::Int(i)) => {
                let len = l.values.len() as i64;
                let i = if *i < 0 { i + len } else { *i };
                if i < 0 || i >= len {
                    Value::NULL
                } else {
                    l.values[i as usize].clone()
                }
            }
            (Value::Map(m), Value::String(key)) => {
                m.kvs.get(key).cloned().unwrap_or(Value::NULL)
            }
            (Value::DataSet(ds), Value::Int(i)) => {
                // a row as a list
                match ds.rows.get(*i as usize) {
                    Some(row) => Value::List(List { values: row.clone() }),
                    None => Value::NULL,
                }
            }
            _ => Value::BAD_TYPE,
        }
    }

    fn eval_subscript_range(
        &mut self,
        collection: &Expr,
        lo: Option<&Expr>,
        hi: Option<&Expr>,
    ) -> Value {
        let coll = self.eval(collection);
        if coll.is_null() {
            return coll;
        }
        let list = match coll {
            Value::List(l) => l,
            _ => return Value::BAD_TYPE,
        };
        let len = list.values.len() as i64;
        let clamp = |v: i64| -> i64 {
            let v = if v < 0 { v + len } else { v };
            v.clamp(0, len)
        };
        let lo = match lo {
            Some(e) => match self.eval(e) {
                Value::Int(i) => clamp(i),
                v if v.is_null() => return v,
                _ => return Value::BAD_TYPE,
            },
            None => 0,
        };
        let hi = match hi {
            Some(e) => match self.eval(e) {
                Value::Int(i) => clamp(i),
                v if v.is_null() => return v,
                _ => return Value::BAD_TYPE,
            },
            None => len,
        };
        if lo >= hi {
            return Value::List(List { values: vec![] });
        }
        Value::List(List {
            values: list.values[lo as usize..hi as usize].to_vec(),
        })
    }

    fn eval_attribute(&mut self, collection: &Expr, attr: &str) -> Value {
        let coll = self.eval(collection);
        if coll.is_null() {
            return coll;
        }
        match &coll {
            Value::Map(m) => m.kvs.get(attr).cloned().unwrap_or(Value::NULL),
            Value::Vertex(v) => v
                .flat_props()
                .get(attr)
                .map(|p| (*p).clone())
                .unwrap_or(Value::UNKNOWN_PROP),
            Value::Edge(e) => e
                .props
                .get(attr)
                .cloned()
                .unwrap_or(Value::UNKNOWN_PROP),
            Value::Date(d) => match attr {
                "year" => Value::Int(d.year as i64),
                "month" => Value::Int(d.month as i64),
                "day" => Value::Int(d.day as i64),
                _ => Value::UNKNOWN_PROP,
            },
            Value::Time(t) => match attr {
                "hour" => Value::Int(t.hour as i64),
                "minute" => Value::Int(t.minute as i64),
                "second" => Value::Int(t.sec as i64),
                "microsecond" => Value::Int(t.microsec as i64),
                _ => Value::UNKNOWN_PROP,
            },
            Value::DateTime(dt) => match attr {
                "year" => Value::Int(dt.year as i64),
                "month" => Value::Int(dt.month as i64),
                "day" => Value::Int(dt.day as i64),
                "hour" => Value::Int(dt.hour as i64),
                "minute" => Value::Int(dt.minute as i64),
                "second" => Value::Int(dt.sec as i64),
                "microsecond" => Value::Int(dt.microsec as i64),
                _ => Value::UNKNOWN_PROP,
            },
            _ => Value::BAD_TYPE,
        }
    }

    fn eval_case(&mut self, case: &CaseExpr) -> Value {
        match &case.condition {
            Some(cond) => {
                let cond_val = self.eval(cond);
                for (when, then) in &case.when_thens {
                    if matches!(cond_val.equal(&self.eval(when)), Value::Bool(true)) {
                        return self.eval(then);
                    }
                }
            }
            None => {
                for (when, then) in &case.when_thens {
                    if matches!(self.eval(when), Value::Bool(true)) {
                        return self.eval(then);
                    }
                }
            }
        }
        match &case.default {
            Some(default) => self.eval(default),
            None => Value::NULL,
        }
    }

    fn eval_predicate(&mut self, pred: &PredicateExpr) -> Value {
        let coll = self.eval(&pred.collection);
        if coll.is_null() {
            return coll;
        }
        let items = match coll {
            Value::List(l) => l.values,
            _ => return Value::BAD_TYPE,
        };
        let mut true_count = 0usize;
        let mut false_count = 0usize;
        let mut saw_null = false;
        for item in items {
            self.locals.push((pred.var.clone(), item));
            let verdict = self.eval(&pred.filter);
            self.locals.pop();
            match verdict {
                Value::Bool(true) => true_count += 1,
                Value::Bool(false) => false_count += 1,
                Value::Null(_) => saw_null = true,
                _ => return Value::BAD_TYPE,
            }
        }
        match pred.func {
            PredicateFn::All => {
                if false_count > 0 {
                    Value::Bool(false)
                } else if saw_null {
                    Value::NULL
                } else {
                    Value::Bool(true)
                }
            }
            PredicateFn::Any => {
                if true_count > 0 {
                    Value::Bool(true)
                } else if saw_null {
                    Value::NULL
                } else {
                    Value::Bool(false)
                }
            }
            PredicateFn::NoneOf => {
                if true_count > 0 {
                    Value::Bool(false)
                } else if saw_null {
                    Value::NULL
                } else {
                    Value::Bool(true)
                }
            }
            PredicateFn::Single => {
                if saw_null {
                    Value::NULL
                } else {
                    Value::Bool(true_count == 1)
                }
            }
        }
    }

    fn eval_reduce(&mut self, reduce: &ReduceExpr) -> Value {
        let coll = self.eval(&reduce.collection);
        if coll.is_null() {
            return coll;
        }
        let items = match coll {
            Value::List(l) => l.values,
            _ => return Value::BAD_TYPE,
        };
        let mut acc = self.eval(&reduce.initial);
        for item in items {
            self.locals.push((reduce.accumulator.clone(), acc));
            self.locals.push((reduce.var.clone(), item));
            acc = self.eval(&reduce.mapping);
            self.locals.pop();
            self.locals.pop();
        }
        acc
    }

    fn eval_comprehension(&mut self, lc: &ListComprehensionExpr) -> Value {
        let coll = self.eval(&lc.collection);
        if coll.is_null() {
            return coll;
        }
        let items = match coll {
            Value::List(l) => l.values,
            _ => return Value::BAD_TYPE,
        };
        let mut out = Vec::new();
        for item in items {
            self.locals.push((lc.var.clone(), item.clone()));
            let keep = match &lc.filter {
                Some(filter) => matches!(self.eval(filter), Value::Bool(true)),
                None => true,
            };
            if keep {
                out.push(match &lc.mapping {
                    Some(mapping) => self.eval(mapping),
                    None => item,
                });
            }
            self.locals.pop();
        }
        Value::List(List { values: out })
    }

    fn eval_path_build(&mut self, items: &[Expr]) -> Value {
        let mut values = items.iter().map(|i| self.eval(i));
        let src = match values.next() {
            Some(Value::Vertex(v)) => *v,
            Some(v) if v.is_null() => return v,
            _ => return Value::BAD_TYPE,
        };
        let mut path = Path::new(src);
        loop {
            let edge = match values.next() {
                None => break,
                Some(Value::Edge(e)) => e,
                Some(v) if v.is_null() => return v,
                _ => return Value::BAD_TYPE,
            };
            let dst = match values.next() {
                Some(Value::Vertex(v)) => *v,
                Some(v) if v.is_null() => return v,
                _ => return Value::BAD_TYPE,
            };
            path.steps.push(Step {
                dst,
                etype: edge.etype,
                name: edge.name.clone(),
                ranking: edge.ranking,
                props: edge.props.clone(),
            });
        }
        Value::new_path(path)
    }

    /// Deterministic per query invocation: a counter mixed through the
    /// stable hash, formatted in the canonical 8-4-4-4-12 shape.
    fn eval_uuid(&mut self) -> Value {
        self.uuid_counter += 1;
        let hi = hash_bytes(&self.uuid_counter.to_le_bytes());
        let lo = hash_bytes(&hi.to_le_bytes());
        Value::String(format!(
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (hi >> 32) as u32,
            (hi >> 16) as u16,
            hi as u16,
            (lo >> 48) as u16,
            lo & 0xffff_ffff_ffff
        ))
    }
}
