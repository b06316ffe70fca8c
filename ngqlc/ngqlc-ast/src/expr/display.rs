//! Prints expressions back to parseable NGQL. Binary and unary operators
//! carry their own parentheses, so the printed form re-parses to an equal
//! tree without precedence bookkeeping.

use std::fmt::{self, Display, Formatter};

use super::{Expr, ExprKind, VertexRole};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Display for ExprKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use ExprKind::*;
        match self {
            Constant(v) => write!(f, "{v}"),
            Label(name) => write!(f, "{name}"),
            LabelAttribute { label, attr } => write!(f, "{label}.{attr}"),
            Variable(var) => write!(f, "${var}"),
            InputProperty(prop) => write!(f, "$-.{prop}"),
            VariableProperty { var, prop } => write!(f, "${var}.{prop}"),
            SourceProperty { tag, prop } => write!(f, "$^.{tag}.{prop}"),
            DestProperty { tag, prop } => write!(f, "$$.{tag}.{prop}"),
            EdgeProperty { edge, prop } => write!(f, "{edge}.{prop}"),
            TagProperty { tag, prop } => write!(f, "{tag}.{prop}"),
            EdgeSrc(alias) => write!(f, "{alias}._src"),
            EdgeDst(alias) => write!(f, "{alias}._dst"),
            EdgeRank(alias) => write!(f, "{alias}._rank"),
            EdgeTypeId(alias) => write!(f, "{alias}._type"),
            VertexRef(VertexRole::Source) => write!(f, "$^"),
            VertexRef(VertexRole::Dest) => write!(f, "$$"),
            EdgeRef => write!(f, "EDGE"),
            Column(i) => write!(f, "COLUMN[{i}]"),
            Unary { op, operand } => match op {
                super::UnaryOp::IsNull
                | super::UnaryOp::IsNotNull
                | super::UnaryOp::IsEmpty
                | super::UnaryOp::IsNotEmpty => write!(f, "({operand} {op})"),
                _ => write!(f, "{op}({operand})"),
            },
            Arithmetic { op, left, right } => write!(f, "({left}{op}{right})"),
            Relational { op, left, right } => {
                if op.is_keyword() {
                    write!(f, "({left} {op} {right})")
                } else {
                    write!(f, "({left}{op}{right})")
                }
            }
            Logical { op, left, right } => write!(f, "({left} {op} {right})"),
            TypeCasting { target, operand } => write!(f, "({target})({operand})"),
            FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args, ",")?;
                write!(f, ")")
            }
            Aggregate {
                func,
                arg,
                distinct,
            } => {
                write!(f, "{func}(")?;
                if *distinct {
                    write!(f, "DISTINCT ")?;
                }
                match arg {
                    Some(arg) => write!(f, "{arg}")?,
                    None => write!(f, "*")?,
                }
                write!(f, ")")
            }
            Subscript { collection, index } => write!(f, "{collection}[{index}]"),
            SubscriptRange { collection, lo, hi } => {
                write!(f, "{collection}[")?;
                if let Some(lo) = lo {
                    write!(f, "{lo}")?;
                }
                write!(f, "..")?;
                if let Some(hi) = hi {
                    write!(f, "{hi}")?;
                }
                write!(f, "]")
            }
            Attribute { collection, attr } => write!(f, "{collection}.{attr}"),
            Case(c) => {
                write!(f, "CASE")?;
                if let Some(cond) = &c.condition {
                    write!(f, " {cond}")?;
                }
                for (when, then) in &c.when_thens {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(default) = &c.default {
                    write!(f, " ELSE {default}")?;
                }
                write!(f, " END")
            }
            Predicate(p) => {
                write!(
                    f,
                    "{}({} IN {} WHERE {})",
                    p.func, p.var, p.collection, p.filter
                )
            }
            Reduce(r) => write!(
                f,
                "reduce({} = {}, {} IN {} | {})",
                r.accumulator, r.initial, r.var, r.collection, r.mapping
            ),
            ListComprehension(l) => {
                write!(f, "[{} IN {}", l.var, l.collection)?;
                if let Some(filter) = &l.filter {
                    write!(f, " WHERE {filter}")?;
                }
                if let Some(mapping) = &l.mapping {
                    write!(f, " | {mapping}")?;
                }
                write!(f, "]")
            }
            ListCtor(items) => {
                write!(f, "[")?;
                write_list(f, items, ",")?;
                write!(f, "]")
            }
            SetCtor(items) => {
                write!(f, "{{")?;
                write_list(f, items, ",")?;
                write!(f, "}}")
            }
            MapCtor(items) => {
                write!(f, "{{")?;
                for (i, (k, v)) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "}}")
            }
            PathBuild(items) => {
                write!(f, "PATH_BUILD(")?;
                write_list(f, items, ",")?;
                write!(f, ")")
            }
            Uuid => write!(f, "uuid()"),
        }
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Expr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
