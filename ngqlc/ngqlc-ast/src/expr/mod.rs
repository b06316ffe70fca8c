//! The expression tree.
//!
//! One discriminant, one payload per kind; evaluation, printing, type
//! inference and property collection all dispatch over [ExprKind].

mod display;
mod ops;
mod visitor;

use enum_as_inner::EnumAsInner;
pub use ops::{ArithmeticOp, LogicalOp, PredicateFn, RelationalOp, UnaryOp};
use serde::{Deserialize, Serialize};
pub use visitor::{walk_expr, ExprVisitor};

use crate::span::Span;
use crate::types::ValueType;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Expr {
    pub fn new<K: Into<ExprKind>>(kind: K) -> Self {
        Expr {
            kind: kind.into(),
            span: None,
        }
    }

    pub fn constant(v: impl Into<Value>) -> Self {
        Expr::new(ExprKind::Constant(v.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner, strum::AsRefStr)]
pub enum ExprKind {
    Constant(Value),

    /// A bare identifier the validator has not resolved yet; also the form
    /// taken by the local variables of predicates, reduce and
    /// comprehensions.
    Label(String),
    /// `label.attr` before the validator rewrites it to a source, dest or
    /// edge property based on the surrounding context.
    LabelAttribute { label: String, attr: String },
    /// `$var` as a whole data set.
    Variable(String),

    /// `$-.prop`
    InputProperty(String),
    /// `$var.prop`
    VariableProperty { var: String, prop: String },
    /// `$^.tag.prop`
    SourceProperty { tag: String, prop: String },
    /// `$$.tag.prop`
    DestProperty { tag: String, prop: String },
    /// `alias.prop` over the edge alias of a traversal.
    EdgeProperty { edge: String, prop: String },
    /// `tag.prop` over the schema being looked up.
    TagProperty { tag: String, prop: String },

    /// `alias._src`
    EdgeSrc(String),
    /// `alias._dst`
    EdgeDst(String),
    /// `alias._rank`
    EdgeRank(String),
    /// `alias._type`
    EdgeTypeId(String),
    /// `$^` / `$$` as a whole vertex.
    VertexRef(VertexRole),
    /// The current edge as a whole value.
    EdgeRef,
    /// `COLUMN[i]`: positional input access.
    Column(i64),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Relational {
        op: RelationalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    TypeCasting {
        target: ValueType,
        operand: Box<Expr>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
    /// Only valid inside a group-by aware context; the validator rejects it
    /// elsewhere. `arg` of `None` is `count(*)`.
    Aggregate {
        func: String,
        arg: Option<Box<Expr>>,
        distinct: bool,
    },
    Subscript {
        collection: Box<Expr>,
        index: Box<Expr>,
    },
    SubscriptRange {
        collection: Box<Expr>,
        lo: Option<Box<Expr>>,
        hi: Option<Box<Expr>>,
    },
    Attribute {
        collection: Box<Expr>,
        attr: String,
    },
    Case(Box<CaseExpr>),
    Predicate(Box<PredicateExpr>),
    Reduce(Box<ReduceExpr>),
    ListComprehension(Box<ListComprehensionExpr>),
    ListCtor(Vec<Expr>),
    SetCtor(Vec<Expr>),
    MapCtor(Vec<(String, Expr)>),
    /// Builds a Path from alternating vertex/edge descriptors; produced by
    /// MATCH lowering, not by the parser.
    PathBuild(Vec<Expr>),
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexRole {
    Source,
    Dest,
}

/// `CASE [cond] WHEN v THEN r ... ELSE e END`. Without `cond` the WHEN arms
/// are boolean; with it they are compared against the condition's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExpr {
    pub condition: Option<Expr>,
    pub when_thens: Vec<(Expr, Expr)>,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateExpr {
    pub func: PredicateFn,
    pub var: String,
    pub collection: Expr,
    pub filter: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceExpr {
    pub accumulator: String,
    pub initial: Expr,
    pub var: String,
    pub collection: Expr,
    pub mapping: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListComprehensionExpr {
    pub var: String,
    pub collection: Expr,
    pub filter: Option<Expr>,
    pub mapping: Option<Expr>,
}

impl From<Value> for ExprKind {
    fn from(v: Value) -> Self {
        ExprKind::Constant(v)
    }
}

impl ExprKind {
    pub fn into_expr(self, span: Span) -> Expr {
        Expr {
            kind: self,
            span: Some(span),
        }
    }
}

impl Expr {
    /// Immediate children, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        use ExprKind::*;
        match &self.kind {
            Constant(_) | Label(_) | LabelAttribute { .. } | Variable(_) | InputProperty(_)
            | VariableProperty { .. } | SourceProperty { .. } | DestProperty { .. }
            | EdgeProperty { .. } | TagProperty { .. } | EdgeSrc(_) | EdgeDst(_) | EdgeRank(_)
            | EdgeTypeId(_) | VertexRef(_) | EdgeRef | Column(_) | Uuid => vec![],
            Unary { operand, .. } | TypeCasting { operand, .. } => vec![operand],
            Arithmetic { left, right, .. }
            | Relational { left, right, .. }
            | Logical { left, right, .. } => vec![left, right],
            FunctionCall { args, .. } => args.iter().collect(),
            Aggregate { arg, .. } => arg.iter().map(|e| e.as_ref()).collect(),
            Subscript { collection, index } => vec![collection, index],
            SubscriptRange { collection, lo, hi } => {
                let mut v: Vec<&Expr> = vec![collection];
                v.extend(lo.iter().map(|e| e.as_ref()));
                v.extend(hi.iter().map(|e| e.as_ref()));
                v
            }
            Attribute { collection, .. } => vec![collection],
            Case(c) => {
                let mut v: Vec<&Expr> = Vec::new();
                v.extend(c.condition.iter());
                for (w, t) in &c.when_thens {
                    v.push(w);
                    v.push(t);
                }
                v.extend(c.default.iter());
                v
            }
            Predicate(p) => vec![&p.collection, &p.filter],
            Reduce(r) => vec![&r.initial, &r.collection, &r.mapping],
            ListComprehension(l) => {
                let mut v: Vec<&Expr> = vec![&l.collection];
                v.extend(l.filter.iter());
                v.extend(l.mapping.iter());
                v
            }
            ListCtor(items) | SetCtor(items) | PathBuild(items) => items.iter().collect(),
            MapCtor(items) => items.iter().map(|(_, e)| e).collect(),
        }
    }

    /// Whether any aggregate call appears in this tree, without descending
    /// into aggregate arguments.
    pub fn has_aggregate(&self) -> bool {
        if matches!(self.kind, ExprKind::Aggregate { .. }) {
            return true;
        }
        self.children().iter().any(|c| c.has_aggregate())
    }

    /// True when the tree only references the pipe input and variables
    /// (besides pure computation); the FROM-clause reference restriction.
    pub fn is_input_or_var_only(&self) -> bool {
        use ExprKind::*;
        match &self.kind {
            SourceProperty { .. } | DestProperty { .. } | EdgeProperty { .. }
            | TagProperty { .. } | EdgeSrc(_) | EdgeDst(_) | EdgeRank(_) | EdgeTypeId(_)
            | VertexRef(_) | EdgeRef => false,
            _ => self.children().iter().all(|c| c.is_input_or_var_only()),
        }
    }

    /// Names of `$var` / `$var.prop` references in the tree.
    pub fn variable_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        fn rec<'a>(e: &'a Expr, out: &mut Vec<&'a str>) {
            match &e.kind {
                ExprKind::Variable(v) => out.push(v.as_str()),
                ExprKind::VariableProperty { var, .. } => out.push(var.as_str()),
                _ => {}
            }
            for c in e.children() {
                rec(c, out);
            }
        }
        rec(self, &mut out);
        out
    }

    pub fn has_input_ref(&self) -> bool {
        matches!(self.kind, ExprKind::InputProperty(_) | ExprKind::Column(_))
            || self.children().iter().any(|c| c.has_input_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_gt_30() -> Expr {
        Expr::new(ExprKind::Relational {
            op: RelationalOp::Gt,
            left: Box::new(Expr::new(ExprKind::DestProperty {
                tag: "person".to_string(),
                prop: "age".to_string(),
            })),
            right: Box::new(Expr::constant(30i64)),
        })
    }

    #[test]
    fn children_cover_binary_nodes() {
        let e = age_gt_30();
        assert_eq!(e.children().len(), 2);
    }

    #[test]
    fn aggregate_detection() {
        let agg = Expr::new(ExprKind::Aggregate {
            func: "count".to_string(),
            arg: None,
            distinct: false,
        });
        let sum = Expr::new(ExprKind::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(agg),
            right: Box::new(Expr::constant(1i64)),
        });
        assert!(sum.has_aggregate());
        assert!(!age_gt_30().has_aggregate());
    }

    #[test]
    fn input_or_var_only_rejects_graph_scopes() {
        assert!(!age_gt_30().is_input_or_var_only());
        let input = Expr::new(ExprKind::InputProperty("id".to_string()));
        assert!(input.is_input_or_var_only());
    }

    #[test]
    fn serde_round_trip() {
        let e = age_gt_30();
        let json = serde_json::to_string(&e).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }

    #[test]
    fn variable_refs_are_collected() {
        let e = Expr::new(ExprKind::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Expr::new(ExprKind::VariableProperty {
                var: "a".to_string(),
                prop: "x".to_string(),
            })),
            right: Box::new(Expr::new(ExprKind::Variable("b".to_string()))),
        });
        assert_eq!(e.variable_refs(), vec!["a", "b"]);
    }
}
