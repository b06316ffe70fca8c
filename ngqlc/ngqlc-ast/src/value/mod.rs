//! The runtime value model.
//!
//! [Value] is the tagged union every expression evaluates to. The order of
//! the variants is significant: it defines the total order across
//! heterogeneous kinds (NULL sorts first, DataSet last). Error conditions
//! inside expression evaluation are themselves values (the `Null` family),
//! never panics.

mod dataset;
mod graph;
mod ops;
mod time;

use std::fmt::{self, Display, Formatter};

pub use dataset::DataSet;
use enum_as_inner::EnumAsInner;
pub use graph::{Edge, Path, Step, Tag, Vertex};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
pub use time::{Date, DateTime, Duration, Time};

use crate::types::ValueType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Value {
    Null(NullKind),
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Duration(Duration),
    Vertex(Box<Vertex>),
    Edge(Box<Edge>),
    Path(Box<Path>),
    List(List),
    Map(Map),
    Set(Set),
    DataSet(Box<DataSet>),
}

/// The NULL family. Plain `Null` is the SQL-ish missing value; the rest are
/// error sentinels produced by evaluation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum::AsRefStr,
)]
pub enum NullKind {
    Null,
    NaN,
    BadData,
    BadType,
    ErrOverflow,
    UnknownProp,
    DivByZero,
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct List {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Map {
    pub kvs: IndexMap<String, Value>,
}

/// An unordered collection; equality ignores insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Set {
    pub values: Vec<Value>,
}

impl Value {
    pub const NULL: Value = Value::Null(NullKind::Null);
    pub const BAD_DATA: Value = Value::Null(NullKind::BadData);
    pub const BAD_TYPE: Value = Value::Null(NullKind::BadType);
    pub const OVERFLOW: Value = Value::Null(NullKind::ErrOverflow);
    pub const UNKNOWN_PROP: Value = Value::Null(NullKind::UnknownProp);
    pub const DIV_BY_ZERO: Value = Value::Null(NullKind::DivByZero);
    pub const OUT_OF_RANGE: Value = Value::Null(NullKind::OutOfRange);

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null(_) => ValueType::Null,
            Value::Empty => ValueType::Empty,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Date(_) => ValueType::Date,
            Value::Time(_) => ValueType::Time,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Duration(_) => ValueType::Duration,
            Value::Vertex(_) => ValueType::Vertex,
            Value::Edge(_) => ValueType::Edge,
            Value::Path(_) => ValueType::Path,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
            Value::Set(_) => ValueType::Set,
            Value::DataSet(_) => ValueType::DataSet,
        }
    }

    /// Position of the kind in the cross-kind total order.
    pub(crate) fn kind_order(&self) -> u8 {
        match self {
            Value::Null(_) => 0,
            Value::Empty => 1,
            Value::Bool(_) => 2,
            Value::Int(_) => 3,
            Value::Float(_) => 4,
            Value::String(_) => 5,
            Value::Date(_) => 6,
            Value::Time(_) => 7,
            Value::DateTime(_) => 8,
            Value::Duration(_) => 9,
            Value::Vertex(_) => 10,
            Value::Edge(_) => 11,
            Value::Path(_) => 12,
            Value::List(_) => 13,
            Value::Map(_) => 14,
            Value::Set(_) => 15,
            Value::DataSet(_) => 16,
        }
    }

    pub fn is_error_null(&self) -> bool {
        matches!(self, Value::Null(k) if *k != NullKind::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn new_vertex(vertex: Vertex) -> Value {
        Value::Vertex(Box::new(vertex))
    }

    pub fn new_edge(edge: Edge) -> Value {
        Value::Edge(Box::new(edge))
    }

    pub fn new_path(path: Path) -> Value {
        Value::Path(Box::new(path))
    }

    pub fn new_dataset(ds: DataSet) -> Value {
        Value::DataSet(Box::new(ds))
    }

    pub fn list(values: Vec<Value>) -> Value {
        Value::List(List { values })
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().all(|v| other.values.contains(v))
    }
}

impl Set {
    /// Inserts unless an equal value is already present.
    pub fn insert(&mut self, value: Value) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Set {
        let mut set = Set::default();
        for v in values {
            set.insert(v);
        }
        set
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }
}

impl Map {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.kvs.get(key)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List {
            values: iter.into_iter().collect(),
        }
    }
}

/// Prints the value the way it appears in query text or result sets.
/// Strings are double-quoted with escapes so that constants round-trip
/// through the parser.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(NullKind::Null) => write!(f, "NULL"),
            Value::Null(kind) => write!(f, "__NULL_{}__", kind.as_ref()),
            Value::Empty => write!(f, "__EMPTY__"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", ops::float_repr(*v)),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Vertex(v) => write!(f, "{v}"),
            Value::Edge(e) => write!(f, "{e}"),
            Value::Path(p) => write!(f, "{p}"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.kvs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Set(s) => {
                write!(f, "{{")?;
                for (i, v) in s.values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "}}")
            }
            Value::DataSet(ds) => write!(f, "{ds}"),
        }
    }
}

pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_equality_ignores_order() {
        let a = Set::from_values([Value::Int(1), Value::Int(2)]);
        let b = Set::from_values([Value::Int(2), Value::Int(1)]);
        assert_eq!(a, b);
        assert_ne!(a, Set::from_values([Value::Int(1)]));
    }

    #[test]
    fn set_insert_dedups() {
        let s = Set::from_values([Value::Int(1), Value::Int(1), Value::Int(2)]);
        assert_eq!(s.values.len(), 2);
    }

    #[test]
    fn display_round_trippable_literals() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::from("a\"b").to_string(), r#""a\"b""#);
        assert_eq!(
            Value::list(vec![Value::Int(1), Value::from("x")]).to_string(),
            r#"[1, "x"]"#
        );
        assert_eq!(Value::NULL.to_string(), "NULL");
    }

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(3.25).to_string(), "3.25");
    }
}
