use serde::{Deserialize, Serialize};

/// Static type of a [crate::Value], as seen by type inference.
///
/// `Any` stands for "cannot be narrowed before runtime"; concrete checks on
/// such expressions are deferred to evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ValueType {
    Empty,
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    Time,
    DateTime,
    Duration,
    Vertex,
    Edge,
    Path,
    List,
    Map,
    Set,
    DataSet,
    Any,
}

impl ValueType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ValueType::Date | ValueType::Time | ValueType::DateTime | ValueType::Duration
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ValueType::List | ValueType::Map | ValueType::Set | ValueType::DataSet
        )
    }

    /// Whether a value of this type can show up where `expected` is required.
    /// `Any` and `Null` are compatible with everything, in both directions.
    pub fn accepts(&self, expected: ValueType) -> bool {
        *self == expected
            || matches!(self, ValueType::Any | ValueType::Null | ValueType::Empty)
            || matches!(expected, ValueType::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_spelling() {
        assert_eq!(ValueType::Int.to_string(), "INT");
        assert_eq!(ValueType::DataSet.to_string(), "DATASET");
        assert_eq!(ValueType::String.to_string(), "STRING");
    }

    #[test]
    fn any_accepts_everything() {
        assert!(ValueType::Any.accepts(ValueType::Int));
        assert!(ValueType::Int.accepts(ValueType::Any));
        assert!(!ValueType::Int.accepts(ValueType::String));
    }
}
