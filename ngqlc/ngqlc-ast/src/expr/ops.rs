use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "IS NULL")]
    IsNull,
    #[strum(serialize = "IS NOT NULL")]
    IsNotNull,
    #[strum(serialize = "IS EMPTY")]
    IsEmpty,
    #[strum(serialize = "IS NOT EMPTY")]
    IsNotEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ArithmeticOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum RelationalOp {
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "IN")]
    In,
    #[strum(serialize = "NOT IN")]
    NotIn,
    #[strum(serialize = "CONTAINS")]
    Contains,
    #[strum(serialize = "NOT CONTAINS")]
    NotContains,
    #[strum(serialize = "STARTS WITH")]
    StartsWith,
    #[strum(serialize = "NOT STARTS WITH")]
    NotStartsWith,
    #[strum(serialize = "ENDS WITH")]
    EndsWith,
    #[strum(serialize = "NOT ENDS WITH")]
    NotEndsWith,
    #[strum(serialize = "=~")]
    RegexMatch,
}

impl RelationalOp {
    /// Word-shaped operators need surrounding spaces when printed.
    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            RelationalOp::Lt
                | RelationalOp::Le
                | RelationalOp::Gt
                | RelationalOp::Ge
                | RelationalOp::Eq
                | RelationalOp::Ne
                | RelationalOp::RegexMatch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum LogicalOp {
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
    #[strum(serialize = "XOR")]
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum PredicateFn {
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "any")]
    Any,
    #[strum(serialize = "none")]
    NoneOf,
    #[strum(serialize = "single")]
    Single,
}
