//! Control sentences: EXPLAIN/PROFILE wrappers, sequential composition and
//! conditional flow-through.

use serde::{Deserialize, Serialize};

use super::Sentence;
use crate::expr::Expr;

/// Output format of an EXPLAIN. The raw string arrives from the parser and
/// is parsed case-insensitively during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
pub enum ExplainFormat {
    #[default]
    #[strum(serialize = "row")]
    Row,
    #[strum(serialize = "dot")]
    Dot,
    #[strum(serialize = "dot:struct")]
    DotStruct,
}

impl ExplainFormat {
    /// Case-insensitive parse; `None` for unrecognized strings.
    pub fn parse(s: &str) -> Option<ExplainFormat> {
        match s.to_ascii_lowercase().as_str() {
            "row" => Some(ExplainFormat::Row),
            "dot" => Some(ExplainFormat::Dot),
            "dot:struct" => Some(ExplainFormat::DotStruct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainSentence {
    pub is_profile: bool,
    /// The raw `FORMAT="..."` string, if any.
    pub format: Option<String>,
    pub body: Box<Sentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialSentences {
    pub sentences: Vec<Sentence>,
}

/// `RETURN $var IF $cond`: forwards `$var` downstream when the condition
/// holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSentence {
    pub var: String,
    pub condition: Expr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_format_is_case_insensitive() {
        assert_eq!(ExplainFormat::parse("ROW"), Some(ExplainFormat::Row));
        assert_eq!(ExplainFormat::parse("Dot"), Some(ExplainFormat::Dot));
        assert_eq!(
            ExplainFormat::parse("DOT:STRUCT"),
            Some(ExplainFormat::DotStruct)
        );
        assert_eq!(ExplainFormat::parse("tree"), None);
    }
}
