//! Schema maintenance: spaces, tags, edges and indexes.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Storage property types; a superset of the value kinds because fixed
/// width matters to the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum PropertyType {
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "int8")]
    Int8,
    #[strum(serialize = "int16")]
    Int16,
    #[strum(serialize = "int32")]
    Int32,
    #[strum(serialize = "int64")]
    Int64,
    #[strum(serialize = "float")]
    Float,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "fixed_string")]
    FixedString,
    #[strum(serialize = "timestamp")]
    Timestamp,
    #[strum(serialize = "date")]
    Date,
    #[strum(serialize = "time")]
    Time,
    #[strum(serialize = "datetime")]
    Datetime,
    #[strum(serialize = "duration")]
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeDef {
    pub ptype: PropertyType,
    /// Only meaningful for `FixedString`.
    pub len: Option<i16>,
}

impl ColumnTypeDef {
    pub fn simple(ptype: PropertyType) -> Self {
        ColumnTypeDef { ptype, len: None }
    }

    pub fn fixed_string(len: i16) -> Self {
        ColumnTypeDef {
            ptype: PropertyType::FixedString,
            len: Some(len),
        }
    }
}

impl Display for ColumnTypeDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.len {
            Some(len) => write!(f, "{}({len})", self.ptype),
            None => write!(f, "{}", self.ptype),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub type_def: ColumnTypeDef,
    pub nullable: bool,
    pub default: Option<Expr>,
    pub comment: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: &str, ptype: PropertyType) -> Self {
        ColumnSpec {
            name: name.to_string(),
            type_def: ColumnTypeDef::simple(ptype),
            nullable: true,
            default: None,
            comment: None,
        }
    }
}

impl Display for ColumnSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_def)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT \"{comment}\"")?;
        }
        Ok(())
    }
}

/// `TTL_DURATION` / `TTL_COL` / `COMMENT` trailing a schema definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaProps {
    pub ttl_duration: Option<i64>,
    pub ttl_col: Option<String>,
    pub comment: Option<String>,
}

impl SchemaProps {
    pub fn is_empty(&self) -> bool {
        self.ttl_duration.is_none() && self.ttl_col.is_none() && self.comment.is_none()
    }
}

impl Display for SchemaProps {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut Formatter<'_>| -> fmt::Result {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            Ok(())
        };
        if let Some(d) = self.ttl_duration {
            sep(f)?;
            write!(f, "ttl_duration = {d}")?;
        }
        if let Some(c) = &self.ttl_col {
            sep(f)?;
            write!(f, "ttl_col = \"{c}\"")?;
        }
        if let Some(c) = &self.comment {
            sep(f)?;
            write!(f, "comment = \"{c}\"")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTagSentence {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub props: SchemaProps,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEdgeSentence {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub props: SchemaProps,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum AlterSchemaOp {
    #[strum(serialize = "ADD")]
    Add,
    #[strum(serialize = "CHANGE")]
    Change,
    #[strum(serialize = "DROP")]
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterSchemaOptItem {
    pub op: AlterSchemaOp,
    /// For ADD/CHANGE.
    pub columns: Vec<ColumnSpec>,
    /// For DROP.
    pub col_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTagSentence {
    pub name: String,
    pub opts: Vec<AlterSchemaOptItem>,
    pub props: SchemaProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterEdgeSentence {
    pub name: String,
    pub opts: Vec<AlterSchemaOptItem>,
    pub props: SchemaProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSchemaSentence {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeSchemaSentence {
    pub name: String,
}

/// A `key = value` option of CREATE SPACE. The recognized key set is
/// enumerated by the validator, which rejects unknown keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceOptItem {
    pub key: String,
    pub value: Expr,
}

impl SpaceOptItem {
    pub fn new(key: &str, value: Expr) -> Self {
        SpaceOptItem {
            key: key.to_string(),
            value,
        }
    }
}

impl Display for SpaceOptItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpaceSentence {
    pub name: String,
    pub options: Vec<SpaceOptItem>,
    pub if_not_exists: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpaceAsSentence {
    pub old_name: String,
    pub new_name: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterSpaceSentence {
    pub name: String,
    /// Only `add_zone` today.
    pub op: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexField {
    pub name: String,
    /// Prefix length for string columns.
    pub len: Option<i16>,
}

impl Display for IndexField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.len {
            Some(len) => write!(f, "{}({len})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexSentence {
    pub is_edge: bool,
    pub index_name: String,
    pub schema_name: String,
    pub fields: Vec<IndexField>,
    pub if_not_exists: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndexSentence {
    pub is_edge: bool,
    pub index_name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeIndexSentence {
    pub is_edge: bool,
    pub index_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebuildIndexSentence {
    pub is_edge: bool,
    pub index_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFulltextIndexSentence {
    pub is_edge: bool,
    pub index_name: String,
    pub schema_name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropFulltextIndexSentence {
    pub index_name: String,
}
