//! Data mutation sentences.

use serde::{Deserialize, Serialize};

use super::clauses::{VerticesClause, WhenClause, YieldClause};
use super::query::EdgeKeyRef;
use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexTagItem {
    pub tag: String,
    pub props: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRowItem {
    pub vid: Expr,
    /// Values for the concatenated prop lists of all tag items.
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertVerticesSentence {
    pub tag_items: Vec<VertexTagItem>,
    pub rows: Vec<VertexRowItem>,
    pub if_not_exists: bool,
    pub ignore_existed_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRowItem {
    pub src: Expr,
    pub dst: Expr,
    pub rank: i64,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertEdgesSentence {
    pub edge: String,
    pub props: Vec<String>,
    pub rows: Vec<EdgeRowItem>,
    pub if_not_exists: bool,
    pub ignore_existed_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub field: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateVertexSentence {
    /// `UPSERT` rather than `UPDATE`.
    pub insertable: bool,
    pub vid: Expr,
    pub tag: Option<String>,
    pub items: Vec<UpdateItem>,
    pub when_clause: Option<WhenClause>,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEdgeSentence {
    pub insertable: bool,
    pub src: Expr,
    pub dst: Expr,
    pub rank: i64,
    pub edge: String,
    pub items: Vec<UpdateItem>,
    pub when_clause: Option<WhenClause>,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteVerticesSentence {
    pub vertices: VerticesClause,
    /// `WITH EDGE`: also remove incident edges.
    pub with_edge: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTagsSentence {
    /// Empty means all tags.
    pub tags: Vec<String>,
    pub vertices: VerticesClause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEdgesSentence {
    pub edge: String,
    pub keys: Vec<EdgeKeyRef>,
    pub ref_expr: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSentence {
    pub url: String,
}
