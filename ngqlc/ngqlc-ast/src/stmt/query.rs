//! Traversal and projection sentences.

use serde::{Deserialize, Serialize};

use super::clauses::{
    EdgeDirection, GroupClause, OrderFactor, OverClause, StepClause, TruncateClause,
    VerticesClause, WhereClause, YieldClause,
};
use super::Sentence;
use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoSentence {
    pub step: StepClause,
    pub from: VerticesClause,
    pub over: OverClause,
    pub where_clause: Option<WhereClause>,
    pub yield_clause: Option<YieldClause>,
    pub truncate: Option<TruncateClause>,
}

/// `LOOKUP ON <tag-or-edge>`: which one it is gets decided against the
/// schema during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupSentence {
    pub source: String,
    pub where_clause: Option<WhereClause>,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchVerticesSentence {
    /// Empty means `FETCH PROP ON *`.
    pub tags: Vec<String>,
    pub vertices: VerticesClause,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeKeyRef {
    pub src: Expr,
    pub dst: Expr,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchEdgesSentence {
    pub edge: String,
    pub keys: Vec<EdgeKeyRef>,
    /// Input/variable reference form, exclusive with `keys`.
    pub ref_expr: Option<Expr>,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindPathType {
    Shortest,
    AllPath,
    NoLoop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindPathSentence {
    pub path_type: FindPathType,
    pub with_prop: bool,
    pub from: VerticesClause,
    pub to: VerticesClause,
    pub over: OverClause,
    pub where_clause: Option<WhereClause>,
    pub step: StepClause,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSubgraphSentence {
    pub with_prop: bool,
    pub step: StepClause,
    pub from: VerticesClause,
    pub in_edges: Vec<String>,
    pub out_edges: Vec<String>,
    pub both_edges: Vec<String>,
    pub yield_clause: Option<YieldClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSentence {
    pub paths: Vec<MatchPath>,
    pub where_clause: Option<WhereClause>,
    pub ret: MatchReturn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPath {
    pub alias: Option<String>,
    pub head: MatchNode,
    pub steps: Vec<(MatchEdge, MatchNode)>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchNode {
    pub alias: Option<String>,
    pub labels: Vec<String>,
    /// A map-constructor expression of property equalities.
    pub props: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEdge {
    pub alias: Option<String>,
    pub types: Vec<String>,
    pub direction: EdgeDirection,
    pub range: Option<MatchStepRange>,
    pub props: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStepRange {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReturn {
    /// `None` stands for `RETURN *`.
    pub columns: Option<YieldClause>,
    pub order: Vec<OrderFactor>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBySentence {
    pub factors: Vec<OrderFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitSentence {
    pub offset: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldSentence {
    pub yield_clause: YieldClause,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBySentence {
    pub group_clause: GroupClause,
    pub yield_clause: YieldClause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSentence {
    pub op: SetOperator,
    pub left: Box<Sentence>,
    pub right: Box<Sentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipedSentence {
    pub left: Box<Sentence>,
    pub right: Box<Sentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSentence {
    pub var: String,
    pub body: Box<Sentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseSentence {
    pub space: String,
}
