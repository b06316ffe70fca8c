//! The logical plan: a DAG of typed plan nodes the validator hands to the
//! executor. Nodes carry their kind-specific arguments, the variable names
//! they read and publish, and their output column names.

use enum_as_inner::EnumAsInner;
use ngqlc_ast::expr::Expr;
use ngqlc_ast::stmt::admin::{AdminJobCmd, AdminJobOp, ConfigModule, HostAddr};
use ngqlc_ast::stmt::clauses::{EdgeDirection, OrderDirection, YieldColumn};
use ngqlc_ast::stmt::explain::ExplainFormat;
use ngqlc_ast::stmt::maintain::{ColumnSpec, IndexField, SchemaProps, SpaceOptItem};
use ngqlc_ast::stmt::query::FindPathType;
use ngqlc_ast::stmt::user::RoleType;
use serde::Serialize;

use crate::catalog::SpaceDesc;

pub type NodeId = i64;

#[derive(Debug, Clone, Serialize)]
pub struct PlanNode {
    pub id: NodeId,
    pub kind: PlanNodeKind,
    /// Variables this node reads; the executor resolves them against the
    /// result store.
    pub input_vars: Vec<String>,
    /// Variable this node publishes its output under.
    pub output_var: String,
    pub col_names: Vec<String>,
    /// Upstream nodes; execution order is a topological order of these.
    pub deps: Vec<NodeId>,
}

impl PlanNode {
    pub fn kind_name(&self) -> &str {
        self.kind.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataCollectKind {
    Rows,
    /// Path assembly; the mode decides shortest-only, all walks, or
    /// cycle-free walks.
    Paths { path_type: FindPathType },
    /// Subgraph assembly; `with_prop` keeps the fetched properties on the
    /// collected vertices and edges.
    Subgraph { with_prop: bool },
    MultiSteps,
}

#[derive(Debug, Clone, Serialize, strum::AsRefStr, EnumAsInner)]
pub enum PlanNodeKind {
    Start,

    // ---- storage access ----
    GetNeighbors {
        src: Expr,
        space: String,
        edge_types: Vec<String>,
        direction: EdgeDirection,
        vertex_props: Vec<String>,
        edge_props: Vec<String>,
        dedup: bool,
    },
    GetVertices {
        src: Expr,
        space: String,
        tags: Vec<String>,
        props: Vec<String>,
        dedup: bool,
    },
    GetEdges {
        space: String,
        edge: String,
        props: Vec<String>,
        dedup: bool,
    },
    IndexScan {
        space: String,
        schema: String,
        is_edge: bool,
        index: String,
        filter: Option<Expr>,
    },
    Traverse {
        edge_types: Vec<String>,
        direction: EdgeDirection,
        min_steps: u32,
        max_steps: Option<u32>,
        filter: Option<Expr>,
    },
    AppendVertices {
        filter: Option<Expr>,
    },

    // ---- relational ----
    Filter {
        condition: Expr,
    },
    Project {
        columns: Vec<YieldColumn>,
    },
    Unwind {
        unwind_expr: Expr,
        alias: String,
    },
    Aggregate {
        group_keys: Vec<Expr>,
        group_items: Vec<YieldColumn>,
    },
    Sort {
        factors: Vec<(String, OrderDirection)>,
    },
    TopN {
        factors: Vec<(String, OrderDirection)>,
        offset: i64,
        count: i64,
    },
    Limit {
        offset: i64,
        count: i64,
    },
    Sample {
        count: Expr,
    },
    Dedup,
    DataCollect {
        kind: DataCollectKind,
    },
    Union,
    Intersect,
    Minus,
    Loop {
        condition: Expr,
        /// Root of the loop body subplan.
        body: NodeId,
    },
    Select {
        condition: Expr,
    },
    PassThrough,
    Assign {
        var: String,
    },
    InnerJoin {
        hash_keys: Vec<Expr>,
        probe_keys: Vec<Expr>,
    },
    LeftJoin {
        hash_keys: Vec<Expr>,
        probe_keys: Vec<Expr>,
    },

    // ---- spaces ----
    CreateSpace {
        desc: SpaceDesc,
        if_not_exists: bool,
    },
    CreateSpaceAs {
        old_name: String,
        new_name: String,
    },
    AlterSpace {
        space: String,
        op: String,
        args: Vec<String>,
    },
    DropSpace {
        space: String,
        if_exists: bool,
    },
    ClearSpace {
        space: String,
        if_exists: bool,
    },
    DescSpace {
        space: String,
    },
    ShowSpaces,
    ShowCreateSpace {
        space: String,
    },
    SwitchSpace {
        space: String,
    },

    // ---- schema ----
    CreateTag {
        name: String,
        columns: Vec<ColumnSpec>,
        props: SchemaProps,
        if_not_exists: bool,
    },
    CreateEdge {
        name: String,
        columns: Vec<ColumnSpec>,
        props: SchemaProps,
        if_not_exists: bool,
    },
    AlterTag {
        name: String,
    },
    AlterEdge {
        name: String,
    },
    DropTag {
        name: String,
        if_exists: bool,
    },
    DropEdge {
        name: String,
        if_exists: bool,
    },
    DescTag {
        name: String,
    },
    DescEdge {
        name: String,
    },
    ShowTags,
    ShowEdges,
    ShowCreateTag {
        name: String,
    },
    ShowCreateEdge {
        name: String,
    },

    // ---- indexes ----
    CreateIndex {
        is_edge: bool,
        index: String,
        schema: String,
        fields: Vec<IndexField>,
        if_not_exists: bool,
    },
    DropIndex {
        is_edge: bool,
        index: String,
        if_exists: bool,
    },
    DescIndex {
        is_edge: bool,
        index: String,
    },
    ShowCreateIndex {
        is_edge: bool,
        index: String,
    },
    ShowIndexes {
        is_edge: bool,
    },
    ShowIndexStatus {
        is_edge: bool,
    },
    RebuildIndex {
        is_edge: bool,
        index: String,
    },
    CreateFulltextIndex {
        index: String,
        schema: String,
        is_edge: bool,
        fields: Vec<String>,
    },
    DropFulltextIndex {
        index: String,
    },
    ShowFulltextIndexes,
    RebuildFulltextIndex,

    // ---- mutation ----
    InsertVertices {
        space: String,
        if_not_exists: bool,
    },
    InsertEdges {
        space: String,
        edge: String,
        if_not_exists: bool,
    },
    UpdateVertex {
        space: String,
        tag: Option<String>,
        insertable: bool,
    },
    UpdateEdge {
        space: String,
        edge: String,
        insertable: bool,
    },
    DeleteVertices {
        space: String,
        with_edge: bool,
    },
    DeleteTags {
        space: String,
        tags: Vec<String>,
    },
    DeleteEdges {
        space: String,
        edge: String,
    },
    Download {
        url: String,
    },
    Ingest,

    // ---- hosts, zones, configs, snapshots, listeners, services ----
    AddHosts {
        hosts: Vec<HostAddr>,
    },
    DropHosts {
        hosts: Vec<HostAddr>,
    },
    ShowHosts,
    ShowParts {
        parts: Vec<i32>,
    },
    ShowConfigs {
        module: ConfigModule,
    },
    SetConfig {
        module: ConfigModule,
        name: String,
    },
    GetConfig {
        module: ConfigModule,
        name: String,
    },
    CreateSnapshot,
    DropSnapshot {
        name: String,
    },
    ShowSnapshots,
    MergeZone {
        zones: Vec<String>,
        into_zone: String,
    },
    DropZone {
        zone: String,
    },
    DivideZone {
        zone: String,
    },
    RenameZone {
        from: String,
        to: String,
    },
    DescZone {
        zone: String,
    },
    ShowZones,
    AddHostsIntoZone {
        zone: String,
        hosts: Vec<HostAddr>,
    },
    AddListener {
        hosts: Vec<HostAddr>,
    },
    RemoveListener,
    ShowListener,
    SignInService {
        hosts: Vec<HostAddr>,
    },
    SignOutService,
    ShowServiceClients,
    BalanceDiskAttach {
        paths: Vec<String>,
    },
    BalanceDiskRemove {
        paths: Vec<String>,
    },
    SubmitJob {
        op: AdminJobOp,
        cmd: Option<AdminJobCmd>,
        args: Vec<String>,
    },
    ShowJobs,
    StopJob {
        job_id: i64,
    },
    RecoverJob {
        job_ids: Vec<i64>,
    },
    ShowStats,
    ShowCharset,
    ShowCollation,
    ShowMetaLeader,

    // ---- sessions and queries ----
    ShowSessions {
        local: bool,
        session_id: Option<i64>,
    },
    KillSession {
        session_id: Expr,
    },
    ShowQueries {
        all: bool,
    },
    KillQuery {
        session_id: Option<Expr>,
        plan_id: Expr,
    },

    // ---- users ----
    CreateUser {
        account: String,
        if_not_exists: bool,
    },
    DropUser {
        account: String,
        if_exists: bool,
    },
    UpdateUser {
        account: String,
    },
    ChangePassword {
        account: String,
    },
    GrantRole {
        account: String,
        space: String,
        role: RoleType,
    },
    RevokeRole {
        account: String,
        space: String,
        role: RoleType,
    },
    ShowUsers,
    DescribeUser {
        account: String,
    },
    ShowRoles {
        space: String,
    },
}

/// A fragment under construction: the output-producing `root` and the
/// `tail` that will receive upstream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPlan {
    pub root: NodeId,
    pub tail: NodeId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan {
    pub nodes: Vec<PlanNode>,
    pub root: NodeId,
    pub tail: NodeId,
    pub is_profile: bool,
    pub format: ExplainFormat,
}

impl ExecutionPlan {
    pub fn node(&self, id: NodeId) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn root_node(&self) -> Option<&PlanNode> {
        self.node(self.root)
    }

    /// Kind names from root to tail following first dependencies; the
    /// spine a row-formatted EXPLAIN prints.
    pub fn spine(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = self.node(self.root);
        while let Some(node) = cur {
            out.push(node.kind_name());
            cur = node.deps.first().and_then(|id| self.node(*id));
        }
        out
    }
}

/// Accumulates nodes during validation; ids come from the query context's
/// generator so they are unique per query.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    pub nodes: Vec<PlanNode>,
}

impl PlanBuilder {
    pub fn add(&mut self, node: PlanNode) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut PlanNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Makes `downstream`'s tail depend on `upstream`'s root, chaining the
    /// two fragments.
    pub fn append(&mut self, upstream: SubPlan, downstream: SubPlan) -> SubPlan {
        if let Some(tail) = self.node_mut(downstream.tail) {
            tail.deps.push(upstream.root);
        }
        SubPlan {
            root: downstream.root,
            tail: upstream.tail,
        }
    }

    pub fn into_plan(self, sub: SubPlan, is_profile: bool, format: ExplainFormat) -> ExecutionPlan {
        ExecutionPlan {
            nodes: self.nodes,
            root: sub.root,
            tail: sub.tail,
            is_profile,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, kind: PlanNodeKind, deps: Vec<NodeId>) -> PlanNode {
        PlanNode {
            id,
            kind,
            input_vars: vec![],
            output_var: format!("__v{id}"),
            col_names: vec![],
            deps,
        }
    }

    #[test]
    fn append_links_fragments() {
        let mut builder = PlanBuilder::default();
        let start = builder.add(node(0, PlanNodeKind::Start, vec![]));
        let filter = builder.add(node(
            1,
            PlanNodeKind::Filter {
                condition: ngqlc_ast::expr::Expr::constant(true),
            },
            vec![],
        ));
        let joined = builder.append(
            SubPlan {
                root: start,
                tail: start,
            },
            SubPlan {
                root: filter,
                tail: filter,
            },
        );
        assert_eq!(joined.root, filter);
        assert_eq!(joined.tail, start);
        let plan = builder.into_plan(joined, false, ExplainFormat::Row);
        assert_eq!(plan.spine(), vec!["Filter", "Start"]);
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(PlanNodeKind::Start.as_ref(), "Start");
        assert_eq!(PlanNodeKind::ShowSpaces.as_ref(), "ShowSpaces");
        assert_eq!(
            PlanNodeKind::Filter {
                condition: ngqlc_ast::expr::Expr::constant(true)
            }
            .as_ref(),
            "Filter"
        );
    }
}
