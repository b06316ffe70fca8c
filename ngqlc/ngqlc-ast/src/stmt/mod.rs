//! The sentence tree: one kind per statement the parser can produce.
//!
//! Sentences compose through `;` (sequential), `|` (pipe) and
//! `$var = ...` (assignment). Construction returns an owning node; the
//! containing sentence owns its clauses, the top-level sequential owns the
//! statements.

pub mod admin;
pub mod clauses;
mod display;
pub mod explain;
pub mod maintain;
pub mod mutate;
pub mod query;
pub mod user;

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

pub use self::admin::*;
pub use self::clauses::*;
pub use self::explain::*;
pub use self::maintain::*;
pub use self::mutate::*;
pub use self::query::*;
pub use self::user::*;
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub kind: SentenceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Sentence {
    pub fn new<K: Into<SentenceKind>>(kind: K) -> Self {
        Sentence {
            kind: kind.into(),
            span: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner, strum::AsRefStr)]
pub enum SentenceKind {
    // ---- query ----
    Go(Box<GoSentence>),
    Lookup(LookupSentence),
    FetchVertices(FetchVerticesSentence),
    FetchEdges(FetchEdgesSentence),
    FindPath(Box<FindPathSentence>),
    GetSubgraph(Box<GetSubgraphSentence>),
    Match(Box<MatchSentence>),
    OrderBy(OrderBySentence),
    Limit(LimitSentence),
    Yield(YieldSentence),
    GroupBy(GroupBySentence),
    Set(SetSentence),
    Pipe(PipedSentence),
    Assignment(AssignmentSentence),
    Use(UseSentence),

    // ---- schema: spaces ----
    CreateSpace(Box<CreateSpaceSentence>),
    CreateSpaceAs(CreateSpaceAsSentence),
    AlterSpace(AlterSpaceSentence),
    DropSpace(DropSchemaSentence),
    ClearSpace(DropSchemaSentence),
    DescribeSpace(DescribeSchemaSentence),
    ShowSpaces,
    ShowCreateSpace(DescribeSchemaSentence),

    // ---- schema: tags and edges ----
    CreateTag(Box<CreateTagSentence>),
    CreateEdge(Box<CreateEdgeSentence>),
    AlterTag(Box<AlterTagSentence>),
    AlterEdge(Box<AlterEdgeSentence>),
    DropTag(DropSchemaSentence),
    DropEdge(DropSchemaSentence),
    DescribeTag(DescribeSchemaSentence),
    DescribeEdge(DescribeSchemaSentence),
    ShowTags,
    ShowEdges,
    ShowCreateTag(DescribeSchemaSentence),
    ShowCreateEdge(DescribeSchemaSentence),

    // ---- indexes ----
    CreateTagIndex(Box<CreateIndexSentence>),
    CreateEdgeIndex(Box<CreateIndexSentence>),
    DropTagIndex(DropIndexSentence),
    DropEdgeIndex(DropIndexSentence),
    DescribeTagIndex(DescribeIndexSentence),
    DescribeEdgeIndex(DescribeIndexSentence),
    ShowCreateTagIndex(DescribeIndexSentence),
    ShowCreateEdgeIndex(DescribeIndexSentence),
    ShowTagIndexes,
    ShowEdgeIndexes,
    ShowTagIndexStatus,
    ShowEdgeIndexStatus,
    RebuildTagIndex(RebuildIndexSentence),
    RebuildEdgeIndex(RebuildIndexSentence),
    CreateFulltextIndex(Box<CreateFulltextIndexSentence>),
    DropFulltextIndex(DropFulltextIndexSentence),
    ShowFulltextIndexes,
    RebuildFulltextIndex,

    // ---- mutation ----
    InsertVertices(Box<InsertVerticesSentence>),
    InsertEdges(Box<InsertEdgesSentence>),
    UpdateVertex(Box<UpdateVertexSentence>),
    UpdateEdge(Box<UpdateEdgeSentence>),
    DeleteVertices(DeleteVerticesSentence),
    DeleteTags(DeleteTagsSentence),
    DeleteEdges(DeleteEdgesSentence),
    Download(DownloadSentence),
    Ingest,

    // ---- admin ----
    AddHosts(AddHostsSentence),
    DropHosts(DropHostsSentence),
    ShowHosts(ShowHostsSentence),
    ShowParts(ShowPartsSentence),
    ShowConfigs(ShowConfigsSentence),
    SetConfig(SetConfigSentence),
    GetConfig(GetConfigSentence),
    CreateSnapshot,
    DropSnapshot(DropSnapshotSentence),
    ShowSnapshots,
    MergeZone(MergeZoneSentence),
    DropZone(DropZoneSentence),
    DivideZone(DivideZoneSentence),
    RenameZone(RenameZoneSentence),
    DescribeZone(DescribeZoneSentence),
    ShowZones,
    AddHostsIntoZone(AddHostsIntoZoneSentence),
    AddListener(AddListenerSentence),
    RemoveListener(RemoveListenerSentence),
    ShowListener,
    SignInService(SignInServiceSentence),
    SignOutService(SignOutServiceSentence),
    ShowServiceClients(ShowServiceClientsSentence),
    AdminJob(AdminJobSentence),
    BalanceDisk(BalanceDiskSentence),
    ShowStats,
    ShowCharset,
    ShowCollation,
    ShowMetaLeader,

    // ---- sessions and queries ----
    ShowSessions(ShowSessionsSentence),
    KillSession(KillSessionSentence),
    ShowQueries(ShowQueriesSentence),
    KillQuery(KillQuerySentence),

    // ---- users ----
    CreateUser(CreateUserSentence),
    DropUser(DropUserSentence),
    AlterUser(AlterUserSentence),
    ChangePassword(ChangePasswordSentence),
    Grant(GrantSentence),
    Revoke(RevokeSentence),
    ShowUsers,
    DescribeUser(DescribeUserSentence),
    ShowRoles(ShowRolesSentence),

    // ---- control ----
    Explain(Box<ExplainSentence>),
    Sequential(SequentialSentences),
    Return(ReturnSentence),
}

impl SentenceKind {
    /// The statement-kind name used by diagnostics.
    pub fn name(&self) -> &str {
        self.as_ref()
    }
}

macro_rules! impl_from_kind {
    ($($payload:ty => $variant:ident boxed,)*) => {
        $(impl From<$payload> for SentenceKind {
            fn from(v: $payload) -> Self {
                SentenceKind::$variant(Box::new(v))
            }
        })*
    };
    ($($payload:ty => $variant:ident,)*) => {
        $(impl From<$payload> for SentenceKind {
            fn from(v: $payload) -> Self {
                SentenceKind::$variant(v)
            }
        })*
    };
}

impl_from_kind! {
    GoSentence => Go boxed,
    FindPathSentence => FindPath boxed,
    GetSubgraphSentence => GetSubgraph boxed,
    MatchSentence => Match boxed,
    CreateSpaceSentence => CreateSpace boxed,
    CreateTagSentence => CreateTag boxed,
    CreateEdgeSentence => CreateEdge boxed,
    AlterTagSentence => AlterTag boxed,
    AlterEdgeSentence => AlterEdge boxed,
    InsertVerticesSentence => InsertVertices boxed,
    InsertEdgesSentence => InsertEdges boxed,
    UpdateVertexSentence => UpdateVertex boxed,
    UpdateEdgeSentence => UpdateEdge boxed,
    ExplainSentence => Explain boxed,
    CreateFulltextIndexSentence => CreateFulltextIndex boxed,
}

impl_from_kind! {
    LookupSentence => Lookup,
    FetchVerticesSentence => FetchVertices,
    FetchEdgesSentence => FetchEdges,
    OrderBySentence => OrderBy,
    LimitSentence => Limit,
    YieldSentence => Yield,
    GroupBySentence => GroupBy,
    SetSentence => Set,
    PipedSentence => Pipe,
    AssignmentSentence => Assignment,
    UseSentence => Use,
    SequentialSentences => Sequential,
    ReturnSentence => Return,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn kind_names() {
        let s = Sentence::new(SentenceKind::ShowSpaces);
        assert_eq!(s.kind.name(), "ShowSpaces");
        let y = Sentence::new(YieldSentence {
            yield_clause: YieldClause::new(vec![YieldColumn::new(Expr::constant(1i64))]),
            where_clause: None,
        });
        assert_eq!(y.kind.name(), "Yield");
    }
}
