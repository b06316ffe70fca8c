//! Permission prechecks, run before a sentence's own validation.
//!
//! GOD may do anything. Inside a space: schema writes need ADMIN or
//! above, data writes USER or above, reads any granted role. Cluster
//! management (hosts, zones, users, balance) is GOD only. Granting or
//! revoking a role requires a role strictly greater than the granted one.

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::stmt::user::RoleType;
use ngqlc_ast::stmt::SentenceKind;

use crate::context::QueryContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessKind {
    /// No check beyond being logged in.
    Open,
    Read,
    DataWrite,
    SchemaWrite,
    /// Cluster-wide administration.
    God,
    /// Grant/Revoke carry their own rule.
    RoleManage,
}

fn classify(kind: &SentenceKind) -> AccessKind {
    use SentenceKind::*;
    match kind {
        // session-local or universally visible; compound sentences defer to
        // their parts
        Use(_) | ShowSpaces | ShowCharset | ShowCollation | ShowMetaLeader | ChangePassword(_)
        | ShowSessions(_) | ShowQueries(_) | KillQuery(_) | Return(_) | Sequential(_)
        | Explain(_) => AccessKind::Open,

        Go(_) | Lookup(_) | FetchVertices(_) | FetchEdges(_) | FindPath(_) | GetSubgraph(_)
        | Match(_) | OrderBy(_) | Limit(_) | Yield(_) | GroupBy(_) | Set(_) | Pipe(_)
        | Assignment(_) | DescribeSpace(_) | ShowCreateSpace(_) | DescribeTag(_)
        | DescribeEdge(_) | ShowTags | ShowEdges | ShowCreateTag(_) | ShowCreateEdge(_)
        | DescribeTagIndex(_) | DescribeEdgeIndex(_) | ShowCreateTagIndex(_)
        | ShowCreateEdgeIndex(_) | ShowTagIndexes | ShowEdgeIndexes | ShowTagIndexStatus
        | ShowEdgeIndexStatus | ShowFulltextIndexes | ShowParts(_) | ShowStats => AccessKind::Read,

        InsertVertices(_) | InsertEdges(_) | UpdateVertex(_) | UpdateEdge(_)
        | DeleteVertices(_) | DeleteTags(_) | DeleteEdges(_) | Download(_) | Ingest => {
            AccessKind::DataWrite
        }

        CreateTag(_) | CreateEdge(_) | AlterTag(_) | AlterEdge(_) | DropTag(_) | DropEdge(_)
        | CreateTagIndex(_) | CreateEdgeIndex(_) | DropTagIndex(_) | DropEdgeIndex(_)
        | RebuildTagIndex(_) | RebuildEdgeIndex(_) | CreateFulltextIndex(_)
        | DropFulltextIndex(_) | RebuildFulltextIndex | AdminJob(_) | ShowRoles(_) => {
            AccessKind::SchemaWrite
        }

        CreateSpace(_) | CreateSpaceAs(_) | AlterSpace(_) | DropSpace(_) | ClearSpace(_)
        | AddHosts(_) | DropHosts(_) | ShowHosts(_) | ShowConfigs(_) | SetConfig(_)
        | GetConfig(_) | CreateSnapshot | DropSnapshot(_) | ShowSnapshots | MergeZone(_)
        | DropZone(_) | DivideZone(_) | RenameZone(_) | DescribeZone(_) | ShowZones
        | AddHostsIntoZone(_) | AddListener(_) | RemoveListener(_) | ShowListener
        | SignInService(_) | SignOutService(_) | ShowServiceClients(_) | BalanceDisk(_)
        | CreateUser(_) | DropUser(_) | AlterUser(_) | ShowUsers | DescribeUser(_)
        | KillSession(_) => AccessKind::God,

        Grant(_) | Revoke(_) => AccessKind::RoleManage,
    }
}

fn current_role(qctx: &QueryContext) -> Option<RoleType> {
    let space = qctx.session.space.as_ref()?;
    qctx.catalog.role(&space.name, &qctx.session.user)
}

fn denied() -> Error {
    Error::permission("Permission denied.")
}

pub(crate) fn check(kind: &SentenceKind, qctx: &QueryContext) -> Result<()> {
    if qctx.catalog.is_god(&qctx.session.user) {
        return Ok(());
    }
    match classify(kind) {
        AccessKind::Open => Ok(()),
        AccessKind::God => Err(denied()),
        AccessKind::Read => current_role(qctx).map(|_| ()).ok_or_else(denied),
        AccessKind::DataWrite => match current_role(qctx) {
            Some(role) if role.rank() >= RoleType::User.rank() => Ok(()),
            _ => Err(denied()),
        },
        AccessKind::SchemaWrite => match current_role(qctx) {
            Some(role) if role.rank() >= RoleType::Admin.rank() => Ok(()),
            _ => Err(denied()),
        },
        AccessKind::RoleManage => {
            let (space, target_role) = match kind {
                SentenceKind::Grant(g) => (&g.space, g.role),
                SentenceKind::Revoke(r) => (&r.space, r.role),
                _ => return Err(denied()),
            };
            if target_role == RoleType::God {
                return Err(denied());
            }
            match qctx.catalog.role(space, &qctx.session.user) {
                Some(granter) if granter.outranks(target_role) => Ok(()),
                _ => Err(denied()),
            }
        }
    }
}

/// Sentences that run without a space bound to the session.
pub(crate) fn no_space_required(kind: &SentenceKind) -> bool {
    use SentenceKind::*;
    matches!(
        kind,
        Use(_) | CreateSpace(_)
            | CreateSpaceAs(_)
            | DropSpace(_)
            | ClearSpace(_)
            | AlterSpace(_)
            | DescribeSpace(_)
            | ShowSpaces
            | ShowCreateSpace(_)
            | AddHosts(_)
            | DropHosts(_)
            | ShowHosts(_)
            | ShowConfigs(_)
            | SetConfig(_)
            | GetConfig(_)
            | CreateSnapshot
            | DropSnapshot(_)
            | ShowSnapshots
            | MergeZone(_)
            | DropZone(_)
            | DivideZone(_)
            | RenameZone(_)
            | DescribeZone(_)
            | ShowZones
            | AddHostsIntoZone(_)
            | AddListener(_)
            | RemoveListener(_)
            | ShowListener
            | SignInService(_)
            | SignOutService(_)
            | ShowServiceClients(_)
            | BalanceDisk(_)
            | ShowStats
            | ShowCharset
            | ShowCollation
            | ShowMetaLeader
            | ShowSessions(_)
            | KillSession(_)
            | ShowQueries(_)
            | KillQuery(_)
            | CreateUser(_)
            | DropUser(_)
            | AlterUser(_)
            | ChangePassword(_)
            | Grant(_)
            | Revoke(_)
            | ShowUsers
            | DescribeUser(_)
            | ShowRoles(_)
            | Explain(_)
            | Sequential(_)
            | Return(_)
    )
}
