//! Administrative sentences: hosts, zones, configs, snapshots, listeners,
//! services, jobs, sessions and queries.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAddr {
    pub host: String,
    pub port: i32,
}

impl HostAddr {
    pub fn new(host: &str, port: i32) -> Self {
        HostAddr {
            host: host.to_string(),
            port,
        }
    }
}

impl Display for HostAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\":{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum HostRole {
    #[strum(serialize = "GRAPH")]
    Graph,
    #[strum(serialize = "META")]
    Meta,
    #[strum(serialize = "STORAGE")]
    Storage,
    #[strum(serialize = "AGENT")]
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddHostsSentence {
    pub hosts: Vec<HostAddr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropHostsSentence {
    pub hosts: Vec<HostAddr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowHostsSentence {
    pub role: Option<HostRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowPartsSentence {
    pub parts: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
pub enum ConfigModule {
    #[default]
    #[strum(serialize = "ALL")]
    All,
    #[strum(serialize = "GRAPH")]
    Graph,
    #[strum(serialize = "META")]
    Meta,
    #[strum(serialize = "STORAGE")]
    Storage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRowItem {
    pub module: ConfigModule,
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowConfigsSentence {
    pub module: ConfigModule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetConfigSentence {
    pub item: ConfigRowItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetConfigSentence {
    pub item: ConfigRowItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSnapshotSentence {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeZoneSentence {
    pub zones: Vec<String>,
    pub into_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropZoneSentence {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivideZoneSentence {
    pub name: String,
    pub parts: Vec<(String, Vec<HostAddr>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameZoneSentence {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeZoneSentence {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddHostsIntoZoneSentence {
    pub hosts: Vec<HostAddr>,
    pub zone: String,
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ListenerKind {
    #[strum(serialize = "ELASTICSEARCH")]
    Elasticsearch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddListenerSentence {
    pub kind: ListenerKind,
    pub hosts: Vec<HostAddr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveListenerSentence {
    pub kind: ListenerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceClientItem {
    pub host: HostAddr,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ServiceKind {
    #[strum(serialize = "ELASTICSEARCH")]
    Elasticsearch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInServiceSentence {
    pub kind: ServiceKind,
    pub clients: Vec<ServiceClientItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignOutServiceSentence {
    pub kind: ServiceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowServiceClientsSentence {
    pub kind: ServiceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum AdminJobOp {
    #[strum(serialize = "SUBMIT JOB")]
    Add,
    #[strum(serialize = "SHOW JOB")]
    Show,
    #[strum(serialize = "SHOW JOBS")]
    ShowAll,
    #[strum(serialize = "STOP JOB")]
    Stop,
    #[strum(serialize = "RECOVER JOB")]
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum AdminJobCmd {
    #[strum(serialize = "COMPACT")]
    Compact,
    #[strum(serialize = "FLUSH")]
    Flush,
    #[strum(serialize = "STATS")]
    Stats,
    #[strum(serialize = "REBUILD TAG INDEX")]
    RebuildTagIndex,
    #[strum(serialize = "REBUILD EDGE INDEX")]
    RebuildEdgeIndex,
    #[strum(serialize = "REBUILD FULLTEXT INDEX")]
    RebuildFulltextIndex,
    #[strum(serialize = "DOWNLOAD HDFS")]
    Download,
    #[strum(serialize = "INGEST")]
    Ingest,
    #[strum(serialize = "BALANCE DATA")]
    DataBalance,
    #[strum(serialize = "BALANCE ACROSS ZONE")]
    ZoneBalance,
    #[strum(serialize = "BALANCE LEADER")]
    LeaderBalance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminJobSentence {
    pub op: AdminJobOp,
    /// Present for `SUBMIT JOB`; absent for show/stop/recover.
    pub cmd: Option<AdminJobCmd>,
    pub args: Vec<String>,
}

impl AdminJobSentence {
    /// Whether this job operates on the current space's data.
    pub fn needs_space(&self) -> bool {
        !matches!(
            self.cmd,
            Some(AdminJobCmd::DataBalance)
                | Some(AdminJobCmd::ZoneBalance)
                | Some(AdminJobCmd::LeaderBalance)
                | None
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceDiskSentence {
    pub remove: bool,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSessionsSentence {
    pub session_id: Option<i64>,
    pub local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSessionSentence {
    pub session_id: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowQueriesSentence {
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillQuerySentence {
    pub session_id: Option<Expr>,
    pub plan_id: Expr,
}
