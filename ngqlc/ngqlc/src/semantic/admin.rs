//! Validators for the administrative sentences. Most produce a single
//! plan node carrying the validated request; the interesting work is the
//! argument checking.

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::stmt::admin::AdminJobOp;
use ngqlc_ast::stmt::SentenceKind;
use ngqlc_ast::types::ValueType;

use super::deduce_type::{Scopes, TypeDeducer};
use super::{Outcome, Vctx};
use crate::ir::PlanNodeKind;

pub(crate) fn validate_admin(kind: &SentenceKind, vctx: &mut Vctx) -> Result<Outcome> {
    use SentenceKind::*;
    match kind {
        AddHosts(a) => {
            if a.hosts.is_empty() {
                return Err(Error::semantic("Host list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::AddHosts {
                    hosts: a.hosts.clone(),
                },
                &[],
            ))
        }
        DropHosts(d) => {
            if d.hosts.is_empty() {
                return Err(Error::semantic("Host list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::DropHosts {
                    hosts: d.hosts.clone(),
                },
                &[],
            ))
        }
        ShowHosts(_) => Ok(vctx.single_node(
            PlanNodeKind::ShowHosts,
            &[
                ("Host", ValueType::String),
                ("Port", ValueType::Int),
                ("Status", ValueType::String),
                ("Leader count", ValueType::Int),
                ("Leader distribution", ValueType::String),
                ("Partition distribution", ValueType::String),
            ],
        )),
        ShowParts(s) => Ok(vctx.single_node(
            PlanNodeKind::ShowParts {
                parts: s.parts.clone(),
            },
            &[
                ("Partition ID", ValueType::Int),
                ("Leader", ValueType::String),
                ("Peers", ValueType::String),
                ("Losts", ValueType::String),
            ],
        )),
        ShowConfigs(s) => Ok(vctx.single_node(
            PlanNodeKind::ShowConfigs { module: s.module },
            &[
                ("module", ValueType::String),
                ("name", ValueType::String),
                ("type", ValueType::String),
                ("mode", ValueType::String),
                ("value", ValueType::Any),
            ],
        )),
        SetConfig(s) => {
            if s.item.value.is_none() {
                return Err(Error::semantic("Empty config value."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::SetConfig {
                    module: s.item.module,
                    name: s.item.name.clone(),
                },
                &[],
            ))
        }
        GetConfig(g) => Ok(vctx.single_node(
            PlanNodeKind::GetConfig {
                module: g.item.module,
                name: g.item.name.clone(),
            },
            &[
                ("module", ValueType::String),
                ("name", ValueType::String),
                ("type", ValueType::String),
                ("value", ValueType::Any),
            ],
        )),
        CreateSnapshot => Ok(vctx.single_node(PlanNodeKind::CreateSnapshot, &[])),
        DropSnapshot(d) => Ok(vctx.single_node(
            PlanNodeKind::DropSnapshot {
                name: d.name.clone(),
            },
            &[],
        )),
        ShowSnapshots => Ok(vctx.single_node(
            PlanNodeKind::ShowSnapshots,
            &[
                ("Name", ValueType::String),
                ("Status", ValueType::String),
                ("Hosts", ValueType::String),
            ],
        )),
        MergeZone(m) => {
            if m.zones.is_empty() {
                return Err(Error::semantic("Zone list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::MergeZone {
                    zones: m.zones.clone(),
                    into_zone: m.into_zone.clone(),
                },
                &[],
            ))
        }
        DropZone(d) => Ok(vctx.single_node(
            PlanNodeKind::DropZone {
                zone: d.name.clone(),
            },
            &[],
        )),
        DivideZone(d) => {
            if d.parts.is_empty() {
                return Err(Error::semantic("Zone list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::DivideZone {
                    zone: d.name.clone(),
                },
                &[],
            ))
        }
        RenameZone(r) => Ok(vctx.single_node(
            PlanNodeKind::RenameZone {
                from: r.from.clone(),
                to: r.to.clone(),
            },
            &[],
        )),
        DescribeZone(d) => Ok(vctx.single_node(
            PlanNodeKind::DescZone {
                zone: d.name.clone(),
            },
            &[("Hosts", ValueType::String)],
        )),
        ShowZones => Ok(vctx.single_node(
            PlanNodeKind::ShowZones,
            &[
                ("Name", ValueType::String),
                ("Host", ValueType::String),
                ("Port", ValueType::Int),
            ],
        )),
        AddHostsIntoZone(a) => {
            if a.hosts.is_empty() {
                return Err(Error::semantic("Host list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::AddHostsIntoZone {
                    zone: a.zone.clone(),
                    hosts: a.hosts.clone(),
                },
                &[],
            ))
        }
        AddListener(a) => {
            if a.hosts.is_empty() {
                return Err(Error::semantic("Listener host list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::AddListener {
                    hosts: a.hosts.clone(),
                },
                &[],
            ))
        }
        RemoveListener(_) => Ok(vctx.single_node(PlanNodeKind::RemoveListener, &[])),
        ShowListener => Ok(vctx.single_node(
            PlanNodeKind::ShowListener,
            &[
                ("PartId", ValueType::Int),
                ("Type", ValueType::String),
                ("Host", ValueType::String),
                ("Status", ValueType::String),
            ],
        )),
        SignInService(s) => {
            if s.clients.is_empty() {
                return Err(Error::semantic("Service client list cannot be empty."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::SignInService {
                    hosts: s.clients.iter().map(|c| c.host.clone()).collect(),
                },
                &[],
            ))
        }
        SignOutService(_) => Ok(vctx.single_node(PlanNodeKind::SignOutService, &[])),
        ShowServiceClients(_) => Ok(vctx.single_node(
            PlanNodeKind::ShowServiceClients,
            &[
                ("Host", ValueType::String),
                ("Port", ValueType::Int),
                ("Type", ValueType::String),
            ],
        )),
        AdminJob(job) => validate_admin_job(job, vctx),
        BalanceDisk(b) => {
            if b.paths.is_empty() {
                return Err(Error::semantic("Disk path list cannot be empty."));
            }
            let kind = if b.remove {
                PlanNodeKind::BalanceDiskRemove {
                    paths: b.paths.clone(),
                }
            } else {
                PlanNodeKind::BalanceDiskAttach {
                    paths: b.paths.clone(),
                }
            };
            Ok(vctx.single_node(kind, &[("New Job Id", ValueType::Int)]))
        }
        ShowStats => Ok(vctx.single_node(
            PlanNodeKind::ShowStats,
            &[
                ("Type", ValueType::String),
                ("Name", ValueType::String),
                ("Count", ValueType::Int),
            ],
        )),
        ShowCharset => Ok(vctx.single_node(
            PlanNodeKind::ShowCharset,
            &[
                ("Charset", ValueType::String),
                ("Description", ValueType::String),
                ("Default collation", ValueType::String),
                ("Maxlen", ValueType::Int),
            ],
        )),
        ShowCollation => Ok(vctx.single_node(
            PlanNodeKind::ShowCollation,
            &[
                ("Collation", ValueType::String),
                ("Charset", ValueType::String),
            ],
        )),
        ShowMetaLeader => Ok(vctx.single_node(
            PlanNodeKind::ShowMetaLeader,
            &[
                ("Meta Leader", ValueType::String),
                ("secs from last heart beat", ValueType::Int),
            ],
        )),
        ShowSessions(s) => Ok(vctx.single_node(
            PlanNodeKind::ShowSessions {
                local: s.local,
                session_id: s.session_id,
            },
            &[
                ("SessionId", ValueType::Int),
                ("UserName", ValueType::String),
                ("SpaceName", ValueType::String),
                ("CreateTime", ValueType::DateTime),
                ("UpdateTime", ValueType::DateTime),
                ("GraphAddr", ValueType::String),
            ],
        )),
        KillSession(k) => {
            require_int_arg(vctx, &k.session_id, "session id")?;
            Ok(vctx.single_node(
                PlanNodeKind::KillSession {
                    session_id: k.session_id.clone(),
                },
                &[],
            ))
        }
        ShowQueries(s) => Ok(vctx.single_node(
            PlanNodeKind::ShowQueries { all: s.all },
            &[
                ("SessionID", ValueType::Int),
                ("ExecutionPlanID", ValueType::Int),
                ("User", ValueType::String),
                ("Host", ValueType::String),
                ("StartTime", ValueType::DateTime),
                ("DurationInUSec", ValueType::Int),
                ("Status", ValueType::String),
                ("Query", ValueType::String),
            ],
        )),
        KillQuery(k) => {
            if let Some(session) = &k.session_id {
                require_int_arg(vctx, session, "session id")?;
            }
            require_int_arg(vctx, &k.plan_id, "plan id")?;
            Ok(vctx.single_node(
                PlanNodeKind::KillQuery {
                    session_id: k.session_id.clone(),
                    plan_id: k.plan_id.clone(),
                },
                &[],
            ))
        }
        other => Err(Error::internal(format!(
            "not an admin sentence: {}",
            other.name()
        ))),
    }
}

fn require_int_arg(vctx: &Vctx, expr: &ngqlc_ast::expr::Expr, what: &str) -> Result<()> {
    let aliases = std::collections::HashMap::new();
    let t = TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, Scopes::default()).deduce(expr)?;
    if matches!(
        t,
        ValueType::Int | ValueType::Any | ValueType::Null | ValueType::Empty
    ) {
        return Ok(());
    }
    Err(Error::semantic(format!(
        "The {what} should be an integer, but was {t}"
    )))
}

fn validate_admin_job(
    job: &ngqlc_ast::stmt::admin::AdminJobSentence,
    vctx: &mut Vctx,
) -> Result<Outcome> {
    match job.op {
        AdminJobOp::Add => {
            if job.cmd.is_none() {
                return Err(Error::semantic("SUBMIT JOB needs a command."));
            }
            Ok(vctx.single_node(
                PlanNodeKind::SubmitJob {
                    op: job.op,
                    cmd: job.cmd,
                    args: job.args.clone(),
                },
                &[("New Job Id", ValueType::Int)],
            ))
        }
        AdminJobOp::ShowAll => Ok(vctx.single_node(
            PlanNodeKind::ShowJobs,
            &[
                ("Job Id", ValueType::Int),
                ("Command", ValueType::String),
                ("Status", ValueType::String),
                ("Start Time", ValueType::DateTime),
                ("Stop Time", ValueType::DateTime),
            ],
        )),
        AdminJobOp::Show => {
            parse_job_id(job.args.first())?;
            Ok(vctx.single_node(
                PlanNodeKind::ShowJobs,
                &[
                    ("Job Id", ValueType::Int),
                    ("Command", ValueType::String),
                    ("Status", ValueType::String),
                ],
            ))
        }
        AdminJobOp::Stop => {
            let job_id = parse_job_id(job.args.first())?;
            Ok(vctx.single_node(
                PlanNodeKind::StopJob { job_id },
                &[("Result", ValueType::String)],
            ))
        }
        AdminJobOp::Recover => {
            let mut job_ids = Vec::new();
            for arg in &job.args {
                job_ids.push(parse_job_id(Some(arg))?);
            }
            Ok(vctx.single_node(
                PlanNodeKind::RecoverJob { job_ids },
                &[("Recovered job num", ValueType::Int)],
            ))
        }
    }
}

fn parse_job_id(arg: Option<&String>) -> Result<i64> {
    let arg = arg.ok_or_else(|| Error::semantic("Job id is missing."))?;
    arg.parse::<i64>()
        .map_err(|_| Error::semantic(format!("Invalid job id `{arg}'.")))
}
