//! Semantic validation: name resolution, type checking, reference
//! correctness and plan emission.
//!
//! One validator runs per sentence. The orchestration wrapper applies the
//! shared steps in order: space requirement, permission precheck, input
//! propagation from the pipe upstream, the sentence's own validation, plan
//! emission, and publication of the output schema for the downstream.

mod acl;
mod admin;
mod deduce_props;
mod deduce_type;
mod fusion;
mod maintain;
mod mutate;
mod permission;
mod query;

use log::debug;
use ngqlc_ast::error::{Error, ErrorKind, Result, WithErrorInfo};
use ngqlc_ast::stmt::explain::ExplainFormat;
use ngqlc_ast::stmt::{Sentence, SentenceKind, SequentialSentences};
use ngqlc_ast::types::ValueType;

use crate::context::{ColDef, ColsDef, QueryContext};
use crate::ir::{ExecutionPlan, NodeId, PlanBuilder, PlanNode, PlanNodeKind, SubPlan};
use crate::session::SpaceInfo;

/// Bound on statements in one sequential; a runaway statement list is cut
/// off rather than validated to death.
pub const MAX_SENTENCES_PER_SEQUENTIAL: usize = 512;

pub(crate) struct Vctx<'a> {
    pub qctx: &'a mut QueryContext,
    pub plan: PlanBuilder,
    /// Columns the pipe upstream published for `$-`.
    pub inputs: ColsDef,
}

/// What a sentence validator hands back to the orchestration.
pub(crate) struct Outcome {
    pub sub: SubPlan,
    pub outputs: ColsDef,
}

impl Vctx<'_> {
    pub fn space(&self) -> Result<SpaceInfo> {
        self.qctx
            .session
            .space
            .clone()
            .ok_or_else(|| Error::semantic("Space was not chosen."))
    }

    pub fn add_node(
        &mut self,
        kind: PlanNodeKind,
        col_names: Vec<String>,
        deps: Vec<NodeId>,
    ) -> NodeId {
        let id = self.qctx.next_node_id();
        let output_var = format!("__{}_{}", kind.as_ref(), id);
        self.plan.add(PlanNode {
            id,
            kind,
            input_vars: Vec::new(),
            output_var,
            col_names,
            deps,
        })
    }

    /// A plan that is one node, serving as both root and tail.
    pub fn single_node(&mut self, kind: PlanNodeKind, cols: &[(&str, ValueType)]) -> Outcome {
        let col_names = cols.iter().map(|(n, _)| n.to_string()).collect();
        let id = self.add_node(kind, col_names, Vec::new());
        Outcome {
            sub: SubPlan { root: id, tail: id },
            outputs: cols.iter().map(|(n, t)| ColDef::new(n, *t)).collect(),
        }
    }
}

/// Validates one (possibly compound) sentence into an executable plan.
pub fn validate(sentence: &Sentence, qctx: &mut QueryContext) -> Result<ExecutionPlan> {
    let (body, is_profile, format) = match &sentence.kind {
        SentenceKind::Explain(e) => {
            let format = match &e.format {
                Some(f) => ExplainFormat::parse(f).ok_or_else(|| {
                    Error::syntax(format!("Invalid explain/profile format: \"{f}\""))
                })?,
                None => ExplainFormat::Row,
            };
            (e.body.as_ref(), e.is_profile, format)
        }
        _ => (sentence, false, ExplainFormat::Row),
    };

    let mut vctx = Vctx {
        qctx,
        plan: PlanBuilder::default(),
        inputs: ColsDef::new(),
    };
    let outcome = validate_sentence(body, &mut vctx)?;
    let Vctx { mut plan, .. } = vctx;
    fusion::fuse_projections(&mut plan);
    Ok(plan.into_plan(outcome.sub, is_profile, format))
}

pub(crate) fn validate_sentence(sentence: &Sentence, vctx: &mut Vctx) -> Result<Outcome> {
    use SentenceKind::*;

    vctx.qctx.counters.sentences_validated += 1;
    debug!("validating {}", sentence.kind.name());

    let needs_space = match &sentence.kind {
        AdminJob(job) => job.needs_space(),
        kind => !permission::no_space_required(kind),
    };
    if needs_space && !vctx.qctx.session.space_chosen() {
        return Err(Error::semantic("Space was not chosen."));
    }
    permission::check(&sentence.kind, vctx.qctx)?;

    let result = match &sentence.kind {
        // ---- composition ----
        Sequential(seq) => validate_sequential(seq, vctx),
        Pipe(pipe) => {
            let left = validate_sentence(&pipe.left, vctx)?;
            let saved = std::mem::replace(&mut vctx.inputs, left.outputs);
            let right = validate_sentence(&pipe.right, vctx);
            vctx.inputs = saved;
            let right = right?;
            let sub = vctx.plan.append(left.sub, right.sub);
            Ok(Outcome {
                sub,
                outputs: right.outputs,
            })
        }
        Assignment(assign) => {
            let body = validate_sentence(&assign.body, vctx)?;
            vctx.qctx.symbols.register(&assign.var, body.outputs.clone());
            let col_names = body.outputs.iter().map(|c| c.name.clone()).collect();
            let id = vctx.add_node(
                PlanNodeKind::Assign {
                    var: assign.var.clone(),
                },
                col_names,
                vec![body.sub.root],
            );
            Ok(Outcome {
                sub: SubPlan {
                    root: id,
                    tail: body.sub.tail,
                },
                outputs: body.outputs,
            })
        }
        Return(ret) => {
            let cols = vctx.qctx.symbols.lookup(&ret.var)?.clone();
            let filter = query::rewrite_input_refs(&ret.condition, vctx)?;
            let col_names = cols.iter().map(|c| c.name.clone()).collect();
            let id = vctx.add_node(
                PlanNodeKind::Select { condition: filter },
                col_names,
                Vec::new(),
            );
            if let Some(node) = vctx.plan.node_mut(id) {
                node.input_vars.push(ret.var.clone());
            }
            Ok(Outcome {
                sub: SubPlan { root: id, tail: id },
                outputs: cols,
            })
        }
        Explain(_) => Err(Error::syntax("Nested EXPLAIN is not supported.")),

        // ---- query ----
        Go(go) => query::validate_go(go, vctx),
        Lookup(lookup) => query::validate_lookup(lookup, vctx),
        FetchVertices(fetch) => query::validate_fetch_vertices(fetch, vctx),
        FetchEdges(fetch) => query::validate_fetch_edges(fetch, vctx),
        FindPath(fp) => query::validate_find_path(fp, vctx),
        GetSubgraph(gs) => query::validate_get_subgraph(gs, vctx),
        Match(m) => query::validate_match(m, vctx),
        OrderBy(ob) => query::validate_order_by(ob, vctx),
        Limit(l) => query::validate_limit(l, vctx),
        Yield(y) => query::validate_yield(y, vctx),
        GroupBy(g) => query::validate_group_by(g, vctx),
        Set(s) => query::validate_set(s, vctx),
        Use(u) => query::validate_use(u, vctx),

        // ---- schema ----
        CreateSpace(_) | CreateSpaceAs(_) | AlterSpace(_) | DropSpace(_) | ClearSpace(_)
        | DescribeSpace(_) | ShowSpaces | ShowCreateSpace(_) | CreateTag(_) | CreateEdge(_)
        | AlterTag(_) | AlterEdge(_) | DropTag(_) | DropEdge(_) | DescribeTag(_)
        | DescribeEdge(_) | ShowTags | ShowEdges | ShowCreateTag(_) | ShowCreateEdge(_)
        | CreateTagIndex(_) | CreateEdgeIndex(_) | DropTagIndex(_) | DropEdgeIndex(_)
        | DescribeTagIndex(_) | DescribeEdgeIndex(_) | ShowCreateTagIndex(_)
        | ShowCreateEdgeIndex(_) | ShowTagIndexes | ShowEdgeIndexes | ShowTagIndexStatus
        | ShowEdgeIndexStatus | RebuildTagIndex(_) | RebuildEdgeIndex(_)
        | CreateFulltextIndex(_) | DropFulltextIndex(_) | ShowFulltextIndexes
        | RebuildFulltextIndex => maintain::validate_maintain(&sentence.kind, vctx),

        // ---- mutation ----
        InsertVertices(_) | InsertEdges(_) | UpdateVertex(_) | UpdateEdge(_)
        | DeleteVertices(_) | DeleteTags(_) | DeleteEdges(_) | Download(_) | Ingest => {
            mutate::validate_mutate(&sentence.kind, vctx)
        }

        // ---- users ----
        CreateUser(_) | DropUser(_) | AlterUser(_) | ChangePassword(_) | Grant(_) | Revoke(_)
        | ShowUsers | DescribeUser(_) | ShowRoles(_) => acl::validate_acl(&sentence.kind, vctx),

        // ---- everything administrative ----
        kind => admin::validate_admin(kind, vctx),
    };

    result.with_span(sentence.span)
}

fn validate_sequential(seq: &SequentialSentences, vctx: &mut Vctx) -> Result<Outcome> {
    if seq.sentences.is_empty() {
        return Err(Error::new(ErrorKind::StatementEmpty, "Statement empty."));
    }
    if seq.sentences.len() > MAX_SENTENCES_PER_SEQUENTIAL {
        return Err(Error::semantic(format!(
            "The maximum number of statements allowed has been exceeded ({MAX_SENTENCES_PER_SEQUENTIAL})"
        )));
    }
    let mut chained: Option<SubPlan> = None;
    let mut last_outputs = ColsDef::new();
    for sentence in &seq.sentences {
        let outcome = validate_sentence(sentence, vctx)?;
        chained = Some(match chained {
            None => outcome.sub,
            Some(prev) => vctx.plan.append(prev, outcome.sub),
        });
        last_outputs = outcome.outputs;
    }
    Ok(Outcome {
        sub: chained.expect("at least one sentence"),
        outputs: last_outputs,
    })
}
