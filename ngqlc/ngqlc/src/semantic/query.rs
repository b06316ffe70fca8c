//! Validators for the traversal and projection sentences.

use std::collections::HashMap;
use std::sync::OnceLock;

use itertools::Itertools;
use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::expr::{Expr, ExprKind};
use ngqlc_ast::stmt::clauses::{
    EdgeDirection, OverClause, VerticesClause, YieldClause, YieldColumn,
};
use ngqlc_ast::stmt::query::*;
use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::{List, Value};

use super::deduce_props::PropRefs;
use super::deduce_type::{Scopes, TypeDeducer};
use super::{Outcome, Vctx};
use crate::context::{ColDef, ColsDef};
use crate::eval::{Evaluator, NullContext};
use crate::ir::{DataCollectKind, PlanNodeKind, SubPlan};
use crate::session::SpaceInfo;

// ---------------------------------------------------------------- helpers

fn no_aliases() -> HashMap<String, String> {
    HashMap::new()
}

fn empty_aliases() -> &'static HashMap<String, String> {
    static EMPTY: OnceLock<HashMap<String, String>> = OnceLock::new();
    EMPTY.get_or_init(HashMap::new)
}

fn eval_constant(vctx: &Vctx, expr: &Expr) -> Value {
    Evaluator::new(&vctx.qctx.registry, &NullContext).eval(expr)
}

/// Rewrites pre-resolution label forms against the edge aliases in scope,
/// tracking predicate/reduce/comprehension locals so their variables stay
/// untouched.
fn rewrite_labels(
    expr: &Expr,
    aliases: &HashMap<String, String>,
    locals: &mut Vec<String>,
) -> Result<Expr> {
    use ExprKind::*;
    let kind = match &expr.kind {
        Label(name) => {
            if locals.iter().any(|l| l == name) {
                Label(name.clone())
            } else {
                return Err(Error::semantic(format!("Invalid label identifiers: {name}")));
            }
        }
        LabelAttribute { label, attr } => {
            if locals.iter().any(|l| l == label) {
                Attribute {
                    collection: Box::new(Expr::new(Label(label.clone()))),
                    attr: attr.clone(),
                }
            } else if aliases.contains_key(label) {
                EdgeProperty {
                    edge: label.clone(),
                    prop: attr.clone(),
                }
            } else {
                return Err(Error::semantic(format!(
                    "Invalid label identifiers: {label}"
                )));
            }
        }
        Predicate(p) => {
            let collection = rewrite_labels(&p.collection, aliases, locals)?;
            locals.push(p.var.clone());
            let filter = rewrite_labels(&p.filter, aliases, locals);
            locals.pop();
            Predicate(Box::new(ngqlc_ast::expr::PredicateExpr {
                func: p.func,
                var: p.var.clone(),
                collection,
                filter: filter?,
            }))
        }
        Reduce(r) => {
            let collection = rewrite_labels(&r.collection, aliases, locals)?;
            let initial = rewrite_labels(&r.initial, aliases, locals)?;
            locals.push(r.accumulator.clone());
            locals.push(r.var.clone());
            let mapping = rewrite_labels(&r.mapping, aliases, locals);
            locals.pop();
            locals.pop();
            Reduce(Box::new(ngqlc_ast::expr::ReduceExpr {
                accumulator: r.accumulator.clone(),
                initial,
                var: r.var.clone(),
                collection,
                mapping: mapping?,
            }))
        }
        ListComprehension(lc) => {
            let collection = rewrite_labels(&lc.collection, aliases, locals)?;
            locals.push(lc.var.clone());
            let filter = lc
                .filter
                .as_ref()
                .map(|f| rewrite_labels(f, aliases, locals))
                .transpose();
            let mapping = lc
                .mapping
                .as_ref()
                .map(|m| rewrite_labels(m, aliases, locals))
                .transpose();
            locals.pop();
            ListComprehension(Box::new(ngqlc_ast::expr::ListComprehensionExpr {
                var: lc.var.clone(),
                collection,
                filter: filter?,
                mapping: mapping?,
            }))
        }
        _ => {
            // rebuild with rewritten children
            let mut clone = expr.clone();
            rewrite_children(&mut clone, aliases, locals)?;
            return Ok(clone);
        }
    };
    Ok(Expr {
        kind,
        span: expr.span,
    })
}

fn rewrite_children(
    expr: &mut Expr,
    aliases: &HashMap<String, String>,
    locals: &mut Vec<String>,
) -> Result<()> {
    use ExprKind::*;
    match &mut expr.kind {
        Unary { operand, .. } | TypeCasting { operand, .. } => {
            **operand = rewrite_labels(operand, aliases, locals)?;
        }
        Arithmetic { left, right, .. }
        | Relational { left, right, .. }
        | Logical { left, right, .. } => {
            **left = rewrite_labels(left, aliases, locals)?;
            **right = rewrite_labels(right, aliases, locals)?;
        }
        FunctionCall { args, .. } => {
            for arg in args {
                *arg = rewrite_labels(arg, aliases, locals)?;
            }
        }
        Aggregate { arg, .. } => {
            if let Some(arg) = arg {
                **arg = rewrite_labels(arg, aliases, locals)?;
            }
        }
        Subscript { collection, index } => {
            **collection = rewrite_labels(collection, aliases, locals)?;
            **index = rewrite_labels(index, aliases, locals)?;
        }
        SubscriptRange { collection, lo, hi } => {
            **collection = rewrite_labels(collection, aliases, locals)?;
            if let Some(lo) = lo {
                **lo = rewrite_labels(lo, aliases, locals)?;
            }
            if let Some(hi) = hi {
                **hi = rewrite_labels(hi, aliases, locals)?;
            }
        }
        Attribute { collection, .. } => {
            **collection = rewrite_labels(collection, aliases, locals)?;
        }
        Case(case) => {
            if let Some(cond) = &mut case.condition {
                *cond = rewrite_labels(cond, aliases, locals)?;
            }
            for (when, then) in &mut case.when_thens {
                *when = rewrite_labels(when, aliases, locals)?;
                *then = rewrite_labels(then, aliases, locals)?;
            }
            if let Some(default) = &mut case.default {
                *default = rewrite_labels(default, aliases, locals)?;
            }
        }
        ListCtor(items) | SetCtor(items) | PathBuild(items) => {
            for item in items {
                *item = rewrite_labels(item, aliases, locals)?;
            }
        }
        MapCtor(items) => {
            for (_, item) in items {
                *item = rewrite_labels(item, aliases, locals)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Validates a condition in input/variable scope only and hands back the
/// rewritten form; the Return sentence and filters over `$-` use this.
pub(crate) fn rewrite_input_refs(expr: &Expr, vctx: &mut Vctx) -> Result<Expr> {
    let rewritten = rewrite_labels(expr, empty_aliases(), &mut Vec::new())?;
    let scopes = Scopes {
        graph: false,
        graph_error: Some("Only support input and variable in yield sentence."),
        allow_aggregate: false,
        restrict_to_schema: None,
    };
    let aliases = no_aliases();
    let t = TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, scopes).deduce(&rewritten)?;
    require_boolish(&rewritten, t)?;
    vctx.qctx.alloc_expr(rewritten.clone());
    Ok(rewritten)
}

fn require_boolish(expr: &Expr, t: ValueType) -> Result<()> {
    if matches!(
        t,
        ValueType::Bool | ValueType::Any | ValueType::Null | ValueType::Empty
    ) {
        return Ok(());
    }
    Err(Error::semantic(format!(
        "`{expr}', expected Boolean, but was `{t}'"
    )))
}

/// Enforces the one-source rule: a sentence may read `$-` or exactly one
/// `$var`, never both, never two variables.
fn check_single_source<'a>(sentence_text: &str, exprs: impl Iterator<Item = &'a Expr>) -> Result<()> {
    let mut has_input = false;
    let mut vars: Vec<&str> = Vec::new();
    for e in exprs {
        has_input |= e.has_input_ref();
        for v in e.variable_refs() {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
    }
    if (has_input && !vars.is_empty()) || vars.len() > 1 {
        return Err(Error::syntax(format!(
            "Near `{sentence_text}', Only support single data source."
        )));
    }
    Ok(())
}

fn resolve_over(
    over: &OverClause,
    vctx: &Vctx,
    space: &SpaceInfo,
) -> Result<(Vec<String>, HashMap<String, String>)> {
    let mut names = Vec::new();
    let mut aliases = HashMap::new();
    if over.is_all {
        for edge in vctx.qctx.catalog.list_edges(&space.name)? {
            aliases.insert(edge.clone(), edge.clone());
            names.push(edge);
        }
        if names.is_empty() {
            return Err(Error::semantic("No edge type found in space."));
        }
    } else {
        for oe in &over.edges {
            vctx.qctx.catalog.edge_schema(&space.name, &oe.edge)?;
            let alias = oe.alias_or_name().to_string();
            if aliases.insert(alias.clone(), oe.edge.clone()).is_some() {
                return Err(Error::semantic(format!("Duplicate edge alias `{alias}'")));
            }
            names.push(oe.edge.clone());
        }
    }
    Ok((names, aliases))
}

/// Resolves a FROM/TO clause to the source expression fed to storage and,
/// for the variable form, the variable it reads.
fn resolve_vertices(
    clause: &VerticesClause,
    vctx: &Vctx,
    space: &SpaceInfo,
    what: &str,
) -> Result<(Expr, Option<String>)> {
    if let Some(r) = &clause.ref_expr {
        match &r.kind {
            ExprKind::InputProperty(_) => {
                let aliases = no_aliases();
                TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, Scopes::default())
                    .deduce(r)?;
                Ok((r.clone(), None))
            }
            ExprKind::VariableProperty { var, .. } => {
                let aliases = no_aliases();
                TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, Scopes::default())
                    .deduce(r)?;
                Ok((r.clone(), Some(var.clone())))
            }
            _ => Err(Error::semantic(format!(
                "`{r}' is not support in {what} sentence."
            ))),
        }
    } else {
        let mut vids = Vec::with_capacity(clause.vids.len());
        for vid in &clause.vids {
            let v = eval_constant(vctx, vid);
            let ok = match space.vid_type {
                ValueType::Int => v.is_int(),
                _ => v.is_string(),
            };
            if !ok {
                return Err(Error::semantic(format!(
                    "Vid should be a {}.",
                    if space.vid_type == ValueType::Int {
                        "integer"
                    } else {
                        "string"
                    }
                )));
            }
            vids.push(v);
        }
        Ok((Expr::constant(Value::List(List { values: vids })), None))
    }
}

fn deduce_in(
    vctx: &Vctx,
    expr: &Expr,
    aliases: &HashMap<String, String>,
    scopes: Scopes,
) -> Result<ValueType> {
    TypeDeducer::new(vctx.qctx, &vctx.inputs, aliases, scopes).deduce(expr)
}

fn project_outputs(
    vctx: &Vctx,
    cols: &[YieldColumn],
    aliases: &HashMap<String, String>,
    scopes: &Scopes,
) -> Result<ColsDef> {
    let mut outputs = ColsDef::new();
    for col in cols {
        let t = deduce_in(vctx, &col.expr, aliases, scopes.clone())?;
        let name = col.name();
        if outputs.iter().any(|c| c.name == name) {
            return Err(Error::semantic(format!("Duplicate column name `{name}'")));
        }
        outputs.push(ColDef { name, vtype: t });
    }
    Ok(outputs)
}

// --------------------------------------------------------------------- GO

pub(crate) fn validate_go(go: &GoSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;

    if let Some(n) = go.step.n_steps {
        if go.step.m_steps > n {
            return Err(Error::semantic(format!(
                "Invalid step range: {} to {n}.",
                go.step.m_steps
            )));
        }
    }

    let (edge_names, aliases) = resolve_over(&go.over, vctx, &space)?;
    let (src_expr, src_var) = resolve_vertices(&go.from, vctx, &space, "go")?;

    // rewrite and type-check the filter
    let scopes = Scopes {
        graph: true,
        graph_error: None,
        allow_aggregate: false,
        restrict_to_schema: None,
    };
    let where_expr = match &go.where_clause {
        Some(w) => {
            let rewritten = rewrite_labels(&w.filter, &aliases, &mut Vec::new())?;
            let t = deduce_in(vctx, &rewritten, &aliases, scopes.clone())?;
            require_boolish(&rewritten, t)?;
            vctx.qctx.alloc_expr(rewritten.clone());
            Some(rewritten)
        }
        None => None,
    };

    // yield columns, defaulting to each edge's destination id
    let yield_clause = match &go.yield_clause {
        Some(y) => {
            let columns = y
                .columns
                .iter()
                .map(|c| {
                    rewrite_labels(&c.expr, &aliases, &mut Vec::new()).map(|expr| YieldColumn {
                        expr,
                        alias: c.alias.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            YieldClause {
                columns,
                distinct: y.distinct,
            }
        }
        None => YieldClause::new(
            go.over
                .edges
                .iter()
                .map(|e| YieldColumn::new(Expr::new(ExprKind::EdgeDst(e.alias_or_name().to_string()))))
                .chain(
                    go.over
                        .is_all
                        .then(|| {
                            edge_names
                                .iter()
                                .map(|e| YieldColumn::new(Expr::new(ExprKind::EdgeDst(e.clone()))))
                                .collect::<Vec<_>>()
                        })
                        .unwrap_or_default(),
                )
                .collect(),
        ),
    };
    let outputs = project_outputs(vctx, &yield_clause.columns, &aliases, &scopes)?;

    // the one-source rule covers src, filter and yield together
    let go_text = format!("GO FROM {}", go.from);
    check_single_source(
        &go_text,
        [&src_expr]
            .into_iter()
            .chain(where_expr.iter())
            .chain(yield_clause.columns.iter().map(|c| &c.expr)),
    )?;

    let refs = PropRefs::collect_all(
        where_expr
            .iter()
            .chain(yield_clause.columns.iter().map(|c| &c.expr)),
    );

    // ---- plan emission ----
    let from_is_ref = go.from.is_ref();
    let start = if from_is_ref {
        None
    } else {
        Some(vctx.add_node(PlanNodeKind::Start, vec![], vec![]))
    };

    let gn_cols: Vec<String> = refs
        .edge_props
        .iter()
        .map(|(e, p)| format!("{e}.{p}"))
        .chain(aliases.keys().sorted().map(|a| format!("{a}._dst")))
        .unique()
        .collect();
    let gn = vctx.add_node(
        PlanNodeKind::GetNeighbors {
            src: src_expr,
            space: space.name.clone(),
            edge_types: edge_names,
            direction: go.over.direction,
            vertex_props: refs.src_props.iter().map(|(t, p)| format!("{t}.{p}")).collect(),
            edge_props: refs.edge_props.iter().map(|(e, p)| format!("{e}.{p}")).collect(),
            dedup: false,
        },
        gn_cols,
        start.into_iter().collect(),
    );
    if let (Some(var), Some(node)) = (src_var.clone(), vctx.plan.node_mut(gn)) {
        node.input_vars.push(var);
    }
    let tail = start.unwrap_or(gn);

    // multi-step traversals loop over GetNeighbors
    let mut cur = gn;
    if !go.step.is_single() || go.step.m_steps != 1 {
        cur = vctx.add_node(
            PlanNodeKind::Loop {
                condition: Expr::constant(go.step.max_steps() as i64),
                body: gn,
            },
            vec![],
            vec![cur],
        );
        if go.step.n_steps.is_some() {
            cur = vctx.add_node(
                PlanNodeKind::DataCollect {
                    kind: DataCollectKind::MultiSteps,
                },
                vec![],
                vec![cur],
            );
        }
    }

    if refs.needs_dst() {
        let first_alias = aliases
            .keys()
            .sorted()
            .next()
            .cloned()
            .unwrap_or_else(|| "_dst".to_string());
        let dst_col = format!("{first_alias}._dst");
        cur = vctx.add_node(
            PlanNodeKind::Project {
                columns: vec![YieldColumn::new(Expr::new(ExprKind::EdgeDst(
                    first_alias.clone(),
                )))],
            },
            vec![dst_col.clone()],
            vec![cur],
        );
        cur = vctx.add_node(
            PlanNodeKind::GetVertices {
                src: Expr::new(ExprKind::InputProperty(dst_col.clone())),
                space: space.name.clone(),
                tags: refs.dst_props.iter().map(|(t, _)| t.clone()).unique().collect(),
                props: refs.dst_props.iter().map(|(t, p)| format!("{t}.{p}")).collect(),
                dedup: true,
            },
            vec![dst_col],
            vec![cur],
        );
    }

    if let Some(filter) = where_expr {
        let upstream_cols = vctx
            .plan
            .node(cur)
            .map(|n| n.col_names.clone())
            .unwrap_or_default();
        cur = vctx.add_node(
            PlanNodeKind::Filter { condition: filter },
            upstream_cols,
            vec![cur],
        );
    }

    let col_names: Vec<String> = outputs.iter().map(|c| c.name.clone()).collect();
    cur = vctx.add_node(
        PlanNodeKind::Project {
            columns: yield_clause.columns.clone(),
        },
        col_names.clone(),
        vec![cur],
    );
    if yield_clause.distinct {
        cur = vctx.add_node(PlanNodeKind::Dedup, col_names.clone(), vec![cur]);
    }
    if let Some(truncate) = &go.truncate {
        let count = truncate.expr.clone();
        cur = if truncate.is_sample {
            vctx.add_node(PlanNodeKind::Sample { count }, col_names.clone(), vec![cur])
        } else {
            let count = match eval_constant(vctx, &truncate.expr) {
                Value::Int(i) if i >= 0 => i,
                _ => return Err(Error::semantic("Limit count should be a non-negative integer.")),
            };
            vctx.add_node(
                PlanNodeKind::Limit { offset: 0, count },
                col_names.clone(),
                vec![cur],
            )
        };
    }

    Ok(Outcome {
        sub: SubPlan { root: cur, tail },
        outputs,
    })
}

// ------------------------------------------------------------------ YIELD

pub(crate) fn validate_yield(y: &YieldSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let scopes = Scopes {
        graph: false,
        graph_error: Some("Only support input and variable in yield sentence."),
        allow_aggregate: true,
        restrict_to_schema: None,
    };
    let aliases = no_aliases();

    let columns = y
        .yield_clause
        .columns
        .iter()
        .map(|c| {
            rewrite_labels(&c.expr, &aliases, &mut Vec::new()).map(|expr| YieldColumn {
                expr,
                alias: c.alias.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let where_expr = match &y.where_clause {
        Some(w) => {
            let rewritten = rewrite_labels(&w.filter, &aliases, &mut Vec::new())?;
            let no_agg = Scopes {
                allow_aggregate: false,
                ..scopes.clone()
            };
            let t = deduce_in(vctx, &rewritten, &aliases, no_agg)?;
            require_boolish(&rewritten, t)?;
            Some(rewritten)
        }
        None => None,
    };

    let outputs = project_outputs(vctx, &columns, &aliases, &scopes)?;

    let text = y.yield_clause.to_string();
    check_single_source(
        &text,
        columns.iter().map(|c| &c.expr).chain(where_expr.iter()),
    )?;

    let has_agg = columns.iter().any(|c| c.expr.has_aggregate());
    let reads_anything = columns
        .iter()
        .map(|c| &c.expr)
        .chain(where_expr.iter())
        .any(|e| e.has_input_ref() || !e.variable_refs().is_empty());

    let mut tail = None;
    let mut cur = None;
    if !reads_anything {
        let start = vctx.add_node(PlanNodeKind::Start, vec![], vec![]);
        tail = Some(start);
        cur = Some(start);
    }
    if let Some(filter) = where_expr {
        let input_cols: Vec<String> = vctx.inputs.iter().map(|c| c.name.clone()).collect();
        let id = vctx.add_node(
            PlanNodeKind::Filter { condition: filter },
            input_cols,
            cur.into_iter().collect(),
        );
        tail = tail.or(Some(id));
        cur = Some(id);
    }
    let col_names: Vec<String> = outputs.iter().map(|c| c.name.clone()).collect();
    let project = if has_agg {
        vctx.add_node(
            PlanNodeKind::Aggregate {
                group_keys: vec![],
                group_items: columns,
            },
            col_names.clone(),
            cur.into_iter().collect(),
        )
    } else {
        vctx.add_node(
            PlanNodeKind::Project { columns },
            col_names.clone(),
            cur.into_iter().collect(),
        )
    };
    let tail = tail.unwrap_or(project);
    let mut root = project;
    if y.yield_clause.distinct {
        root = vctx.add_node(PlanNodeKind::Dedup, col_names, vec![root]);
    }

    Ok(Outcome {
        sub: SubPlan { root, tail },
        outputs,
    })
}

// --------------------------------------------------------------- ORDER BY

pub(crate) fn validate_order_by(ob: &OrderBySentence, vctx: &mut Vctx) -> Result<Outcome> {
    let mut factors = Vec::new();
    for factor in &ob.factors {
        let name = match &factor.expr.kind {
            ExprKind::InputProperty(col) => col.clone(),
            ExprKind::VariableProperty { prop, .. } => prop.clone(),
            _ => {
                return Err(Error::semantic(format!(
                    "`{}' is not supported in order by",
                    factor.expr
                )))
            }
        };
        let aliases = no_aliases();
        deduce_in(vctx, &factor.expr, &aliases, Scopes::default())?;
        factors.push((name, factor.direction));
    }
    check_single_source(
        "ORDER BY",
        ob.factors.iter().map(|f| &f.expr),
    )?;
    let outputs = vctx.inputs.clone();
    let col_names = outputs.iter().map(|c| c.name.clone()).collect();
    let id = vctx.add_node(PlanNodeKind::Sort { factors }, col_names, vec![]);
    Ok(Outcome {
        sub: SubPlan { root: id, tail: id },
        outputs,
    })
}

// ------------------------------------------------------------------ LIMIT

pub(crate) fn validate_limit(l: &LimitSentence, vctx: &mut Vctx) -> Result<Outcome> {
    if l.offset < 0 || l.count < 0 {
        return Err(Error::syntax("skip `-1' is illegal"));
    }
    let outputs = vctx.inputs.clone();
    let col_names = outputs.iter().map(|c| c.name.clone()).collect();
    let id = vctx.add_node(
        PlanNodeKind::Limit {
            offset: l.offset,
            count: l.count,
        },
        col_names,
        vec![],
    );
    Ok(Outcome {
        sub: SubPlan { root: id, tail: id },
        outputs,
    })
}

// --------------------------------------------------------------- GROUP BY

pub(crate) fn validate_group_by(g: &GroupBySentence, vctx: &mut Vctx) -> Result<Outcome> {
    let aliases = no_aliases();
    let plain = Scopes {
        graph: false,
        graph_error: Some("Only support input and variable in yield sentence."),
        allow_aggregate: false,
        restrict_to_schema: None,
    };

    let mut group_keys = Vec::new();
    for key in &g.group_clause.keys {
        let rewritten = rewrite_labels(&key.expr, &aliases, &mut Vec::new())?;
        if rewritten.has_aggregate() {
            return Err(Error::semantic(format!(
                "Group `{}' invalid", key.expr
            )));
        }
        deduce_in(vctx, &rewritten, &aliases, plain.clone())?;
        group_keys.push(rewritten);
    }
    if group_keys.is_empty() {
        return Err(Error::syntax("Group cannot be empty"));
    }

    let agg_scopes = Scopes {
        allow_aggregate: true,
        ..plain.clone()
    };
    let mut group_items = Vec::new();
    let mut outputs = ColsDef::new();
    for col in &g.yield_clause.columns {
        let rewritten = rewrite_labels(&col.expr, &aliases, &mut Vec::new())?;
        let t = deduce_in(vctx, &rewritten, &aliases, agg_scopes.clone())?;
        if !rewritten.has_aggregate() && !group_keys.contains(&rewritten) {
            return Err(Error::semantic(format!(
                "Yield non-agg expression `{}' must be functionally dependent on items in GROUP BY clause",
                col.expr
            )));
        }
        outputs.push(ColDef {
            name: col.name(),
            vtype: t,
        });
        group_items.push(YieldColumn {
            expr: rewritten,
            alias: col.alias.clone(),
        });
    }
    if group_items.is_empty() {
        return Err(Error::syntax("Yield cannot be empty"));
    }

    let col_names = outputs.iter().map(|c| c.name.clone()).collect();
    let id = vctx.add_node(
        PlanNodeKind::Aggregate {
            group_keys,
            group_items,
        },
        col_names,
        vec![],
    );
    Ok(Outcome {
        sub: SubPlan { root: id, tail: id },
        outputs,
    })
}

// -------------------------------------------------------------------- SET

pub(crate) fn validate_set(s: &SetSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let left = super::validate_sentence(&s.left, vctx)?;
    let right = super::validate_sentence(&s.right, vctx)?;

    let lcols: Vec<&str> = left.outputs.iter().map(|c| c.name.as_str()).collect();
    let rcols: Vec<&str> = right.outputs.iter().map(|c| c.name.as_str()).collect();
    if lcols != rcols {
        return Err(Error::semantic(format!(
            "different column names to UNION/INTERSECT/MINUS are not supported: <{}> vs. <{}>",
            lcols.join(","),
            rcols.join(",")
        )));
    }

    let kind = match s.op {
        SetOperator::Union | SetOperator::UnionAll => PlanNodeKind::Union,
        SetOperator::Intersect => PlanNodeKind::Intersect,
        SetOperator::Minus => PlanNodeKind::Minus,
    };
    let col_names: Vec<String> = left.outputs.iter().map(|c| c.name.clone()).collect();
    let mut root = vctx.add_node(kind, col_names.clone(), vec![left.sub.root, right.sub.root]);
    if s.op == SetOperator::Union {
        root = vctx.add_node(PlanNodeKind::Dedup, col_names, vec![root]);
    }
    Ok(Outcome {
        sub: SubPlan {
            root,
            tail: left.sub.tail,
        },
        outputs: left.outputs,
    })
}

// -------------------------------------------------------------------- USE

pub(crate) fn validate_use(u: &UseSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let desc = vctx.qctx.catalog.space_by_name(&u.space)?;
    vctx.qctx.session.space = Some(SpaceInfo::from(&desc));
    Ok(vctx.single_node(
        PlanNodeKind::SwitchSpace {
            space: u.space.clone(),
        },
        &[],
    ))
}

// ----------------------------------------------------------------- LOOKUP

pub(crate) fn validate_lookup(lookup: &LookupSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;
    let catalog = &vctx.qctx.catalog;

    let (is_edge, _schema) = match catalog.tag_schema(&space.name, &lookup.source) {
        Ok(schema) => (false, schema),
        Err(_) => (true, catalog.edge_schema(&space.name, &lookup.source)?),
    };

    let indexes = if is_edge {
        catalog.edge_indexes(&space.name)
    } else {
        catalog.tag_indexes(&space.name)
    };
    let index = indexes
        .into_iter()
        .find(|idx| idx.schema_name == lookup.source)
        .ok_or_else(|| Error::semantic("No valid index found"))?;

    let mut aliases = no_aliases();
    aliases.insert(lookup.source.clone(), lookup.source.clone());
    let scopes = Scopes {
        graph: true,
        graph_error: None,
        allow_aggregate: false,
        restrict_to_schema: Some(lookup.source.clone()),
    };

    let filter = match &lookup.where_clause {
        Some(w) => {
            let rewritten = rewrite_lookup_labels(&w.filter, lookup, is_edge)?;
            let t = deduce_in(vctx, &rewritten, &aliases, scopes.clone())?;
            require_boolish(&rewritten, t)?;
            vctx.qctx.alloc_expr(rewritten.clone());
            Some(rewritten)
        }
        None => None,
    };

    // default outputs expose the scanned keys
    let (columns, outputs) = match &lookup.yield_clause {
        Some(y) => {
            let mut columns = Vec::new();
            for c in &y.columns {
                let expr = rewrite_lookup_labels(&c.expr, lookup, is_edge)?;
                columns.push(YieldColumn {
                    expr,
                    alias: c.alias.clone(),
                });
            }
            let outputs = project_outputs(vctx, &columns, &aliases, &scopes)?;
            (Some(columns), outputs)
        }
        None => {
            let outputs = if is_edge {
                vec![
                    ColDef::new("SrcVID", space.vid_type),
                    ColDef::new("DstVID", space.vid_type),
                    ColDef::new("Ranking", ValueType::Int),
                ]
            } else {
                vec![ColDef::new("VertexID", space.vid_type)]
            };
            (None, outputs)
        }
    };

    let start = vctx.add_node(PlanNodeKind::Start, vec![], vec![]);
    let col_names: Vec<String> = outputs.iter().map(|c| c.name.clone()).collect();
    let scan = vctx.add_node(
        PlanNodeKind::IndexScan {
            space: space.name.clone(),
            schema: lookup.source.clone(),
            is_edge,
            index: index.name,
            filter,
        },
        col_names.clone(),
        vec![start],
    );
    let root = match columns {
        Some(columns) => vctx.add_node(
            PlanNodeKind::Project { columns },
            col_names,
            vec![scan],
        ),
        None => scan,
    };
    Ok(Outcome {
        sub: SubPlan { root, tail: start },
        outputs,
    })
}

/// In LOOKUP, `schema.prop` labels resolve to tag or edge properties of
/// the scanned schema.
fn rewrite_lookup_labels(expr: &Expr, lookup: &LookupSentence, is_edge: bool) -> Result<Expr> {
    use ExprKind::*;
    let mut clone = expr.clone();
    fn walk(e: &mut Expr, source: &str, is_edge: bool) -> Result<()> {
        if let LabelAttribute { label, attr } = &e.kind {
            let (label, attr) = (label.clone(), attr.clone());
            if label != source {
                return Err(Error::semantic(format!("Schema name error: {label}")));
            }
            e.kind = if is_edge {
                EdgeProperty {
                    edge: label,
                    prop: attr,
                }
            } else {
                TagProperty {
                    tag: label,
                    prop: attr,
                }
            };
            return Ok(());
        }
        if matches!(e.kind, Label(_)) {
            return Err(Error::semantic(format!("Invalid label identifiers: {e}")));
        }
        walk_kind(&mut e.kind, source, is_edge)
    }
    fn walk_kind(kind: &mut ExprKind, source: &str, is_edge: bool) -> Result<()> {
        match kind {
            Unary { operand, .. } | TypeCasting { operand, .. } => {
                walk(operand, source, is_edge)
            }
            Arithmetic { left, right, .. }
            | Relational { left, right, .. }
            | Logical { left, right, .. } => {
                walk(left, source, is_edge)?;
                walk(right, source, is_edge)
            }
            FunctionCall { args, .. } => {
                for arg in args {
                    walk(arg, source, is_edge)?;
                }
                Ok(())
            }
            Subscript { collection, index } => {
                walk(collection, source, is_edge)?;
                walk(index, source, is_edge)
            }
            Attribute { collection, .. } => walk(collection, source, is_edge),
            ListCtor(items) | SetCtor(items) => {
                for item in items {
                    walk(item, source, is_edge)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
    walk(&mut clone, &lookup.source, is_edge)?;
    Ok(clone)
}

// ------------------------------------------------------------------ FETCH

pub(crate) fn validate_fetch_vertices(
    fetch: &FetchVerticesSentence,
    vctx: &mut Vctx,
) -> Result<Outcome> {
    let space = vctx.space()?;
    let tags = if fetch.tags.is_empty() {
        vctx.qctx.catalog.list_tags(&space.name)?
    } else {
        for tag in &fetch.tags {
            vctx.qctx.catalog.tag_schema(&space.name, tag)?;
        }
        fetch.tags.clone()
    };
    let (src_expr, src_var) = resolve_vertices(&fetch.vertices, vctx, &space, "fetch")?;

    let scopes = Scopes {
        graph: true,
        ..Scopes::default()
    };
    let aliases = no_aliases();
    let (columns, outputs) = match &fetch.yield_clause {
        Some(y) => {
            let outputs = project_outputs(vctx, &y.columns, &aliases, &scopes)?;
            (y.columns.clone(), outputs)
        }
        None => {
            let col = YieldColumn::aliased(
                Expr::new(ExprKind::VertexRef(ngqlc_ast::expr::VertexRole::Source)),
                "vertices_",
            );
            (vec![col], vec![ColDef::new("vertices_", ValueType::Vertex)])
        }
    };

    let from_is_ref = fetch.vertices.is_ref();
    let start = if from_is_ref {
        None
    } else {
        Some(vctx.add_node(PlanNodeKind::Start, vec![], vec![]))
    };
    let gv = vctx.add_node(
        PlanNodeKind::GetVertices {
            src: src_expr,
            space: space.name.clone(),
            tags,
            props: vec![],
            dedup: true,
        },
        vec![],
        start.into_iter().collect(),
    );
    if let (Some(var), Some(node)) = (src_var, vctx.plan.node_mut(gv)) {
        node.input_vars.push(var);
    }
    let col_names = outputs.iter().map(|c| c.name.clone()).collect();
    let project = vctx.add_node(PlanNodeKind::Project { columns }, col_names, vec![gv]);
    Ok(Outcome {
        sub: SubPlan {
            root: project,
            tail: start.unwrap_or(gv),
        },
        outputs,
    })
}

pub(crate) fn validate_fetch_edges(fetch: &FetchEdgesSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;
    vctx.qctx.catalog.edge_schema(&space.name, &fetch.edge)?;

    if let Some(r) = &fetch.ref_expr {
        if !r.is_input_or_var_only() {
            return Err(Error::semantic(format!(
                "`{r}' is not support in fetch sentence."
            )));
        }
    } else {
        for key in &fetch.keys {
            for vid in [&key.src, &key.dst] {
                let v = eval_constant(vctx, vid);
                let ok = match space.vid_type {
                    ValueType::Int => v.is_int(),
                    _ => v.is_string(),
                };
                if !ok {
                    return Err(Error::semantic(format!(
                        "Vid should be a {}.",
                        if space.vid_type == ValueType::Int {
                            "integer"
                        } else {
                            "string"
                        }
                    )));
                }
            }
        }
    }

    let mut aliases = no_aliases();
    aliases.insert(fetch.edge.clone(), fetch.edge.clone());
    let scopes = Scopes {
        graph: true,
        ..Scopes::default()
    };
    let (columns, outputs) = match &fetch.yield_clause {
        Some(y) => {
            let columns = y
                .columns
                .iter()
                .map(|c| {
                    rewrite_labels(&c.expr, &aliases, &mut Vec::new()).map(|expr| YieldColumn {
                        expr,
                        alias: c.alias.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let outputs = project_outputs(vctx, &columns, &aliases, &scopes)?;
            (columns, outputs)
        }
        None => {
            let col = YieldColumn::aliased(Expr::new(ExprKind::EdgeRef), "edges_");
            (vec![col], vec![ColDef::new("edges_", ValueType::Edge)])
        }
    };

    let start = vctx.add_node(PlanNodeKind::Start, vec![], vec![]);
    let ge = vctx.add_node(
        PlanNodeKind::GetEdges {
            space: space.name.clone(),
            edge: fetch.edge.clone(),
            props: vec![],
            dedup: true,
        },
        vec![],
        vec![start],
    );
    let col_names = outputs.iter().map(|c| c.name.clone()).collect();
    let project = vctx.add_node(PlanNodeKind::Project { columns }, col_names, vec![ge]);
    Ok(Outcome {
        sub: SubPlan {
            root: project,
            tail: start,
        },
        outputs,
    })
}

// -------------------------------------------------------------- FIND PATH

pub(crate) fn validate_find_path(fp: &FindPathSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;
    let (edge_names, aliases) = resolve_over(&fp.over, vctx, &space)?;
    let (src_expr, _) = resolve_vertices(&fp.from, vctx, &space, "find path")?;
    let (_to_expr, _) = resolve_vertices(&fp.to, vctx, &space, "find path")?;

    let filter = match &fp.where_clause {
        Some(w) => {
            let rewritten = rewrite_labels(&w.filter, &aliases, &mut Vec::new())?;
            let scopes = Scopes {
                graph: true,
                ..Scopes::default()
            };
            let t = deduce_in(vctx, &rewritten, &aliases, scopes)?;
            require_boolish(&rewritten, t)?;
            Some(rewritten)
        }
        None => None,
    };

    // WITH PROP keeps the traversed properties on the collected paths
    let wanted_props = if fp.with_prop {
        vec!["*".to_string()]
    } else {
        vec![]
    };
    let start = vctx.add_node(PlanNodeKind::Start, vec![], vec![]);
    let gn = vctx.add_node(
        PlanNodeKind::GetNeighbors {
            src: src_expr,
            space: space.name.clone(),
            edge_types: edge_names,
            direction: fp.over.direction,
            vertex_props: wanted_props.clone(),
            edge_props: wanted_props,
            dedup: true,
        },
        vec![],
        vec![start],
    );
    let looped = vctx.add_node(
        PlanNodeKind::Loop {
            condition: Expr::constant(fp.step.max_steps() as i64),
            body: gn,
        },
        vec![],
        vec![gn],
    );
    let mut cur = vctx.add_node(
        PlanNodeKind::DataCollect {
            kind: DataCollectKind::Paths {
                path_type: fp.path_type,
            },
        },
        vec!["path".to_string()],
        vec![looped],
    );
    if let Some(filter) = filter {
        cur = vctx.add_node(
            PlanNodeKind::Filter { condition: filter },
            vec!["path".to_string()],
            vec![cur],
        );
    }
    Ok(Outcome {
        sub: SubPlan {
            root: cur,
            tail: start,
        },
        outputs: vec![ColDef::new("path", ValueType::Path)],
    })
}

// ----------------------------------------------------------- GET SUBGRAPH

pub(crate) fn validate_get_subgraph(gs: &GetSubgraphSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;
    for edge in gs.in_edges.iter().chain(&gs.out_edges).chain(&gs.both_edges) {
        vctx.qctx.catalog.edge_schema(&space.name, edge)?;
    }
    let (src_expr, _) = resolve_vertices(&gs.from, vctx, &space, "get subgraph")?;

    let outputs = match &gs.yield_clause {
        Some(y) => {
            if y.columns.len() > 2 {
                return Err(Error::semantic(
                    "Only support yield vertices or edges in get subgraph sentence.",
                ));
            }
            y.columns
                .iter()
                .map(|c| {
                    let name = c.name();
                    let vtype = match &c.expr.kind {
                        ExprKind::Label(l) if l.eq_ignore_ascii_case("vertices") => ValueType::List,
                        ExprKind::Label(l) if l.eq_ignore_ascii_case("edges") => ValueType::List,
                        _ => {
                            return Err(Error::semantic(
                                "Only support yield vertices or edges in get subgraph sentence.",
                            ))
                        }
                    };
                    Ok(ColDef { name, vtype })
                })
                .collect::<Result<Vec<_>>>()?
        }
        None => vec![
            ColDef::new("_vertices", ValueType::List),
            ColDef::new("_edges", ValueType::List),
        ],
    };

    let edge_types: Vec<String> = gs
        .in_edges
        .iter()
        .chain(&gs.out_edges)
        .chain(&gs.both_edges)
        .cloned()
        .collect();
    let wanted_props = if gs.with_prop {
        vec!["*".to_string()]
    } else {
        vec![]
    };
    let start = vctx.add_node(PlanNodeKind::Start, vec![], vec![]);
    let gn = vctx.add_node(
        PlanNodeKind::GetNeighbors {
            src: src_expr,
            space: space.name.clone(),
            edge_types,
            direction: EdgeDirection::Both,
            vertex_props: wanted_props.clone(),
            edge_props: wanted_props,
            dedup: true,
        },
        vec![],
        vec![start],
    );
    let looped = vctx.add_node(
        PlanNodeKind::Loop {
            condition: Expr::constant(gs.step.max_steps() as i64),
            body: gn,
        },
        vec![],
        vec![gn],
    );
    let col_names = outputs.iter().map(|c| c.name.clone()).collect();
    let dc = vctx.add_node(
        PlanNodeKind::DataCollect {
            kind: DataCollectKind::Subgraph {
                with_prop: gs.with_prop,
            },
        },
        col_names,
        vec![looped],
    );
    Ok(Outcome {
        sub: SubPlan {
            root: dc,
            tail: start,
        },
        outputs,
    })
}

// ------------------------------------------------------------------ MATCH

pub(crate) fn validate_match(m: &MatchSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;

    // aliases build MATCH's own scope
    let mut alias_cols = ColsDef::new();
    let mut declare = |name: &str, t: ValueType| -> Result<()> {
        if alias_cols.iter().any(|c| c.name == name) {
            return Err(Error::semantic(format!("`{name}': Redefined alias")));
        }
        alias_cols.push(ColDef::new(name, t));
        Ok(())
    };

    for path in &m.paths {
        if let Some(alias) = &path.alias {
            declare(alias, ValueType::Path)?;
        }
        if let Some(alias) = &path.head.alias {
            declare(alias, ValueType::Vertex)?;
        }
        for (edge, node) in &path.steps {
            if let Some(alias) = &edge.alias {
                let t = if edge.range.is_some() {
                    ValueType::List
                } else {
                    ValueType::Edge
                };
                declare(alias, t)?;
            }
            if let Some(alias) = &node.alias {
                declare(alias, ValueType::Vertex)?;
            }
        }
    }

    // schema existence
    for path in &m.paths {
        for label in path
            .head
            .labels
            .iter()
            .chain(path.steps.iter().flat_map(|(_, n)| n.labels.iter()))
        {
            vctx.qctx.catalog.tag_schema(&space.name, label)?;
        }
        for (edge, _) in &path.steps {
            for etype in &edge.types {
                vctx.qctx.catalog.edge_schema(&space.name, etype)?;
            }
            if let Some(range) = &edge.range {
                if let Some(max) = range.max {
                    if range.min > max {
                        return Err(Error::semantic(format!(
                            "Max hop must be greater equal than min hop: {} vs. {max}",
                            range.min
                        )));
                    }
                }
            }
        }
    }

    // every pattern needs its own scan start: a labeled head node with an
    // index over that label
    if m.paths.is_empty() {
        return Err(Error::semantic("Path pattern cannot be empty."));
    }
    let mut scan_starts = Vec::new();
    for path in &m.paths {
        let start_label = path.head.labels.first().ok_or_else(|| {
            Error::semantic("Can't solve the start vids from the sentence.")
        })?;
        let index = vctx
            .qctx
            .catalog
            .tag_indexes(&space.name)
            .into_iter()
            .find(|idx| &idx.schema_name == start_label)
            .ok_or_else(|| Error::semantic("No valid index found"))?;
        scan_starts.push((start_label.clone(), index.name));
    }

    // rewrite alias references in WHERE / RETURN into input columns
    let match_aliases: HashMap<String, String> = alias_cols
        .iter()
        .map(|c| (c.name.clone(), c.name.clone()))
        .collect();
    let rewrite_match = |e: &Expr| rewrite_match_refs(e, &match_aliases);

    let saved_inputs = std::mem::replace(&mut vctx.inputs, alias_cols.clone());
    let validate_inner = |vctx: &mut Vctx| -> Result<(Option<Expr>, Vec<YieldColumn>, ColsDef)> {
        let filter = match &m.where_clause {
            Some(w) => {
                let rewritten = rewrite_match(&w.filter)?;
                let t = deduce_in(vctx, &rewritten, empty_aliases(), Scopes::default())?;
                require_boolish(&rewritten, t)?;
                Some(rewritten)
            }
            None => None,
        };

        let (columns, outputs) = match &m.ret.columns {
            None => {
                // RETURN * keeps declaration order
                let columns = vctx
                    .inputs
                    .iter()
                    .map(|c| YieldColumn::new(Expr::new(ExprKind::InputProperty(c.name.clone()))))
                    .collect::<Vec<_>>();
                let outputs = vctx
                    .inputs
                    .iter()
                    .map(|c| ColDef::new(&format!("$-.{}", c.name), c.vtype))
                    .collect();
                (columns, outputs)
            }
            Some(y) => {
                let mut columns = Vec::new();
                let mut outputs = ColsDef::new();
                for c in &y.columns {
                    let expr = rewrite_match(&c.expr)?;
                    let scopes = Scopes {
                        allow_aggregate: true,
                        ..Scopes::default()
                    };
                    let t = deduce_in(vctx, &expr, empty_aliases(), scopes)?;
                    let col = YieldColumn {
                        expr,
                        alias: c.alias.clone(),
                    };
                    outputs.push(ColDef {
                        name: c.alias.clone().unwrap_or_else(|| c.expr.to_string()),
                        vtype: t,
                    });
                    columns.push(col);
                }
                (columns, outputs)
            }
        };
        Ok((filter, columns, outputs))
    };
    let inner = validate_inner(vctx);
    vctx.inputs = saved_inputs;
    let (filter, columns, outputs) = inner?;

    // order factors must name output columns
    let mut sort_factors = Vec::new();
    for factor in &m.ret.order {
        let name = factor.expr.to_string();
        let name = name.trim_start_matches("$-.").to_string();
        if !outputs.iter().any(|c| c.name == name) {
            return Err(Error::semantic(format!(
                "Column `{name}' not found in return items"
            )));
        }
        sort_factors.push((name, factor.direction));
    }

    // ---- plan ----
    let start = vctx.add_node(PlanNodeKind::Start, vec![], vec![]);
    let mut pattern_roots = Vec::new();
    for (path, (start_label, index_name)) in m.paths.iter().zip(scan_starts) {
        let mut cur = vctx.add_node(
            PlanNodeKind::IndexScan {
                space: space.name.clone(),
                schema: start_label,
                is_edge: false,
                index: index_name,
                filter: path.head.props.clone(),
            },
            vec![],
            vec![start],
        );
        for (edge, _node) in &path.steps {
            let (min_steps, max_steps) = match &edge.range {
                Some(range) => (range.min, range.max),
                None => (1, Some(1)),
            };
            cur = vctx.add_node(
                PlanNodeKind::Traverse {
                    edge_types: edge.types.clone(),
                    direction: edge.direction,
                    min_steps,
                    max_steps,
                    filter: edge.props.clone(),
                },
                vec![],
                vec![cur],
            );
        }
        pattern_roots.push(cur);
    }
    // comma-separated patterns combine by join, so every traversal chain
    // feeds the rest of the pipeline
    let mut cur = pattern_roots[0];
    for other in pattern_roots.into_iter().skip(1) {
        cur = vctx.add_node(
            PlanNodeKind::InnerJoin {
                hash_keys: vec![],
                probe_keys: vec![],
            },
            vec![],
            vec![cur, other],
        );
    }
    cur = vctx.add_node(PlanNodeKind::AppendVertices { filter: None }, vec![], vec![cur]);
    if let Some(filter) = filter {
        cur = vctx.add_node(PlanNodeKind::Filter { condition: filter }, vec![], vec![cur]);
    }
    let col_names: Vec<String> = outputs.iter().map(|c| c.name.clone()).collect();
    cur = vctx.add_node(
        PlanNodeKind::Project { columns },
        col_names.clone(),
        vec![cur],
    );
    if m.ret.distinct {
        cur = vctx.add_node(PlanNodeKind::Dedup, col_names.clone(), vec![cur]);
    }
    if !sort_factors.is_empty() {
        cur = vctx.add_node(
            PlanNodeKind::Sort {
                factors: sort_factors,
            },
            col_names.clone(),
            vec![cur],
        );
    }
    if m.ret.skip.is_some() || m.ret.limit.is_some() {
        cur = vctx.add_node(
            PlanNodeKind::Limit {
                offset: m.ret.skip.unwrap_or(0),
                count: m.ret.limit.unwrap_or(i64::MAX),
            },
            col_names,
            vec![cur],
        );
    }

    Ok(Outcome {
        sub: SubPlan {
            root: cur,
            tail: start,
        },
        outputs,
    })
}

/// In MATCH, bare aliases and `alias.prop` resolve to the pattern's
/// columns.
fn rewrite_match_refs(expr: &Expr, aliases: &HashMap<String, String>) -> Result<Expr> {
    use ExprKind::*;
    let kind = match &expr.kind {
        Label(name) => {
            if aliases.contains_key(name) {
                InputProperty(name.clone())
            } else {
                return Err(Error::semantic(format!("Alias used but not defined: `{name}'")));
            }
        }
        LabelAttribute { label, attr } => {
            if aliases.contains_key(label) {
                Attribute {
                    collection: Box::new(Expr::new(InputProperty(label.clone()))),
                    attr: attr.clone(),
                }
            } else {
                return Err(Error::semantic(format!(
                    "Alias used but not defined: `{label}'"
                )));
            }
        }
        _ => {
            let mut clone = expr.clone();
            rewrite_match_children(&mut clone, aliases)?;
            return Ok(clone);
        }
    };
    Ok(Expr {
        kind,
        span: expr.span,
    })
}

fn rewrite_match_children(expr: &mut Expr, aliases: &HashMap<String, String>) -> Result<()> {
    use ExprKind::*;
    match &mut expr.kind {
        Unary { operand, .. } | TypeCasting { operand, .. } => {
            **operand = rewrite_match_refs(operand, aliases)?;
        }
        Arithmetic { left, right, .. }
        | Relational { left, right, .. }
        | Logical { left, right, .. } => {
            **left = rewrite_match_refs(left, aliases)?;
            **right = rewrite_match_refs(right, aliases)?;
        }
        FunctionCall { args, .. } => {
            for arg in args {
                *arg = rewrite_match_refs(arg, aliases)?;
            }
        }
        Aggregate { arg, .. } => {
            if let Some(arg) = arg {
                **arg = rewrite_match_refs(arg, aliases)?;
            }
        }
        Subscript { collection, index } => {
            **collection = rewrite_match_refs(collection, aliases)?;
            **index = rewrite_match_refs(index, aliases)?;
        }
        Attribute { collection, .. } => {
            **collection = rewrite_match_refs(collection, aliases)?;
        }
        ListCtor(items) | SetCtor(items) => {
            for item in items {
                *item = rewrite_match_refs(item, aliases)?;
            }
        }
        _ => {}
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ngqlc_ast::error::ErrorCode;
    use ngqlc_ast::expr::RelationalOp;
    use ngqlc_ast::stmt::clauses::{GroupClause, OrderDirection, OrderFactor, StepClause};
    use ngqlc_ast::stmt::maintain::{ColumnTypeDef, PropertyType};
    use ngqlc_ast::stmt::Sentence;

    use super::*;
    use crate::catalog::{ColumnDef, IndexDesc, MemCatalog, SchemaDesc, SpaceDesc};
    use crate::context::QueryContext;
    use crate::semantic::validate;
    use crate::session::Session;

    fn catalog() -> MemCatalog {
        let mut cat = MemCatalog::new();
        let mut space = SpaceDesc::new(1, "nba");
        space.vid_type = ColumnTypeDef::simple(PropertyType::Int64);
        cat.add_space(space);
        cat.add_tag(
            "nba",
            "person",
            SchemaDesc::with_columns(vec![
                ColumnDef::new("name", PropertyType::String),
                ColumnDef::new("age", PropertyType::Int64),
            ]),
        );
        cat.add_edge(
            "nba",
            "follow",
            SchemaDesc::with_columns(vec![ColumnDef::new("degree", PropertyType::Int64)]),
        );
        cat.add_tag_index(
            "nba",
            IndexDesc {
                name: "person_index".to_string(),
                schema_name: "person".to_string(),
                is_edge: false,
                fields: vec!["name".to_string()],
            },
        );
        cat.add_god("root");
        cat
    }

    fn qctx() -> QueryContext {
        let space = SpaceInfo {
            id: 1,
            name: "nba".to_string(),
            vid_type: ValueType::Int,
        };
        QueryContext::new(Arc::new(catalog()), Session::with_space("root", space))
    }

    fn go_yield(alias: &str) -> Sentence {
        Sentence::new(GoSentence {
            step: StepClause::single(1),
            from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            over: OverClause::over(&["follow"]),
            where_clause: None,
            yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
                Expr::new(ExprKind::EdgeDst("follow".to_string())),
                alias,
            )])),
            truncate: None,
        })
    }

    fn pipe(left: Sentence, right: Sentence) -> Sentence {
        Sentence::new(PipedSentence {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn input(col: &str) -> Expr {
        Expr::new(ExprKind::InputProperty(col.to_string()))
    }

    #[test]
    fn order_by_sorts_input_columns() {
        let mut qctx = qctx();
        let ob = Sentence::new(OrderBySentence {
            factors: vec![OrderFactor {
                expr: input("d"),
                direction: OrderDirection::Descend,
            }],
        });
        let plan = validate(&pipe(go_yield("d"), ob), &mut qctx).unwrap();
        let factors = plan
            .nodes
            .iter()
            .find_map(|n| match &n.kind {
                PlanNodeKind::Sort { factors } => Some(factors),
                _ => None,
            })
            .unwrap();
        assert_eq!(factors, &vec![("d".to_string(), OrderDirection::Descend)]);
        // sorting preserves the input schema
        assert_eq!(plan.root_node().unwrap().col_names, vec!["d"]);
    }

    #[test]
    fn order_by_rejects_unknown_and_computed_factors() {
        let mut qctx = qctx();
        let unknown = Sentence::new(OrderBySentence {
            factors: vec![OrderFactor {
                expr: input("ghost"),
                direction: OrderDirection::Ascend,
            }],
        });
        let err = validate(&pipe(go_yield("d"), unknown), &mut qctx).unwrap_err();
        assert_eq!(err.message, "column 'ghost' not exist in input.");

        let computed = Sentence::new(OrderBySentence {
            factors: vec![OrderFactor {
                expr: Expr::constant(1i64),
                direction: OrderDirection::Ascend,
            }],
        });
        let err = validate(&pipe(go_yield("d"), computed), &mut qctx).unwrap_err();
        assert!(err.message.contains("is not supported in order by"));
    }

    #[test]
    fn limit_carries_offset_and_count() {
        let mut qctx = qctx();
        let limit = Sentence::new(LimitSentence {
            offset: 2,
            count: 5,
        });
        let plan = validate(&pipe(go_yield("d"), limit), &mut qctx).unwrap();
        assert!(plan.nodes.iter().any(|n| matches!(
            n.kind,
            PlanNodeKind::Limit {
                offset: 2,
                count: 5
            }
        )));

        let negative = Sentence::new(LimitSentence {
            offset: -1,
            count: 5,
        });
        let err = validate(&negative, &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_SYNTAX_ERROR);
    }

    #[test]
    fn group_by_aggregates_over_keys() {
        let mut qctx = qctx();
        let group = Sentence::new(GroupBySentence {
            group_clause: GroupClause {
                keys: vec![YieldColumn::new(input("d"))],
            },
            yield_clause: YieldClause::new(vec![
                YieldColumn::aliased(input("d"), "d"),
                YieldColumn::aliased(
                    Expr::new(ExprKind::Aggregate {
                        func: "count".to_string(),
                        arg: None,
                        distinct: false,
                    }),
                    "total",
                ),
            ]),
        });
        let plan = validate(&pipe(go_yield("d"), group), &mut qctx).unwrap();
        let (keys, items) = plan
            .nodes
            .iter()
            .find_map(|n| match &n.kind {
                PlanNodeKind::Aggregate {
                    group_keys,
                    group_items,
                } => Some((group_keys, group_items)),
                _ => None,
            })
            .unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(items.len(), 2);
        assert_eq!(plan.root_node().unwrap().col_names, vec!["d", "total"]);
    }

    #[test]
    fn group_by_rejects_non_dependent_yield() {
        let mut qctx = qctx();
        let group = Sentence::new(GroupBySentence {
            group_clause: GroupClause {
                keys: vec![YieldColumn::new(input("d"))],
            },
            yield_clause: YieldClause::new(vec![YieldColumn::new(Expr::new(
                ExprKind::Arithmetic {
                    op: ngqlc_ast::expr::ArithmeticOp::Add,
                    left: Box::new(input("d")),
                    right: Box::new(Expr::constant(1i64)),
                },
            ))]),
        });
        let err = validate(&pipe(go_yield("d"), group), &mut qctx).unwrap_err();
        assert!(err
            .message
            .contains("must be functionally dependent on items in GROUP BY clause"));
    }

    #[test]
    fn union_dedups_unless_all() {
        let mut qctx = qctx();
        let union = Sentence::new(SetSentence {
            op: SetOperator::Union,
            left: Box::new(go_yield("d")),
            right: Box::new(go_yield("d")),
        });
        let plan = validate(&union, &mut qctx).unwrap();
        assert!(plan
            .nodes
            .iter()
            .any(|n| matches!(n.kind, PlanNodeKind::Union)));
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::Dedup
        ));

        let union_all = Sentence::new(SetSentence {
            op: SetOperator::UnionAll,
            left: Box::new(go_yield("d")),
            right: Box::new(go_yield("d")),
        });
        let plan = validate(&union_all, &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::Union
        ));
    }

    #[test]
    fn set_requires_matching_columns() {
        let mut qctx = qctx();
        let minus = Sentence::new(SetSentence {
            op: SetOperator::Minus,
            left: Box::new(go_yield("a")),
            right: Box::new(go_yield("b")),
        });
        let err = validate(&minus, &mut qctx).unwrap_err();
        assert!(err.message.contains("different column names"));
    }

    #[test]
    fn fetch_vertices_plan_and_errors() {
        let mut qctx = qctx();
        let fetch = Sentence::new(FetchVerticesSentence {
            tags: vec!["person".to_string()],
            vertices: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            yield_clause: None,
        });
        let plan = validate(&fetch, &mut qctx).unwrap();
        assert_eq!(plan.spine(), vec!["Project", "GetVertices", "Start"]);
        assert_eq!(plan.root_node().unwrap().col_names, vec!["vertices_"]);

        let unknown = Sentence::new(FetchVerticesSentence {
            tags: vec!["ghost".to_string()],
            vertices: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            yield_clause: None,
        });
        let err = validate(&unknown, &mut qctx).unwrap_err();
        assert_eq!(err.message, "tag `ghost' not found");
    }

    #[test]
    fn fetch_edges_plan_and_errors() {
        let mut qctx = qctx();
        let fetch = Sentence::new(FetchEdgesSentence {
            edge: "follow".to_string(),
            keys: vec![EdgeKeyRef {
                src: Expr::constant(1i64),
                dst: Expr::constant(2i64),
                rank: 0,
            }],
            ref_expr: None,
            yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
                Expr::new(ExprKind::EdgeProperty {
                    edge: "follow".to_string(),
                    prop: "degree".to_string(),
                }),
                "degree",
            )])),
        });
        let plan = validate(&fetch, &mut qctx).unwrap();
        assert_eq!(plan.spine(), vec!["Project", "GetEdges", "Start"]);
        assert_eq!(plan.root_node().unwrap().col_names, vec!["degree"]);

        let bad_vid = Sentence::new(FetchEdgesSentence {
            edge: "follow".to_string(),
            keys: vec![EdgeKeyRef {
                src: Expr::constant("Tim"),
                dst: Expr::constant(2i64),
                rank: 0,
            }],
            ref_expr: None,
            yield_clause: None,
        });
        let err = validate(&bad_vid, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Vid should be a integer.");

        let unknown = Sentence::new(FetchEdgesSentence {
            edge: "ghost".to_string(),
            keys: vec![],
            ref_expr: None,
            yield_clause: None,
        });
        let err = validate(&unknown, &mut qctx).unwrap_err();
        assert_eq!(err.message, "edge `ghost' not found");
    }

    fn find_path(path_type: FindPathType, with_prop: bool) -> Sentence {
        Sentence::new(FindPathSentence {
            path_type,
            with_prop,
            from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            to: VerticesClause::from_vids(vec![Expr::constant(2i64)]),
            over: OverClause::over(&["follow"]),
            where_clause: None,
            step: StepClause::upto(3),
            yield_clause: None,
        })
    }

    #[test]
    fn find_path_mode_reaches_the_plan() {
        let mut qctx = qctx();
        for path_type in [
            FindPathType::Shortest,
            FindPathType::AllPath,
            FindPathType::NoLoop,
        ] {
            let plan = validate(&find_path(path_type, false), &mut qctx).unwrap();
            let collected = plan
                .nodes
                .iter()
                .find_map(|n| match &n.kind {
                    PlanNodeKind::DataCollect { kind } => Some(*kind),
                    _ => None,
                })
                .unwrap();
            assert_eq!(collected, DataCollectKind::Paths { path_type });
            assert_eq!(
                plan.root_node().unwrap().col_names,
                vec!["path".to_string()]
            );
        }
    }

    #[test]
    fn find_path_with_prop_requests_properties() {
        let mut qctx = qctx();
        let plan = validate(&find_path(FindPathType::Shortest, true), &mut qctx).unwrap();
        let props = plan
            .nodes
            .iter()
            .find_map(|n| match &n.kind {
                PlanNodeKind::GetNeighbors {
                    vertex_props,
                    edge_props,
                    ..
                } => Some((vertex_props.clone(), edge_props.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(props.0, vec!["*".to_string()]);
        assert_eq!(props.1, vec!["*".to_string()]);

        let bare = validate(&find_path(FindPathType::Shortest, false), &mut qctx).unwrap();
        let props = bare
            .nodes
            .iter()
            .find_map(|n| match &n.kind {
                PlanNodeKind::GetNeighbors { vertex_props, .. } => Some(vertex_props.clone()),
                _ => None,
            })
            .unwrap();
        assert!(props.is_empty());
    }

    fn subgraph(with_prop: bool) -> Sentence {
        Sentence::new(GetSubgraphSentence {
            with_prop,
            step: StepClause::single(2),
            from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            in_edges: vec![],
            out_edges: vec!["follow".to_string()],
            both_edges: vec![],
            yield_clause: None,
        })
    }

    #[test]
    fn get_subgraph_with_prop_reaches_the_plan() {
        let mut qctx = qctx();
        let plan = validate(&subgraph(true), &mut qctx).unwrap();
        assert!(plan.nodes.iter().any(|n| matches!(
            n.kind,
            PlanNodeKind::DataCollect {
                kind: DataCollectKind::Subgraph { with_prop: true }
            }
        )));
        assert!(plan.nodes.iter().any(|n| matches!(
            &n.kind,
            PlanNodeKind::GetNeighbors { vertex_props, .. } if vertex_props == &vec!["*".to_string()]
        )));
        assert!(plan
            .nodes
            .iter()
            .any(|n| matches!(n.kind, PlanNodeKind::Loop { .. })));
        assert_eq!(
            plan.root_node().unwrap().col_names,
            vec!["_vertices", "_edges"]
        );

        let bare = validate(&subgraph(false), &mut qctx).unwrap();
        assert!(bare.nodes.iter().any(|n| matches!(
            n.kind,
            PlanNodeKind::DataCollect {
                kind: DataCollectKind::Subgraph { with_prop: false }
            }
        )));
    }

    #[test]
    fn get_subgraph_yield_is_restricted() {
        let mut qctx = qctx();
        let mut bad = subgraph(false);
        if let ngqlc_ast::stmt::SentenceKind::GetSubgraph(gs) = &mut bad.kind {
            gs.yield_clause = Some(YieldClause::new(vec![YieldColumn::new(input("x"))]));
        }
        let err = validate(&bad, &mut qctx).unwrap_err();
        assert_eq!(
            err.message,
            "Only support yield vertices or edges in get subgraph sentence."
        );
    }

    fn match_node(alias: &str, labels: &[&str]) -> MatchNode {
        MatchNode {
            alias: Some(alias.to_string()),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            props: None,
        }
    }

    fn match_edge(alias: &str) -> MatchEdge {
        MatchEdge {
            alias: Some(alias.to_string()),
            types: vec!["follow".to_string()],
            direction: EdgeDirection::Out,
            range: None,
            props: None,
        }
    }

    fn ret_all() -> MatchReturn {
        MatchReturn {
            columns: None,
            order: vec![],
            skip: None,
            limit: None,
            distinct: false,
        }
    }

    fn single_pattern() -> MatchPath {
        MatchPath {
            alias: None,
            head: match_node("v", &["person"]),
            steps: vec![(match_edge("e"), match_node("v2", &[]))],
        }
    }

    #[test]
    fn match_single_pattern_plan_shape() {
        let mut qctx = qctx();
        let m = Sentence::new(MatchSentence {
            paths: vec![single_pattern()],
            where_clause: None,
            ret: ret_all(),
        });
        let plan = validate(&m, &mut qctx).unwrap();
        assert_eq!(
            plan.spine(),
            vec![
                "Project",
                "AppendVertices",
                "Traverse",
                "IndexScan",
                "Start"
            ]
        );
        // RETURN * keeps declaration order
        assert_eq!(
            plan.root_node().unwrap().col_names,
            vec!["$-.v", "$-.e", "$-.v2"]
        );
    }

    #[test]
    fn match_lowers_every_pattern_and_joins_them() {
        let mut qctx = qctx();
        let m = Sentence::new(MatchSentence {
            paths: vec![
                single_pattern(),
                MatchPath {
                    alias: None,
                    head: match_node("w", &["person"]),
                    steps: vec![],
                },
            ],
            where_clause: None,
            ret: ret_all(),
        });
        let plan = validate(&m, &mut qctx).unwrap();
        let scans = plan
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, PlanNodeKind::IndexScan { .. }))
            .count();
        assert_eq!(scans, 2);
        let join = plan
            .nodes
            .iter()
            .find(|n| matches!(n.kind, PlanNodeKind::InnerJoin { .. }))
            .unwrap();
        assert_eq!(join.deps.len(), 2);
        // both patterns' aliases reach the output
        assert_eq!(
            plan.root_node().unwrap().col_names,
            vec!["$-.v", "$-.e", "$-.v2", "$-.w"]
        );
    }

    #[test]
    fn match_every_pattern_needs_a_scannable_head() {
        let mut qctx = qctx();
        let m = Sentence::new(MatchSentence {
            paths: vec![
                single_pattern(),
                MatchPath {
                    alias: None,
                    head: match_node("w", &[]),
                    steps: vec![],
                },
            ],
            where_clause: None,
            ret: ret_all(),
        });
        let err = validate(&m, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Can't solve the start vids from the sentence.");
    }

    #[test]
    fn match_rejects_redefined_aliases() {
        let mut qctx = qctx();
        let m = Sentence::new(MatchSentence {
            paths: vec![MatchPath {
                alias: None,
                head: match_node("v", &["person"]),
                steps: vec![(match_edge("e"), match_node("v", &[]))],
            }],
            where_clause: None,
            ret: ret_all(),
        });
        let err = validate(&m, &mut qctx).unwrap_err();
        assert_eq!(err.message, "`v': Redefined alias");
    }

    #[test]
    fn match_where_and_return_resolve_aliases() {
        let mut qctx = qctx();
        let m = Sentence::new(MatchSentence {
            paths: vec![single_pattern()],
            where_clause: Some(ngqlc_ast::stmt::WhereClause::new(Expr::new(
                ExprKind::Relational {
                    op: RelationalOp::Gt,
                    left: Box::new(Expr::new(ExprKind::LabelAttribute {
                        label: "v".to_string(),
                        attr: "age".to_string(),
                    })),
                    right: Box::new(Expr::constant(30i64)),
                },
            ))),
            ret: MatchReturn {
                columns: Some(YieldClause::new(vec![YieldColumn::aliased(
                    Expr::new(ExprKind::Label("v".to_string())),
                    "vert",
                )])),
                order: vec![],
                skip: None,
                limit: Some(10),
                distinct: false,
            },
        });
        let plan = validate(&m, &mut qctx).unwrap();
        assert!(plan
            .nodes
            .iter()
            .any(|n| matches!(n.kind, PlanNodeKind::Filter { .. })));
        assert!(plan.nodes.iter().any(|n| matches!(
            n.kind,
            PlanNodeKind::Limit {
                offset: 0,
                count: 10
            }
        )));
        assert_eq!(plan.root_node().unwrap().col_names, vec!["vert"]);

        let unknown = Sentence::new(MatchSentence {
            paths: vec![single_pattern()],
            where_clause: Some(ngqlc_ast::stmt::WhereClause::new(Expr::new(
                ExprKind::Label("ghost".to_string()),
            ))),
            ret: ret_all(),
        });
        let err = validate(&unknown, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Alias used but not defined: `ghost'");
    }
}
