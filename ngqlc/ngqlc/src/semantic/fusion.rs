//! Projection fusion, run at the end of validation.
//!
//! A `GetNeighbors` (or `GetVertices`) whose `src` is an input property
//! can absorb the upstream `Project` that produces exactly that single
//! column, when nothing else consumes the projection's output. Only pure
//! column-forwarding projections fuse; projections that compute their
//! column stay, because storage cannot evaluate them.

use ngqlc_ast::expr::ExprKind;

use crate::ir::{NodeId, PlanBuilder, PlanNodeKind};

pub(crate) fn fuse_projections(plan: &mut PlanBuilder) {
    while let Some((getter, project)) = find_candidate(plan) {
        apply(plan, getter, project);
    }
}

fn find_candidate(plan: &PlanBuilder) -> Option<(NodeId, NodeId)> {
    for node in &plan.nodes {
        let src = match &node.kind {
            PlanNodeKind::GetNeighbors { src, .. } => src,
            PlanNodeKind::GetVertices { src, .. } => src,
            _ => continue,
        };
        let ExprKind::InputProperty(src_col) = &src.kind else {
            continue;
        };
        let Some(dep_id) = node.deps.first().copied() else {
            continue;
        };
        let Some(dep) = plan.node(dep_id) else {
            continue;
        };
        let PlanNodeKind::Project { columns } = &dep.kind else {
            continue;
        };
        if columns.len() != 1 || columns[0].name() != *src_col {
            continue;
        }
        if !matches!(
            columns[0].expr.kind,
            ExprKind::InputProperty(_) | ExprKind::VariableProperty { .. }
        ) {
            continue;
        }
        // the projection must not be the plan's receiving end
        if dep.deps.is_empty() && dep.input_vars.is_empty() {
            continue;
        }
        // no other consumer of the projection's output
        let consumers = plan
            .nodes
            .iter()
            .filter(|n| n.deps.contains(&dep_id) || n.input_vars.contains(&dep.output_var))
            .count();
        if consumers != 1 {
            continue;
        }
        return Some((node.id, dep_id));
    }
    None
}

fn apply(plan: &mut PlanBuilder, getter_id: NodeId, project_id: NodeId) {
    let Some(project) = plan.node(project_id) else {
        return;
    };
    let new_src = match &project.kind {
        PlanNodeKind::Project { columns } => columns[0].expr.clone(),
        _ => return,
    };
    let new_deps = project.deps.clone();
    let new_inputs = project.input_vars.clone();

    if let Some(getter) = plan.node_mut(getter_id) {
        match &mut getter.kind {
            PlanNodeKind::GetNeighbors { src, .. } | PlanNodeKind::GetVertices { src, .. } => {
                *src = new_src;
            }
            _ => return,
        }
        getter.deps = new_deps;
        getter.input_vars = new_inputs;
    }
    plan.nodes.retain(|n| n.id != project_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngqlc_ast::expr::Expr;
    use ngqlc_ast::stmt::clauses::{EdgeDirection, YieldColumn};
    use crate::ir::PlanNode;

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

    fn forwarding_project(id: NodeId, col: &str, deps: Vec<NodeId>) -> PlanNode {
        node(
            id,
            PlanNodeKind::Project {
                columns: vec![YieldColumn::aliased(
                    Expr::new(ExprKind::InputProperty(col.to_string())),
                    col,
                )],
            },
            deps,
        )
    }

    fn get_neighbors(id: NodeId, src_col: &str, deps: Vec<NodeId>) -> PlanNode {
        node(
            id,
            PlanNodeKind::GetNeighbors {
                src: Expr::new(ExprKind::InputProperty(src_col.to_string())),
                space: "s".to_string(),
                edge_types: vec!["follow".to_string()],
                direction: EdgeDirection::Out,
                vertex_props: vec![],
                edge_props: vec![],
                dedup: false,
            },
            deps,
        )
    }

    #[test]
    fn fuses_single_column_forwarding_projection() {
        let mut plan = PlanBuilder::default();
        plan.add(node(0, PlanNodeKind::Start, vec![]));
        plan.add(forwarding_project(1, "id", vec![0]));
        plan.add(get_neighbors(2, "id", vec![1]));

        fuse_projections(&mut plan);

        assert_eq!(plan.nodes.len(), 2);
        let gn = plan.node(2).unwrap();
        assert_eq!(gn.deps, vec![0]);
        match &gn.kind {
            PlanNodeKind::GetNeighbors { src, .. } => {
                assert_eq!(src.kind, ExprKind::InputProperty("id".to_string()));
            }
            other => panic!("unexpected kind {}", other.as_ref()),
        }
    }

    #[test]
    fn keeps_projection_with_other_consumers() {
        let mut plan = PlanBuilder::default();
        plan.add(node(0, PlanNodeKind::Start, vec![]));
        plan.add(forwarding_project(1, "id", vec![0]));
        plan.add(get_neighbors(2, "id", vec![1]));
        // a second consumer of the projection
        plan.add(node(3, PlanNodeKind::Dedup, vec![1]));

        fuse_projections(&mut plan);
        assert_eq!(plan.nodes.len(), 4);
    }

    #[test]
    fn keeps_projection_with_computed_column() {
        let mut plan = PlanBuilder::default();
        plan.add(node(0, PlanNodeKind::Start, vec![]));
        plan.add(node(
            1,
            PlanNodeKind::Project {
                columns: vec![YieldColumn::aliased(
                    Expr::new(ExprKind::EdgeDst("follow".to_string())),
                    "id",
                )],
            },
            vec![0],
        ));
        plan.add(get_neighbors(2, "id", vec![1]));

        fuse_projections(&mut plan);
        assert_eq!(plan.nodes.len(), 3);
    }

    #[test]
    fn column_name_must_match() {
        let mut plan = PlanBuilder::default();
        plan.add(node(0, PlanNodeKind::Start, vec![]));
        plan.add(forwarding_project(1, "other", vec![0]));
        plan.add(get_neighbors(2, "id", vec![1]));

        fuse_projections(&mut plan);
        assert_eq!(plan.nodes.len(), 3);
    }
}
