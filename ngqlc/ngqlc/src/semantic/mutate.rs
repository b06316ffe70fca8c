//! Validators for the data-mutation sentences.

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::expr::Expr;
use ngqlc_ast::stmt::SentenceKind;
use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::Value;

use super::deduce_type::{Scopes, TypeDeducer};
use super::{Outcome, Vctx};
use crate::catalog::SchemaDesc;
use crate::eval::{Evaluator, NullContext};
use crate::ir::PlanNodeKind;
use crate::session::SpaceInfo;

pub(crate) fn validate_mutate(kind: &SentenceKind, vctx: &mut Vctx) -> Result<Outcome> {
    use SentenceKind::*;
    match kind {
        InsertVertices(iv) => validate_insert_vertices(iv, vctx),
        InsertEdges(ie) => validate_insert_edges(ie, vctx),
        UpdateVertex(uv) => validate_update_vertex(uv, vctx),
        UpdateEdge(ue) => validate_update_edge(ue, vctx),
        DeleteVertices(dv) => {
            let space = vctx.space()?;
            check_vids(vctx, &space, dv.vertices.vids.iter())?;
            Ok(vctx.single_node(
                PlanNodeKind::DeleteVertices {
                    space: space.name,
                    with_edge: dv.with_edge,
                },
                &[],
            ))
        }
        DeleteTags(dt) => {
            let space = vctx.space()?;
            for tag in &dt.tags {
                vctx.qctx.catalog.tag_schema(&space.name, tag)?;
            }
            check_vids(vctx, &space, dt.vertices.vids.iter())?;
            Ok(vctx.single_node(
                PlanNodeKind::DeleteTags {
                    space: space.name,
                    tags: dt.tags.clone(),
                },
                &[],
            ))
        }
        DeleteEdges(de) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.edge_schema(&space.name, &de.edge)?;
            for key in &de.keys {
                check_vids(vctx, &space, [&key.src, &key.dst].into_iter())?;
            }
            Ok(vctx.single_node(
                PlanNodeKind::DeleteEdges {
                    space: space.name,
                    edge: de.edge.clone(),
                },
                &[],
            ))
        }
        Download(d) => {
            if !d.url.starts_with("hdfs://") {
                return Err(Error::semantic("Download source should be a HDFS url."));
            }
            Ok(vctx.single_node(PlanNodeKind::Download { url: d.url.clone() }, &[]))
        }
        Ingest => Ok(vctx.single_node(PlanNodeKind::Ingest, &[])),
        other => Err(Error::internal(format!(
            "not a mutate sentence: {}",
            other.name()
        ))),
    }
}

fn eval_constant(vctx: &Vctx, expr: &Expr) -> Value {
    Evaluator::new(&vctx.qctx.registry, &NullContext).eval(expr)
}

fn check_vids<'a>(
    vctx: &Vctx,
    space: &SpaceInfo,
    vids: impl Iterator<Item = &'a Expr>,
) -> Result<()> {
    for vid in vids {
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
    Ok(())
}

/// A constant value must be storable into the column's declared type.
fn check_value_type(schema: &SchemaDesc, field: &str, value: &Value) -> Result<()> {
    let col = schema
        .column(field)
        .ok_or_else(|| Error::semantic(format!("Unknown column `{field}' in schema")))?;
    if value.is_null() {
        if col.nullable {
            return Ok(());
        }
        return Err(Error::semantic(format!(
            "Column `{field}' is not nullable."
        )));
    }
    let expected = col.value_type();
    let actual = value.value_type();
    let compatible = actual == expected
        || (expected == ValueType::Float && actual == ValueType::Int)
        // timestamps accept their string form
        || (col.type_def.ptype == ngqlc_ast::stmt::maintain::PropertyType::Timestamp
            && actual == ValueType::String);
    if !compatible {
        return Err(Error::semantic(format!(
            "Column type of `{field}' mismatched: expected {expected}, got {actual}"
        )));
    }
    Ok(())
}

fn validate_insert_vertices(
    iv: &ngqlc_ast::stmt::mutate::InsertVerticesSentence,
    vctx: &mut Vctx,
) -> Result<Outcome> {
    let space = vctx.space()?;
    if iv.tag_items.is_empty() {
        return Err(Error::semantic("Insert needs at least one tag."));
    }

    let mut schemas = Vec::new();
    let mut total_props = 0usize;
    for item in &iv.tag_items {
        let schema = vctx.qctx.catalog.tag_schema(&space.name, &item.tag)?;
        for prop in &item.props {
            if schema.column(prop).is_none() {
                return Err(Error::semantic(format!(
                    "Unknown column `{prop}' in tag `{}'",
                    item.tag
                )));
            }
        }
        total_props += item.props.len();
        schemas.push(schema);
    }

    for row in &iv.rows {
        check_vids(vctx, &space, std::iter::once(&row.vid))?;
        if row.values.len() != total_props {
            return Err(Error::semantic(format!(
                "Column count doesn't match value count: {} vs. {}",
                total_props,
                row.values.len()
            )));
        }
        let mut value_idx = 0usize;
        for (item, schema) in iv.tag_items.iter().zip(&schemas) {
            for prop in &item.props {
                let value = eval_constant(vctx, &row.values[value_idx]);
                if value.is_error_null() {
                    return Err(Error::semantic(format!(
                        "Insert wrong value: `{}'",
                        row.values[value_idx]
                    )));
                }
                check_value_type(schema, prop, &value)?;
                value_idx += 1;
            }
        }
    }

    Ok(vctx.single_node(
        PlanNodeKind::InsertVertices {
            space: space.name,
            if_not_exists: iv.if_not_exists,
        },
        &[],
    ))
}

fn validate_insert_edges(
    ie: &ngqlc_ast::stmt::mutate::InsertEdgesSentence,
    vctx: &mut Vctx,
) -> Result<Outcome> {
    let space = vctx.space()?;
    let schema = vctx.qctx.catalog.edge_schema(&space.name, &ie.edge)?;
    for prop in &ie.props {
        if schema.column(prop).is_none() {
            return Err(Error::semantic(format!(
                "Unknown column `{prop}' in edge `{}'",
                ie.edge
            )));
        }
    }
    for row in &ie.rows {
        check_vids(vctx, &space, [&row.src, &row.dst].into_iter())?;
        if row.values.len() != ie.props.len() {
            return Err(Error::semantic(format!(
                "Column count doesn't match value count: {} vs. {}",
                ie.props.len(),
                row.values.len()
            )));
        }
        for (prop, value_expr) in ie.props.iter().zip(&row.values) {
            let value = eval_constant(vctx, value_expr);
            if value.is_error_null() {
                return Err(Error::semantic(format!(
                    "Insert wrong value: `{value_expr}'"
                )));
            }
            check_value_type(&schema, prop, &value)?;
        }
    }
    Ok(vctx.single_node(
        PlanNodeKind::InsertEdges {
            space: space.name,
            edge: ie.edge.clone(),
            if_not_exists: ie.if_not_exists,
        },
        &[],
    ))
}

fn validate_update_vertex(
    uv: &ngqlc_ast::stmt::mutate::UpdateVertexSentence,
    vctx: &mut Vctx,
) -> Result<Outcome> {
    let space = vctx.space()?;
    let tag = uv
        .tag
        .clone()
        .ok_or_else(|| Error::semantic("UPDATE VERTEX requires `ON <tag>'."))?;
    let schema = vctx.qctx.catalog.tag_schema(&space.name, &tag)?;
    check_vids(vctx, &space, std::iter::once(&uv.vid))?;

    for item in &uv.items {
        if schema.column(&item.field).is_none() {
            return Err(Error::semantic(format!(
                "Unknown column `{}' in tag `{tag}'",
                item.field
            )));
        }
    }

    let scopes = Scopes {
        graph: true,
        graph_error: None,
        allow_aggregate: false,
        restrict_to_schema: Some(tag.clone()),
    };
    let aliases = std::collections::HashMap::new();
    if let Some(when) = &uv.when_clause {
        let deduced =
            TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, scopes.clone()).deduce(&when.filter)?;
        if !matches!(
            deduced,
            ValueType::Bool | ValueType::Any | ValueType::Null | ValueType::Empty
        ) {
            return Err(Error::semantic(format!(
                "`{}', expected Boolean, but was `{deduced}'",
                when.filter
            )));
        }
    }
    let outputs = match &uv.yield_clause {
        Some(y) => {
            let mut outputs = Vec::new();
            for col in &y.columns {
                let t = TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, scopes.clone())
                    .deduce(&col.expr)?;
                outputs.push(crate::context::ColDef {
                    name: col.name(),
                    vtype: t,
                });
            }
            outputs
        }
        None => Vec::new(),
    };

    let id = vctx.add_node(
        PlanNodeKind::UpdateVertex {
            space: space.name,
            tag: Some(tag),
            insertable: uv.insertable,
        },
        outputs.iter().map(|c| c.name.clone()).collect(),
        vec![],
    );
    Ok(Outcome {
        sub: crate::ir::SubPlan { root: id, tail: id },
        outputs,
    })
}

fn validate_update_edge(
    ue: &ngqlc_ast::stmt::mutate::UpdateEdgeSentence,
    vctx: &mut Vctx,
) -> Result<Outcome> {
    let space = vctx.space()?;
    let schema = vctx.qctx.catalog.edge_schema(&space.name, &ue.edge)?;
    check_vids(vctx, &space, [&ue.src, &ue.dst].into_iter())?;

    for item in &ue.items {
        if schema.column(&item.field).is_none() {
            return Err(Error::semantic(format!(
                "Unknown column `{}' in edge `{}'",
                item.field, ue.edge
            )));
        }
    }

    let mut aliases = std::collections::HashMap::new();
    aliases.insert(ue.edge.clone(), ue.edge.clone());
    let scopes = Scopes {
        graph: true,
        graph_error: None,
        allow_aggregate: false,
        restrict_to_schema: Some(ue.edge.clone()),
    };
    if let Some(when) = &ue.when_clause {
        let deduced =
            TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, scopes.clone()).deduce(&when.filter)?;
        if !matches!(
            deduced,
            ValueType::Bool | ValueType::Any | ValueType::Null | ValueType::Empty
        ) {
            return Err(Error::semantic(format!(
                "`{}', expected Boolean, but was `{deduced}'",
                when.filter
            )));
        }
    }
    let outputs = match &ue.yield_clause {
        Some(y) => {
            let mut outputs = Vec::new();
            for col in &y.columns {
                let t = TypeDeducer::new(vctx.qctx, &vctx.inputs, &aliases, scopes.clone())
                    .deduce(&col.expr)?;
                outputs.push(crate::context::ColDef {
                    name: col.name(),
                    vtype: t,
                });
            }
            outputs
        }
        None => Vec::new(),
    };

    let id = vctx.add_node(
        PlanNodeKind::UpdateEdge {
            space: space.name,
            edge: ue.edge.clone(),
            insertable: ue.insertable,
        },
        outputs.iter().map(|c| c.name.clone()).collect(),
        vec![],
    );
    Ok(Outcome {
        sub: crate::ir::SubPlan { root: id, tail: id },
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ngqlc_ast::expr::{ExprKind, RelationalOp};
    use ngqlc_ast::stmt::clauses::{VerticesClause, WhenClause, YieldClause, YieldColumn};
    use ngqlc_ast::stmt::maintain::{ColumnTypeDef, PropertyType};
    use ngqlc_ast::stmt::mutate::*;
    use ngqlc_ast::stmt::query::EdgeKeyRef;
    use ngqlc_ast::stmt::Sentence;

    use super::*;
    use crate::catalog::{ColumnDef, MemCatalog, SchemaDesc as Schema, SpaceDesc};
    use crate::context::QueryContext;
    use crate::semantic::validate;
    use crate::session::Session;

    fn qctx() -> QueryContext {
        let mut cat = MemCatalog::new();
        let mut space = SpaceDesc::new(1, "nba");
        space.vid_type = ColumnTypeDef::simple(PropertyType::Int64);
        cat.add_space(space);
        cat.add_tag(
            "nba",
            "person",
            Schema::with_columns(vec![
                ColumnDef::new("name", PropertyType::String),
                ColumnDef::new("age", PropertyType::Int64),
            ]),
        );
        cat.add_edge(
            "nba",
            "follow",
            Schema::with_columns(vec![ColumnDef::new("degree", PropertyType::Int64)]),
        );
        cat.add_god("root");
        let space = SpaceInfo {
            id: 1,
            name: "nba".to_string(),
            vid_type: ValueType::Int,
        };
        QueryContext::new(Arc::new(cat), Session::with_space("root", space))
    }

    fn insert_person(vid: Expr, values: Vec<Expr>) -> Sentence {
        Sentence::new(InsertVerticesSentence {
            tag_items: vec![VertexTagItem {
                tag: "person".to_string(),
                props: vec!["name".to_string(), "age".to_string()],
            }],
            rows: vec![VertexRowItem { vid, values }],
            if_not_exists: false,
            ignore_existed_index: false,
        })
    }

    #[test]
    fn insert_vertices_checks_values_against_schema() {
        let mut qctx = qctx();
        let good = insert_person(
            Expr::constant(1i64),
            vec![Expr::constant("Tim"), Expr::constant(30i64)],
        );
        let plan = validate(&good, &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::InsertVertices { .. }
        ));

        let wrong_type = insert_person(
            Expr::constant(1i64),
            vec![Expr::constant(30i64), Expr::constant("Tim")],
        );
        let err = validate(&wrong_type, &mut qctx).unwrap_err();
        assert_eq!(
            err.message,
            "Column type of `name' mismatched: expected STRING, got INT"
        );

        let short_row = insert_person(Expr::constant(1i64), vec![Expr::constant("Tim")]);
        let err = validate(&short_row, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Column count doesn't match value count: 2 vs. 1");

        let bad_vid = insert_person(
            Expr::constant("Tim"),
            vec![Expr::constant("Tim"), Expr::constant(30i64)],
        );
        let err = validate(&bad_vid, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Vid should be a integer.");
    }

    #[test]
    fn insert_vertices_rejects_unknown_props() {
        let mut qctx = qctx();
        let unknown = Sentence::new(InsertVerticesSentence {
            tag_items: vec![VertexTagItem {
                tag: "person".to_string(),
                props: vec!["ghost".to_string()],
            }],
            rows: vec![VertexRowItem {
                vid: Expr::constant(1i64),
                values: vec![Expr::constant(1i64)],
            }],
            if_not_exists: false,
            ignore_existed_index: false,
        });
        let err = validate(&unknown, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Unknown column `ghost' in tag `person'");
    }

    #[test]
    fn insert_edges_checks_values_against_schema() {
        let mut qctx = qctx();
        let edge_row = |values: Vec<Expr>| {
            Sentence::new(InsertEdgesSentence {
                edge: "follow".to_string(),
                props: vec!["degree".to_string()],
                rows: vec![EdgeRowItem {
                    src: Expr::constant(1i64),
                    dst: Expr::constant(2i64),
                    rank: 0,
                    values,
                }],
                if_not_exists: false,
                ignore_existed_index: false,
            })
        };
        let plan = validate(&edge_row(vec![Expr::constant(5i64)]), &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::InsertEdges { .. }
        ));

        let err = validate(&edge_row(vec![Expr::constant("x")]), &mut qctx).unwrap_err();
        assert_eq!(
            err.message,
            "Column type of `degree' mismatched: expected INT, got STRING"
        );

        let err = validate(&edge_row(vec![]), &mut qctx).unwrap_err();
        assert_eq!(err.message, "Column count doesn't match value count: 1 vs. 0");
    }

    fn update_person(items: Vec<UpdateItem>, tag: Option<&str>) -> Sentence {
        Sentence::new(UpdateVertexSentence {
            insertable: false,
            vid: Expr::constant(1i64),
            tag: tag.map(|t| t.to_string()),
            items,
            when_clause: None,
            yield_clause: None,
        })
    }

    #[test]
    fn update_vertex_requires_tag_and_known_fields() {
        let mut qctx = qctx();
        let set_name = UpdateItem {
            field: "name".to_string(),
            value: Expr::constant("Bob"),
        };
        let err = validate(&update_person(vec![set_name.clone()], None), &mut qctx).unwrap_err();
        assert_eq!(err.message, "UPDATE VERTEX requires `ON <tag>'.");

        let unknown = UpdateItem {
            field: "ghost".to_string(),
            value: Expr::constant(1i64),
        };
        let err = validate(&update_person(vec![unknown], Some("person")), &mut qctx).unwrap_err();
        assert_eq!(err.message, "Unknown column `ghost' in tag `person'");

        let plan = validate(&update_person(vec![set_name], Some("person")), &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::UpdateVertex {
                insertable: false,
                ..
            }
        ));
    }

    #[test]
    fn update_vertex_when_and_yield_stay_on_the_tag() {
        let mut qctx = qctx();
        let tag_prop = |prop: &str| {
            Expr::new(ExprKind::TagProperty {
                tag: "person".to_string(),
                prop: prop.to_string(),
            })
        };
        let good = Sentence::new(UpdateVertexSentence {
            insertable: true,
            vid: Expr::constant(1i64),
            tag: Some("person".to_string()),
            items: vec![UpdateItem {
                field: "age".to_string(),
                value: Expr::constant(31i64),
            }],
            when_clause: Some(WhenClause {
                filter: Expr::new(ExprKind::Relational {
                    op: RelationalOp::Gt,
                    left: Box::new(tag_prop("age")),
                    right: Box::new(Expr::constant(0i64)),
                }),
            }),
            yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
                tag_prop("name"),
                "name",
            )])),
        });
        let plan = validate(&good, &mut qctx).unwrap();
        assert_eq!(plan.root_node().unwrap().col_names, vec!["name"]);

        let foreign = Sentence::new(UpdateVertexSentence {
            insertable: false,
            vid: Expr::constant(1i64),
            tag: Some("person".to_string()),
            items: vec![],
            when_clause: Some(WhenClause {
                filter: Expr::new(ExprKind::TagProperty {
                    tag: "other".to_string(),
                    prop: "x".to_string(),
                }),
            }),
            yield_clause: None,
        });
        let err = validate(&foreign, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Schema name error: other");
    }

    #[test]
    fn update_edge_checks_schema() {
        let mut qctx = qctx();
        let update = |field: &str| {
            Sentence::new(UpdateEdgeSentence {
                insertable: false,
                src: Expr::constant(1i64),
                dst: Expr::constant(2i64),
                rank: 0,
                edge: "follow".to_string(),
                items: vec![UpdateItem {
                    field: field.to_string(),
                    value: Expr::constant(9i64),
                }],
                when_clause: None,
                yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
                    Expr::new(ExprKind::EdgeProperty {
                        edge: "follow".to_string(),
                        prop: "degree".to_string(),
                    }),
                    "degree",
                )])),
            })
        };
        let plan = validate(&update("degree"), &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::UpdateEdge { .. }
        ));
        assert_eq!(plan.root_node().unwrap().col_names, vec!["degree"]);

        let err = validate(&update("ghost"), &mut qctx).unwrap_err();
        assert_eq!(err.message, "Unknown column `ghost' in edge `follow'");
    }

    #[test]
    fn delete_sentences_validate_their_targets() {
        let mut qctx = qctx();
        let delete = Sentence::new(SentenceKind::DeleteVertices(DeleteVerticesSentence {
            vertices: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            with_edge: true,
        }));
        let plan = validate(&delete, &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::DeleteVertices {
                with_edge: true,
                ..
            }
        ));

        let tags = Sentence::new(SentenceKind::DeleteTags(DeleteTagsSentence {
            tags: vec!["person".to_string()],
            vertices: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        }));
        assert!(validate(&tags, &mut qctx).is_ok());
        let unknown_tag = Sentence::new(SentenceKind::DeleteTags(DeleteTagsSentence {
            tags: vec!["ghost".to_string()],
            vertices: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        }));
        let err = validate(&unknown_tag, &mut qctx).unwrap_err();
        assert_eq!(err.message, "tag `ghost' not found");

        let edges = Sentence::new(SentenceKind::DeleteEdges(DeleteEdgesSentence {
            edge: "follow".to_string(),
            keys: vec![EdgeKeyRef {
                src: Expr::constant(1i64),
                dst: Expr::constant(2i64),
                rank: 0,
            }],
            ref_expr: None,
        }));
        assert!(validate(&edges, &mut qctx).is_ok());
        let bad_vid = Sentence::new(SentenceKind::DeleteEdges(DeleteEdgesSentence {
            edge: "follow".to_string(),
            keys: vec![EdgeKeyRef {
                src: Expr::constant("Tim"),
                dst: Expr::constant(2i64),
                rank: 0,
            }],
            ref_expr: None,
        }));
        let err = validate(&bad_vid, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Vid should be a integer.");
    }

    #[test]
    fn download_and_ingest() {
        let mut qctx = qctx();
        let good = Sentence::new(SentenceKind::Download(DownloadSentence {
            url: "hdfs://namenode:9000/data".to_string(),
        }));
        assert!(validate(&good, &mut qctx).is_ok());

        let bad = Sentence::new(SentenceKind::Download(DownloadSentence {
            url: "file:///tmp/data".to_string(),
        }));
        let err = validate(&bad, &mut qctx).unwrap_err();
        assert_eq!(err.message, "Download source should be a HDFS url.");

        let ingest = Sentence::new(SentenceKind::Ingest);
        let plan = validate(&ingest, &mut qctx).unwrap();
        assert!(matches!(plan.root_node().unwrap().kind, PlanNodeKind::Ingest));
    }
}
