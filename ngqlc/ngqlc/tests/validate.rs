//! End-to-end validation: AST in, logical plan or typed error out.

use std::sync::Arc;

use ngqlc::catalog::{ColumnDef, IndexDesc, MemCatalog, SchemaDesc, SpaceDesc};
use ngqlc::context::QueryContext;
use ngqlc::eval::{Evaluator, NullContext};
use ngqlc::functions::FunctionRegistry;
use ngqlc::ir::PlanNodeKind;
use ngqlc::session::{Session, SpaceInfo};
use ngqlc::{validate, ErrorCode, ValueType};
use ngqlc_ast::expr::{Expr, ExprKind, RelationalOp};
use ngqlc_ast::stmt::maintain::{
    ColumnTypeDef, CreateSpaceSentence, CreateTagSentence, PropertyType, SchemaProps, SpaceOptItem,
};
use ngqlc_ast::stmt::mutate::{InsertVerticesSentence, VertexRowItem, VertexTagItem};
use ngqlc_ast::stmt::query::*;
use ngqlc_ast::stmt::user::RoleType;
use ngqlc_ast::stmt::{
    DropSchemaSentence, ExplainSentence, OverClause, Sentence, SentenceKind, SequentialSentences,
    StepClause, VerticesClause, WhereClause, YieldClause, YieldColumn,
};
use ngqlc_ast::value::Value;

fn nba_catalog() -> MemCatalog {
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
    cat.add_tag("nba", "t", SchemaDesc::with_columns(vec![]));
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
    cat.grant_role("nba", "moon", RoleType::User);
    cat.grant_role("nba", "dba", RoleType::Admin);
    cat
}

fn god_ctx() -> QueryContext {
    let cat = Arc::new(nba_catalog());
    let space = SpaceInfo {
        id: 1,
        name: "nba".to_string(),
        vid_type: ValueType::Int,
    };
    QueryContext::new(cat, Session::with_space("root", space))
}

fn user_ctx(user: &str) -> QueryContext {
    let cat = Arc::new(nba_catalog());
    let space = SpaceInfo {
        id: 1,
        name: "nba".to_string(),
        vid_type: ValueType::Int,
    };
    QueryContext::new(cat, Session::with_space(user, space))
}

fn dst_prop(tag: &str, prop: &str) -> Expr {
    Expr::new(ExprKind::DestProperty {
        tag: tag.to_string(),
        prop: prop.to_string(),
    })
}

fn go_filtered_traversal() -> Sentence {
    // GO FROM 1 OVER follow WHERE $$.person.age > 30 YIELD $$.person.name AS name
    Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        over: OverClause::over(&["follow"]),
        where_clause: Some(WhereClause::new(Expr::new(ExprKind::Relational {
            op: RelationalOp::Gt,
            left: Box::new(dst_prop("person", "age")),
            right: Box::new(Expr::constant(30i64)),
        }))),
        yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
            dst_prop("person", "name"),
            "name",
        )])),
        truncate: None,
    })
}

fn yield_input(col: &str, alias: &str) -> Sentence {
    Sentence::new(YieldSentence {
        yield_clause: YieldClause::new(vec![YieldColumn::aliased(
            Expr::new(ExprKind::InputProperty(col.to_string())),
            alias,
        )]),
        where_clause: None,
    })
}

#[test]
fn simple_filtered_traversal_plan_shape() {
    let mut qctx = god_ctx();
    let plan = validate(&go_filtered_traversal(), &mut qctx).unwrap();
    insta::assert_snapshot!(
        plan.spine().join(" -> "),
        @"Project -> Filter -> GetVertices -> Project -> GetNeighbors -> Start"
    );
    // plans serialize for the debug tooling
    let json = serde_json::to_value(&plan).unwrap();
    assert!(json.get("nodes").is_some());
    let root = plan.root_node().unwrap();
    assert_eq!(root.col_names, vec!["name"]);
    // the second fetch stage requests the used person props
    let gv = plan
        .nodes
        .iter()
        .find_map(|n| match &n.kind {
            PlanNodeKind::GetVertices { tags, props, .. } => Some((tags, props)),
            _ => None,
        })
        .unwrap();
    assert_eq!(gv.0, &vec!["person".to_string()]);
    assert!(gv.1.contains(&"person.age".to_string()));
    assert!(gv.1.contains(&"person.name".to_string()));
}

#[test]
fn traversal_without_dst_props_skips_vertex_fetch() {
    let mut qctx = god_ctx();
    let go = Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        over: OverClause::over(&["follow"]),
        where_clause: None,
        yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
            Expr::new(ExprKind::EdgeDst("follow".to_string())),
            "dst",
        )])),
        truncate: None,
    });
    let plan = validate(&go, &mut qctx).unwrap();
    assert_eq!(plan.spine(), vec!["Project", "GetNeighbors", "Start"]);
}

#[test]
fn hash_yield_types_and_values() {
    let mut qctx = god_ctx();
    let args = vec![
        Expr::constant("Hello"),
        Expr::constant(3.14159265f64),
        Expr::constant(1234567890i64),
        Expr::constant(true),
        Expr::constant(false),
    ];
    let columns = args
        .iter()
        .map(|a| {
            YieldColumn::new(Expr::new(ExprKind::FunctionCall {
                name: "hash".to_string(),
                args: vec![a.clone()],
            }))
        })
        .collect();
    let y = Sentence::new(YieldSentence {
        yield_clause: YieldClause::new(columns),
        where_clause: None,
    });
    let plan = validate(&y, &mut qctx).unwrap();
    assert_eq!(plan.spine(), vec!["Project", "Start"]);

    // the evaluated row carries the regression constants
    let reg = FunctionRegistry::new();
    let mut evaluator = Evaluator::new(&reg, &NullContext);
    let row: Vec<Value> = args
        .iter()
        .map(|a| {
            evaluator.eval(&Expr::new(ExprKind::FunctionCall {
                name: "hash".to_string(),
                args: vec![a.clone()],
            }))
        })
        .collect();
    assert_eq!(
        row,
        vec![
            Value::Int(2275118702903107253),
            Value::Int(-8359970742410469755),
            Value::Int(1234567890),
            Value::Int(1),
            Value::Int(0),
        ]
    );
}

#[test]
fn pipe_schema_mismatch_is_semantic_error() {
    let mut qctx = god_ctx();
    let left = Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        over: OverClause::over(&["follow"]),
        where_clause: None,
        yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
            Expr::new(ExprKind::EdgeDst("follow".to_string())),
            "a",
        )])),
        truncate: None,
    });
    let pipe = Sentence::new(PipedSentence {
        left: Box::new(left),
        right: Box::new(yield_input("b", "c")),
    });
    let err = validate(&pipe, &mut qctx).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E_SEMANTIC_ERROR);
    assert_eq!(err.message, "column 'b' not exist in input.");
}

#[test]
fn pipe_chaining_propagates_columns() {
    let mut qctx = god_ctx();
    let left = Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        over: OverClause::over(&["follow"]),
        where_clause: None,
        yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
            Expr::new(ExprKind::EdgeDst("follow".to_string())),
            "a",
        )])),
        truncate: None,
    });
    let pipe = Sentence::new(PipedSentence {
        left: Box::new(left),
        right: Box::new(yield_input("a", "c")),
    });
    let plan = validate(&pipe, &mut qctx).unwrap();
    assert_eq!(plan.root_node().unwrap().col_names, vec!["c"]);
}

#[test]
fn projection_fuses_into_get_neighbors_across_pipes() {
    let mut qctx = god_ctx();
    let first = Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
        over: OverClause::over(&["follow"]),
        where_clause: None,
        yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
            Expr::new(ExprKind::EdgeDst("follow".to_string())),
            "d",
        )])),
        truncate: None,
    });
    // the forwarding projection in the middle is fusable
    let forward = yield_input("d", "d");
    let second = Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_ref(Expr::new(ExprKind::InputProperty("d".to_string()))),
        over: OverClause::over(&["follow"]),
        where_clause: None,
        yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
            Expr::new(ExprKind::EdgeDst("follow".to_string())),
            "d2",
        )])),
        truncate: None,
    });
    let pipe = Sentence::new(PipedSentence {
        left: Box::new(Sentence::new(PipedSentence {
            left: Box::new(first),
            right: Box::new(forward),
        })),
        right: Box::new(second),
    });
    let plan = validate(&pipe, &mut qctx).unwrap();
    // the middle Project was absorbed: only the two yield projections stay
    let projects = plan
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, PlanNodeKind::Project { .. }))
        .count();
    assert_eq!(projects, 2);
}

#[test]
fn range_zero_step_evaluates_to_bad_data() {
    let reg = FunctionRegistry::new();
    let mut evaluator = Evaluator::new(&reg, &NullContext);
    let call = Expr::new(ExprKind::FunctionCall {
        name: "range".to_string(),
        args: vec![
            Expr::constant(1i64),
            Expr::constant(5i64),
            Expr::constant(0i64),
        ],
    });
    assert_eq!(evaluator.eval(&call), Value::BAD_DATA);
}

#[test]
fn schema_write_requires_admin_but_insert_needs_only_user() {
    // CREATE TAG as a USER-role account: denied
    let mut qctx = user_ctx("moon");
    let create = Sentence::new(CreateTagSentence {
        name: "t".to_string(),
        columns: vec![],
        props: SchemaProps::default(),
        if_not_exists: false,
    });
    let err = validate(&create, &mut qctx).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);

    // INSERT VERTEX as the same account: data-write role suffices
    let insert = Sentence::new(InsertVerticesSentence {
        tag_items: vec![VertexTagItem {
            tag: "t".to_string(),
            props: vec![],
        }],
        rows: vec![VertexRowItem {
            vid: Expr::constant(1i64),
            values: vec![],
        }],
        if_not_exists: false,
        ignore_existed_index: false,
    });
    let plan = validate(&insert, &mut qctx).unwrap();
    assert!(matches!(
        plan.root_node().unwrap().kind,
        PlanNodeKind::InsertVertices { .. }
    ));

    // the ADMIN-role account may create the tag
    let mut qctx = user_ctx("dba");
    assert!(validate(&create, &mut qctx).is_ok());
}

#[test]
fn single_data_source_rule() {
    let mut qctx = god_ctx();
    qctx.symbols
        .register("a", vec![ngqlc::context::ColDef::new("x", ValueType::Int)]);
    qctx.symbols
        .register("b", vec![ngqlc::context::ColDef::new("y", ValueType::Int)]);
    let y = Sentence::new(YieldSentence {
        yield_clause: YieldClause::new(vec![
            YieldColumn::new(Expr::new(ExprKind::VariableProperty {
                var: "a".to_string(),
                prop: "x".to_string(),
            })),
            YieldColumn::new(Expr::new(ExprKind::VariableProperty {
                var: "b".to_string(),
                prop: "y".to_string(),
            })),
        ]),
        where_clause: None,
    });
    let err = validate(&y, &mut qctx).unwrap_err();
    assert!(err.message.ends_with("Only support single data source."));
}

#[test]
fn yield_rejects_graph_scopes() {
    let mut qctx = god_ctx();
    let y = Sentence::new(YieldSentence {
        yield_clause: YieldClause::new(vec![YieldColumn::new(dst_prop("person", "age"))]),
        where_clause: None,
    });
    let err = validate(&y, &mut qctx).unwrap_err();
    assert_eq!(
        err.message,
        "Only support input and variable in yield sentence."
    );
}

#[test]
fn assignment_registers_variable() {
    let mut qctx = god_ctx();
    let assign = Sentence::new(AssignmentSentence {
        var: "a".to_string(),
        body: Box::new(go_filtered_traversal()),
    });
    let plan = validate(&assign, &mut qctx).unwrap();
    assert!(matches!(
        plan.root_node().unwrap().kind,
        PlanNodeKind::Assign { .. }
    ));
    assert_eq!(
        qctx.symbols.lookup("a").unwrap(),
        &vec![ngqlc::context::ColDef::new("name", ValueType::String)]
    );
}

#[test]
fn use_space_binds_session_for_later_sentences() {
    let cat = Arc::new(nba_catalog());
    let mut qctx = QueryContext::new(cat, Session::new("root"));
    let seq = Sentence::new(SequentialSentences {
        sentences: vec![
            Sentence::new(UseSentence {
                space: "nba".to_string(),
            }),
            go_filtered_traversal(),
        ],
    });
    let plan = validate(&seq, &mut qctx).unwrap();
    assert!(plan
        .nodes
        .iter()
        .any(|n| matches!(n.kind, PlanNodeKind::SwitchSpace { .. })));
    assert_eq!(qctx.session.space.as_ref().unwrap().name, "nba");
}

#[test]
fn query_without_space_is_rejected() {
    let cat = Arc::new(nba_catalog());
    let mut qctx = QueryContext::new(cat, Session::new("root"));
    let err = validate(&go_filtered_traversal(), &mut qctx).unwrap_err();
    assert_eq!(err.message, "Space was not chosen.");
}

#[test]
fn unknown_space_option_is_rejected() {
    let mut qctx = god_ctx();
    let create = Sentence::new(CreateSpaceSentence {
        name: "x".to_string(),
        options: vec![SpaceOptItem::new("shard_count", Expr::constant(3i64))],
        if_not_exists: false,
        comment: None,
    });
    let err = validate(&create, &mut qctx).unwrap_err();
    assert_eq!(err.message, "Unknown space option `shard_count'.");

    let good = Sentence::new(CreateSpaceSentence {
        name: "x".to_string(),
        options: vec![
            SpaceOptItem::new("partition_num", Expr::constant(10i64)),
            SpaceOptItem::new(
                "vid_type",
                Expr::new(ExprKind::FunctionCall {
                    name: "FIXED_STRING".to_string(),
                    args: vec![Expr::constant(16i64)],
                }),
            ),
        ],
        if_not_exists: false,
        comment: None,
    });
    let plan = validate(&good, &mut qctx).unwrap();
    match &plan.root_node().unwrap().kind {
        PlanNodeKind::CreateSpace { desc, .. } => {
            assert_eq!(desc.partition_num, 10);
            assert_eq!(desc.vid_type, ColumnTypeDef::fixed_string(16));
        }
        other => panic!("unexpected root {}", other.as_ref()),
    }
}

#[test]
fn explain_format_is_validated() {
    let mut qctx = god_ctx();
    let wrap = |format: Option<&str>| {
        Sentence::new(ExplainSentence {
            is_profile: false,
            format: format.map(|f| f.to_string()),
            body: Box::new(go_filtered_traversal()),
        })
    };
    assert!(validate(&wrap(Some("DOT")), &mut qctx).is_ok());
    assert!(validate(&wrap(Some("row")), &mut qctx).is_ok());
    let err = validate(&wrap(Some("tree")), &mut qctx).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E_SYNTAX_ERROR);

    let profiled = Sentence::new(ExplainSentence {
        is_profile: true,
        format: None,
        body: Box::new(go_filtered_traversal()),
    });
    let plan = validate(&profiled, &mut qctx).unwrap();
    assert!(plan.is_profile);
}

#[test]
fn empty_sequential_is_statement_empty() {
    let mut qctx = god_ctx();
    let seq = Sentence::new(SequentialSentences { sentences: vec![] });
    let err = validate(&seq, &mut qctx).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E_STATEMENT_EMPTY);
}

#[test]
fn lookup_requires_index() {
    let mut qctx = god_ctx();
    // person has an index
    let ok = Sentence::new(LookupSentence {
        source: "person".to_string(),
        where_clause: None,
        yield_clause: None,
    });
    let plan = validate(&ok, &mut qctx).unwrap();
    assert!(plan
        .nodes
        .iter()
        .any(|n| matches!(n.kind, PlanNodeKind::IndexScan { .. })));
    assert_eq!(plan.root_node().unwrap().col_names, vec!["VertexID"]);

    // follow has none
    let missing = Sentence::new(LookupSentence {
        source: "follow".to_string(),
        where_clause: None,
        yield_clause: None,
    });
    let err = validate(&missing, &mut qctx).unwrap_err();
    assert_eq!(err.message, "No valid index found");
}

#[test]
fn drop_unknown_tag_reports_not_found() {
    let mut qctx = god_ctx();
    let drop = Sentence::new(SentenceKind::DropTag(DropSchemaSentence {
        name: "ghost".to_string(),
        if_exists: false,
    }));
    let err = validate(&drop, &mut qctx).unwrap_err();
    assert_eq!(err.message, "tag `ghost' not found");
    // IF EXISTS suppresses the lookup
    let drop_if = Sentence::new(SentenceKind::DropTag(DropSchemaSentence {
        name: "ghost".to_string(),
        if_exists: true,
    }));
    assert!(validate(&drop_if, &mut qctx).is_ok());
}

#[test]
fn go_from_string_vid_in_int_space_is_rejected() {
    let mut qctx = god_ctx();
    let go = Sentence::new(GoSentence {
        step: StepClause::single(1),
        from: VerticesClause::from_vids(vec![Expr::constant("Tim")]),
        over: OverClause::over(&["follow"]),
        where_clause: None,
        yield_clause: Some(YieldClause::new(vec![YieldColumn::new(Expr::new(
            ExprKind::EdgeDst("follow".to_string()),
        ))])),
        truncate: None,
    });
    let err = validate(&go, &mut qctx).unwrap_err();
    assert_eq!(err.message, "Vid should be a integer.");
}

#[test]
fn validation_errors_are_deterministic() {
    for _ in 0..3 {
        let mut qctx = god_ctx();
        let pipe = Sentence::new(PipedSentence {
            left: Box::new(go_filtered_traversal()),
            right: Box::new(yield_input("ghost", "c")),
        });
        let err = validate(&pipe, &mut qctx).unwrap_err();
        assert_eq!(err.message, "column 'ghost' not exist in input.");
    }
}

#[test]
fn row_explain_output_lists_nodes() {
    let mut qctx = god_ctx();
    let plan = validate(&go_filtered_traversal(), &mut qctx).unwrap();
    let table = ngqlc::codegen::plan_to_row_table(&plan);
    assert!(table.contains("GetNeighbors"));
    assert!(table.contains("Start"));
    let dot = ngqlc::codegen::plan_to_dot(&plan);
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("GetNeighbors"));
}
