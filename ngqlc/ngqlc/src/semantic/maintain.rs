//! Validators for schema maintenance: spaces, tags, edges, indexes.

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::expr::ExprKind;
use ngqlc_ast::stmt::maintain::*;
use ngqlc_ast::stmt::SentenceKind;
use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::Value;

use super::{Outcome, Vctx};
use crate::catalog::SpaceDesc;
use crate::ir::PlanNodeKind;

const MAX_FIXED_STRING_LEN: i16 = 256;

/// The recognized CREATE SPACE options; anything else is rejected.
const SPACE_OPTION_KEYS: &[&str] = &[
    "partition_num",
    "replica_factor",
    "vid_type",
    "charset",
    "collate",
    "atomic_edge",
    "group_name",
];

pub(crate) fn validate_maintain(kind: &SentenceKind, vctx: &mut Vctx) -> Result<Outcome> {
    use SentenceKind::*;
    match kind {
        CreateSpace(cs) => validate_create_space(cs, vctx),
        CreateSpaceAs(cs) => {
            vctx.qctx.catalog.space_by_name(&cs.old_name)?;
            Ok(vctx.single_node(
                PlanNodeKind::CreateSpaceAs {
                    old_name: cs.old_name.clone(),
                    new_name: cs.new_name.clone(),
                },
                &[],
            ))
        }
        AlterSpace(a) => {
            vctx.qctx.catalog.space_by_name(&a.name)?;
            if a.op != "add_zone" {
                return Err(Error::semantic(format!(
                    "Unsupported alter space operation `{}'.",
                    a.op
                )));
            }
            Ok(vctx.single_node(
                PlanNodeKind::AlterSpace {
                    space: a.name.clone(),
                    op: a.op.clone(),
                    args: a.args.clone(),
                },
                &[],
            ))
        }
        DropSpace(d) => {
            if !d.if_exists {
                vctx.qctx.catalog.space_by_name(&d.name)?;
            }
            Ok(vctx.single_node(
                PlanNodeKind::DropSpace {
                    space: d.name.clone(),
                    if_exists: d.if_exists,
                },
                &[],
            ))
        }
        ClearSpace(d) => {
            if !d.if_exists {
                vctx.qctx.catalog.space_by_name(&d.name)?;
            }
            Ok(vctx.single_node(
                PlanNodeKind::ClearSpace {
                    space: d.name.clone(),
                    if_exists: d.if_exists,
                },
                &[],
            ))
        }
        DescribeSpace(d) => {
            vctx.qctx.catalog.space_by_name(&d.name)?;
            Ok(vctx.single_node(
                PlanNodeKind::DescSpace {
                    space: d.name.clone(),
                },
                &[
                    ("ID", ValueType::Int),
                    ("Name", ValueType::String),
                    ("Partition Number", ValueType::Int),
                    ("Replica Factor", ValueType::Int),
                    ("Charset", ValueType::String),
                    ("Collate", ValueType::String),
                    ("Vid Type", ValueType::String),
                ],
            ))
        }
        ShowSpaces => Ok(vctx.single_node(PlanNodeKind::ShowSpaces, &[("Name", ValueType::String)])),
        ShowCreateSpace(d) => {
            vctx.qctx.catalog.space_by_name(&d.name)?;
            Ok(vctx.single_node(
                PlanNodeKind::ShowCreateSpace {
                    space: d.name.clone(),
                },
                &[
                    ("Space", ValueType::String),
                    ("Create Space", ValueType::String),
                ],
            ))
        }

        CreateTag(c) => {
            validate_columns(&c.columns, &c.props)?;
            Ok(vctx.single_node(
                PlanNodeKind::CreateTag {
                    name: c.name.clone(),
                    columns: c.columns.clone(),
                    props: c.props.clone(),
                    if_not_exists: c.if_not_exists,
                },
                &[],
            ))
        }
        CreateEdge(c) => {
            validate_columns(&c.columns, &c.props)?;
            Ok(vctx.single_node(
                PlanNodeKind::CreateEdge {
                    name: c.name.clone(),
                    columns: c.columns.clone(),
                    props: c.props.clone(),
                    if_not_exists: c.if_not_exists,
                },
                &[],
            ))
        }
        AlterTag(a) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.tag_schema(&space.name, &a.name)?;
            validate_alter_opts(&a.opts)?;
            Ok(vctx.single_node(
                PlanNodeKind::AlterTag {
                    name: a.name.clone(),
                },
                &[],
            ))
        }
        AlterEdge(a) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.edge_schema(&space.name, &a.name)?;
            validate_alter_opts(&a.opts)?;
            Ok(vctx.single_node(
                PlanNodeKind::AlterEdge {
                    name: a.name.clone(),
                },
                &[],
            ))
        }
        DropTag(d) => {
            if !d.if_exists {
                let space = vctx.space()?;
                vctx.qctx.catalog.tag_schema(&space.name, &d.name)?;
            }
            Ok(vctx.single_node(
                PlanNodeKind::DropTag {
                    name: d.name.clone(),
                    if_exists: d.if_exists,
                },
                &[],
            ))
        }
        DropEdge(d) => {
            if !d.if_exists {
                let space = vctx.space()?;
                vctx.qctx.catalog.edge_schema(&space.name, &d.name)?;
            }
            Ok(vctx.single_node(
                PlanNodeKind::DropEdge {
                    name: d.name.clone(),
                    if_exists: d.if_exists,
                },
                &[],
            ))
        }
        DescribeTag(d) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.tag_schema(&space.name, &d.name)?;
            Ok(vctx.single_node(
                PlanNodeKind::DescTag {
                    name: d.name.clone(),
                },
                desc_schema_cols(),
            ))
        }
        DescribeEdge(d) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.edge_schema(&space.name, &d.name)?;
            Ok(vctx.single_node(
                PlanNodeKind::DescEdge {
                    name: d.name.clone(),
                },
                desc_schema_cols(),
            ))
        }
        ShowTags => Ok(vctx.single_node(PlanNodeKind::ShowTags, &[("Name", ValueType::String)])),
        ShowEdges => Ok(vctx.single_node(PlanNodeKind::ShowEdges, &[("Name", ValueType::String)])),
        ShowCreateTag(d) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.tag_schema(&space.name, &d.name)?;
            Ok(vctx.single_node(
                PlanNodeKind::ShowCreateTag {
                    name: d.name.clone(),
                },
                &[("Tag", ValueType::String), ("Create Tag", ValueType::String)],
            ))
        }
        ShowCreateEdge(d) => {
            let space = vctx.space()?;
            vctx.qctx.catalog.edge_schema(&space.name, &d.name)?;
            Ok(vctx.single_node(
                PlanNodeKind::ShowCreateEdge {
                    name: d.name.clone(),
                },
                &[
                    ("Edge", ValueType::String),
                    ("Create Edge", ValueType::String),
                ],
            ))
        }

        CreateTagIndex(c) | CreateEdgeIndex(c) => validate_create_index(c, vctx),
        DropTagIndex(d) | DropEdgeIndex(d) => {
            if !d.if_exists {
                lookup_index(vctx, d.is_edge, &d.index_name)?;
            }
            Ok(vctx.single_node(
                PlanNodeKind::DropIndex {
                    is_edge: d.is_edge,
                    index: d.index_name.clone(),
                    if_exists: d.if_exists,
                },
                &[],
            ))
        }
        DescribeTagIndex(d) | DescribeEdgeIndex(d) => {
            lookup_index(vctx, d.is_edge, &d.index_name)?;
            Ok(vctx.single_node(
                PlanNodeKind::DescIndex {
                    is_edge: d.is_edge,
                    index: d.index_name.clone(),
                },
                desc_schema_cols(),
            ))
        }
        ShowCreateTagIndex(d) | ShowCreateEdgeIndex(d) => {
            lookup_index(vctx, d.is_edge, &d.index_name)?;
            Ok(vctx.single_node(
                PlanNodeKind::ShowCreateIndex {
                    is_edge: d.is_edge,
                    index: d.index_name.clone(),
                },
                &[
                    ("Index", ValueType::String),
                    ("Create Index", ValueType::String),
                ],
            ))
        }
        ShowTagIndexes => Ok(vctx.single_node(
            PlanNodeKind::ShowIndexes { is_edge: false },
            show_index_cols(),
        )),
        ShowEdgeIndexes => Ok(vctx.single_node(
            PlanNodeKind::ShowIndexes { is_edge: true },
            show_index_cols(),
        )),
        ShowTagIndexStatus => Ok(vctx.single_node(
            PlanNodeKind::ShowIndexStatus { is_edge: false },
            &[
                ("Name", ValueType::String),
                ("Index Status", ValueType::String),
            ],
        )),
        ShowEdgeIndexStatus => Ok(vctx.single_node(
            PlanNodeKind::ShowIndexStatus { is_edge: true },
            &[
                ("Name", ValueType::String),
                ("Index Status", ValueType::String),
            ],
        )),
        RebuildTagIndex(r) | RebuildEdgeIndex(r) => {
            lookup_index(vctx, r.is_edge, &r.index_name)?;
            Ok(vctx.single_node(
                PlanNodeKind::RebuildIndex {
                    is_edge: r.is_edge,
                    index: r.index_name.clone(),
                },
                &[("New Job Id", ValueType::Int)],
            ))
        }
        CreateFulltextIndex(c) => {
            let space = vctx.space()?;
            let schema = if c.is_edge {
                vctx.qctx.catalog.edge_schema(&space.name, &c.schema_name)?
            } else {
                vctx.qctx.catalog.tag_schema(&space.name, &c.schema_name)?
            };
            for field in &c.fields {
                let col = schema.column(field).ok_or_else(|| {
                    Error::semantic(format!(
                        "`{field}' not found in schema `{}'.",
                        c.schema_name
                    ))
                })?;
                if col.value_type() != ValueType::String {
                    return Err(Error::semantic(
                        "Only string columns can carry a fulltext index.",
                    ));
                }
            }
            Ok(vctx.single_node(
                PlanNodeKind::CreateFulltextIndex {
                    index: c.index_name.clone(),
                    schema: c.schema_name.clone(),
                    is_edge: c.is_edge,
                    fields: c.fields.clone(),
                },
                &[],
            ))
        }
        DropFulltextIndex(d) => Ok(vctx.single_node(
            PlanNodeKind::DropFulltextIndex {
                index: d.index_name.clone(),
            },
            &[],
        )),
        ShowFulltextIndexes => Ok(vctx.single_node(
            PlanNodeKind::ShowFulltextIndexes,
            show_index_cols(),
        )),
        RebuildFulltextIndex => Ok(vctx.single_node(PlanNodeKind::RebuildFulltextIndex, &[])),

        other => Err(Error::internal(format!(
            "not a maintain sentence: {}",
            other.name()
        ))),
    }
}

fn desc_schema_cols() -> &'static [(&'static str, ValueType)] {
    &[
        ("Field", ValueType::String),
        ("Type", ValueType::String),
        ("Null", ValueType::String),
        ("Default", ValueType::Any),
        ("Comment", ValueType::String),
    ]
}

fn show_index_cols() -> &'static [(&'static str, ValueType)] {
    &[
        ("Index Name", ValueType::String),
        ("By Tag", ValueType::String),
        ("Columns", ValueType::List),
    ]
}

fn lookup_index(vctx: &Vctx, is_edge: bool, name: &str) -> Result<()> {
    let space = vctx.space()?;
    if is_edge {
        vctx.qctx.catalog.edge_index(&space.name, name)?;
    } else {
        vctx.qctx.catalog.tag_index(&space.name, name)?;
    }
    Ok(())
}

fn validate_create_space(cs: &CreateSpaceSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let mut desc = SpaceDesc::new(0, &cs.name);
    for opt in &cs.options {
        let key = opt.key.to_lowercase();
        if !SPACE_OPTION_KEYS.contains(&key.as_str()) {
            return Err(Error::semantic(format!(
                "Unknown space option `{}'.",
                opt.key
            )));
        }
        match key.as_str() {
            "partition_num" => {
                desc.partition_num = positive_int_option(&opt.value, "partition_num")? as i32;
            }
            "replica_factor" => {
                desc.replica_factor = positive_int_option(&opt.value, "replica_factor")? as i32;
            }
            "vid_type" => {
                desc.vid_type = vid_type_option(opt)?;
            }
            "charset" => {
                desc.charset = string_option(&opt.value, "charset")?.to_lowercase();
            }
            "collate" => {
                desc.collate = string_option(&opt.value, "collate")?.to_lowercase();
            }
            // validated for form only; the meta service interprets them
            "atomic_edge" | "group_name" => {}
            _ => unreachable!("key checked against the known set"),
        }
    }
    Ok(vctx.single_node(
        PlanNodeKind::CreateSpace {
            desc,
            if_not_exists: cs.if_not_exists,
        },
        &[],
    ))
}

fn positive_int_option(value: &ngqlc_ast::expr::Expr, key: &str) -> Result<i64> {
    match &value.kind {
        ExprKind::Constant(Value::Int(i)) if *i > 0 => Ok(*i),
        _ => Err(Error::semantic(format!(
            "Space option `{key}' should be a positive integer."
        ))),
    }
}

fn string_option(value: &ngqlc_ast::expr::Expr, key: &str) -> Result<String> {
    match &value.kind {
        ExprKind::Constant(Value::String(s)) => Ok(s.clone()),
        ExprKind::Label(s) => Ok(s.clone()),
        _ => Err(Error::semantic(format!(
            "Space option `{key}' should be a string."
        ))),
    }
}

fn vid_type_option(opt: &SpaceOptItem) -> Result<ColumnTypeDef> {
    // the parser delivers `FIXED_STRING(n)` as a label with a length and
    // `INT64`/`INT` as a bare label
    match &opt.value.kind {
        ExprKind::Label(name) => {
            let upper = name.to_uppercase();
            if upper == "INT64" || upper == "INT" {
                return Ok(ColumnTypeDef::simple(PropertyType::Int64));
            }
            Err(Error::semantic(
                "Space vid_type must be INT64 or FIXED_STRING(<N>).",
            ))
        }
        ExprKind::FunctionCall { name, args } if name.eq_ignore_ascii_case("fixed_string") => {
            match args.first().map(|a| &a.kind) {
                Some(ExprKind::Constant(Value::Int(n)))
                    if *n > 0 && *n <= MAX_FIXED_STRING_LEN as i64 =>
                {
                    Ok(ColumnTypeDef::fixed_string(*n as i16))
                }
                _ => Err(Error::semantic(
                    "Space vid_type must be INT64 or FIXED_STRING(<N>).",
                )),
            }
        }
        _ => Err(Error::semantic(
            "Space vid_type must be INT64 or FIXED_STRING(<N>).",
        )),
    }
}

fn validate_columns(columns: &[ColumnSpec], props: &SchemaProps) -> Result<()> {
    for (i, col) in columns.iter().enumerate() {
        if columns[..i].iter().any(|c| c.name == col.name) {
            return Err(Error::semantic(format!(
                "Duplicate column name `{}'",
                col.name
            )));
        }
        if col.type_def.ptype == PropertyType::FixedString {
            match col.type_def.len {
                Some(len) if len > 0 && len <= MAX_FIXED_STRING_LEN => {}
                _ => {
                    return Err(Error::semantic(format!(
                        "Invalid fixed_string length for column `{}'",
                        col.name
                    )))
                }
            }
        }
    }
    if let Some(ttl_col) = &props.ttl_col {
        let col = columns
            .iter()
            .find(|c| &c.name == ttl_col)
            .ok_or_else(|| Error::semantic(format!("TTL column `{ttl_col}' does not exist.")))?;
        if !matches!(
            col.type_def.ptype,
            PropertyType::Int64 | PropertyType::Timestamp
        ) {
            return Err(Error::semantic(
                "TTL column type must be integer or timestamp.",
            ));
        }
    }
    if props.ttl_duration.is_some_and(|d| d < 0) {
        return Err(Error::semantic("TTL duration must be non-negative."));
    }
    Ok(())
}

fn validate_alter_opts(opts: &[AlterSchemaOptItem]) -> Result<()> {
    if opts.is_empty() {
        return Err(Error::semantic("Alter options cannot be empty."));
    }
    for opt in opts {
        match opt.op {
            AlterSchemaOp::Drop => {
                if opt.col_names.is_empty() {
                    return Err(Error::semantic("Drop column list cannot be empty."));
                }
            }
            _ => {
                validate_columns(&opt.columns, &SchemaProps::default())?;
                if opt.columns.is_empty() {
                    return Err(Error::semantic("Column list cannot be empty."));
                }
            }
        }
    }
    Ok(())
}

fn validate_create_index(c: &CreateIndexSentence, vctx: &mut Vctx) -> Result<Outcome> {
    let space = vctx.space()?;
    let schema = if c.is_edge {
        vctx.qctx.catalog.edge_schema(&space.name, &c.schema_name)?
    } else {
        vctx.qctx.catalog.tag_schema(&space.name, &c.schema_name)?
    };
    for (i, field) in c.fields.iter().enumerate() {
        if c.fields[..i].iter().any(|f| f.name == field.name) {
            return Err(Error::semantic(format!(
                "Duplicate index field `{}'",
                field.name
            )));
        }
        let col = schema.column(&field.name).ok_or_else(|| {
            Error::semantic(format!(
                "`{}' not found in schema `{}'.",
                field.name, c.schema_name
            ))
        })?;
        // variable-length strings need an explicit prefix length
        if col.type_def.ptype == PropertyType::String {
            match field.len {
                Some(len) if len > 0 && len <= MAX_FIXED_STRING_LEN => {}
                _ => {
                    return Err(Error::semantic(format!(
                        "Index field `{}' on a string column must set a length.",
                        field.name
                    )))
                }
            }
        }
    }
    Ok(vctx.single_node(
        PlanNodeKind::CreateIndex {
            is_edge: c.is_edge,
            index: c.index_name.clone(),
            schema: c.schema_name.clone(),
            fields: c.fields.clone(),
            if_not_exists: c.if_not_exists,
        },
        &[],
    ))
}
