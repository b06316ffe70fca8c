//! Schema introspection over graph values, plus the path and dataset
//! helpers.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::{List, Map, Value};

use super::{first_null, matches_or_wild, wild, FnDef, FunctionRegistry};

fn id_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Vertex(v) => v.vid.clone(),
        _ => Value::BAD_TYPE,
    }
}

/// Tag names of a vertex; surfaced both as `tags()` and `labels()`.
fn tags_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Vertex(v) => Value::List(List {
            values: v.tags.iter().map(|t| Value::from(t.name.clone())).collect(),
        }),
        _ => Value::BAD_TYPE,
    }
}

fn type_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Edge(e) => Value::from(e.name.clone()),
        _ => Value::BAD_TYPE,
    }
}

fn typeid_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Edge(e) => Value::Int(e.etype as i64),
        _ => Value::BAD_TYPE,
    }
}

fn src_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Edge(e) => e.src.clone(),
        _ => Value::BAD_TYPE,
    }
}

fn dst_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Edge(e) => e.dst.clone(),
        _ => Value::BAD_TYPE,
    }
}

fn rank_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Edge(e) => Value::Int(e.ranking),
        _ => Value::BAD_TYPE,
    }
}

/// Properties of a vertex (flattened across tags), edge or map.
fn properties_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Vertex(v) => {
            let mut kvs = indexmap::IndexMap::new();
            for (k, val) in v.flat_props() {
                kvs.insert(k.to_string(), val.clone());
            }
            Value::Map(Map { kvs })
        }
        Value::Edge(e) => Value::Map(Map {
            kvs: e.props.clone(),
        }),
        Value::Map(m) => Value::Map(m.clone()),
        _ => Value::BAD_TYPE,
    }
}

fn keys_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    let mut names: Vec<String> = match &args[0] {
        Value::Vertex(v) => v.flat_props().keys().map(|k| k.to_string()).collect(),
        Value::Edge(e) => e.props.keys().cloned().collect(),
        Value::Map(m) => m.kvs.keys().cloned().collect(),
        _ => return Value::BAD_TYPE,
    };
    names.sort();
    Value::List(List {
        values: names.into_iter().map(Value::from).collect(),
    })
}

fn start_node_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => Value::new_vertex(p.src.clone()),
        _ => Value::BAD_TYPE,
    }
}

fn end_node_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => match p.steps.last() {
            Some(step) => Value::new_vertex(step.dst.clone()),
            None => Value::new_vertex(p.src.clone()),
        },
        _ => Value::BAD_TYPE,
    }
}

fn nodes_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => Value::List(List {
            values: p
                .nodes()
                .into_iter()
                .map(|v| Value::new_vertex(v.clone()))
                .collect(),
        }),
        _ => Value::BAD_TYPE,
    }
}

fn relationships_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => Value::List(List {
            values: p.relationships().into_iter().map(Value::new_edge).collect(),
        }),
        _ => Value::BAD_TYPE,
    }
}

fn has_same_vertex_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => Value::Bool(p.has_duplicate_vertices()),
        _ => Value::BAD_TYPE,
    }
}

fn has_same_edge_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => Value::Bool(p.has_duplicate_edges()),
        _ => Value::BAD_TYPE,
    }
}

fn reverse_path_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Path(p) => Value::new_path(p.reversed()),
        _ => Value::BAD_TYPE,
    }
}

/// dataSetRowCol(ds, row, col): col by index or name; out of range is bad
/// data.
fn dataset_row_col_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    let ds = match &args[0] {
        Value::DataSet(ds) => ds,
        _ => return Value::BAD_TYPE,
    };
    let row = match &args[1] {
        Value::Int(r) => *r,
        _ => return Value::BAD_TYPE,
    };
    let col = match &args[2] {
        Value::Int(c) => *c,
        Value::String(name) => match ds.col_index(name) {
            Some(idx) => idx as i64,
            None => return Value::BAD_DATA,
        },
        _ => return Value::BAD_TYPE,
    };
    if row < 0 || col < 0 {
        return Value::BAD_DATA;
    }
    match ds.cell(row as usize, col as usize) {
        Some(v) => v.clone(),
        None => Value::BAD_DATA,
    }
}

pub(super) fn register(reg: &mut FunctionRegistry) {
    reg.insert(FnDef {
        name: "id",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: id_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Vertex)).then_some(ValueType::Any)
        },
    });
    reg.insert(FnDef {
        name: "tags",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: tags_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Vertex)).then_some(ValueType::List)
        },
    });
    reg.alias("labels", "tags");
    reg.insert(FnDef {
        name: "type",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: type_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Edge)).then_some(ValueType::String)
        },
    });
    reg.insert(FnDef {
        name: "typeid",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: typeid_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Edge)).then_some(ValueType::Int)
        },
    });
    reg.insert(FnDef {
        name: "src",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: src_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Edge)).then_some(ValueType::Any)
        },
    });
    reg.insert(FnDef {
        name: "dst",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: dst_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Edge)).then_some(ValueType::Any)
        },
    });
    reg.insert(FnDef {
        name: "rank",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: rank_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Edge)).then_some(ValueType::Int)
        },
    });

    let props_rule = |types: &[ValueType]| -> Option<ValueType> {
        match types {
            [t] if wild(*t)
                || matches!(t, ValueType::Vertex | ValueType::Edge | ValueType::Map) =>
            {
                Some(ValueType::Map)
            }
            _ => None,
        }
    };
    reg.insert(FnDef {
        name: "properties",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: properties_body,
        ret_type: props_rule,
    });
    reg.insert(FnDef {
        name: "keys",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: keys_body,
        ret_type: |types| match types {
            [t] if wild(*t)
                || matches!(t, ValueType::Vertex | ValueType::Edge | ValueType::Map) =>
            {
                Some(ValueType::List)
            }
            _ => None,
        },
    });

    let path_rule_list = |types: &[ValueType]| -> Option<ValueType> {
        matches!(types, [t] if matches_or_wild(*t, ValueType::Path)).then_some(ValueType::List)
    };
    reg.insert(FnDef {
        name: "startNode",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: start_node_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Path)).then_some(ValueType::Vertex)
        },
    });
    reg.insert(FnDef {
        name: "endNode",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: end_node_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Path)).then_some(ValueType::Vertex)
        },
    });
    reg.insert(FnDef {
        name: "nodes",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: nodes_body,
        ret_type: path_rule_list,
    });
    reg.insert(FnDef {
        name: "relationships",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: relationships_body,
        ret_type: path_rule_list,
    });
    reg.insert(FnDef {
        name: "hasSameVertexInPath",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: has_same_vertex_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Path)).then_some(ValueType::Bool)
        },
    });
    reg.insert(FnDef {
        name: "hasSameEdgeInPath",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: has_same_edge_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Path)).then_some(ValueType::Bool)
        },
    });
    reg.insert(FnDef {
        name: "reversePath",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: reverse_path_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::Path)).then_some(ValueType::Path)
        },
    });

    reg.insert(FnDef {
        name: "dataSetRowCol",
        min_arity: 3,
        max_arity: 3,
        is_pure: true,
        body: dataset_row_col_body,
        ret_type: |types| match types {
            [ds, row, col]
                if matches_or_wild(*ds, ValueType::DataSet)
                    && matches_or_wild(*row, ValueType::Int)
                    && (matches_or_wild(*col, ValueType::Int) || *col == ValueType::String) =>
            {
                Some(ValueType::Any)
            }
            _ => None,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::super::FunctionRegistry;
    use super::*;
    use indexmap::indexmap;
    use ngqlc_ast::value::{DataSet, Edge, Path, Step, Tag, Vertex};

    fn call(reg: &FunctionRegistry, name: &str, args: &[Value]) -> Value {
        (reg.get(name, args.len()).unwrap().body)(args)
    }

    fn vertex() -> Value {
        Value::new_vertex(Vertex::new(
            Value::Int(7),
            vec![Tag {
                name: "person".to_string(),
                props: indexmap! {"name".to_string() => Value::from("Tim")},
            }],
        ))
    }

    #[test]
    fn vertex_introspection() {
        let reg = FunctionRegistry::new();
        assert_eq!(call(&reg, "id", &[vertex()]), Value::Int(7));
        assert_eq!(
            call(&reg, "tags", &[vertex()]),
            Value::list(vec![Value::from("person")])
        );
        assert_eq!(
            call(&reg, "labels", &[vertex()]),
            Value::list(vec![Value::from("person")])
        );
        let props = call(&reg, "properties", &[vertex()]);
        assert_eq!(
            props.as_map().unwrap().get("name"),
            Some(&Value::from("Tim"))
        );
    }

    #[test]
    fn edge_introspection() {
        let reg = FunctionRegistry::new();
        let e = Value::new_edge(Edge::new(Value::Int(1), Value::Int(2), 3, "follow", 9));
        assert_eq!(call(&reg, "type", &[e.clone()]), Value::from("follow"));
        assert_eq!(call(&reg, "typeid", &[e.clone()]), Value::Int(3));
        assert_eq!(call(&reg, "src", &[e.clone()]), Value::Int(1));
        assert_eq!(call(&reg, "dst", &[e.clone()]), Value::Int(2));
        assert_eq!(call(&reg, "rank", &[e]), Value::Int(9));
    }

    #[test]
    fn path_introspection() {
        let reg = FunctionRegistry::new();
        let mut path = Path::new(Vertex::new(Value::Int(1), vec![]));
        path.steps.push(Step {
            dst: Vertex::new(Value::Int(2), vec![]),
            etype: 1,
            name: "follow".to_string(),
            ranking: 0,
            props: indexmap::IndexMap::new(),
        });
        let p = Value::new_path(path);
        let nodes = call(&reg, "nodes", &[p.clone()]);
        assert_eq!(nodes.as_list().unwrap().values.len(), 2);
        let rels = call(&reg, "relationships", &[p.clone()]);
        assert_eq!(rels.as_list().unwrap().values.len(), 1);
        assert_eq!(
            call(&reg, "length", &[p.clone()]),
            Value::Int(1)
        );
        assert_eq!(call(&reg, "hasSameVertexInPath", &[p.clone()]), Value::Bool(false));
        let start = call(&reg, "startNode", &[p.clone()]);
        assert_eq!(start.as_vertex().unwrap().vid, Value::Int(1));
        let end = call(&reg, "endNode", &[p]);
        assert_eq!(end.as_vertex().unwrap().vid, Value::Int(2));
    }

    #[test]
    fn dataset_cell_access() {
        let reg = FunctionRegistry::new();
        let mut ds = DataSet::new(vec!["a".to_string(), "b".to_string()]);
        ds.push_row(vec![Value::Int(1), Value::Int(2)]);
        let ds = Value::new_dataset(ds);
        assert_eq!(
            call(&reg, "dataSetRowCol", &[ds.clone(), Value::Int(0), Value::Int(1)]),
            Value::Int(2)
        );
        assert_eq!(
            call(
                &reg,
                "dataSetRowCol",
                &[ds.clone(), Value::Int(0), Value::from("a")]
            ),
            Value::Int(1)
        );
        assert_eq!(
            call(&reg, "dataSetRowCol", &[ds.clone(), Value::Int(5), Value::Int(0)]),
            Value::BAD_DATA
        );
        assert_eq!(
            call(&reg, "dataSetRowCol", &[ds, Value::Int(0), Value::Int(9)]),
            Value::BAD_DATA
        );
    }
}
