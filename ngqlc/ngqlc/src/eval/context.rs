//! Expression-context implementations: the all-NULL context, a row-backed
//! context for input/variable scopes, and a graph-backed context binding a
//! source vertex, destination vertex and current edge.

use std::collections::HashMap;

use ngqlc_ast::expr::VertexRole;
use ngqlc_ast::value::{DataSet, Edge, Value, Vertex};

use super::ExprContext;

/// Binds nothing; every reference reads NULL.
pub struct NullContext;

impl ExprContext for NullContext {}

/// Input columns from one row of a DataSet, plus named variables bound to
/// whole DataSets (their first row serves property reads, as during
/// per-row evaluation).
#[derive(Default)]
pub struct RowContext {
    pub col_names: Vec<String>,
    pub row: Vec<Value>,
    pub vars: HashMap<String, DataSet>,
}

impl RowContext {
    pub fn new(col_names: Vec<String>, row: Vec<Value>) -> Self {
        RowContext {
            col_names,
            row,
            vars: HashMap::new(),
        }
    }

    pub fn bind_var(&mut self, name: &str, ds: DataSet) {
        self.vars.insert(name.to_string(), ds);
    }
}

impl ExprContext for RowContext {
    fn get_input(&self, col: &str) -> Value {
        match self.col_names.iter().position(|c| c == col) {
            Some(idx) => self.row.get(idx).cloned().unwrap_or(Value::NULL),
            None => Value::NULL,
        }
    }

    fn get_var(&self, var: &str) -> Value {
        match self.vars.get(var) {
            Some(ds) => Value::new_dataset(ds.clone()),
            None => Value::NULL,
        }
    }

    fn get_var_prop(&self, var: &str, col: &str) -> Value {
        let Some(ds) = self.vars.get(var) else {
            return Value::NULL;
        };
        let Some(idx) = ds.col_index(col) else {
            return Value::NULL;
        };
        ds.cell(0, idx).cloned().unwrap_or(Value::NULL)
    }

    fn get_column(&self, idx: i64) -> Value {
        if idx < 0 {
            return Value::NULL;
        }
        self.row.get(idx as usize).cloned().unwrap_or(Value::NULL)
    }
}

/// A traversal step: `$^`, `$$` and the current edge.
#[derive(Default)]
pub struct GraphContext {
    pub src: Option<Vertex>,
    pub dst: Option<Vertex>,
    pub edge: Option<Edge>,
}

impl GraphContext {
    fn vertex_prop(vertex: &Option<Vertex>, tag: &str, prop: &str) -> Value {
        let Some(v) = vertex else {
            return Value::NULL;
        };
        match v.tag(tag) {
            Some(t) => t.props.get(prop).cloned().unwrap_or(Value::UNKNOWN_PROP),
            None => Value::UNKNOWN_PROP,
        }
    }
}

impl ExprContext for GraphContext {
    fn get_src_prop(&self, tag: &str, prop: &str) -> Value {
        Self::vertex_prop(&self.src, tag, prop)
    }

    fn get_dst_prop(&self, tag: &str, prop: &str) -> Value {
        Self::vertex_prop(&self.dst, tag, prop)
    }

    fn get_edge_prop(&self, edge: &str, prop: &str) -> Value {
        let Some(e) = &self.edge else {
            return Value::NULL;
        };
        if e.name != edge {
            return Value::NULL;
        }
        match prop {
            "_src" => e.src.clone(),
            "_dst" => e.dst.clone(),
            "_rank" => Value::Int(e.ranking),
            "_type" => Value::Int(e.etype as i64),
            _ => e.props.get(prop).cloned().unwrap_or(Value::UNKNOWN_PROP),
        }
    }

    fn get_tag_prop(&self, tag: &str, prop: &str) -> Value {
        Self::vertex_prop(&self.src, tag, prop)
    }

    fn get_vertex(&self, role: VertexRole) -> Value {
        let v = match role {
            VertexRole::Source => &self.src,
            VertexRole::Dest => &self.dst,
        };
        match v {
            Some(v) => Value::new_vertex(v.clone()),
            None => Value::NULL,
        }
    }

    fn get_edge(&self) -> Value {
        match &self.edge {
            Some(e) => Value::new_edge(e.clone()),
            None => Value::NULL,
        }
    }
}
