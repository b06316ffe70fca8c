//! Writers: sentences back to NGQL text, and plans into the EXPLAIN
//! output formats.

use std::fmt::Write as _;

use itertools::Itertools;
use ngqlc_ast::stmt::explain::ExplainFormat;
use ngqlc_ast::stmt::Sentence;

use crate::ir::ExecutionPlan;

/// The parseable text form of a sentence.
pub fn write_sentence(sentence: &Sentence) -> String {
    sentence.to_string()
}

pub fn describe_plan(plan: &ExecutionPlan) -> String {
    match plan.format {
        ExplainFormat::Row => plan_to_row_table(plan),
        ExplainFormat::Dot | ExplainFormat::DotStruct => plan_to_dot(plan),
    }
}

/// `FORMAT="row"`: one line per node, root first.
pub fn plan_to_row_table(plan: &ExecutionPlan) -> String {
    let mut out = String::from("id|name|dependencies|profiling data|operator info\n");
    // stable output: descending id puts the root before its inputs
    for node in plan.nodes.iter().sorted_by_key(|n| -n.id) {
        let deps = node.deps.iter().map(|d| d.to_string()).join(",");
        let _ = writeln!(
            out,
            "{}|{}|{}||outputVar: {}; colNames: [{}]",
            node.id,
            node.kind_name(),
            deps,
            node.output_var,
            node.col_names.join(", ")
        );
    }
    out
}

/// `FORMAT="dot"`: a digraph with dependency edges.
pub fn plan_to_dot(plan: &ExecutionPlan) -> String {
    let mut out = String::from("digraph exec_plan {\n  rankdir=BT;\n");
    for node in &plan.nodes {
        let _ = writeln!(
            out,
            "  \"{}_{}\" [shape=box];",
            node.kind_name(),
            node.id
        );
    }
    for node in &plan.nodes {
        for dep in &node.deps {
            if let Some(dep_node) = plan.node(*dep) {
                let _ = writeln!(
                    out,
                    "  \"{}_{}\" -> \"{}_{}\";",
                    dep_node.kind_name(),
                    dep_node.id,
                    node.kind_name(),
                    node.id
                );
            }
        }
    }
    out.push_str("}\n");
    out
}
