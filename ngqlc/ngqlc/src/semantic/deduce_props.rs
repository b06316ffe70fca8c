//! Collects which graph properties an expression reads, per scope. GO
//! uses this to decide whether a destination-vertex fetch stage is needed
//! and which storage props to request.

use ngqlc_ast::expr::{Expr, ExprKind};

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct PropRefs {
    /// `$^.tag.prop`
    pub src_props: Vec<(String, String)>,
    /// `$$.tag.prop`
    pub dst_props: Vec<(String, String)>,
    /// `alias.prop`, pseudo attributes included under their reserved names
    pub edge_props: Vec<(String, String)>,
    pub input_cols: Vec<String>,
    pub var_cols: Vec<(String, String)>,
}

impl PropRefs {
    pub fn collect(expr: &Expr) -> PropRefs {
        let mut refs = PropRefs::default();
        refs.walk(expr);
        refs
    }

    pub fn collect_all<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> PropRefs {
        let mut refs = PropRefs::default();
        for e in exprs {
            refs.walk(e);
        }
        refs
    }

    pub fn needs_dst(&self) -> bool {
        !self.dst_props.is_empty()
    }

    fn push(list: &mut Vec<(String, String)>, owner: &str, prop: &str) {
        let item = (owner.to_string(), prop.to_string());
        if !list.contains(&item) {
            list.push(item);
        }
    }

    fn walk(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::SourceProperty { tag, prop } => Self::push(&mut self.src_props, tag, prop),
            ExprKind::DestProperty { tag, prop } => Self::push(&mut self.dst_props, tag, prop),
            ExprKind::EdgeProperty { edge, prop } | ExprKind::TagProperty { tag: edge, prop } => {
                Self::push(&mut self.edge_props, edge, prop)
            }
            ExprKind::EdgeSrc(alias) => Self::push(&mut self.edge_props, alias, "_src"),
            ExprKind::EdgeDst(alias) => Self::push(&mut self.edge_props, alias, "_dst"),
            ExprKind::EdgeRank(alias) => Self::push(&mut self.edge_props, alias, "_rank"),
            ExprKind::EdgeTypeId(alias) => Self::push(&mut self.edge_props, alias, "_type"),
            ExprKind::InputProperty(col) => {
                if !self.input_cols.contains(col) {
                    self.input_cols.push(col.clone());
                }
            }
            ExprKind::VariableProperty { var, prop } => {
                Self::push(&mut self.var_cols, var, prop)
            }
            _ => {}
        }
        for child in expr.children() {
            self.walk(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngqlc_ast::expr::{ExprKind, RelationalOp};

    #[test]
    fn collects_by_scope() {
        // $$.person.age > follow.degree
        let e = Expr::new(ExprKind::Relational {
            op: RelationalOp::Gt,
            left: Box::new(Expr::new(ExprKind::DestProperty {
                tag: "person".to_string(),
                prop: "age".to_string(),
            })),
            right: Box::new(Expr::new(ExprKind::EdgeProperty {
                edge: "follow".to_string(),
                prop: "degree".to_string(),
            })),
        });
        let refs = PropRefs::collect(&e);
        assert!(refs.needs_dst());
        assert_eq!(refs.dst_props, vec![("person".to_string(), "age".to_string())]);
        assert_eq!(
            refs.edge_props,
            vec![("follow".to_string(), "degree".to_string())]
        );
        assert!(refs.src_props.is_empty());
    }

    #[test]
    fn dedups_repeated_references() {
        let dst = Expr::new(ExprKind::DestProperty {
            tag: "person".to_string(),
            prop: "age".to_string(),
        });
        let both = Expr::new(ExprKind::Relational {
            op: RelationalOp::Eq,
            left: Box::new(dst.clone()),
            right: Box::new(dst),
        });
        let refs = PropRefs::collect(&both);
        assert_eq!(refs.dst_props.len(), 1);
    }
}
