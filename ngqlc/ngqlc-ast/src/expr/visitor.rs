//! A read-only visitor over the expression tree.
//!
//! Default methods walk children, so an implementation only overrides the
//! kinds it cares about. Used by the validator for type deduction, property
//! collection and scope checks.

use super::{Expr, ExprKind};

pub trait ExprVisitor {
    /// Called for every node before its kind-specific hook.
    fn visit_expr(&mut self, expr: &Expr) {
        self.visit_kind(expr);
        walk_expr(self, expr);
    }

    fn visit_kind(&mut self, expr: &Expr) {
        use ExprKind::*;
        match &expr.kind {
            Constant(_) => self.visit_constant(expr),
            Label(_) | LabelAttribute { .. } => self.visit_unresolved(expr),
            Variable(_) | VariableProperty { .. } => self.visit_variable(expr),
            InputProperty(_) | Column(_) => self.visit_input(expr),
            SourceProperty { .. } | DestProperty { .. } | VertexRef(_) => {
                self.visit_vertex_prop(expr)
            }
            EdgeProperty { .. } | TagProperty { .. } | EdgeSrc(_) | EdgeDst(_) | EdgeRank(_)
            | EdgeTypeId(_) | EdgeRef => self.visit_edge_prop(expr),
            Aggregate { .. } => self.visit_aggregate(expr),
            FunctionCall { .. } => self.visit_function_call(expr),
            _ => {}
        }
    }

    fn visit_constant(&mut self, _expr: &Expr) {}
    fn visit_unresolved(&mut self, _expr: &Expr) {}
    fn visit_variable(&mut self, _expr: &Expr) {}
    fn visit_input(&mut self, _expr: &Expr) {}
    fn visit_vertex_prop(&mut self, _expr: &Expr) {}
    fn visit_edge_prop(&mut self, _expr: &Expr) {}
    fn visit_aggregate(&mut self, _expr: &Expr) {}
    fn visit_function_call(&mut self, _expr: &Expr) {}
}

pub fn walk_expr<V: ExprVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    for child in expr.children() {
        visitor.visit_expr(child);
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ArithmeticOp, ExprKind};
    use super::*;

    #[derive(Default)]
    struct Counter {
        constants: usize,
        inputs: usize,
    }

    impl ExprVisitor for Counter {
        fn visit_constant(&mut self, _expr: &Expr) {
            self.constants += 1;
        }
        fn visit_input(&mut self, _expr: &Expr) {
            self.inputs += 1;
        }
    }

    #[test]
    fn walk_reaches_nested_nodes() {
        let e = Expr::new(ExprKind::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Expr::constant(1i64)),
            right: Box::new(Expr::new(ExprKind::Arithmetic {
                op: ArithmeticOp::Multiply,
                left: Box::new(Expr::new(ExprKind::InputProperty("x".to_string()))),
                right: Box::new(Expr::constant(2i64)),
            })),
        });
        let mut counter = Counter::default();
        counter.visit_expr(&e);
        assert_eq!(counter.constants, 2);
        assert_eq!(counter.inputs, 1);
    }
}
