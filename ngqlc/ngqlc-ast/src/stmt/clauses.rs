//! Clause types shared across sentence kinds.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// `N STEPS`, `M TO N STEPS` or the legacy `UPTO N STEPS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepClause {
    pub m_steps: u32,
    pub n_steps: Option<u32>,
    pub is_upto: bool,
}

impl StepClause {
    pub fn single(n: u32) -> Self {
        StepClause {
            m_steps: n,
            n_steps: None,
            is_upto: false,
        }
    }

    pub fn range(m: u32, n: u32) -> Self {
        StepClause {
            m_steps: m,
            n_steps: Some(n),
            is_upto: false,
        }
    }

    pub fn upto(n: u32) -> Self {
        StepClause {
            m_steps: n,
            n_steps: None,
            is_upto: true,
        }
    }

    pub fn is_single(&self) -> bool {
        self.n_steps.is_none() && !self.is_upto
    }

    pub fn max_steps(&self) -> u32 {
        self.n_steps.unwrap_or(self.m_steps)
    }
}

impl Default for StepClause {
    fn default() -> Self {
        StepClause::single(1)
    }
}

impl Display for StepClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_upto {
            write!(f, "UPTO {} STEPS", self.m_steps)
        } else if let Some(n) = self.n_steps {
            write!(f, "{} TO {n} STEPS", self.m_steps)
        } else {
            write!(f, "{} STEPS", self.m_steps)
        }
    }
}

/// `FROM`/`TO`: either literal vid expressions or a single input/variable
/// property reference. The two forms never mix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VerticesClause {
    pub vids: Vec<Expr>,
    pub ref_expr: Option<Expr>,
}

impl VerticesClause {
    pub fn from_vids(vids: Vec<Expr>) -> Self {
        VerticesClause {
            vids,
            ref_expr: None,
        }
    }

    pub fn from_ref(expr: Expr) -> Self {
        VerticesClause {
            vids: Vec::new(),
            ref_expr: Some(expr),
        }
    }

    pub fn is_ref(&self) -> bool {
        self.ref_expr.is_some()
    }
}

impl Display for VerticesClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(r) = &self.ref_expr {
            return write!(f, "{r}");
        }
        for (i, vid) in self.vids.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{vid}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeDirection {
    #[default]
    Out,
    In,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverEdge {
    pub edge: String,
    pub alias: Option<String>,
}

impl OverEdge {
    pub fn new(edge: &str) -> Self {
        OverEdge {
            edge: edge.to_string(),
            alias: None,
        }
    }

    /// The name predicates refer to this edge by.
    pub fn alias_or_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.edge)
    }
}

/// `OVER edge [AS alias], ... [REVERSELY | BIDIRECT]` or `OVER *`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverClause {
    pub edges: Vec<OverEdge>,
    pub is_all: bool,
    pub direction: EdgeDirection,
}

impl OverClause {
    pub fn all() -> Self {
        OverClause {
            edges: Vec::new(),
            is_all: true,
            direction: EdgeDirection::Out,
        }
    }

    pub fn over(edges: &[&str]) -> Self {
        OverClause {
            edges: edges.iter().map(|e| OverEdge::new(e)).collect(),
            is_all: false,
            direction: EdgeDirection::Out,
        }
    }
}

impl Display for OverClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "OVER ")?;
        if self.is_all {
            write!(f, "*")?;
        } else {
            for (i, e) in self.edges.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", e.edge)?;
                if let Some(alias) = &e.alias {
                    write!(f, " AS {alias}")?;
                }
            }
        }
        match self.direction {
            EdgeDirection::Out => Ok(()),
            EdgeDirection::In => write!(f, " REVERSELY"),
            EdgeDirection::Both => write!(f, " BIDIRECT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub filter: Expr,
}

impl WhereClause {
    pub fn new(filter: Expr) -> Self {
        WhereClause { filter }
    }
}

impl Display for WhereClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "WHERE {}", self.filter)
    }
}

/// The update-sentence condition; same shape as WHERE, different keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub filter: Expr,
}

impl Display for WhenClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "WHEN {}", self.filter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldColumn {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl YieldColumn {
    pub fn new(expr: Expr) -> Self {
        YieldColumn { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: &str) -> Self {
        YieldColumn {
            expr,
            alias: Some(alias.to_string()),
        }
    }

    /// The output column name: the alias if given, the printed expression
    /// otherwise.
    pub fn name(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| self.expr.to_string())
    }
}

impl Display for YieldColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct YieldClause {
    pub columns: Vec<YieldColumn>,
    pub distinct: bool,
}

impl YieldClause {
    pub fn new(columns: Vec<YieldColumn>) -> Self {
        YieldClause {
            columns,
            distinct: false,
        }
    }

    pub fn col_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

impl Display for YieldClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "YIELD ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{col}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupClause {
    pub keys: Vec<YieldColumn>,
}

impl Display for GroupClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "GROUP BY ")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    #[default]
    Ascend,
    Descend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFactor {
    pub expr: Expr,
    pub direction: OrderDirection,
}

impl Display for OrderFactor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            OrderDirection::Ascend => write!(f, " ASC"),
            OrderDirection::Descend => write!(f, " DESC"),
        }
    }
}

/// `LIMIT n` / `SAMPLE [..]` trailing a traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncateClause {
    pub is_sample: bool,
    pub expr: Expr,
}

impl Display for TruncateClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_sample {
            write!(f, "SAMPLE {}", self.expr)
        } else {
            write!(f, "LIMIT {}", self.expr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, ExprKind};

    #[test]
    fn step_clause_forms() {
        assert_eq!(StepClause::single(2).to_string(), "2 STEPS");
        assert_eq!(StepClause::range(1, 3).to_string(), "1 TO 3 STEPS");
        assert_eq!(StepClause::upto(3).to_string(), "UPTO 3 STEPS");
        assert_eq!(StepClause::range(1, 3).max_steps(), 3);
        assert!(StepClause::default().is_single());
    }

    #[test]
    fn over_clause_direction_suffix() {
        let mut over = OverClause::over(&["follow"]);
        assert_eq!(over.to_string(), "OVER follow");
        over.direction = EdgeDirection::In;
        assert_eq!(over.to_string(), "OVER follow REVERSELY");
        assert_eq!(OverClause::all().to_string(), "OVER *");
    }

    #[test]
    fn yield_column_names() {
        let plain = YieldColumn::new(Expr::new(ExprKind::InputProperty("x".to_string())));
        assert_eq!(plain.name(), "$-.x");
        let aliased = YieldColumn::aliased(
            Expr::new(ExprKind::InputProperty("x".to_string())),
            "renamed",
        );
        assert_eq!(aliased.name(), "renamed");
        assert_eq!(aliased.to_string(), "$-.x AS renamed");
    }
}
