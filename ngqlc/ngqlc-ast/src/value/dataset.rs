use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::Value;

pub type Row = Vec<Value>;

/// A named-column table of values; the unit of dataflow between piped
/// sentences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSet {
    pub col_names: Vec<String>,
    pub rows: Vec<Row>,
}

impl DataSet {
    pub fn new(col_names: Vec<String>) -> DataSet {
        DataSet {
            col_names,
            rows: Vec::new(),
        }
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.col_names.iter().position(|c| c == name)
    }

    /// Bounds-checked cell access.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn push_row(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.col_names.len());
        self.rows.push(row);
    }
}

impl Display for DataSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.col_names.join("|"))?;
        for row in &self.rows {
            write!(f, "\n")?;
            for (i, v) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, "|")?;
                }
                write!(f, "{v}")?;
            }
        }
        Ok(())
    }
}
