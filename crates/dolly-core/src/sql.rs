use std::fmt;

/// Single-row insert with already-quoted values.
///
/// Renders as `INSERT INTO <table> ("c1","c2") VALUES ('v1','v2')`. Storage
/// adapters match on this exact shape, so column and value order follow the
/// order in which they were pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    columns: Vec<String>,
    values: Vec<String>,
}

impl InsertStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append a column with a value the adapter has already quoted.
    pub fn push(&mut self, column: impl Into<String>, quoted: impl Into<String>) {
        self.columns.push(column.into());
        self.values.push(quoted.into());
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(|column| format!("\"{column}\""))
            .collect::<Vec<_>>()
            .join(",");
        write!(
            f,
            "INSERT INTO {} ({}) VALUES ('{}')",
            self.table,
            columns,
            self.values.join("','")
        )
    }
}
