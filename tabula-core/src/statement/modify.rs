use crate::{AsValue, Assignment, ColumnDef, Condition, Expr, Generated, Table};
use std::sync::Arc;
use uuid::Uuid;

/// An `INSERT` of one or more rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Insert {
    pub table: Table,
    pub rows: Vec<Vec<Assignment>>,
    /// Update the existing row when the primary key is already present.
    pub upsert: bool,
    pub returning: Vec<Expr>,
}

impl Insert {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            rows: Vec::new(),
            upsert: false,
            returning: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// Columns the row omits receive their client default or their client generated value here,
    /// the remaining ones are left to the database.
    pub fn row(mut self, values: impl IntoIterator<Item = Assignment>) -> Self {
        let mut row: Vec<Assignment> = Vec::new();
        for assignment in values {
            match row.iter_mut().find(|v| v.column == assignment.column) {
                Some(existing) => *existing = assignment,
                None => row.push(assignment),
            }
        }
        for column in self.table.columns() {
            if row.iter().any(|v| &v.column == column) {
                continue;
            }
            let value = match (&column.client_default, column.generated) {
                (Some(default), ..) => default.produce(),
                (None, Generated::Uuid) => Uuid::new_v4().as_value(),
                _ => continue,
            };
            row.push(Assignment {
                column: column.clone(),
                value: Expr::Param(value, column.column_type),
            });
        }
        self.rows.push(row);
        self
    }

    pub fn on_conflict_update(mut self) -> Self {
        self.upsert = true;
        self
    }

    pub fn returning(mut self, exprs: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.returning = exprs.into_iter().map(Into::into).collect();
        self
    }

    /// Every column assigned by at least one row, in table order.
    pub fn columns(&self) -> Vec<Arc<ColumnDef>> {
        let mut result: Vec<Arc<ColumnDef>> = self
            .table
            .columns()
            .iter()
            .filter(|c| self.rows.iter().flatten().any(|v| &v.column == *c))
            .cloned()
            .collect();
        // Columns of other tables are kept so that validation can report them
        for assignment in self.rows.iter().flatten() {
            if !result.contains(&assignment.column) {
                result.push(assignment.column.clone());
            }
        }
        result
    }

    /// Value assigned to `column` by the row at `index`.
    pub fn value(&self, index: usize, column: &ColumnDef) -> Option<&Expr> {
        self.rows
            .get(index)?
            .iter()
            .find(|v| *v.column == *column)
            .map(|v| &v.value)
    }
}

/// An `UPDATE` of the rows matching the condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Update {
    pub table: Table,
    pub assignments: Vec<Assignment>,
    pub predicate: Option<Expr>,
}

impl Update {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            assignments: Vec::new(),
            predicate: None,
        }
    }

    pub fn set(mut self, assignment: Assignment) -> Self {
        match self
            .assignments
            .iter_mut()
            .find(|v| v.column == assignment.column)
        {
            Some(existing) => *existing = assignment,
            None => self.assignments.push(assignment),
        }
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.predicate = Some(condition.into_expr());
        self
    }
}

/// A `DELETE` of the rows matching the condition, all the rows when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delete {
    pub table: Table,
    pub predicate: Option<Expr>,
}

impl Delete {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            predicate: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.predicate = Some(condition.into_expr());
        self
    }
}

impl Table {
    pub fn insert(&self) -> Insert {
        Insert::new(self)
    }

    pub fn update(&self) -> Update {
        Update::new(self)
    }

    pub fn delete(&self) -> Delete {
        Delete::new(self)
    }
}
