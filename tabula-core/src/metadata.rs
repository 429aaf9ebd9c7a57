use crate::{Dialect, TableRef};

/// Catalog description of a database, as a connection reports it.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseMetadata {
    pub tables: Vec<TableMetadata>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
    pub indices: Vec<IndexMetadata>,
    pub foreign_keys: Vec<ForeignKeyMetadata>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Type as declared in the catalog.
    pub sql_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct IndexMetadata {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyMetadata {
    pub columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
}

impl DatabaseMetadata {
    /// Table stored under the declared name, compared with the catalog rules of the dialect.
    pub fn table(&self, dialect: Dialect, table: &TableRef) -> Option<&TableMetadata> {
        let identifiers = dialect.identifier_manager();
        self.tables.iter().find(|v| {
            identifiers.matches(&table.name, &v.name)
                && (table.schema.is_empty()
                    || v.schema.is_empty()
                    || identifiers.matches(&table.schema, &v.schema))
        })
    }
}

impl TableMetadata {
    pub fn column(&self, dialect: Dialect, name: &str) -> Option<&ColumnMetadata> {
        let identifiers = dialect.identifier_manager();
        self.columns
            .iter()
            .find(|v| identifiers.matches(name, &v.name))
    }
}
