use crate::{IndexDef, Table, TableRef};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateTable {
    pub table: Table,
    pub if_not_exists: bool,
}

impl CreateTable {
    /// The table creation followed by the creation of its indices.
    pub fn statements(&self) -> Vec<super::Statement> {
        let mut result = vec![super::Statement::CreateTable(self.clone())];
        result.extend(self.table.def().indices.iter().map(|index| {
            super::Statement::CreateIndex(CreateIndex {
                table: self.table.clone(),
                index: index.clone(),
                if_not_exists: self.if_not_exists,
            })
        }));
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropTable {
    pub table: TableRef,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateIndex {
    pub table: Table,
    pub index: IndexDef,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateSchema {
    pub name: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropSchema {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
}

impl Table {
    pub fn create(&self) -> CreateTable {
        CreateTable {
            table: self.clone(),
            if_not_exists: false,
        }
    }

    pub fn create_if_not_exists(&self) -> CreateTable {
        CreateTable {
            table: self.clone(),
            if_not_exists: true,
        }
    }

    pub fn drop_table(&self, if_exists: bool) -> DropTable {
        DropTable {
            table: self.table_ref().clone(),
            if_exists,
            cascade: false,
        }
    }
}
