mod ddl;
mod modify;
mod query;

pub use ddl::*;
pub use modify::*;
pub use query::*;

/// Anything the compiler turns into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Query(Query),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    CreateTable(CreateTable),
    DropTable(DropTable),
    CreateIndex(CreateIndex),
    CreateSchema(CreateSchema),
    DropSchema(DropSchema),
}

impl Statement {
    /// The statement produces rows.
    pub fn is_query(&self) -> bool {
        match self {
            Statement::Query(..) => true,
            Statement::Insert(v) => !v.returning.is_empty(),
            _ => false,
        }
    }
}

macro_rules! impl_from_statement {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for Statement {
                fn from(value: $variant) -> Self {
                    Statement::$variant(value)
                }
            }
        )+
    };
}

impl_from_statement!(
    Query,
    Insert,
    Update,
    Delete,
    CreateTable,
    DropTable,
    CreateIndex,
    CreateSchema,
    DropSchema
);
