use crate::{CodecContext, ColumnType, Value};
use std::ops::{Deref, DerefMut};

/// Clause being written, some constructs render differently depending on it.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlCreateIndex,
    SqlCreateSchema,
    SqlCreateTable,
    SqlCreateTableDefault,
    SqlCreateTablePrimaryKey,
    SqlCreateTableUnique,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlDropSchema,
    SqlDropTable,
    SqlInsertInto,
    SqlInsertIntoOnConflict,
    SqlInsertIntoValues,
    SqlJoin,
    SqlReturning,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectHaving,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdateSet,
    SqlUpdateWhere,
}

/// State carried while writing one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub fragment: Fragment,
    pub qualify_columns: bool,
    /// Values are rendered as literals instead of placeholders.
    pub inline: bool,
    pub codec: CodecContext,
    /// Parameters in placeholder order.
    pub params: Vec<(Value, ColumnType)>,
}

impl Context {
    pub fn new(codec: CodecContext) -> Self {
        Self {
            fragment: Fragment::None,
            qualify_columns: false,
            inline: false,
            codec,
            params: Vec::new(),
        }
    }

    pub fn inline(codec: CodecContext) -> Self {
        Self {
            inline: true,
            ..Self::new(codec)
        }
    }

    /// Change the fragment until the returned guard is dropped, which also restores the column
    /// qualification and the inline mode.
    pub fn switch_fragment<'s>(&'s mut self, fragment: Fragment) -> ContextUpdater<'s> {
        let previous = (self.fragment, self.qualify_columns, self.inline);
        self.fragment = fragment;
        ContextUpdater {
            current: self,
            previous,
        }
    }
}

pub struct ContextUpdater<'a> {
    pub current: &'a mut Context,
    previous: (Fragment, bool, bool),
}

impl<'a> Deref for ContextUpdater<'a> {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        self.current
    }
}

impl<'a> DerefMut for ContextUpdater<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.current
    }
}

impl<'a> Drop for ContextUpdater<'a> {
    fn drop(&mut self) {
        (
            self.current.fragment,
            self.current.qualify_columns,
            self.current.inline,
        ) = self.previous;
    }
}
