use crate::{Error, Prepared, Result, truncate_long};
use std::fmt::{self, Display};

/// What a connection runs: SQL text, or a statement it already prepared.
#[derive(Debug)]
pub enum Executable<P: Prepared> {
    /// Unprepared SQL text, without parameters.
    Raw(String),
    Prepared(P),
}

impl<P: Prepared> Executable<P> {
    pub fn is_prepared(&self) -> bool {
        matches!(self, Executable::Prepared(..))
    }

    pub fn prepared_mut(&mut self) -> Result<&mut P> {
        match self {
            Executable::Prepared(prepared) => Ok(prepared),
            Executable::Raw(..) => Err(Error::msg("Cannot bind the parameters of a raw query")),
        }
    }
}

impl<P: Prepared> From<String> for Executable<P> {
    fn from(value: String) -> Self {
        Executable::Raw(value)
    }
}

impl<P: Prepared> From<&str> for Executable<P> {
    fn from(value: &str) -> Self {
        Executable::Raw(value.to_owned())
    }
}

impl<P: Prepared> Display for Executable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executable::Raw(sql) => f.write_str(&truncate_long!(sql)),
            Executable::Prepared(prepared) => prepared.fmt(f),
        }
    }
}
