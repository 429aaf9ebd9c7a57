mod context;
mod dialects;
mod sql_writer;

pub use context::*;
pub use dialects::*;
pub use sql_writer::*;
