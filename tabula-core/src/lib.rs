mod as_value;
mod codec;
mod column;
mod compiler;
mod config;
mod connection;
mod database;
mod dialect;
mod error;
mod executable;
mod expression;
mod identifier;
mod identity;
mod metadata;
mod prepared;
mod record;
mod row;
mod statement;
mod table;
mod transaction;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use codec::*;
pub use column::*;
pub use compiler::*;
pub use config::*;
pub use connection::*;
pub use database::*;
pub use dialect::*;
pub use error::*;
pub use executable::*;
pub use expression::*;
pub use identifier::*;
pub use identity::*;
pub use metadata::*;
pub use prepared::*;
pub use record::*;
pub use row::*;
pub use statement::*;
pub use table::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub use writer::SqlWriter;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
