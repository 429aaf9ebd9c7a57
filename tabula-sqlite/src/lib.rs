mod cbox;
mod connection;
mod extract;
mod prepared;
mod provider;

pub(crate) use cbox::*;
pub use connection::*;
pub use prepared::*;
pub use provider::*;
