mod catalog;
mod codecs;
mod crud;
mod identity;
pub mod mock;
mod transactions;

pub use crate::{
    catalog::catalog,
    codecs::codecs,
    crud::crud,
    identity::identity,
    mock::{MockCall, MockConnection, MockPrepared, MockProvider},
    transactions::transactions,
};
use log::LevelFilter;
use std::env;
use tabula::{ConnectionProvider, Database};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every scenario against the database, the scenarios create and drop their own tables.
pub async fn execute_tests<P: ConnectionProvider>(database: &Database<P>) {
    crud(database).await;
    identity(database).await;
    transactions(database).await;
    codecs(database).await;
    catalog(database).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
