//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, admission::create_admission_table, member::create_member_table,
    payment::create_payment_table,
};

/// Create the application's tables if they do not exist yet.
///
/// The tables are created in a single exclusive transaction so that two
/// server processes pointed at the same database file cannot race each other
/// on start up.
///
/// # Errors
/// Returns an error if any table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_member_table(&transaction)?;
    create_payment_table(&transaction)?;
    create_admission_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
