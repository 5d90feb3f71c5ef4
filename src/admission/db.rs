//! Database operations for admission applications.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    admission::domain::{AdmissionRecord, AdmissionStatus, NewAdmission},
    database_id::AdmissionId,
};

/// Create the admission table in the database.
///
/// `bkash_transaction_id` starts out NULL and is set at most once by
/// [attach_payment_reference].
///
/// # Errors
/// Returns an error if the table or its index could not be created.
pub fn create_admission_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS admission (
            id INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL,
            name TEXT NOT NULL,
            father_name TEXT NOT NULL,
            mother_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            gender TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            status TEXT NOT NULL,
            bkash_transaction_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_admission_created_at ON admission(created_at);",
    )?;

    Ok(())
}

/// Insert a validated admission application and return its generated ID.
/// New applications always start out [AdmissionStatus::Pending] with no
/// payment reference.
///
/// # Errors
/// Returns [Error::SqlError] if a SQL error occurred.
pub fn create_admission(
    new_admission: NewAdmission,
    connection: &Connection,
) -> Result<AdmissionId, Error> {
    connection.execute(
        "INSERT INTO admission
            (created_at, name, father_name, mother_name, email, phone, gender, date_of_birth,
            status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            OffsetDateTime::now_utc(),
            new_admission.name,
            new_admission.father_name,
            new_admission.mother_name,
            new_admission.email,
            new_admission.phone,
            new_admission.gender,
            new_admission.date_of_birth,
            AdmissionStatus::Pending.as_str(),
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

/// List every admission application, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if a SQL error occurred.
pub fn get_admissions(connection: &Connection) -> Result<Vec<AdmissionRecord>, Error> {
    connection
        .prepare(
            "SELECT id, created_at, name, father_name, mother_name, email, phone, gender,
                date_of_birth, status, bkash_transaction_id
            FROM admission
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([], map_row_to_admission)?
        .map(|maybe_admission| maybe_admission.map_err(|error| error.into()))
        .collect()
}

/// Set the status of an admission application, regardless of its current
/// status.
///
/// # Errors
/// Returns [Error::NotFound] if no application has the given ID, or
/// [Error::SqlError] if another SQL error occurred.
pub fn set_admission_status(
    id: AdmissionId,
    status: AdmissionStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE admission SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Record the bKash transaction reference for an application's admission fee.
///
/// The reference can be set exactly once. The conditional UPDATE makes the
/// write atomic: two racing requests cannot both set it.
///
/// # Errors
/// Returns [Error::NotFound] if no application has the given ID,
/// [Error::PaymentReferenceAlreadySet] if the application already has a
/// reference, or [Error::SqlError] if another SQL error occurred.
pub fn attach_payment_reference(
    id: AdmissionId,
    transaction_id: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE admission SET bkash_transaction_id = ?1
        WHERE id = ?2 AND bkash_transaction_id IS NULL",
        params![transaction_id, id],
    )?;

    if rows_affected == 0 {
        // Zero rows means either no such application or one that already has
        // a reference. Tell them apart with a second query.
        return if admission_exists(id, connection)? {
            Err(Error::PaymentReferenceAlreadySet)
        } else {
            Err(Error::NotFound)
        };
    }

    Ok(())
}

fn admission_exists(id: AdmissionId, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_one(
        "SELECT COUNT(*) FROM admission WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

fn map_row_to_admission(row: &Row) -> Result<AdmissionRecord, rusqlite::Error> {
    let raw_status: String = row.get(9)?;
    let status = AdmissionStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            rusqlite::types::Type::Text,
            format!("unknown admission status {raw_status:?}").into(),
        )
    })?;

    Ok(AdmissionRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        name: row.get(2)?,
        father_name: row.get(3)?,
        mother_name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        gender: row.get(7)?,
        date_of_birth: row.get(8)?,
        status,
        bkash_transaction_id: row.get(10)?,
    })
}
