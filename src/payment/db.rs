//! Database operations for the payment ledger.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::PaymentId,
    member::{MemberId, avatar_url},
    payment::domain::{Amount, NewPayment, OwnerSummary, PaymentStatus, PaymentType,
        PaymentWithOwner},
};

/// Create the payment table in the database.
///
/// The UNIQUE constraint on `transaction_id` is what makes payment
/// submission idempotent: [create_payment] relies on the constraint instead
/// of checking for duplicates first, so two racing submissions cannot both
/// get through.
///
/// # Errors
/// Returns an error if the table or its index could not be created.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS payment (
            id INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL,
            payment_type TEXT NOT NULL,
            amount TEXT NOT NULL,
            transaction_id TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL,
            member_id INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_payment_created_at ON payment(created_at);",
    )?;

    Ok(())
}

/// Insert a validated payment owned by `member_id` and return its generated
/// ID. New payments always start out [PaymentStatus::Pending].
///
/// # Errors
/// Returns [Error::DuplicateTransaction] if the transaction ID is already in
/// the ledger, or [Error::SqlError] if another SQL error occurred.
pub fn create_payment(
    new_payment: NewPayment,
    member_id: MemberId,
    connection: &Connection,
) -> Result<PaymentId, Error> {
    connection.execute(
        "INSERT INTO payment (created_at, payment_type, amount, transaction_id, status, member_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            OffsetDateTime::now_utc(),
            new_payment.payment_type.as_str(),
            new_payment.amount.as_str(),
            new_payment.transaction_id,
            PaymentStatus::Pending.as_str(),
            member_id.as_i64(),
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

/// List every payment, newest first, each with its owner's display identity.
///
/// Owners are resolved at read time. A payment whose owner was deleted still
/// lists, with placeholder identity fields.
///
/// # Errors
/// Returns [Error::SqlError] if a SQL error occurred.
pub fn get_payments_with_owner(connection: &Connection) -> Result<Vec<PaymentWithOwner>, Error> {
    connection
        .prepare(
            "SELECT p.id, p.created_at, p.payment_type, p.amount, p.transaction_id, p.status,
                    m.display_name, m.email, m.profile_image
            FROM payment p
            LEFT JOIN member m ON m.id = p.member_id
            ORDER BY p.created_at DESC, p.id DESC",
        )?
        .query_map([], map_row_to_payment_with_owner)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Set the status of a payment, regardless of its current status.
///
/// # Errors
/// Returns [Error::NotFound] if no payment has the given ID, or
/// [Error::SqlError] if another SQL error occurred.
pub fn set_payment_status(
    id: PaymentId,
    status: PaymentStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE payment SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Permanently delete a payment. There is no undo.
///
/// # Errors
/// Returns [Error::NotFound] if no payment has the given ID, or
/// [Error::SqlError] if another SQL error occurred.
pub fn delete_payment(id: PaymentId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM payment WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row_to_payment_with_owner(row: &Row) -> Result<PaymentWithOwner, rusqlite::Error> {
    let id = row.get(0)?;
    let created_at: String = row.get(1)?;
    let raw_payment_type: String = row.get(2)?;
    let raw_amount: String = row.get(3)?;
    let transaction_id: String = row.get(4)?;
    let raw_status: String = row.get(5)?;
    let display_name: Option<String> = row.get(6)?;
    let email: Option<String> = row.get(7)?;
    let profile_image: Option<String> = row.get(8)?;

    let payment_type = PaymentType::parse(&raw_payment_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown payment type {raw_payment_type:?}").into(),
        )
    })?;
    let status = PaymentStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown payment status {raw_status:?}").into(),
        )
    })?;

    let owner = match (display_name, email) {
        (Some(name), Some(email)) => OwnerSummary {
            profile_image: avatar_url(&email, profile_image.as_deref()),
            name,
            email,
        },
        _ => OwnerSummary::placeholder(),
    };

    Ok(PaymentWithOwner {
        id,
        created_at,
        payment_type,
        amount: Amount::new_unchecked(&raw_amount),
        transaction_id,
        status,
        owner,
    })
}

#[cfg(test)]
mod payment_query_tests {
    use rusqlite::{Connection, params};

    use crate::{
        Error,
        database_id::PaymentId,
        db::initialize,
        member::{MemberId, Role},
        payment::domain::{Amount, NewPayment, PaymentStatus, PaymentType},
        test_utils::create_test_member,
    };

    use super::{
        create_payment, delete_payment, get_payments_with_owner, set_payment_status,
    };

    fn get_test_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        connection
    }

    fn sample_payment(transaction_id: &str) -> NewPayment {
        NewPayment {
            payment_type: PaymentType::Monthly,
            amount: Amount::new_unchecked("1500.00"),
            transaction_id: transaction_id.to_string(),
        }
    }

    #[track_caller]
    fn must_get_status(id: PaymentId, connection: &Connection) -> String {
        connection
            .query_one(
                "SELECT status FROM payment WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .expect("could not get payment status from database")
    }

    #[test]
    fn create_payment_stores_a_pending_payment() {
        let connection = get_test_db_connection();
        let member = create_test_member("anika", Role::Student, &connection);

        let id = create_payment(sample_payment("TX1"), member.id, &connection)
            .expect("Could not create payment");

        let (amount, transaction_id, member_id): (String, String, i64) = connection
            .query_one(
                "SELECT amount, transaction_id, member_id FROM payment WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("could not get payment from database");

        assert_eq!(amount, "1500.00");
        assert_eq!(transaction_id, "TX1");
        assert_eq!(member_id, member.id.as_i64());
        assert_eq!(must_get_status(id, &connection), "PENDING");
    }

    #[test]
    fn create_payment_rejects_duplicate_transaction_id() {
        let connection = get_test_db_connection();
        let anika = create_test_member("anika", Role::Student, &connection);
        let rafiq = create_test_member("rafiq", Role::Student, &connection);
        create_payment(sample_payment("TX1"), anika.id, &connection)
            .expect("Could not create payment");

        // A different member and amount must not get around the constraint.
        let duplicate = create_payment(
            NewPayment {
                amount: Amount::new_unchecked("50.00"),
                ..sample_payment("TX1")
            },
            rafiq.id,
            &connection,
        );

        assert_eq!(duplicate, Err(Error::DuplicateTransaction));
    }

    #[test]
    fn duplicate_transaction_id_is_rejected_in_either_order() {
        let connection = get_test_db_connection();
        let anika = create_test_member("anika", Role::Student, &connection);
        let rafiq = create_test_member("rafiq", Role::Student, &connection);

        create_payment(sample_payment("TX2"), rafiq.id, &connection)
            .expect("Could not create payment");
        let duplicate = create_payment(sample_payment("TX2"), anika.id, &connection);

        assert_eq!(duplicate, Err(Error::DuplicateTransaction));

        let count: i64 = connection
            .query_one(
                "SELECT COUNT(*) FROM payment WHERE transaction_id = 'TX2'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn get_payments_with_owner_lists_newest_first() {
        let connection = get_test_db_connection();
        let member = create_test_member("anika", Role::Student, &connection);

        let first = create_payment(sample_payment("TX1"), member.id, &connection).unwrap();
        let second = create_payment(sample_payment("TX2"), member.id, &connection).unwrap();
        let third = create_payment(sample_payment("TX3"), member.id, &connection).unwrap();

        let payments = get_payments_with_owner(&connection).expect("Could not list payments");

        let ids: Vec<_> = payments.iter().map(|payment| payment.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[test]
    fn get_payments_with_owner_attaches_owner_identity() {
        let connection = get_test_db_connection();
        let member = create_test_member("anika", Role::Student, &connection);

        create_payment(sample_payment("TX1"), member.id, &connection).unwrap();

        let payments = get_payments_with_owner(&connection).expect("Could not list payments");

        assert_eq!(payments.len(), 1);
        let owner = &payments[0].owner;
        assert_eq!(owner.name, member.display_name);
        assert_eq!(owner.email, member.email);
        // No uploaded image, so the owner gets a Gravatar fallback.
        assert!(
            owner
                .profile_image
                .starts_with("https://www.gravatar.com/avatar/"),
            "unexpected profile image {:?}",
            owner.profile_image
        );
    }

    #[test]
    fn get_payments_with_owner_keeps_payments_of_deleted_members() {
        let connection = get_test_db_connection();
        let member = create_test_member("anika", Role::Student, &connection);
        create_payment(sample_payment("TX1"), member.id, &connection).unwrap();
        connection
            .execute("DELETE FROM member WHERE id = ?1", [member.id.as_i64()])
            .expect("could not delete member");

        let payments = get_payments_with_owner(&connection).expect("Could not list payments");

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].owner.name, "Deleted member");
        assert_eq!(payments[0].owner.email, "");
    }

    #[test]
    fn get_payments_with_owner_returns_empty_list_for_empty_ledger() {
        let connection = get_test_db_connection();

        let payments = get_payments_with_owner(&connection).expect("Could not list payments");

        assert!(payments.is_empty());
    }

    #[test]
    fn set_payment_status_overwrites_a_rejected_status() {
        let connection = get_test_db_connection();
        let member = create_test_member("anika", Role::Student, &connection);
        let id = create_payment(sample_payment("TX1"), member.id, &connection).unwrap();

        set_payment_status(id, PaymentStatus::Rejected, &connection)
            .expect("Could not reject payment");
        set_payment_status(id, PaymentStatus::Confirmed, &connection)
            .expect("Could not confirm payment");

        assert_eq!(must_get_status(id, &connection), "CONFIRMED");
    }

    #[test]
    fn set_payment_status_fails_for_missing_payment() {
        let connection = get_test_db_connection();

        let result = set_payment_status(999, PaymentStatus::Confirmed, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_payment_removes_the_row() {
        let connection = get_test_db_connection();
        let member = create_test_member("anika", Role::Student, &connection);
        let id = create_payment(sample_payment("TX1"), member.id, &connection).unwrap();

        delete_payment(id, &connection).expect("Could not delete payment");

        let count: i64 = connection
            .query_one("SELECT COUNT(*) FROM payment", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn delete_payment_fails_for_missing_payment() {
        let connection = get_test_db_connection();

        let result = delete_payment(999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
