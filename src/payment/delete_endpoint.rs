//! Defines the admin endpoint for deleting a payment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::PaymentId, payment::db::delete_payment};

/// The state needed to delete a payment.
#[derive(Debug, Clone)]
pub struct DeletePaymentState {
    /// The database connection for the payment ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletePaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that permanently deletes a payment.
///
/// Deletion is a hard remove with no undo. Responds 204 No Content on
/// success and 404 Not Found if no payment has the given ID.
pub async fn delete_payment_endpoint(
    State(state): State<DeletePaymentState>,
    Path(payment_id): Path<PaymentId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_payment(payment_id, &connection) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error @ Error::NotFound) => error.into_response(),
        Err(error) => {
            tracing::error!("Could not delete payment {payment_id}: {error}");
            error.into_response()
        }
    }
}
