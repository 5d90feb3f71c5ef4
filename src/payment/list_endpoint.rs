//! Defines the admin endpoint for listing the payment ledger.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, payment::db::get_payments_with_owner};

/// The state needed to list payments.
#[derive(Debug, Clone)]
pub struct ListPaymentsState {
    /// The database connection for the payment ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListPaymentsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists every payment, newest first, with each
/// owner's display identity attached.
pub async fn list_payments_endpoint(State(state): State<ListPaymentsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_payments_with_owner(&connection) {
        Ok(payments) => Json(payments).into_response(),
        Err(error) => {
            tracing::error!("Could not list payments: {error}");
            error.into_response()
        }
    }
}
