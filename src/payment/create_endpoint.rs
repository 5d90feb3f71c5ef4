//! Defines the endpoint for recording a new fee payment.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    auth::Principal,
    payment::{db::create_payment, domain::PaymentForm},
};

/// The state needed to record a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentState {
    /// The database connection for the payment ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a payment owned by the logged-in member.
///
/// The owner always comes from the session principal. The request body
/// cannot assign the payment to someone else.
///
/// # Responses
/// - 201 Created with the new payment's ID on success.
/// - 409 Conflict if the transaction ID is already in the ledger.
/// - 422 Unprocessable Entity if any field fails validation.
pub async fn create_payment_endpoint(
    State(state): State<CreatePaymentState>,
    Extension(principal): Extension<Principal>,
    Json(form): Json<PaymentForm>,
) -> Response {
    let new_payment = match form.validate() {
        Ok(new_payment) => new_payment,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_payment(new_payment, principal.id, &connection) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(error @ Error::DuplicateTransaction) => error.into_response(),
        Err(error) => {
            tracing::error!("Could not record payment: {error}");
            error.into_response()
        }
    }
}
