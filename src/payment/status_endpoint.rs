//! Defines the admin endpoints for confirming and rejecting payments.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::PaymentId,
    payment::{db::set_payment_status, domain::PaymentStatus},
};

/// The state needed to review a payment.
#[derive(Debug, Clone)]
pub struct PaymentReviewState {
    /// The database connection for the payment ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PaymentReviewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that marks a payment CONFIRMED.
///
/// The transition is unconditional: confirming an already rejected payment
/// overwrites the rejection.
pub async fn confirm_payment_endpoint(
    State(state): State<PaymentReviewState>,
    Path(payment_id): Path<PaymentId>,
) -> Response {
    review_payment(state, payment_id, PaymentStatus::Confirmed)
}

/// A route handler that marks a payment REJECTED.
pub async fn reject_payment_endpoint(
    State(state): State<PaymentReviewState>,
    Path(payment_id): Path<PaymentId>,
) -> Response {
    review_payment(state, payment_id, PaymentStatus::Rejected)
}

fn review_payment(
    state: PaymentReviewState,
    payment_id: PaymentId,
    status: PaymentStatus,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match set_payment_status(payment_id, status, &connection) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error @ Error::NotFound) => error.into_response(),
        Err(error) => {
            tracing::error!("Could not set payment {payment_id} to {status}: {error}");
            error.into_response()
        }
    }
}
