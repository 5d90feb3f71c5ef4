//! Defines the public endpoint for reporting an admission fee payment.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, admission::db::attach_payment_reference, database_id::AdmissionId,
    validation::FieldErrors,
};

/// The state needed to attach a payment reference to an application.
#[derive(Debug, Clone)]
pub struct AdmissionPaymentState {
    /// The database connection for admission applications.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdmissionPaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a report-admission-payment request.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentReferenceForm {
    /// The bKash transaction reference for the admission fee.
    pub transaction_id: String,
}

impl PaymentReferenceForm {
    /// Validate the form, returning the trimmed transaction reference.
    pub fn validate(self) -> Result<String, Error> {
        let transaction_id = self.transaction_id.trim().to_string();
        if transaction_id.is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert("transactionId", "Transaction ID must not be empty");
            return Err(Error::Validation(errors));
        }

        Ok(transaction_id)
    }
}

/// A route handler for recording the bKash reference of an admission fee.
///
/// This endpoint is public because applicants pay before they have an
/// account. The reference can only be set once per application, so a typo'd
/// application ID cannot silently overwrite someone else's reference.
///
/// # Responses
/// - 200 OK with the application's ID on success.
/// - 404 Not Found if no application has the given ID.
/// - 409 Conflict if the application already has a payment reference.
/// - 422 Unprocessable Entity if the transaction ID is blank.
pub async fn admission_payment_endpoint(
    State(state): State<AdmissionPaymentState>,
    Path(admission_id): Path<AdmissionId>,
    Json(form): Json<PaymentReferenceForm>,
) -> Response {
    let transaction_id = match form.validate() {
        Ok(transaction_id) => transaction_id,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match attach_payment_reference(admission_id, &transaction_id, &connection) {
        Ok(()) => (StatusCode::OK, Json(json!({ "id": admission_id }))).into_response(),
        Err(error @ (Error::NotFound | Error::PaymentReferenceAlreadySet)) => {
            error.into_response()
        }
        Err(error) => {
            tracing::error!(
                "Could not attach payment reference to admission {admission_id}: {error}"
            );
            error.into_response()
        }
    }
}
