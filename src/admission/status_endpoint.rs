//! Defines the admin endpoints for approving and rejecting admissions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    admission::{db::set_admission_status, domain::AdmissionStatus},
    database_id::AdmissionId,
};

/// The state needed to review an admission application.
#[derive(Debug, Clone)]
pub struct AdmissionReviewState {
    /// The database connection for admission applications.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdmissionReviewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that marks an admission application APPROVED.
///
/// The transition is unconditional: approving an already rejected
/// application overwrites the rejection.
pub async fn approve_admission_endpoint(
    State(state): State<AdmissionReviewState>,
    Path(admission_id): Path<AdmissionId>,
) -> Response {
    review_admission(state, admission_id, AdmissionStatus::Approved)
}

/// A route handler that marks an admission application REJECTED.
pub async fn reject_admission_endpoint(
    State(state): State<AdmissionReviewState>,
    Path(admission_id): Path<AdmissionId>,
) -> Response {
    review_admission(state, admission_id, AdmissionStatus::Rejected)
}

fn review_admission(
    state: AdmissionReviewState,
    admission_id: AdmissionId,
    status: AdmissionStatus,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match set_admission_status(admission_id, status, &connection) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error @ Error::NotFound) => error.into_response(),
        Err(error) => {
            tracing::error!("Could not set admission {admission_id} to {status}: {error}");
            error.into_response()
        }
    }
}
