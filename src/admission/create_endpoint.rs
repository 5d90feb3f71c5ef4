//! Defines the public endpoint for submitting an admission application.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    admission::{db::create_admission, domain::AdmissionForm},
};

/// The state needed to record an admission application.
#[derive(Debug, Clone)]
pub struct CreateAdmissionState {
    /// The database connection for admission applications.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAdmissionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for submitting an admission application.
///
/// This endpoint is public: applicants do not have an account yet.
///
/// # Responses
/// - 201 Created with the new application's ID on success.
/// - 422 Unprocessable Entity if any field fails validation.
pub async fn create_admission_endpoint(
    State(state): State<CreateAdmissionState>,
    Json(form): Json<AdmissionForm>,
) -> Response {
    let new_admission = match form.validate() {
        Ok(new_admission) => new_admission,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_admission(new_admission, &connection) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(error) => {
            tracing::error!("Could not record admission application: {error}");
            error.into_response()
        }
    }
}
