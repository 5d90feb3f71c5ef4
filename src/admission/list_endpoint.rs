//! Defines the admin endpoint for listing admission applications.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, admission::db::get_admissions};

/// The state needed to list admission applications.
#[derive(Debug, Clone)]
pub struct ListAdmissionsState {
    /// The database connection for admission applications.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAdmissionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists every admission application, newest first.
pub async fn list_admissions_endpoint(State(state): State<ListAdmissionsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_admissions(&connection) {
        Ok(admissions) => Json(admissions).into_response(),
        Err(error) => {
            tracing::error!("Could not list admissions: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod list_admissions_endpoint_tests {
    use axum::{extract::State, http::StatusCode};
    use serde_json::json;

    use crate::{
        AppState,
        admission::{db::create_admission, domain::AdmissionForm},
        database_id::AdmissionId,
        test_utils::{get_test_app_state, parse_json_body},
    };

    use super::{ListAdmissionsState, list_admissions_endpoint};

    fn seed_admission(app_state: &AppState, name: &str) -> AdmissionId {
        let connection = app_state.db_connection.lock().unwrap();
        let form: AdmissionForm = serde_json::from_value(json!({
            "name": name,
            "fatherName": "Farid Ahmed",
            "motherName": "Salma Ahmed",
            "email": "tanvir@example.com",
            "phone": "01712345678",
            "gender": "male",
            "dateOfBirth": "2008-05-17",
        }))
        .unwrap();

        create_admission(form.validate().unwrap(), &connection)
            .expect("Could not create admission")
    }

    #[tokio::test]
    async fn lists_applications_newest_first() {
        let app_state = get_test_app_state();
        seed_admission(&app_state, "First Applicant");
        seed_admission(&app_state, "Second Applicant");
        let state = ListAdmissionsState {
            db_connection: app_state.db_connection.clone(),
        };

        let response = list_admissions_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json_body(response).await;
        let admissions = body.as_array().expect("body should be a JSON array");
        assert_eq!(admissions.len(), 2);
        assert_eq!(admissions[0]["name"], "Second Applicant");
        assert_eq!(admissions[1]["name"], "First Applicant");
        assert_eq!(admissions[0]["status"], "PENDING");
        assert_eq!(admissions[0]["dateOfBirth"], "2008-05-17");
        assert!(admissions[0]["bkashTransactionId"].is_null());
    }

    #[tokio::test]
    async fn empty_intake_lists_as_an_empty_array() {
        let app_state = get_test_app_state();
        let state = ListAdmissionsState {
            db_connection: app_state.db_connection.clone(),
        };

        let response = list_admissions_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body, json!([]));
    }
}
