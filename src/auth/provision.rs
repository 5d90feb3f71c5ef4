//! Defines the first-run provisioning endpoint that creates the first admin
//! account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    member::{NewMember, Role, create_member},
    validation::FieldErrors,
};

/// The request header that must carry the bootstrap secret.
pub const SETUP_SECRET_HEADER: &str = "x-setup-secret";

/// The state needed to provision the first admin account.
#[derive(Debug, Clone)]
pub struct ProvisionState {
    /// The secret that must accompany provisioning requests. An empty string
    /// disables the endpoint.
    pub setup_secret: String,
    /// The database connection for creating members.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProvisionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            setup_secret: state.setup_secret.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields for creating the first admin account.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetupForm {
    /// The name the admin will log in with.
    pub username: String,
    /// The admin's plain text password, validated for strength.
    pub password: String,
    /// The name shown in listings.
    pub display_name: String,
    /// The admin's email address.
    pub email: String,
}

/// A route handler that creates the first admin account.
///
/// The created account always gets the ADMIN role. The bootstrap secret is
/// compared by exact string match and should be shared out-of-band, then
/// unset once the school is set up.
///
/// # Responses
/// - 201 Created with the new admin's ID on success.
/// - 401 Unauthorized if the secret is missing, wrong, or provisioning is
///   disabled.
/// - 409 Conflict if the username is already taken.
/// - 422 Unprocessable Entity if any field fails validation.
pub async fn provision_admin(
    State(state): State<ProvisionState>,
    headers: HeaderMap,
    Json(form): Json<SetupForm>,
) -> Response {
    // An empty secret means the operator never enabled provisioning.
    if state.setup_secret.is_empty() {
        return Error::InvalidSetupSecret.into_response();
    }

    let supplied_secret = headers
        .get(SETUP_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if supplied_secret != Some(state.setup_secret.as_str()) {
        return Error::InvalidSetupSecret.into_response();
    }

    let new_member = match validate(form) {
        Ok(new_member) => new_member,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_member(new_member, &connection) {
        Ok(member) => (StatusCode::CREATED, Json(json!({ "id": member.id }))).into_response(),
        Err(error @ Error::DuplicateUsername(_)) => error.into_response(),
        Err(error) => {
            tracing::error!("Could not create admin account: {error}");
            error.into_response()
        }
    }
}

fn validate(form: SetupForm) -> Result<NewMember, Error> {
    let mut errors = FieldErrors::new();

    let username = form.username.trim().to_string();
    if username.is_empty() {
        errors.insert("username", "Username must not be empty");
    }

    let display_name = form.display_name.trim().to_string();
    if display_name.is_empty() {
        errors.insert("displayName", "Display name must not be empty");
    }

    let email = form.email.trim().to_string();
    if email.is_empty() {
        errors.insert("email", "Email must not be empty");
    }

    let password = ValidatedPassword::new(&form.password);
    if let Err(Error::TooWeak(feedback)) = &password {
        errors.insert("password", format!("Password is too weak. {feedback}"));
    }

    errors.into_result()?;

    let password_hash = PasswordHash::new(password?, PasswordHash::DEFAULT_COST)?;

    Ok(NewMember {
        username,
        password_hash,
        display_name,
        email,
        profile_image: None,
        role: Role::Admin,
    })
}
