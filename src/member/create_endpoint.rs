//! Defines the admin endpoint for creating member accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
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

/// The state needed to create a member account.
#[derive(Debug, Clone)]
pub struct CreateMemberState {
    /// The database connection for inserting members.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateMemberState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a create-member request.
///
/// Every field defaults to empty so that missing fields show up in the
/// validation error map instead of failing JSON extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberForm {
    /// The unique name the member will log in with.
    pub username: String,
    /// The member's plain text password, validated for strength.
    pub password: String,
    /// The name shown in listings.
    pub display_name: String,
    /// The member's email address.
    pub email: String,
    /// The member's access level: STUDENT, TRAINER, or ADMIN.
    pub role: String,
    /// An optional URL for the member's profile image.
    pub profile_image: Option<String>,
}

/// A route handler for creating a member account with an explicit role.
///
/// # Responses
/// - 201 Created with the new member's ID on success.
/// - 409 Conflict if the username is already taken.
/// - 422 Unprocessable Entity if any field fails validation.
pub async fn create_member_endpoint(
    State(state): State<CreateMemberState>,
    Json(form): Json<MemberForm>,
) -> Response {
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
            tracing::error!("Could not create member: {error}");
            error.into_response()
        }
    }
}

fn validate(form: MemberForm) -> Result<NewMember, Error> {
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

    let role = Role::parse(form.role.trim());
    if role.is_none() {
        errors.insert("role", "Role must be one of STUDENT, TRAINER, or ADMIN");
    }

    let password = ValidatedPassword::new(&form.password);
    if let Err(Error::TooWeak(feedback)) = &password {
        errors.insert("password", format!("Password is too weak. {feedback}"));
    }

    let profile_image = form
        .profile_image
        .map(|image| image.trim().to_string())
        .filter(|image| !image.is_empty());

    errors.into_result()?;

    let password_hash = PasswordHash::new(password?, PasswordHash::DEFAULT_COST)?;

    match role {
        Some(role) => Ok(NewMember {
            username,
            password_hash,
            display_name,
            email,
            profile_image,
            role,
        }),
        // Unreachable: a failed role parse always records a field error.
        None => Err(Error::Validation(FieldErrors::new())),
    }
}
