//! Defines the endpoint that checks credentials and issues the session
//! cookie.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{cookie::set_session_cookie, token::Principal},
    member::get_member_by_username,
};

/// The state needed to log in a member.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session stays valid after logging in.
    pub session_duration: Duration,
    /// The database connection for looking up members.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent with a log-in request.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// The name the member logs in with.
    pub username: String,
    /// The member's plain text password.
    pub password: String,
}

/// A route handler that checks `credentials` and issues a session cookie.
///
/// An unknown username and a wrong password produce byte-identical
/// responses so the endpoint does not leak which usernames exist.
///
/// # Responses
/// - 200 OK with the member's principal and a session cookie on success.
/// - 401 Unauthorized if the credentials do not match a member account.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<Credentials>,
) -> Response {
    // Drop the database lock before the slow bcrypt verification.
    let member = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_member_by_username(&credentials.username, &connection) {
            Ok(member) => member,
            Err(Error::NotFound) => return Error::InvalidCredentials.into_response(),
            Err(error) => {
                tracing::error!("Could not look up member during log-in: {error}");
                return error.into_response();
            }
        }
    };

    let is_password_valid = match member.password_hash.verify(&credentials.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Could not verify password: {error}");
            return Error::HashingError(error.to_string()).into_response();
        }
    };

    if !is_password_valid {
        return Error::InvalidCredentials.into_response();
    }

    let principal = Principal::from(&member);

    match set_session_cookie(jar, principal.clone(), state.session_duration) {
        Ok(updated_jar) => (StatusCode::OK, updated_jar, Json(principal)).into_response(),
        Err(error) => error.into_response(),
    }
}
