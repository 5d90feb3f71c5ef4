//! DojoDesk is the server for a martial arts school's admin dashboard.
//!
//! This library provides a JSON REST API for member log in, fee payment
//! records, and admission applications. The heart of the app is the payment
//! ledger: members report the payments they made through bKash and admins
//! confirm or reject them against the provider's statement.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod admission;
mod app_state;
mod auth;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod member;
mod password;
mod payment;
mod routing;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use member::{Member, MemberId, Role, get_member_by_username};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;

use crate::validation::FieldErrors;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The member provided a username and password combination that does not
    /// match any account.
    ///
    /// An unknown username and a wrong password intentionally produce the
    /// same error so that the log in endpoint does not leak which usernames
    /// exist.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request carried no session cookie, or a cookie that is expired or
    /// otherwise not usable.
    #[error("the request is not authenticated")]
    Unauthenticated,

    /// The logged-in member's role does not grant access to the resource.
    #[error("the member's role does not permit this operation")]
    Forbidden,

    /// The setup secret header is missing or wrong, or provisioning is
    /// disabled because the operator never configured a secret.
    #[error("invalid setup secret")]
    InvalidSetupSecret,

    /// One or more request fields failed validation.
    ///
    /// Holds an error message per failing field so the client can show all
    /// problems at once.
    #[error("invalid fields: {0}")]
    Validation(FieldErrors),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The specified username already exists in the database.
    #[error("the username \"{0}\" already exists in the database")]
    DuplicateUsername(String),

    /// The specified payment transaction ID already exists in the ledger.
    ///
    /// Each bKash transaction ID can only be reported once, so resubmitting
    /// a payment form cannot create a second ledger entry.
    #[error("the transaction ID already exists in the ledger")]
    DuplicateTransaction,

    /// The admission application already has a payment reference attached.
    #[error("the admission application already has a payment reference")]
    PaymentReferenceAlreadySet,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("payment.transaction_id") =>
            {
                Error::DuplicateTransaction
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidCredentials => error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid username or password",
            ),
            Error::Unauthenticated => {
                error_response(StatusCode::UNAUTHORIZED, "Authentication required")
            }
            Error::InvalidSetupSecret => {
                error_response(StatusCode::UNAUTHORIZED, "Invalid setup secret")
            }
            Error::Forbidden => error_response(StatusCode::FORBIDDEN, "Insufficient permissions"),
            Error::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            Error::TooWeak(feedback) => field_error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "password",
                &feedback,
            ),
            Error::DuplicateUsername(username) => field_error_response(
                StatusCode::CONFLICT,
                "username",
                &format!("The username \"{username}\" is already taken"),
            ),
            Error::DuplicateTransaction => field_error_response(
                StatusCode::CONFLICT,
                "transactionId",
                "A payment with this transaction ID has already been submitted",
            ),
            Error::PaymentReferenceAlreadySet => field_error_response(
                StatusCode::CONFLICT,
                "transactionId",
                "This application already has a payment reference",
            ),
            Error::NotFound => error_response(
                StatusCode::NOT_FOUND,
                "The requested resource could not be found",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, check the server logs for details",
                )
            }
        }
    }
}

fn error_response(status_code: StatusCode, message: &str) -> Response {
    (status_code, Json(json!({ "error": message }))).into_response()
}

fn field_error_response(status_code: StatusCode, field: &str, message: &str) -> Response {
    (status_code, Json(json!({ "errors": { field: message } }))).into_response()
}
