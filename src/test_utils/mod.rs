#![allow(missing_docs)]

pub(crate) mod http;

use rusqlite::Connection;

use crate::{
    AppState,
    member::{Member, NewMember, Role, create_member},
    password::{PasswordHash, ValidatedPassword},
};

pub(crate) use http::{assert_field_error, parse_json_body};

/// The plain text password every test member logs in with.
pub(crate) const TEST_PASSWORD: &str = "okon";

/// The setup secret that test app states are configured with.
pub(crate) const TEST_SETUP_SECRET: &str = "letmein";

/// Create an app state backed by an in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    let db_connection =
        Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(db_connection, "foobar", TEST_SETUP_SECRET)
        .expect("Could not create app state.")
}

/// Create a member whose password is [TEST_PASSWORD].
///
/// The low bcrypt cost keeps the hashing fast enough for tests.
pub(crate) fn create_test_member(username: &str, role: Role, connection: &Connection) -> Member {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
        .expect("Could not hash password.");

    create_member(
        NewMember {
            username: username.to_string(),
            password_hash,
            display_name: format!("Test {username}"),
            email: format!("{username}@example.com"),
            profile_image: None,
            role,
        },
        connection,
    )
    .expect("Could not create member.")
}
