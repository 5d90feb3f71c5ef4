//! Member records: the people known to the school and their credentials.
//!
//! A member carries the credentials used to log in and the display identity
//! shown next to their payments in the admin listing.

use std::fmt::Display;

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer member IDs.
///
/// This prevents member IDs from being confused with other integer IDs such
/// as payment record IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(i64);

impl MemberId {
    /// Create a new member ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The underlying integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The access level of a member.
///
/// Roles are ranked: a trainer can do everything a student can, and an admin
/// can do everything a trainer can.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// A regular member who can record their own fee payments.
    Student,
    /// A teaching member. Ranks above students.
    Trainer,
    /// A member who runs the dashboard and reviews payments and admissions.
    Admin,
}

impl Role {
    /// Parse a role from its wire or storage form, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("student") {
            Some(Self::Student)
        } else if text.eq_ignore_ascii_case("trainer") {
            Some(Self::Trainer)
        } else if text.eq_ignore_ascii_case("admin") {
            Some(Self::Admin)
        } else {
            None
        }
    }

    /// The canonical storage and wire form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Trainer => "TRAINER",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether this role grants at least the access of `minimum`.
    pub fn satisfies(&self, minimum: Role) -> bool {
        self.rank() >= minimum.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Student => 0,
            Self::Trainer => 1,
            Self::Admin => 2,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member account with credentials and display identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// The member's ID in the database.
    pub id: MemberId,
    /// The unique name the member logs in with.
    pub username: String,
    /// The member's salted and hashed password.
    pub password_hash: PasswordHash,
    /// The name shown in listings, e.g. "Anika Rahman".
    pub display_name: String,
    /// The member's email address.
    pub email: String,
    /// A URL for the member's profile image, if they uploaded one.
    pub profile_image: Option<String>,
    /// The member's access level.
    pub role: Role,
}

/// The fields needed to insert a new member.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// The unique name the member will log in with.
    pub username: String,
    /// The member's salted and hashed password.
    pub password_hash: PasswordHash,
    /// The name shown in listings.
    pub display_name: String,
    /// The member's email address.
    pub email: String,
    /// A URL for the member's profile image, if they uploaded one.
    pub profile_image: Option<String>,
    /// The member's access level.
    pub role: Role,
}

/// Create the member table in the database.
///
/// # Errors
/// Returns an error if the table or its index could not be created.
pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT NOT NULL,
            email TEXT NOT NULL,
            profile_image TEXT,
            role TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_member_username ON member(username);",
    )?;

    Ok(())
}

/// Insert a member into the database and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateUsername] if the username is already taken, or
/// [Error::SqlError] if another SQL error occurred.
pub fn create_member(new_member: NewMember, connection: &Connection) -> Result<Member, Error> {
    connection
        .execute(
            "INSERT INTO member (username, password_hash, display_name, email, profile_image, role)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new_member.username,
                new_member.password_hash.to_string(),
                new_member.display_name,
                new_member.email,
                new_member.profile_image,
                new_member.role.as_str(),
            ],
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("member.username") =>
            {
                Error::DuplicateUsername(new_member.username.clone())
            }
            error => error.into(),
        })?;

    let id = MemberId::new(connection.last_insert_rowid());

    Ok(Member {
        id,
        username: new_member.username,
        password_hash: new_member.password_hash,
        display_name: new_member.display_name,
        email: new_member.email,
        profile_image: new_member.profile_image,
        role: new_member.role,
    })
}

/// Get the member with the given username.
///
/// # Errors
/// Returns [Error::NotFound] if there is no member with that username, or
/// [Error::SqlError] if another SQL error occurred.
pub fn get_member_by_username(username: &str, connection: &Connection) -> Result<Member, Error> {
    connection
        .prepare(
            "SELECT id, username, password_hash, display_name, email, profile_image, role
            FROM member
            WHERE username = :username",
        )?
        .query_row(&[(":username", &username)], map_row_to_member)
        .map_err(|error| error.into())
}

/// The image URL to show for a member in listings.
///
/// Members without an uploaded profile image fall back to a Gravatar URL
/// derived from their email address.
pub fn avatar_url(email: &str, profile_image: Option<&str>) -> String {
    match profile_image {
        Some(image) => image.to_string(),
        None => {
            let email_hash = md5::compute(email.trim().to_lowercase());

            format!("https://www.gravatar.com/avatar/{email_hash:x}?d=identicon")
        }
    }
}

fn map_row_to_member(row: &Row) -> Result<Member, rusqlite::Error> {
    let id = MemberId::new(row.get(0)?);
    let username: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;
    let display_name: String = row.get(3)?;
    let email: String = row.get(4)?;
    let profile_image: Option<String> = row.get(5)?;
    let raw_role: String = row.get(6)?;

    let role = Role::parse(&raw_role).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown role {raw_role:?}").into(),
        )
    })?;

    Ok(Member {
        id,
        username,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        display_name,
        email,
        profile_image,
        role,
    })
}


#[cfg(test)]
mod member_query_tests {
    use rusqlite::Connection;

    use crate::{Error, PasswordHash};

    use super::{Member, NewMember, Role, create_member, create_member_table,
        get_member_by_username};

    fn get_test_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        create_member_table(&connection).expect("Could not create member table.");

        connection
    }

    fn sample_member(username: &str) -> NewMember {
        NewMember {
            username: username.to_string(),
            password_hash: PasswordHash::new_unchecked("dummy_hash"),
            display_name: "Anika Rahman".to_string(),
            email: "anika@example.com".to_string(),
            profile_image: None,
            role: Role::Student,
        }
    }

    #[test]
    fn create_member_succeeds() {
        let connection = get_test_db_connection();

        let member = create_member(sample_member("anika"), &connection)
            .expect("Could not create member");

        assert!(member.id.as_i64() > 0);
        assert_eq!(member.username, "anika");
        assert_eq!(member.role, Role::Student);
    }

    #[test]
    fn create_member_fails_on_duplicate_username() {
        let connection = get_test_db_connection();
        create_member(sample_member("anika"), &connection).expect("Could not create member");

        let duplicate = create_member(sample_member("anika"), &connection);

        assert_eq!(
            duplicate,
            Err(Error::DuplicateUsername("anika".to_string()))
        );
    }

    #[test]
    fn get_member_by_username_returns_the_stored_member() {
        let connection = get_test_db_connection();
        let inserted_member =
            create_member(sample_member("anika"), &connection).expect("Could not create member");

        let selected_member = get_member_by_username("anika", &connection);

        assert_eq!(Ok(inserted_member), selected_member);
    }

    #[test]
    fn get_member_by_username_fails_on_unknown_username() {
        let connection = get_test_db_connection();

        let selected_member = get_member_by_username("ghost", &connection);

        assert_eq!(selected_member, Err(Error::NotFound));
    }
}
