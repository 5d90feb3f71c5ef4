//! The session token stored in the auth cookie: who is logged in, and until
//! when.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::member::{Member, MemberId, Role};

/// Serde functions for the token expiry timestamp.
///
/// RFC 3339 keeps every component fully padded, including midnight, which
/// the stock `OffsetDateTime` serde support does not guarantee to round
/// trip through a string.
mod expiry_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = datetime
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&text, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

/// The public identity of a logged-in member.
///
/// The principal is embedded in the session token and returned as the body
/// of a successful log-in. It deliberately carries no credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// The member's ID in the database.
    pub id: MemberId,
    /// The name the member logs in with.
    pub username: String,
    /// The name shown in listings.
    pub display_name: String,
    /// The member's access level.
    pub role: Role,
}

impl From<&Member> for Principal {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            username: member.username.clone(),
            display_name: member.display_name.clone(),
            role: member.role,
        }
    }
}

/// A session token: the principal plus the instant the session stops being
/// valid.
///
/// The expiry is fixed when the token is issued. Sessions do not slide.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The identity of the logged-in member.
    pub principal: Principal,
    /// When the session expires.
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod token_tests {
    use time::macros::datetime;

    use crate::member::{MemberId, Role};

    use super::{Principal, Token};

    fn sample_token() -> Token {
        Token {
            principal: Principal {
                id: MemberId::new(1),
                username: "anika".to_string(),
                display_name: "Anika Rahman".to_string(),
                role: Role::Admin,
            },
            expires_at: datetime!(2026-03-05 08:30:00 UTC),
        }
    }

    #[test]
    fn serializes_principal_and_expiry() {
        let json = serde_json::to_string(&sample_token()).expect("Could not serialize token");

        assert_eq!(
            json,
            r#"{"principal":{"id":1,"username":"anika","displayName":"Anika Rahman","role":"ADMIN"},"expires_at":"2026-03-05T08:30:00Z"}"#
        );
    }

    #[test]
    fn deserializes_serialized_token() {
        let token = sample_token();

        let json = serde_json::to_string(&token).expect("Could not serialize token");
        let parsed: Token = serde_json::from_str(&json).expect("Could not deserialize token");

        assert_eq!(parsed, token);
    }

    #[test]
    fn round_trips_a_midnight_expiry() {
        let token = Token {
            expires_at: datetime!(2026-03-05 00:00:00 UTC),
            ..sample_token()
        };

        let json = serde_json::to_string(&token).expect("Could not serialize token");
        let parsed: Token = serde_json::from_str(&json).expect("Could not deserialize token");

        assert_eq!(parsed.expires_at, token.expires_at);
    }
}
