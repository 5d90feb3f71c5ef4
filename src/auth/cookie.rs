//! Issues, verifies, and revokes the session cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::token::{Principal, Token},
};

/// The name of the cookie holding the session token.
pub const COOKIE_SESSION: &str = "session";

/// How long a session stays valid after logging in.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(15);

/// Add a session cookie for `principal` to the cookie jar.
///
/// The token inside the cookie expires `duration` from now. The jar encrypts
/// and signs the cookie value with its private key, so the client can
/// neither read nor forge a token.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if the token cannot be
/// serialized.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    principal: Principal,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        principal,
        expires_at,
    };
    let token_json = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, token_json))
            .path("/")
            .expires(expires_at)
            .max_age(duration)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    ))
}

/// Replace the session cookie with an already expired tombstone, which makes
/// the client delete the cookie.
///
/// Revocation always succeeds, even when no one was logged in.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Get the session token from the cookie jar and check that it has not
/// expired.
///
/// # Errors
/// Returns [Error::Unauthenticated] if the cookie is missing, cannot be
/// parsed, or holds an expired token. A missing and a tampered cookie look
/// the same here because the jar silently drops values that fail decryption.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::Unauthenticated)?;

    let token: Token =
        serde_json::from_str(cookie.value()).map_err(|_| Error::Unauthenticated)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::Unauthenticated);
    }

    Ok(token)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::{Key, SameSite}};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::token::Principal,
        member::{MemberId, Role},
    };

    use super::{
        COOKIE_SESSION, DEFAULT_SESSION_DURATION, get_token_from_cookies,
        invalidate_session_cookie, set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn sample_principal() -> Principal {
        Principal {
            id: MemberId::new(7),
            username: "anika".to_string(),
            display_name: "Anika Rahman".to_string(),
            role: Role::Trainer,
        }
    }

    #[track_caller]
    fn assert_close_to(left: OffsetDateTime, right: OffsetDateTime) {
        let delta = (left - right).abs();

        assert!(
            delta < Duration::seconds(5),
            "want {left} and {right} within 5 seconds of each other"
        );
    }

    #[test]
    fn set_then_get_round_trips_the_principal() {
        let jar = get_jar();

        let jar = set_session_cookie(jar, sample_principal(), DEFAULT_SESSION_DURATION)
            .expect("Could not set session cookie");
        let token = get_token_from_cookies(&jar).expect("Could not get token from cookie jar");

        assert_eq!(token.principal, sample_principal());
        assert_close_to(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_SESSION_DURATION,
        );
    }

    #[test]
    fn session_cookie_has_browser_attributes_set() {
        let jar = get_jar();

        let jar = set_session_cookie(jar, sample_principal(), DEFAULT_SESSION_DURATION)
            .expect("Could not set session cookie");
        let cookie = jar.get(COOKIE_SESSION).expect("Could not get session cookie");

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(DEFAULT_SESSION_DURATION));
        let expiry = cookie
            .expires_datetime()
            .expect("session cookie should have an expiry");
        assert_close_to(expiry, OffsetDateTime::now_utc() + DEFAULT_SESSION_DURATION);
    }

    #[test]
    fn get_token_fails_when_no_cookie_is_set() {
        let jar = get_jar();

        let result = get_token_from_cookies(&jar);

        assert_eq!(result, Err(Error::Unauthenticated));
    }

    #[test]
    fn get_token_fails_for_an_expired_token() {
        let jar = get_jar();

        let jar = set_session_cookie(jar, sample_principal(), Duration::seconds(-10))
            .expect("Could not set session cookie");
        let result = get_token_from_cookies(&jar);

        assert_eq!(result, Err(Error::Unauthenticated));
    }

    #[test]
    fn get_token_fails_after_invalidation() {
        let jar = get_jar();

        let jar = set_session_cookie(jar, sample_principal(), DEFAULT_SESSION_DURATION)
            .expect("Could not set session cookie");
        let jar = invalidate_session_cookie(jar);
        let result = get_token_from_cookies(&jar);

        assert_eq!(result, Err(Error::Unauthenticated));
    }

    #[test]
    fn invalidated_cookie_is_an_expired_tombstone() {
        let jar = get_jar();

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION).expect("Could not get session cookie");

        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(
            cookie.expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
    }
}
