//! Defines the endpoint that revokes the session cookie.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::auth::cookie::invalidate_session_cookie;

/// A route handler that replaces the session cookie with an expired
/// tombstone, logging the member out.
///
/// Always responds 204 No Content, whether or not anyone was logged in.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_session_cookie(jar);

    (StatusCode::NO_CONTENT, jar).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{
            cookie::{COOKIE_SESSION, DEFAULT_SESSION_DURATION, set_session_cookie},
            token::Principal,
        },
        member::{MemberId, Role},
    };

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_expires_the_session_cookie() {
        let jar = PrivateCookieJar::new(Key::from(&Sha512::digest("42")));
        let principal = Principal {
            id: MemberId::new(123),
            username: "anika".to_string(),
            display_name: "Anika Rahman".to_string(),
            role: Role::Student,
        };
        let jar = set_session_cookie(jar, principal, DEFAULT_SESSION_DURATION).unwrap();

        let response = get_log_out(jar).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_session_cookie_expired(&response);
    }

    fn assert_session_cookie_expired(response: &Response<Body>) {
        let mut found_cookie = false;

        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_header.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            if cookie.name() != COOKIE_SESSION {
                continue;
            }
            found_cookie = true;

            assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }

        assert!(found_cookie, "no Set-Cookie header for {COOKIE_SESSION:?}");
    }
}
