//! Role-checking middleware for protected routes.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, Error, auth::cookie::get_token_from_cookies, member::Role};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Check the session cookie and the principal's role before running the
/// inner handler.
///
/// The principal's role comes from the token, not the member table, so a
/// role change takes effect at the next log-in rather than immediately.
async fn require_role(state: AuthState, request: Request, next: Next, minimum: Role) -> Response {
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not get cookie jar from request: {error:?}");
            return Error::Unauthenticated.into_response();
        }
    };

    let principal = match get_token_from_cookies(&jar) {
        Ok(token) => token.principal,
        Err(error) => return error.into_response(),
    };

    if !principal.role.satisfies(minimum) {
        return Error::Forbidden.into_response();
    }

    parts.extensions.insert(principal);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

/// Middleware that lets any logged-in member through.
///
/// **Note**: Route handlers behind this middleware can take the function
/// argument `Extension(principal): Extension<Principal>` to receive the
/// identity of the logged-in member.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    require_role(state, request, next, Role::Student).await
}

/// Middleware that only lets admins through.
///
/// Requests with a valid session but an insufficient role get 403 Forbidden,
/// requests without a valid session get 401 Unauthorized.
pub async fn admin_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    require_role(state, request, next, Role::Admin).await
}
