//! Application router configuration with public, member and admin route groups.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use crate::{
    AppState, Error,
    admission::{
        admission_payment_endpoint, approve_admission_endpoint, create_admission_endpoint,
        list_admissions_endpoint, reject_admission_endpoint,
    },
    auth::{admin_guard, auth_guard, get_log_out, post_log_in, provision_admin},
    endpoints,
    member::create_member_endpoint,
    payment::{
        confirm_payment_endpoint, create_payment_endpoint, delete_payment_endpoint,
        list_payments_endpoint, reject_payment_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::SETUP, post(provision_admin))
        .route(endpoints::ADMISSIONS, post(create_admission_endpoint))
        .route(
            endpoints::ADMISSION_PAYMENT,
            post(admission_payment_endpoint),
        );

    let member_routes = Router::new()
        .route(endpoints::PAYMENTS, post(create_payment_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let admin_routes = Router::new()
        .route(endpoints::ADMIN_PAYMENTS, get(list_payments_endpoint))
        .route(endpoints::CONFIRM_PAYMENT, post(confirm_payment_endpoint))
        .route(endpoints::REJECT_PAYMENT, post(reject_payment_endpoint))
        .route(endpoints::DELETE_PAYMENT, delete(delete_payment_endpoint))
        .route(endpoints::ADMIN_MEMBERS, post(create_member_endpoint))
        .route(endpoints::ADMIN_ADMISSIONS, get(list_admissions_endpoint))
        .route(
            endpoints::APPROVE_ADMISSION,
            post(approve_admission_endpoint),
        )
        .route(endpoints::REJECT_ADMISSION, post(reject_admission_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    public_routes
        .merge(member_routes)
        .merge(admin_routes)
        .fallback(get_not_found)
        .with_state(state)
}

/// The fallback for unknown routes, kept as JSON like everything else.
async fn get_not_found() -> Response {
    Error::NotFound.into_response()
}
