//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/admin/payments/{payment_id}',
//! use [format_endpoint].

/// The route for logging in a member.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current member.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for provisioning the first admin account.
pub const SETUP: &str = "/api/setup";

/// The route for a logged-in member to record a fee payment.
pub const PAYMENTS: &str = "/api/payments";
/// The route for admins to list the payment ledger.
pub const ADMIN_PAYMENTS: &str = "/api/admin/payments";
/// The route for admins to confirm a payment.
pub const CONFIRM_PAYMENT: &str = "/api/admin/payments/{payment_id}/confirm";
/// The route for admins to reject a payment.
pub const REJECT_PAYMENT: &str = "/api/admin/payments/{payment_id}/reject";
/// The route for admins to delete a payment.
pub const DELETE_PAYMENT: &str = "/api/admin/payments/{payment_id}";

/// The route for admins to create member accounts.
pub const ADMIN_MEMBERS: &str = "/api/admin/members";

/// The route for the public to submit an admission application.
pub const ADMISSIONS: &str = "/api/admissions";
/// The route for an applicant to report their admission fee payment.
pub const ADMISSION_PAYMENT: &str = "/api/admissions/{admission_id}/payment";
/// The route for admins to list admission applications.
pub const ADMIN_ADMISSIONS: &str = "/api/admin/admissions";
/// The route for admins to approve an admission application.
pub const APPROVE_ADMISSION: &str = "/api/admin/admissions/{admission_id}/approve";
/// The route for admins to reject an admission application.
pub const REJECT_ADMISSION: &str = "/api/admin/admissions/{admission_id}/reject";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/admissions/{admission_id}/payment',
/// '{admission_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::SETUP);

        assert_endpoint_is_valid_uri(endpoints::PAYMENTS);
        assert_endpoint_is_valid_uri(endpoints::ADMIN_PAYMENTS);
        assert_endpoint_is_valid_uri(endpoints::CONFIRM_PAYMENT);
        assert_endpoint_is_valid_uri(endpoints::REJECT_PAYMENT);
        assert_endpoint_is_valid_uri(endpoints::DELETE_PAYMENT);

        assert_endpoint_is_valid_uri(endpoints::ADMIN_MEMBERS);

        assert_endpoint_is_valid_uri(endpoints::ADMISSIONS);
        assert_endpoint_is_valid_uri(endpoints::ADMISSION_PAYMENT);
        assert_endpoint_is_valid_uri(endpoints::ADMIN_ADMISSIONS);
        assert_endpoint_is_valid_uri(endpoints::APPROVE_ADMISSION);
        assert_endpoint_is_valid_uri(endpoints::REJECT_ADMISSION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
