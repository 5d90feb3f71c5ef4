use axum::response::Response;
use serde_json::Value;

/// Read a response body to completion and parse it as JSON.
pub(crate) async fn parse_json_body(response: Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    serde_json::from_slice(&body_bytes).expect("response body should be valid JSON")
}

/// Assert that `body` carries a non-empty error message for `field`.
#[track_caller]
pub(crate) fn assert_field_error(body: &Value, field: &str) {
    let message = body["errors"][field]
        .as_str()
        .unwrap_or_else(|| panic!("want an error for field {field:?}, got body {body}"));

    assert!(
        !message.is_empty(),
        "error message for field {field:?} should not be empty"
    );
}
