//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Truncation never splits
/// a multi-byte character.
///
/// Passwords in JSON request bodies are redacted before logging. A request
/// body that cannot be read gets a 400 Bad Request, a response body that
/// cannot be read a 500 Internal Server Error.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => body_bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    if is_json(&parts.headers) {
        log_request(&parts, &redact_field(&body_text, "password"));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => body_bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"))
}

/// Replace the string value of `field_name` in `json_text` with asterisks.
///
/// This works on the raw body text rather than a parsed value so that a body
/// that is not quite valid JSON still gets logged (redacted) instead of
/// being dropped.
fn redact_field(json_text: &str, field_name: &str) -> String {
    let needle = format!("\"{field_name}\"");
    let Some(key_index) = json_text.find(&needle) else {
        return json_text.to_string();
    };

    let value_search_start = key_index + needle.len();
    let Some(colon_index) = json_text[value_search_start..]
        .find(':')
        .map(|offset| value_search_start + offset)
    else {
        return json_text.to_string();
    };
    let Some(open_quote_index) = json_text[colon_index..]
        .find('"')
        .map(|offset| colon_index + offset)
    else {
        return json_text.to_string();
    };

    // Walk to the closing quote, skipping backslash escapes.
    let mut escaped = false;
    for (offset, character) in json_text[open_quote_index + 1..].char_indices() {
        if escaped {
            escaped = false;
        } else if character == '\\' {
            escaped = true;
        } else if character == '"' {
            let close_quote_index = open_quote_index + 1 + offset;

            return format!(
                "{}********{}",
                &json_text[..open_quote_index + 1],
                &json_text[close_quote_index..]
            );
        }
    }

    json_text.to_string()
}

/// The maximum number of body bytes to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Cut `body` down to at most [LOG_BODY_LENGTH_LIMIT] bytes, backing off so
/// that a multi-byte character is never split.
fn truncate_to_char_boundary(body: &str) -> &str {
    let mut cut = LOG_BODY_LENGTH_LIMIT.min(body.len());
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }

    &body[..cut]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let truncated_body = truncate_to_char_boundary(body);
        tracing::info!("Received request: {headers:#?}\nbody: {truncated_body}...");
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let truncated_body = truncate_to_char_boundary(body);
        tracing::info!("Sending response: {headers:#?}\nbody: {truncated_body}...");
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}


#[cfg(test)]
mod truncation_tests {
    use super::{LOG_BODY_LENGTH_LIMIT, truncate_to_char_boundary};

    #[test]
    fn cuts_ascii_at_the_limit() {
        let body = "a".repeat(100);

        assert_eq!(
            truncate_to_char_boundary(&body),
            "a".repeat(LOG_BODY_LENGTH_LIMIT)
        );
    }

    #[test]
    fn backs_off_when_a_multibyte_character_straddles_the_limit() {
        // 63 ASCII bytes followed by three-byte characters, so the first
        // Bengali character occupies bytes 63 to 66.
        let body = format!("{}অনিক", "a".repeat(63));

        assert_eq!(truncate_to_char_boundary(&body), "a".repeat(63));
    }

    #[test]
    fn keeps_bodies_at_or_under_the_limit_whole() {
        assert_eq!(truncate_to_char_boundary("ok"), "ok");

        let body = "b".repeat(LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate_to_char_boundary(&body), body);
    }
}
