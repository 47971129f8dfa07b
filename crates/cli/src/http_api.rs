use crate::command::{CommandResponse, ResponseMeta};
use crate::server_security::{AuthToken, AUTH_TOKEN_ENV};
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderMap, Response as HttpResponse, StatusCode},
    response::Response,
};
use grantscope_protocol::{serialize_json, ErrorCode, ErrorEnvelope};
use serde::Serialize;

pub(crate) fn is_authorized(headers: &HeaderMap, token: &AuthToken) -> bool {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return false;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    token.matches_http_authorization_header(value)
}

pub(crate) fn error_response(code: ErrorCode, message: String) -> CommandResponse {
    let hint = match code {
        ErrorCode::Unauthorized => format!(
            "The server was started with {AUTH_TOKEN_ENV}; include Authorization: Bearer <token>."
        ),
        ErrorCode::InvalidRequest => {
            "Send {\"action\": ..., \"payload\": {...}}. Run action=capabilities to list actions."
                .to_string()
        }
        _ => "Check the request against the Command API schema.".to_string(),
    };
    CommandResponse::error(
        ErrorEnvelope::new(code, message).with_hint(hint),
        ResponseMeta::default(),
    )
}

pub(crate) fn build_response(
    status: StatusCode,
    response: CommandResponse,
) -> Result<Response, StatusCode> {
    let mut response = json_response(status, &response)?;
    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            "www-authenticate",
            axum::http::HeaderValue::from_static("Bearer"),
        );
    }
    Ok(response)
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response, StatusCode> {
    let bytes = serialize_json(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();
    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_is_checked() {
        let token = AuthToken::parse(Some("s3cret")).unwrap().unwrap();
        let mut headers = HeaderMap::new();
        assert!(!is_authorized(&headers, &token));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(is_authorized(&headers, &token));
    }

    #[test]
    fn unauthorized_response_carries_challenge() {
        let response = build_response(
            StatusCode::UNAUTHORIZED,
            error_response(ErrorCode::Unauthorized, "Missing token".to_string()),
        )
        .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
