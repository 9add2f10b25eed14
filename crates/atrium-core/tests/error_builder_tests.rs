use atrium_core::error_builder::{
    bad_gateway, bad_request, forbidden, internal_server_error, not_found, unauthorized, ErrorBuilder,
};
use axum::http::StatusCode;

fn field<'a>(error: &'a atrium_core::problemdetails::Problem, key: &str) -> &'a str {
    error.body.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

#[test]
fn test_error_builder_basic() {
    let error = ErrorBuilder::new(StatusCode::BAD_REQUEST)
        .problem("validation-error")
        .title("Validation Error")
        .detail("The request contains invalid data")
        .instance("/admin-panel/user-lookup")
        .build();

    assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(field(&error, "type"), "https://atrium.dev/probs/validation-error");
    assert_eq!(field(&error, "title"), "Validation Error");
    assert_eq!(field(&error, "detail"), "The request contains invalid data");
    assert_eq!(field(&error, "instance"), "/admin-panel/user-lookup");
    assert!(error.body.contains_key("timestamp"));
}

#[test]
fn test_error_code_extension() {
    let error = bad_request()
        .detail("User not found")
        .error_code("INVALID_INPUT")
        .build();

    assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(error.error_code(), Some("INVALID_INPUT"));
    assert_eq!(field(&error, "detail"), "User not found");
}

#[test]
fn test_bad_request_has_no_default_code() {
    let error = bad_request().build();
    assert_eq!(error.error_code(), None);
}

#[test]
fn test_internal_server_error_builder() {
    let error = internal_server_error().build();

    assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(field(&error, "type"), "https://atrium.dev/probs/internal-server-error");
    assert_eq!(field(&error, "instance"), "/error/internal-server-error");
    assert_eq!(error.error_code(), Some("INTERNAL_SERVER_ERROR"));
}

#[test]
fn test_not_found_builder() {
    let error = not_found().detail("Workspace was not found").build();

    assert_eq!(error.status_code, StatusCode::NOT_FOUND);
    assert_eq!(field(&error, "title"), "Resource Not Found");
    assert_eq!(field(&error, "detail"), "Workspace was not found");
    assert_eq!(error.error_code(), Some("NOT_FOUND"));
}

#[test]
fn test_auth_builders_carry_codes() {
    let unauthorized = unauthorized().build();
    assert_eq!(unauthorized.status_code, StatusCode::UNAUTHORIZED);
    assert_eq!(unauthorized.error_code(), Some("UNAUTHENTICATED"));

    let forbidden = forbidden().build();
    assert_eq!(forbidden.status_code, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.error_code(), Some("FORBIDDEN_EXCEPTION"));
}

#[test]
fn test_later_error_code_overrides_default() {
    let error = unauthorized().error_code("INVALID_LOGIN_TOKEN").build();
    assert_eq!(error.error_code(), Some("INVALID_LOGIN_TOKEN"));
}

#[test]
fn test_bad_gateway_builder() {
    let error = bad_gateway()
        .error_code("BILLING_PROVIDER_ERROR")
        .build();

    assert_eq!(error.status_code, StatusCode::BAD_GATEWAY);
    assert_eq!(field(&error, "title"), "Upstream Service Error");
    assert_eq!(error.error_code(), Some("BILLING_PROVIDER_ERROR"));
}
