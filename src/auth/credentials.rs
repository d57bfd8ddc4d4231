use std::collections::HashMap;

use actix_web::{
    http::header::{HeaderMap, AUTHORIZATION},
    web,
};

use crate::auth::AuthError;

pub const LICENSE_HEADER: &str = "x-licencia";
pub const LICENSE_QUERY_PARAM: &str = "licencia";

const ACCEPTED_SCHEMES: [&str; 2] = ["Bearer", "JWT"];

/// Reads `Authorization: <Bearer|JWT> <token>`.
///
/// `Ok(None)` means no header was sent; a header that is present but does not
/// have exactly a known scheme and a token is `MalformedCredential`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| {
        AuthError::MalformedCredential("authorization header is not valid text".to_string())
    })?;

    let parts: Vec<&str> = value.trim().split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::MalformedCredential(format!(
            "expected '<scheme> <token>', got {} part(s)",
            parts.len()
        )));
    };

    if !ACCEPTED_SCHEMES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(scheme))
    {
        return Err(AuthError::MalformedCredential(format!(
            "unsupported scheme '{}'",
            scheme
        )));
    }

    if token.is_empty() {
        return Err(AuthError::MalformedCredential("empty token".to_string()));
    }

    Ok(Some(token.to_string()))
}

/// License key from the `x-licencia` header, or else the `licencia` query
/// parameter. Blank values count as absent.
pub fn extract_license_key(headers: &HeaderMap, query: &str) -> Option<String> {
    let from_header = headers
        .get(LICENSE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        web::Query::<HashMap<String, String>>::from_query(query)
            .ok()
            .and_then(|params| params.into_inner().remove(LICENSE_QUERY_PARAM))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    })
}
