//! Extractor configuration that turns malformed requests into domain errors.
//!
//! Actix rejects undecodable JSON bodies and query strings before a handler
//! runs. These handlers keep those rejections inside the shared error schema.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

/// Upper bound for JSON request bodies.
pub const JSON_BODY_LIMIT: usize = 256 * 1024;

/// Validation error codes for requests rejected before reaching a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectionCode {
    MalformedBody,
    BodyTooLarge,
    UnsupportedContentType,
    MalformedQuery,
    MalformedPath,
}

impl RejectionCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MalformedBody => "malformed_body",
            Self::BodyTooLarge => "body_too_large",
            Self::UnsupportedContentType => "unsupported_content_type",
            Self::MalformedQuery => "malformed_query",
            Self::MalformedPath => "malformed_path",
        }
    }
}

fn rejection(message: impl Into<String>, code: RejectionCode, reason: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "code": code.as_str(),
        "reason": reason,
    }))
}

pub(crate) fn json_rejection(err: &JsonPayloadError) -> Error {
    let reason = err.to_string();
    debug!(%reason, "rejected JSON body");
    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            rejection("request body too large", RejectionCode::BodyTooLarge, &reason)
        }
        JsonPayloadError::ContentType => rejection(
            "request body must be application/json",
            RejectionCode::UnsupportedContentType,
            &reason,
        ),
        _ => rejection("malformed JSON body", RejectionCode::MalformedBody, &reason),
    }
}

pub(crate) fn query_rejection(err: &QueryPayloadError) -> Error {
    let reason = err.to_string();
    debug!(%reason, "rejected query string");
    rejection("malformed query string", RejectionCode::MalformedQuery, &reason)
}

pub(crate) fn path_rejection(err: &PathError) -> Error {
    let reason = err.to_string();
    debug!(%reason, "rejected path parameters");
    rejection("malformed path", RejectionCode::MalformedPath, &reason)
}

/// JSON extractor settings used by every API scope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req: &HttpRequest| json_rejection(&err).into())
}

/// Query extractor settings used by every API scope.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| query_rejection(&err).into())
}

/// Path extractor settings used by every API scope.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| path_rejection(&err).into())
}
