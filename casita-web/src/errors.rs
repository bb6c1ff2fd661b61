//! Any errors that casita-web might generate, and supporting implementations.

use std::collections::HashMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use casita_store::StoreError;
use serde_json::Value;
use thiserror::Error;

/// An error that happened in a web handler.
///
/// The display string of a variant is the short message that ends up in the
/// HTTP response body, so it is part of the API contract.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A referenced record does not exist.
    #[error("Not found")]
    NotFound,

    /// The request body is malformed or incomplete.
    #[error("{0}")]
    BadRequest(&'static str),

    /// A storage failure that is not a missing record.
    #[error("Internal error")]
    Store(#[source] StoreError),

    /// A generic error, when there is nothing more specific to say.
    #[error("Internal error")]
    Internal,
}

impl HandlerError {
    /// The body is not parseable as JSON.
    pub fn not_a_json() -> Self {
        Self::BadRequest("Not a JSON")
    }
}

impl From<StoreError> for HandlerError {
    fn from(error: StoreError) -> Self {
        match error {
            // A missing record keeps its identity as a 404.
            StoreError::NotFound { .. } => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HashMap::new();
        response.insert("error".to_owned(), Value::String(self.to_string()));
        HttpResponse::build(self.status_code()).json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casita_store::EntityKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes_match_the_taxonomy() {
        assert_eq!(HandlerError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            HandlerError::not_a_json().status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_not_found_becomes_http_not_found() {
        let error: HandlerError = StoreError::NotFound {
            kind: EntityKind::Place,
            id: "p1".to_string(),
        }
        .into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Not found");
    }

    #[test]
    fn other_store_errors_become_internal() {
        let error: HandlerError =
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")).into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "Internal error");
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let error = HandlerError::BadRequest("Missing user_id");
        assert_eq!(error.to_string(), "Missing user_id");
        assert_eq!(HandlerError::not_a_json().to_string(), "Not a JSON");
    }
}
