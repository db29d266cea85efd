use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::{Error, ErrorType};

/// HTTP response builder for Error enum
impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error_type {
            ErrorType::LabelMe => StatusCode::INTERNAL_SERVER_ERROR,

            ErrorType::UnknownReport => StatusCode::NOT_FOUND,
            ErrorType::InvalidStatus => StatusCode::BAD_REQUEST,

            ErrorType::TooManyAttachments { .. } => StatusCode::BAD_REQUEST,
            ErrorType::FileTooLarge { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorType::FileTypeNotAllowed => StatusCode::BAD_REQUEST,

            ErrorType::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ErrorType::NotPrivileged => StatusCode::FORBIDDEN,

            ErrorType::DatabaseError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::InvalidProperty => StatusCode::BAD_REQUEST,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::FailedValidation { .. } => StatusCode::BAD_REQUEST,
        };

        (status, Json(&self)).into_response()
    }
}
