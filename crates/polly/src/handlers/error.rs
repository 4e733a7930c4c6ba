use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use polly_core::poll::PollError;
use polly_core::storage::{
    poll_error_to_status_code, repository_error_to_status_code, RepositoryError,
};

use crate::context::MissingIdentity;

pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(repo_error)
        } else if let Some(poll_error) = self.0.downcast_ref::<PollError>() {
            poll_error_to_status_code(poll_error)
        } else if self.0.is::<MissingIdentity>() {
            401
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %self.0, "Request failed");
        } else {
            tracing::warn!(status = %status_code, error = %self.0, "Request rejected");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
