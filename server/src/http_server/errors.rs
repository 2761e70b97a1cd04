use std::fmt::Debug;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A failed request: the report that caused it and the status to answer with.
pub struct ServerError(pub(crate) color_eyre::Report, pub(crate) StatusCode);

impl Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Status Code: {}", self.1)?;

        Debug::fmt(&self.0, f)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.1.is_server_error() {
            let error: &(dyn std::error::Error + 'static) = self.0.as_ref();
            sentry::capture_error(error);

            tracing::error!(error = ?self.0, status = %self.1, "ServerError");
        } else {
            tracing::warn!(error = %self.0, status = %self.1, "Request rejected");
        }

        let body = ErrorBody {
            error: format!("{:#}", self.0),
        };

        (self.1, Json(body)).into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        ServerError(err.into(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub(crate) trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError>;
}

impl<T> WithStatus<T> for color_eyre::Result<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError> {
        self.map_err(|err| ServerError(err, status))
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;

    use super::*;

    #[test]
    fn test_with_status_keeps_the_status() {
        let result: color_eyre::Result<()> = Err(eyre!("Recipe not found"));

        let err = result.with_status(StatusCode::NOT_FOUND).err().unwrap();

        assert_eq!(err.1, StatusCode::NOT_FOUND);
        assert_eq!(err.0.to_string(), "Recipe not found");
    }

    #[tokio::test]
    async fn test_client_errors_render_json() {
        let response = ServerError(eyre!("servings must be positive"), StatusCode::BAD_REQUEST)
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value =
            crate::http_server::test_helpers::response_body_json(response).await;
        assert_eq!(body["error"], "servings must be positive");
    }

    #[test]
    fn test_plain_errors_become_internal() {
        let err: ServerError = std::io::Error::other("disk on fire").into();

        assert_eq!(err.1, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
