use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// UpstreamError
///
/// Failure of a call to one of the external collaborators (application backend,
/// live content provider, weather service).
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, or a body that could not be decoded.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collaborator answered with a non-2xx status.
    #[error("upstream answered with status {0}")]
    Status(u16),
}

/// AuthError
///
/// Failures of the authentication-adjacent endpoints. These are the only errors the
/// gateway reports to the client, as a short message for the inline message area.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error("session is no longer accepted by the backend")]
    SessionRejected,

    #[error("account service is unavailable")]
    Upstream(#[source] UpstreamError),
}

impl From<UpstreamError> for AuthError {
    fn from(err: UpstreamError) -> Self {
        // The backend answers 400/401 for bad credentials; everything else is an outage.
        match err {
            UpstreamError::Status(400) | UpstreamError::Status(401) => AuthError::InvalidCredentials,
            other => AuthError::Upstream(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidCredentials | AuthError::SessionRejected => StatusCode::UNAUTHORIZED,
            AuthError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        if let AuthError::Upstream(source) = &self {
            tracing::error!("account service error: {}", source);
        }

        let body = Json(ErrorMessage {
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Turns a non-2xx response into `UpstreamError::Status`.
pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(UpstreamError::Status(status.as_u16()))
    }
}
