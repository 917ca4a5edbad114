use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vn_core::{Error, Stage};

/// A pipeline error on its way out as a JSON body.
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    article: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            // Text passed straight through from the caller was refused.
            Error::UpstreamRejected {
                stage: Stage::Translation | Stage::Speech,
                status: 400 | 413 | 422,
                ..
            } => StatusCode::BAD_REQUEST,
            Error::UpstreamUnavailable { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::UpstreamUnavailable { .. }
            | Error::UpstreamMalformedResponse { .. }
            | Error::UpstreamRejected { .. }
            | Error::ModelOutputInvalid { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            stage: self.0.stage(),
            article: self.0.article(),
            upstream_status: self.0.upstream_status(),
        };
        (status, Json(body)).into_response()
    }
}
