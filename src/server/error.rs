//! Error → HTTP response mapping.

use crate::error::{ErrorKind, Html2ImageError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, warn};

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::ConversionFailed | ErrorKind::InternalIo => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Html2ImageError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status_code();

        match kind {
            ErrorKind::ClientInput | ErrorKind::PayloadTooLarge => {
                debug!(status = status.as_u16(), "Rejected request: {}", self)
            }
            ErrorKind::Timeout | ErrorKind::ConversionFailed => {
                warn!(status = status.as_u16(), "Conversion error: {}", self)
            }
            ErrorKind::InternalIo => error!(status = status.as_u16(), "Internal error: {}", self),
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_per_kind() {
        assert_eq!(ErrorKind::ClientInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ErrorKind::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ErrorKind::ConversionFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn body_is_the_message() {
        let resp = Html2ImageError::MissingInput.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"missing file or url");
    }
}
