use super::{form, AppState};
use crate::convert::convert;
use crate::error::Result;
use axum::extract::{Request, State};
use axum::http::{header, HeaderName};
use axum::response::{IntoResponse, Response};

/// Header naming the engine that produced the body.
pub const X_CONVERTER: HeaderName = HeaderName::from_static("x-converter");

pub(super) async fn screenshot(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response> {
    let fields = form::read_fields(request, state.max_upload_bytes).await?;
    let request = fields.validate(&state.limits)?;
    let output = convert(request, &state.factory, &state.default_engine).await?;

    Ok((
        [
            (header::CONTENT_TYPE, output.content_type()),
            (X_CONVERTER, output.engine),
        ],
        output.bytes,
    )
        .into_response())
}

pub(super) async fn health() -> &'static str {
    "OK"
}
