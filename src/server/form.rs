//! Collect `/screenshot` fields from the query string and the request body.
//!
//! Body fields are applied before query fields and the first value of a name
//! wins, so a field present in both places takes the body's value. Bodies
//! other than multipart or urlencoded are ignored.

use crate::error::{Html2ImageError, Result};
use crate::pipeline::input::Upload;
use crate::validate::FormFields;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};

/// Read every recognised field out of `request`.
///
/// `limit_bytes` is only used to word the 413 error; the limit itself is
/// enforced by the router's `DefaultBodyLimit`.
pub(super) async fn read_fields(request: Request, limit_bytes: usize) -> Result<FormFields> {
    let mut fields = FormFields::default();
    let query: Vec<(String, String)> = request
        .uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        read_multipart(request, limit_bytes, &mut fields).await?;
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|r| rejection(r.status(), r.body_text(), limit_bytes))?;
        for (name, value) in url::form_urlencoded::parse(&body) {
            fields.set(&name, value);
        }
    }

    for (name, value) in query {
        fields.set(&name, value);
    }
    Ok(fields)
}

async fn read_multipart(
    request: Request,
    limit_bytes: usize,
    fields: &mut FormFields,
) -> Result<()> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|r| rejection(r.status(), r.body_text(), limit_bytes))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection(e.status(), e.body_text(), limit_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| rejection(e.status(), e.body_text(), limit_bytes))?;
            if fields.file.is_none() {
                fields.file = Some(Upload::new(file_name, bytes.to_vec()));
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| rejection(e.status(), e.body_text(), limit_bytes))?;
            fields.set(&name, value);
        }
    }
    Ok(())
}

fn rejection(status: StatusCode, text: String, limit_bytes: usize) -> Html2ImageError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Html2ImageError::UploadTooLarge { limit_bytes }
    } else {
        Html2ImageError::MalformedForm(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, content_type: Option<&str>, body: impl Into<Body>) -> Request {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(body.into()).unwrap()
    }

    #[tokio::test]
    async fn query_only() {
        let req = request(
            "/screenshot?url=https%3A%2F%2Fexample.com&width=800",
            None,
            Body::empty(),
        );
        let f = read_fields(req, 1024).await.unwrap();
        assert_eq!(f.url.as_deref(), Some("https://example.com"));
        assert_eq!(f.width.as_deref(), Some("800"));
        assert!(f.file.is_none());
    }

    #[tokio::test]
    async fn urlencoded_body_overrides_query() {
        let req = request(
            "/screenshot?format=pdf&width=800",
            Some("application/x-www-form-urlencoded"),
            "format=jpeg&crop=true",
        );
        let f = read_fields(req, 1024).await.unwrap();
        assert_eq!(f.format.as_deref(), Some("jpeg"));
        assert_eq!(f.width.as_deref(), Some("800"));
        assert_eq!(f.crop.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn repeated_body_field_keeps_first() {
        let req = request(
            "/screenshot?width=640",
            Some("application/x-www-form-urlencoded"),
            "width=800&width=1024",
        );
        let f = read_fields(req, 1024).await.unwrap();
        assert_eq!(f.width.as_deref(), Some("800"));
    }

    #[tokio::test]
    async fn multipart_file_and_fields() {
        let body = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"page.html\"\r\n\
            Content-Type: text/html\r\n\r\n\
            <h1>hi</h1>\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"quality\"\r\n\r\n\
            80\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"unknown\"\r\n\r\n\
            ignored\r\n\
            --XyZ--\r\n";
        let req = request("/screenshot", Some("multipart/form-data; boundary=XyZ"), body);
        let f = read_fields(req, 1024).await.unwrap();

        let file = f.file.unwrap();
        assert_eq!(file.file_name.as_deref(), Some("page.html"));
        assert_eq!(file.bytes, b"<h1>hi</h1>");
        assert_eq!(f.quality.as_deref(), Some("80"));
    }

    #[tokio::test]
    async fn multipart_without_boundary_is_malformed() {
        let req = request("/screenshot", Some("multipart/form-data"), "junk");
        let err = read_fields(req, 1024).await.unwrap_err();
        assert!(matches!(err, Html2ImageError::MalformedForm(_)), "{err:?}");
    }

    #[test]
    fn payload_too_large_maps_to_upload_error() {
        let e = rejection(StatusCode::PAYLOAD_TOO_LARGE, String::new(), 10);
        assert!(matches!(e, Html2ImageError::UploadTooLarge { limit_bytes: 10 }));
    }
}
