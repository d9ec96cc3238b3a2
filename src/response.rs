//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Controllers build a [`Response`] and return it. The router passes it
//! through untouched; only routing misses and failures get a response the
//! router writes itself.

use bytes::Bytes;
use http_body_util::Full;
use tracing::error;

use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Json,  // application/json
    Text,  // text/plain; charset=utf-8
    Xml,   // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
            Self::Xml  => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use switchyard::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NoContent);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use switchyard::{ContentType, Response, Status};
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::bytes_raw("application/json", body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    /// `404` with the fixed body `404 Not Found`.
    pub fn not_found() -> Self {
        Self::builder().status(Status::NotFound).text("404 Not Found")
    }

    /// `500` with the fixed body `500 Internal Server Error`.
    pub fn internal_error() -> Self {
        Self::builder().status(Status::InternalServerError).text("500 Internal Server Error")
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: Status::Ok.into(),
        }
    }

    /// Converts into the `http` response hyper writes to the wire.
    ///
    /// A header or status the `http` crate rejects turns the whole response
    /// into a bare 500.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(Bytes::from(self.body))).unwrap_or_else(|e| {
            error!("unencodable response: {e}");
            let mut fallback = http::Response::new(Full::new(Bytes::from_static(
                b"500 Internal Server Error",
            )));
            *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish("application/json", body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::SeeOther`).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// The router renders a dispatch [`Outcome`](crate::Outcome) through this;
/// controllers return a [`Response`] directly.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_fixed_body() {
        let resp = Response::not_found();
        assert_eq!(resp.status_code(), 404);
        assert_eq!(resp.body(), b"404 Not Found");
        assert_eq!(resp.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn builder_keeps_content_type_first() {
        let resp = Response::builder()
            .status(Status::Created)
            .header("location", "/users/1")
            .json(b"{}".to_vec());
        assert_eq!(resp.status_code(), 201);
        assert_eq!(resp.headers()[0].0, "content-type");
        assert_eq!(resp.header("location"), Some("/users/1"));
    }

    #[test]
    fn typed_bytes_set_content_type() {
        let resp = Response::builder()
            .status(Status::Accepted)
            .bytes(ContentType::Xml, b"<ok/>".to_vec());
        assert_eq!(resp.status_code(), 202);
        assert_eq!(resp.header("content-type"), Some("application/xml"));
        assert_eq!(resp.body(), b"<ok/>");
    }

    #[test]
    fn into_http_carries_status_and_headers() {
        let http = Response::builder()
            .status(Status::Accepted)
            .header("x-trace", "abc")
            .text("queued")
            .into_http();
        assert_eq!(http.status(), http::StatusCode::ACCEPTED);
        assert_eq!(http.headers()["x-trace"], "abc");
    }

    #[test]
    fn into_http_rejects_bad_header_as_500() {
        let http = Response::builder()
            .header("bad header", "x")
            .text("nope")
            .into_http();
        assert_eq!(http.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
