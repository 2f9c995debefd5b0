//! Outgoing HTTP response type.
//!
//! A [`Response`] is threaded through the pipeline by value. Every stage that
//! wants a different response builds a new one from the old: the `with_*`
//! methods consume `self` and hand back the modified copy.

use std::io::{self, Write};

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values the built-in responders send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream
    Text,        // text/plain; charset=utf-8
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }

    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use adroit::{ContentType, Response};
/// use http::StatusCode;
///
/// let ok = Response::text("hello");
/// let gone = Response::status(StatusCode::GONE);
/// let created = Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// assert_eq!(created.content_type(), Some(ContentType::Json.as_str()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, ..Self::default() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn with_status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Replaces every value of `name` with `value`.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_content_type(self, content_type: ContentType) -> Self {
        self.with_header(CONTENT_TYPE, content_type.header_value())
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Converts into the `http` representation hyper sends on the wire.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }

    /// Serialises the response as an HTTP/1.1 message.
    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or(""),
        )?;
        write!(writer, "content-length: {}\r\n", self.body.len())?;
        for (name, value) in &self.headers {
            if *name == CONTENT_LENGTH {
                continue;
            }
            writer.write_all(name.as_str().as_bytes())?;
            writer.write_all(b": ")?;
            writer.write_all(value.as_bytes())?;
            writer.write_all(b"\r\n")?;
        }
        writer.write_all(b"\r\n")?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Appends a header. Names or values that are not valid HTTP are skipped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) =
            (HeaderName::try_from(name), HeaderValue::try_from(value))
        {
            self.headers.append(name, value);
        }
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(ContentType::Json, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text, Bytes::from(body.into()))
    }

    /// Terminate with an HTML body (`text/html; charset=utf-8`).
    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Html, Bytes::from(body.into()))
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(mut self, content_type: ContentType, body: Bytes) -> Response {
        self.headers.insert(CONTENT_TYPE, content_type.header_value());
        Response { body, headers: self.headers, status: self.status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_methods_return_a_modified_copy() {
        let template = Response::default();
        let response = template
            .clone()
            .with_status(StatusCode::ACCEPTED)
            .with_content_type(ContentType::Json)
            .with_body("{}");

        assert_eq!(template.status_code(), StatusCode::OK);
        assert!(template.body().is_empty());
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.body_str(), Some("{}"));
    }

    #[test]
    fn builder_skips_invalid_headers() {
        let response = Response::builder()
            .header("x-ok", "yes")
            .header("bad header", "value")
            .no_body();

        assert_eq!(response.header("x-ok"), Some("yes"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn writes_an_http1_message() {
        let response = Response::builder()
            .status(StatusCode::NOT_ACCEPTABLE)
            .text("nope");
        let mut out = Vec::new();
        response.write_to(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("HTTP/1.1 406 Not Acceptable\r\n"));
        assert!(out.contains("content-length: 4\r\n"));
        assert!(out.contains("content-type: text/plain; charset=utf-8\r\n"));
        assert!(out.ends_with("\r\n\r\nnope"));
    }

    #[test]
    fn writes_content_length_once() {
        let response = Response::builder()
            .header("content-length", "99")
            .text("four");
        let mut out = Vec::new();
        response.write_to(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(out.matches("content-length").count(), 1, "{out}");
        assert!(out.contains("content-length: 4\r\n"));
    }

    #[test]
    fn converts_into_an_http_response() {
        let response = Response::status(StatusCode::NO_CONTENT).into_http();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
