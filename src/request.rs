//! Incoming HTTP request type and the attributes stages attach to it.
//!
//! A [`Request`] is never modified in place. Each `with_*` method borrows the
//! request and returns a changed copy, so a stage can hand a new request to
//! the next one while the value it received stays as it was.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, IntoHeaderName};
use http::Method;
use indexmap::IndexMap;
use serde_json::Value;

use crate::action::BoxedAction;
use crate::domain::DomainPayload;
use crate::identifier::Artifact;
use crate::responder::BoxedResponder;
use crate::response::Response;
use crate::router::RoutingResult;

/// A typed value stored on a request under a configured attribute key.
#[derive(Clone, Debug)]
pub enum Attribute {
    RoutingResult(RoutingResult),
    Action(BoxedAction),
    Payload(DomainPayload),
    Response(Response),
    Responder(BoxedResponder),
    Value(Value),
}

impl Attribute {
    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoutingResult(_) => "a routing result",
            Self::Action(_) => "an action",
            Self::Payload(_) => "a domain payload",
            Self::Response(_) => "a response",
            Self::Responder(_) => "a responder",
            Self::Value(_) => "a plain value",
        }
    }
}

impl From<Artifact> for Attribute {
    fn from(artifact: Artifact) -> Self {
        match artifact {
            Artifact::Action(action) => Self::Action(action),
            Artifact::Responder(responder) => Self::Responder(responder),
            Artifact::Value(value) => Self::Value(value),
        }
    }
}

/// An incoming HTTP request.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: IndexMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
    attributes: IndexMap<String, Attribute>,
}

impl Request {
    /// Creates a request for `path`. A query string left on the path is
    /// ignored by the routers; use [`Request::with_query_params`] to set
    /// parsed parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: IndexMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Builds a request from hyper's parts and an already collected body.
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let query = parts
            .uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .unwrap_or_default();

        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: query.into_iter().collect(),
            headers: parts.headers,
            body,
            attributes: IndexMap::new(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Header lookup (case-insensitive, as header names always are).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a repeated header, joined with `", "`.
    pub fn header_line(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        (!values.is_empty()).then(|| values.join(", "))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &IndexMap<String, Attribute> {
        &self.attributes
    }

    pub fn with_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) -> Self {
        let mut new = self.clone();
        new.headers.append(name, value);
        new
    }

    pub fn with_body(&self, body: impl Into<Bytes>) -> Self {
        let mut new = self.clone();
        new.body = body.into();
        new
    }

    /// Replaces the whole query parameter set.
    pub fn with_query_params<I, K, V>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut new = self.clone();
        new.query = params.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        new
    }

    /// Merges `params` into the query set. On a name clash the merged value
    /// wins over the one already present.
    pub fn with_merged_query_params<I, K, V>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut new = self.clone();
        new.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        new
    }

    pub fn with_attribute(&self, key: impl Into<String>, value: Attribute) -> Self {
        let mut new = self.clone();
        new.attributes.insert(key.into(), value);
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::ACCEPT;

    #[test]
    fn with_attribute_does_not_touch_the_original() {
        let original = Request::get("/");
        let updated = original.with_attribute("k", Attribute::Value(Value::from(1)));

        assert!(original.attribute("k").is_none());
        assert!(matches!(updated.attribute("k"), Some(Attribute::Value(_))));
    }

    #[test]
    fn merged_query_params_overwrite_existing_names() {
        let request = Request::get("/")
            .with_query_params([("p", "old"), ("q", "kept")])
            .with_merged_query_params([("p", "new")]);

        assert_eq!(request.query_param("p"), Some("new"));
        assert_eq!(request.query_param("q"), Some("kept"));
    }

    #[test]
    fn header_line_joins_repeated_headers() {
        let request = Request::get("/")
            .with_header(ACCEPT, HeaderValue::from_static("text/html"))
            .with_header(ACCEPT, HeaderValue::from_static("application/json;q=0.5"));

        assert_eq!(
            request.header_line("accept").as_deref(),
            Some("text/html, application/json;q=0.5"),
        );
        assert_eq!(request.header_line("x-missing"), None);
    }

    #[test]
    fn from_parts_parses_the_query_string() {
        let (parts, ()) = http::Request::builder()
            .method(Method::PUT)
            .uri("/users/7?name=al%20ice&flag=1")
            .body(())
            .unwrap()
            .into_parts();
        let request = Request::from_parts(parts, Bytes::from_static(b"body"));

        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.path(), "/users/7");
        assert_eq!(request.query_param("name"), Some("al ice"));
        assert_eq!(request.query_param("flag"), Some("1"));
        assert_eq!(request.body().as_ref(), b"body");
    }
}
