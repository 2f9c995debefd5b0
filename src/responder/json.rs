use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

use crate::domain::DomainPayload;
use crate::response::{ContentType, Response};

use super::{Responder, ResponderOutput};

/// Renders the payload values as a JSON object.
///
/// Always answers `200 OK` with `content-type: application/json`; extra
/// headers can be added but cannot replace the content type.
#[derive(Clone, Debug, Default)]
pub struct JsonResponder {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl JsonResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to every response. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.push((name, value));
        }
        self
    }
}

impl Responder for JsonResponder {
    fn respond(&self, payload: &DomainPayload, response: Response) -> ResponderOutput {
        let body = match serde_json::to_vec(payload.values()) {
            Ok(body) => body,
            Err(e) => return ResponderOutput::Failed(format!("could not encode payload values: {e}")),
        };

        let response = self
            .headers
            .iter()
            .fold(response, |res, (name, value)| res.with_header(name.clone(), value.clone()));

        response
            .with_content_type(ContentType::Json)
            .with_status(StatusCode::OK)
            .with_body(body)
            .into()
    }

    fn name(&self) -> String {
        "JsonResponder".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respond(responder: &JsonResponder, payload: &DomainPayload) -> Response {
        match responder.respond(payload, Response::status(StatusCode::ACCEPTED)) {
            ResponderOutput::Response(response) => response,
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[test]
    fn encodes_the_payload_values() {
        let payload = DomainPayload::from_values("user", [("name", "alice")]);
        let response = respond(&JsonResponder::new(), &payload);

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.body_str(), Some(r#"{"name":"alice"}"#));
    }

    #[test]
    fn content_type_cannot_be_overridden() {
        let responder = JsonResponder::new()
            .with_header("content-type", "text/plain")
            .with_header("x-version", "2");
        let response = respond(&responder, &DomainPayload::new("user"));

        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.header("x-version"), Some("2"));
        assert_eq!(response.body_str(), Some("{}"));
    }
}
