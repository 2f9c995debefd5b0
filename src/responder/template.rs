use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::DomainPayload;
use crate::response::{ContentType, Response};

use super::{Responder, ResponderOutput};

/// A template engine the [`TemplateResponder`] renders through.
pub trait TemplateEngine: Send + Sync + 'static {
    fn render(&self, template: &str, values: &Map<String, Value>) -> Result<String, TemplateError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template \"{0}\" does not exist")]
    NotFound(String),

    #[error("failed to render template \"{template}\": {reason}")]
    Render { template: String, reason: String },
}

/// Renders the payload values into an HTML template.
pub struct TemplateResponder {
    engine: Arc<dyn TemplateEngine>,
    template: Option<String>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl TemplateResponder {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self { engine, template: None, headers: Vec::new() }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Adds a header to every response. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.push((name, value));
        }
        self
    }
}

impl Responder for TemplateResponder {
    fn respond(&self, payload: &DomainPayload, response: Response) -> ResponderOutput {
        let Some(template) = self.template.as_deref().filter(|t| !t.is_empty()) else {
            return ResponderOutput::Failed("no template set to render".to_owned());
        };

        let body = match self.engine.render(template, payload.values()) {
            Ok(body) => body,
            Err(e) => return ResponderOutput::Failed(e.to_string()),
        };

        self.headers
            .iter()
            .fold(response, |res, (name, value)| res.with_header(name.clone(), value.clone()))
            .with_content_type(ContentType::Html)
            .with_status(StatusCode::OK)
            .with_body(body)
            .into()
    }

    fn name(&self) -> String {
        match &self.template {
            Some(template) => format!("TemplateResponder({template})"),
            None => "TemplateResponder".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replaces `{{key}}` with string values.
    struct Braces;

    impl TemplateEngine for Braces {
        fn render(&self, template: &str, values: &Map<String, Value>) -> Result<String, TemplateError> {
            let source = match template {
                "hello.html" => "<p>Hello {{name}}</p>",
                other => return Err(TemplateError::NotFound(other.to_owned())),
            };
            Ok(values.iter().fold(source.to_owned(), |out, (k, v)| {
                out.replace(&format!("{{{{{k}}}}}"), v.as_str().unwrap_or_default())
            }))
        }
    }

    fn responder(template: Option<&str>) -> TemplateResponder {
        let responder = TemplateResponder::new(Arc::new(Braces));
        match template {
            Some(t) => responder.with_template(t),
            None => responder,
        }
    }

    #[test]
    fn renders_payload_values() {
        let payload = DomainPayload::from_values("greeting", [("name", "alice")]);
        let output = responder(Some("hello.html")).respond(&payload, Response::default());

        match output {
            ResponderOutput::Response(res) => {
                assert_eq!(res.body_str(), Some("<p>Hello alice</p>"));
                assert_eq!(res.content_type(), Some("text/html; charset=utf-8"));
            }
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[test]
    fn missing_template_is_a_failure() {
        let payload = DomainPayload::new("greeting");

        assert!(matches!(
            responder(None).respond(&payload, Response::default()),
            ResponderOutput::Failed(reason) if reason.contains("no template")
        ));
        assert!(matches!(
            responder(Some("gone.html")).respond(&payload, Response::default()),
            ResponderOutput::Failed(reason) if reason.contains("gone.html")
        ));
    }
}
