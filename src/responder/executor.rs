use crate::error::{ResponderExecutionError, Result};
use crate::middleware::{Middleware, Next};
use crate::request::{Attribute, Request};
use crate::response::Response;

use super::ResponderOutput;

/// Runs the resolved responder against the domain payload.
#[derive(Clone, Debug)]
pub struct ResponderExecutorMiddleware {
    responder_attribute: String,
    payload_attribute: String,
}

impl ResponderExecutorMiddleware {
    pub fn new(responder_attribute: impl Into<String>, payload_attribute: impl Into<String>) -> Self {
        Self {
            responder_attribute: responder_attribute.into(),
            payload_attribute: payload_attribute.into(),
        }
    }
}

impl Middleware for ResponderExecutorMiddleware {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        let responder = match request.attribute(&self.responder_attribute) {
            Some(Attribute::Responder(responder)) => responder.clone(),
            // the action answered directly; nothing left to render
            Some(Attribute::Response(direct)) => {
                let direct = direct.clone();
                return next.run(request, direct);
            }
            Some(other) => {
                return Err(ResponderExecutionError::NotInvocable {
                    attribute: self.responder_attribute.clone(),
                    found: other.kind().to_owned(),
                }
                .into());
            }
            None => {
                return Err(ResponderExecutionError::MissingResponder {
                    attribute: self.responder_attribute.clone(),
                }
                .into());
            }
        };

        let Some(Attribute::Payload(payload)) = request.attribute(&self.payload_attribute) else {
            return Err(ResponderExecutionError::MissingPayload {
                attribute: self.payload_attribute.clone(),
            }
            .into());
        };

        let response = match responder.respond(payload, response) {
            ResponderOutput::Response(response) => response,
            ResponderOutput::Failed(reason) => {
                return Err(ResponderExecutionError::Failed { responder: responder.name(), reason }.into());
            }
            ResponderOutput::Unexpected(returned) => {
                return Err(ResponderExecutionError::InvalidReturn {
                    responder: responder.name(),
                    returned: returned.to_string(),
                }
                .into());
            }
        };

        next.run(request, response)
    }

    fn name(&self) -> String {
        "ResponderExecutorMiddleware".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::domain::DomainPayload;
    use crate::error::Error;
    use crate::responder::{HttpStatusCodeResponder, responder_fn};

    fn execute(request: Request) -> Result<Response> {
        ResponderExecutorMiddleware::new("responder", "payload")
            .process(request, Response::default(), Next::new(&[]))
    }

    fn with_payload(request: Request) -> Request {
        request.with_attribute("payload", Attribute::Payload(DomainPayload::new("user")))
    }

    #[test]
    fn renders_the_payload() {
        let request = with_payload(Request::get("/")).with_attribute(
            "responder",
            Attribute::Responder(Arc::new(HttpStatusCodeResponder::new(StatusCode::ACCEPTED))),
        );

        assert_eq!(execute(request).unwrap().status_code(), StatusCode::ACCEPTED);
    }

    #[test]
    fn a_direct_response_is_returned_untouched() {
        let request = Request::get("/")
            .with_attribute("responder", Attribute::Response(Response::text("direct")));

        assert_eq!(execute(request).unwrap().body_str(), Some("direct"));
    }

    #[test]
    fn missing_slots_are_errors() {
        assert!(matches!(
            execute(Request::get("/")),
            Err(Error::ResponderExecution(ResponderExecutionError::MissingResponder { .. }))
        ));

        let no_payload = Request::get("/").with_attribute(
            "responder",
            Attribute::Responder(Arc::new(HttpStatusCodeResponder::not_acceptable())),
        );
        assert!(matches!(
            execute(no_payload),
            Err(Error::ResponderExecution(ResponderExecutionError::MissingPayload { .. }))
        ));
    }

    #[test]
    fn plain_values_are_not_invocable() {
        let request = with_payload(Request::get("/"))
            .with_attribute("responder", Attribute::Value(json!("json")));

        let err = execute(request).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not execute \"a plain value\" from request attribute \"responder\" because it is not a responder",
        );
    }

    #[test]
    fn unexpected_returns_name_the_responder() {
        let responder = responder_fn("broken", |_: &DomainPayload, _: Response| "oops");
        let request = with_payload(Request::get("/"))
            .with_attribute("responder", Attribute::Responder(Arc::new(responder)));

        let err = execute(request).unwrap_err();
        assert_eq!(err.to_string(), "the responder \"broken\" returned \"&str\" instead of a response");
    }
}
