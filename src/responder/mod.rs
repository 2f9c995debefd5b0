//! Responders and their two pipeline stages.
//!
//! A responder turns the [`DomainPayload`] an action produced into the final
//! [`Response`]. Like actions, responders are stored as `Arc<dyn Responder>`
//! and any `Fn(&DomainPayload, Response) -> impl Into<ResponderOutput>`
//! closure qualifies.

mod executor;
mod json;
mod negotiating;
mod resolver;
mod status;
mod template;

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::DomainPayload;
use crate::output::{Unexpected, unexpected_output};
use crate::response::Response;

pub use executor::ResponderExecutorMiddleware;
pub use json::JsonResponder;
pub use negotiating::NegotiatingResponderResolver;
pub use resolver::ResponderResolverMiddleware;
pub use status::HttpStatusCodeResponder;
pub use template::{TemplateEngine, TemplateError, TemplateResponder};

/// A shared, type-erased responder.
pub type BoxedResponder = Arc<dyn Responder>;

/// Builds the response for a domain payload.
pub trait Responder: Send + Sync + 'static {
    fn respond(&self, payload: &DomainPayload, response: Response) -> ResponderOutput;

    /// Name used in logs and error messages.
    fn name(&self) -> String {
        type_name::<Self>().to_owned()
    }
}

impl fmt::Debug for dyn Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Responder({})", self.name())
    }
}

impl<F, R> Responder for F
where
    F: Fn(&DomainPayload, Response) -> R + Send + Sync + 'static,
    R: Into<ResponderOutput>,
{
    fn respond(&self, payload: &DomainPayload, response: Response) -> ResponderOutput {
        self(payload, response).into()
    }
}

/// Everything a responder can return. Only `Response` is a success.
#[derive(Clone, Debug)]
pub enum ResponderOutput {
    Response(Response),
    /// The responder could not build a response, with the reason.
    Failed(String),
    Unexpected(Unexpected),
}

impl From<Response> for ResponderOutput {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<Unexpected> for ResponderOutput {
    fn from(unexpected: Unexpected) -> Self {
        Self::Unexpected(unexpected)
    }
}

impl<E: fmt::Display> From<Result<Response, E>> for ResponderOutput {
    fn from(result: Result<Response, E>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

impl From<Option<Response>> for ResponderOutput {
    fn from(value: Option<Response>) -> Self {
        match value {
            Some(response) => Self::Response(response),
            None => Self::Unexpected(Unexpected::of::<Option<Response>>()),
        }
    }
}

unexpected_output!(ResponderOutput: (), String, &'static str, DomainPayload, Value);

/// A closure responder with an explicit name.
pub struct ResponderFn<F> {
    name: String,
    f: F,
}

pub fn responder_fn<F, R>(name: impl Into<String>, f: F) -> ResponderFn<F>
where
    F: Fn(&DomainPayload, Response) -> R + Send + Sync + 'static,
    R: Into<ResponderOutput>,
{
    ResponderFn { name: name.into(), f }
}

impl<F, R> Responder for ResponderFn<F>
where
    F: Fn(&DomainPayload, Response) -> R + Send + Sync + 'static,
    R: Into<ResponderOutput>,
{
    fn respond(&self, payload: &DomainPayload, response: Response) -> ResponderOutput {
        (self.f)(payload, response).into()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_become_failures() {
        let responder = responder_fn("fails", |_: &DomainPayload, _: Response| {
            Err::<Response, _>("template missing")
        });

        match responder.respond(&DomainPayload::new("x"), Response::default()) {
            ResponderOutput::Failed(reason) => assert_eq!(reason, "template missing"),
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn payloads_are_unexpected() {
        let responder = |p: &DomainPayload, _: Response| p.clone();
        let output = responder.respond(&DomainPayload::new("x"), Response::default());

        assert!(matches!(output, ResponderOutput::Unexpected(u) if u.type_name().ends_with("DomainPayload")));
    }
}
