//! Actions and their two pipeline stages.
//!
//! # How actions are stored
//!
//! Resolvers hand out actions of *different* concrete types, so a resolved
//! action is kept behind a trait object and shared by `Arc`:
//!
//! ```text
//! |req: &Request, res| DomainPayload::new("user")   ← user writes this
//!        ↓ action_fn("user.show", …)
//! ActionFn { name, f }                              ← named wrapper
//!        ↓ Artifact::action(…) / Identifier::action(…)
//! Arc<dyn Action>  (BoxedAction)                    ← stored in tables / attributes
//!        ↓
//! action.execute(&request, response)                ← one vtable dispatch
//!        ↓
//! ActionOutput::{Payload, Response, Unexpected}     ← checked by the executor
//! ```
//!
//! Any `Fn(&Request, Response) -> impl Into<ActionOutput>` is an action.
//! Wrap it with [`action_fn`] to give it a readable name in diagnostics.

mod executor;
mod resolver;

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::DomainPayload;
use crate::output::{Unexpected, unexpected_output};
use crate::request::Request;
use crate::response::Response;

pub use executor::ActionExecutorMiddleware;
pub use resolver::ActionResolverMiddleware;

/// A shared, type-erased action.
pub type BoxedAction = Arc<dyn Action>;

/// Application logic invoked for a routed request.
///
/// Returns a [`DomainPayload`] for a responder to render, or a finished
/// [`Response`] that skips the responder stages.
pub trait Action: Send + Sync + 'static {
    fn execute(&self, request: &Request, response: Response) -> ActionOutput;

    /// Name used in logs and error messages.
    fn name(&self) -> String {
        type_name::<Self>().to_owned()
    }
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.name())
    }
}

impl<F, R> Action for F
where
    F: Fn(&Request, Response) -> R + Send + Sync + 'static,
    R: Into<ActionOutput>,
{
    fn execute(&self, request: &Request, response: Response) -> ActionOutput {
        self(request, response).into()
    }
}

// ── ActionOutput ──────────────────────────────────────────────────────────────

/// Everything an action can return.
///
/// Only `Payload` and `Response` are valid. `Unexpected` keeps other return
/// values representable so the executor can report them.
#[derive(Clone, Debug)]
pub enum ActionOutput {
    Payload(DomainPayload),
    Response(Response),
    Unexpected(Unexpected),
}

impl From<DomainPayload> for ActionOutput {
    fn from(payload: DomainPayload) -> Self {
        Self::Payload(payload)
    }
}

impl From<Response> for ActionOutput {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<Unexpected> for ActionOutput {
    fn from(unexpected: Unexpected) -> Self {
        Self::Unexpected(unexpected)
    }
}

/// `None` is reported as an unexpected `Option<T>`.
impl<T: Into<ActionOutput>> From<Option<T>> for ActionOutput {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Unexpected(Unexpected::of::<Option<T>>()),
        }
    }
}

unexpected_output!(ActionOutput: (), String, &'static str, bool, i64, Value);

// ── Named closures ────────────────────────────────────────────────────────────

/// A closure action with an explicit name.
pub struct ActionFn<F> {
    name: String,
    f: F,
}

/// Names a closure so resolve and execution errors can identify it.
pub fn action_fn<F, R>(name: impl Into<String>, f: F) -> ActionFn<F>
where
    F: Fn(&Request, Response) -> R + Send + Sync + 'static,
    R: Into<ActionOutput>,
{
    ActionFn { name: name.into(), f }
}

impl<F, R> Action for ActionFn<F>
where
    F: Fn(&Request, Response) -> R + Send + Sync + 'static,
    R: Into<ActionOutput>,
{
    fn execute(&self, request: &Request, response: Response) -> ActionOutput {
        (self.f)(request, response).into()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

// ── ForwardAction ─────────────────────────────────────────────────────────────

/// Forwards straight to a responder: returns an empty payload whose type is
/// the configured responder id.
#[derive(Clone, Debug)]
pub struct ForwardAction {
    responder: String,
}

impl ForwardAction {
    pub fn new(responder: impl Into<String>) -> Self {
        Self { responder: responder.into() }
    }
}

impl Action for ForwardAction {
    fn execute(&self, _request: &Request, _response: Response) -> ActionOutput {
        DomainPayload::new(self.responder.as_str()).into()
    }

    fn name(&self) -> String {
        format!("forward:{}", self.responder)
    }
}
