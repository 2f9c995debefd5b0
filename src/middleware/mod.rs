//! Middleware layer.
//!
//! Every pipeline stage is a [`Middleware`]: it receives the request, the
//! response built so far, and a [`Next`] cursor over the remaining stages.
//! A stage either returns a response itself or calls [`Next::run`] to hand
//! control to the stage after it.
//!
//! ```text
//! routing → resolve action → execute action → resolve responder → execute responder
//!    │            │                │                  │                    │
//!    └─ next.run ─┴──── next.run ──┴───── next.run ───┴────── next.run ────┘
//! ```
//!
//! The empty tail returns the response it was given, so the last stage
//! always ends the chain with whatever it produced.

mod routing;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

pub use routing::RoutingMiddleware;

/// A shared, type-erased pipeline stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// One stage of the request pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response>;

    /// Name used in logs and by [`Pipeline::stage_names`](crate::Pipeline::stage_names).
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_owned()
    }
}

impl fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Middleware({})", self.name())
    }
}

/// The rest of the chain, as seen from one stage.
pub struct Next<'a> {
    stages: &'a [BoxedMiddleware],
}

impl<'a> Next<'a> {
    pub(crate) fn new(stages: &'a [BoxedMiddleware]) -> Self {
        Self { stages }
    }

    /// Runs the next stage, or returns `response` if none is left.
    pub fn run(self, request: Request, response: Response) -> Result<Response> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.process(request, response, Next::new(rest)),
            None => Ok(response),
        }
    }

    /// Number of stages still ahead.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }
}

/// Runs `stages` in order, starting with `response`.
pub fn run_chain(stages: &[BoxedMiddleware], request: Request, response: Response) -> Result<Response> {
    Next::new(stages).run(request, response)
}

/// A closure stage with a name.
///
/// ```rust
/// use adroit::middleware::{FnMiddleware, Next};
/// use adroit::{Request, Response};
///
/// let stamp = FnMiddleware::new("stamp", |req: Request, res: Response, next: Next<'_>| {
///     let res = next.run(req, res)?;
///     Ok(res.with_header(
///         http::header::HeaderName::from_static("x-stamp"),
///         http::HeaderValue::from_static("1"),
///     ))
/// });
/// # let _ = stamp;
/// ```
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(Request, Response, Next<'_>) -> Result<Response> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Response, Next<'_>) -> Result<Response> + Send + Sync + 'static,
{
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        (self.f)(request, response, next)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
