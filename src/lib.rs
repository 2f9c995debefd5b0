//! # adroit
//!
//! An Action-Domain-Responder pipeline for HTTP services.
//!
//! A request is routed to an *action*. The action returns a
//! [`DomainPayload`], a typed bag of result data, and a *responder* chosen
//! by the payload's type turns it into the final [`Response`]. Both the
//! action and the responder are found by ordered chains of resolvers, so
//! the same identifier can come from a static table, a container, or the
//! route itself.
//!
//! ```text
//! request ─► routing ─► resolve action ─► execute action ─► resolve responder ─► execute responder ─► response
//!                            │                   │                  ▲
//!                            └─ 404 on no route  └─ Response ───────┘ (skips the responder)
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use adroit::action::action_fn;
//! use adroit::resolver::ArrayResolver;
//! use adroit::responder::JsonResponder;
//! use adroit::router::{RegexRouter, Route};
//! use adroit::{Artifact, DomainPayload, Pipeline, Request, Server, WebApplication};
//!
//! #[tokio::main]
//! async fn main() -> adroit::Result<()> {
//!     let router = RegexRouter::new("/")
//!         .with_route(Route::get().from("/users/[:id]").to("user.show"))?;
//!
//!     let actions = ArrayResolver::new([(
//!         "user.show",
//!         Artifact::action(action_fn("user.show", |req: &Request, _| {
//!             DomainPayload::new("user").with_value("id", req.query_param("id").unwrap_or_default())
//!         })),
//!     )])
//!     .for_actions();
//!     let responders = ArrayResolver::new([("user", Artifact::responder(JsonResponder::new()))])
//!         .for_responders();
//!
//!     let pipeline = Pipeline::default_with(router, vec![Arc::new(actions) as _], vec![Arc::new(responders) as _])?;
//!     let app = WebApplication::new().pipe(pipeline);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod application;
mod config;
mod domain;
mod error;
mod identifier;
mod output;
mod pipeline;
mod request;
mod response;
mod server;

pub mod action;
pub mod middleware;
pub mod negotiation;
pub mod resolver;
pub mod responder;
pub mod router;

pub use application::{Emitter, WebApplication, WriterEmitter};
pub use config::{AttributeKeys, Config, RouterConfig, ServerConfig};
pub use domain::DomainPayload;
pub use error::{
    ActionExecutionError, ConfigError, Error, ResolveError, ResolveFailure, ResponderExecutionError, Result,
};
pub use identifier::{Artifact, Identifier};
pub use negotiation::{ContentNegotiationManager, MediaTypeNegotiator, Negotiator};
pub use output::Unexpected;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request::{Attribute, Request};
pub use response::{ContentType, Response, ResponseBuilder};
pub use server::Server;
