//! Minimal adroit example: a JSON user endpoint behind content negotiation.
//!
//! Run with:
//!   RUST_LOG=adroit=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -H 'accept: application/json' http://localhost:3000/users/42
//!   curl -H 'accept: text/html' http://localhost:3000/users/42     # 406
//!   curl http://localhost:3000/users/0                             # 404
//!   curl http://localhost:3000/about
//!   curl http://localhost:3000/healthz

use std::sync::Arc;

use adroit::action::{ForwardAction, action_fn};
use adroit::resolver::{ArrayResolver, BoxedResolver};
use adroit::responder::{JsonResponder, NegotiatingResponderResolver};
use adroit::router::{NumericMatcher, Route};
use adroit::{
    Artifact, Config, ContentNegotiationManager, DomainPayload, Pipeline, Request, Response, Server,
    WebApplication,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> adroit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let router = config.router.regex_router().with_routes([
        Route::get().from("/users/[:id]").to("user.show").if_matches("id", NumericMatcher),
        Route::get().from("/about").to("about"),
        Route::get().from("/healthz").to("healthz"),
    ])?;

    let actions = ArrayResolver::new([
        ("user.show", Artifact::action(action_fn("user.show", show_user))),
        ("healthz", Artifact::action(action_fn("healthz", |_: &Request, _| Response::text("ok")))),
        ("about", Artifact::action(ForwardAction::new("about"))),
    ])
    .for_actions();

    let json = ArrayResolver::new([
        ("user", Artifact::responder(JsonResponder::new().with_header("cache-control", "no-store"))),
        ("about", Artifact::responder(JsonResponder::new())),
    ])
    .for_responders();
    let responders = NegotiatingResponderResolver::new(ContentNegotiationManager::default())
        .on("application/json", [Arc::new(json) as BoxedResolver]);

    let pipeline = Pipeline::builder(router)
        .attribute_keys(config.attributes.clone())
        .action_resolver(Arc::new(actions))
        .responder_resolver(Arc::new(responders))
        .build()?;

    let app = WebApplication::new().pipe(pipeline);

    Server::bind(&config.server.addr)?.serve(app).await
}

// GET /users/:id
fn show_user(req: &Request, _: Response) -> DomainPayload {
    let id = req.query_param("id").unwrap_or_default();
    DomainPayload::new("user")
        .with_status("found")
        .with_values([("id", id), ("name", "alice")])
}
