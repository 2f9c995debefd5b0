//! The ADR pipeline: routing, action and responder stages in one chain.
//!
//! ```text
//! before_routing*            → RoutingMiddleware
//! before_resolve_action*     → ActionResolverMiddleware
//! before_execute_action*     → ActionExecutorMiddleware
//! before_resolve_responder*  → ResponderResolverMiddleware
//! before_execute_responder*  → ResponderExecutorMiddleware
//! after_responder*
//! ```
//!
//! Each extension point takes any number of middlewares, run in
//! registration order. The whole chain is flattened once, by
//! [`PipelineBuilder::build`].

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, error};

use crate::action::{ActionExecutorMiddleware, ActionResolverMiddleware};
use crate::config::AttributeKeys;
use crate::error::{Error, Result};
use crate::middleware::{BoxedMiddleware, Middleware, Next, RoutingMiddleware, run_chain};
use crate::request::Request;
use crate::resolver::BoxedResolver;
use crate::responder::{ResponderExecutorMiddleware, ResponderResolverMiddleware};
use crate::response::Response;
use crate::router::Router;

/// Assembles a [`Pipeline`].
pub struct PipelineBuilder {
    router: Arc<dyn Router>,
    action_resolvers: Vec<BoxedResolver>,
    responder_resolvers: Vec<BoxedResolver>,
    keys: AttributeKeys,
    before_routing: Vec<BoxedMiddleware>,
    before_resolve_action: Vec<BoxedMiddleware>,
    before_execute_action: Vec<BoxedMiddleware>,
    before_resolve_responder: Vec<BoxedMiddleware>,
    before_execute_responder: Vec<BoxedMiddleware>,
    after_responder: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    pub fn new(router: impl Router) -> Self {
        Self::with_shared_router(Arc::new(router))
    }

    pub fn with_shared_router(router: Arc<dyn Router>) -> Self {
        Self {
            router,
            action_resolvers: Vec::new(),
            responder_resolvers: Vec::new(),
            keys: AttributeKeys::default(),
            before_routing: Vec::new(),
            before_resolve_action: Vec::new(),
            before_execute_action: Vec::new(),
            before_resolve_responder: Vec::new(),
            before_execute_responder: Vec::new(),
            after_responder: Vec::new(),
        }
    }

    pub fn action_resolver(mut self, resolver: BoxedResolver) -> Self {
        self.action_resolvers.push(resolver);
        self
    }

    pub fn action_resolvers(mut self, resolvers: impl IntoIterator<Item = BoxedResolver>) -> Self {
        self.action_resolvers.extend(resolvers);
        self
    }

    pub fn responder_resolver(mut self, resolver: BoxedResolver) -> Self {
        self.responder_resolvers.push(resolver);
        self
    }

    pub fn responder_resolvers(mut self, resolvers: impl IntoIterator<Item = BoxedResolver>) -> Self {
        self.responder_resolvers.extend(resolvers);
        self
    }

    /// Attribute keys shared by every stage.
    pub fn attribute_keys(mut self, keys: AttributeKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn before_routing(mut self, middleware: impl Middleware) -> Self {
        self.before_routing.push(Arc::new(middleware));
        self
    }

    pub fn before_resolve_action(mut self, middleware: impl Middleware) -> Self {
        self.before_resolve_action.push(Arc::new(middleware));
        self
    }

    pub fn before_execute_action(mut self, middleware: impl Middleware) -> Self {
        self.before_execute_action.push(Arc::new(middleware));
        self
    }

    pub fn before_resolve_responder(mut self, middleware: impl Middleware) -> Self {
        self.before_resolve_responder.push(Arc::new(middleware));
        self
    }

    pub fn before_execute_responder(mut self, middleware: impl Middleware) -> Self {
        self.before_execute_responder.push(Arc::new(middleware));
        self
    }

    pub fn after_responder(mut self, middleware: impl Middleware) -> Self {
        self.after_responder.push(Arc::new(middleware));
        self
    }

    /// Flattens the chain. Fails if a resolver list holds a resolver of
    /// the wrong kind.
    pub fn build(self) -> Result<Pipeline> {
        let keys = self.keys;

        let routing = RoutingMiddleware::new(Arc::clone(&self.router), &keys.routing_result);
        let resolve_action =
            ActionResolverMiddleware::new(self.action_resolvers, &keys.routing_result, &keys.action)?;
        let execute_action = ActionExecutorMiddleware::new(&keys.action, &keys.payload);
        let resolve_responder =
            ResponderResolverMiddleware::new(self.responder_resolvers, &keys.payload, &keys.responder)?;
        let execute_responder = ResponderExecutorMiddleware::new(&keys.responder, &keys.payload);

        let mut stages: Vec<BoxedMiddleware> = Vec::new();
        stages.extend(self.before_routing);
        stages.push(Arc::new(routing));
        stages.extend(self.before_resolve_action);
        stages.push(Arc::new(resolve_action));
        stages.extend(self.before_execute_action);
        stages.push(Arc::new(execute_action));
        stages.extend(self.before_resolve_responder);
        stages.push(Arc::new(resolve_responder));
        stages.extend(self.before_execute_responder);
        stages.push(Arc::new(execute_responder));
        stages.extend(self.after_responder);

        debug!(stages = stages.len(), "pipeline assembled");
        Ok(Pipeline { stages, router: self.router, keys })
    }
}

/// A fully wired ADR pipeline.
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    router: Arc<dyn Router>,
    keys: AttributeKeys,
}

impl Pipeline {
    pub fn builder(router: impl Router) -> PipelineBuilder {
        PipelineBuilder::new(router)
    }

    /// A pipeline with default attribute keys and no extra middleware.
    pub fn default_with(
        router: impl Router,
        action_resolvers: Vec<BoxedResolver>,
        responder_resolvers: Vec<BoxedResolver>,
    ) -> Result<Self> {
        PipelineBuilder::new(router)
            .action_resolvers(action_resolvers)
            .responder_resolvers(responder_resolvers)
            .build()
    }

    pub fn router(&self) -> &Arc<dyn Router> {
        &self.router
    }

    pub fn attribute_keys(&self) -> &AttributeKeys {
        &self.keys
    }

    /// Names of the stages in execution order.
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs the request through every stage.
    ///
    /// A request no route leads to gets `404 Not Found`. An action or
    /// responder that fails or returns something it must not gets `500`
    /// with the error message as body. Resolve failures and configuration
    /// errors are returned to the caller.
    pub fn handle(&self, request: Request, response: Response) -> Result<Response> {
        match run_chain(&self.stages, request, response) {
            Err(Error::NoRoute(failure)) => {
                debug!(%failure, "no route");
                Ok(Response::builder().status(StatusCode::NOT_FOUND).text("Not Found"))
            }
            Err(e @ (Error::ActionExecution(_) | Error::ResponderExecution(_))) => {
                error!("pipeline failed: {e}");
                Ok(Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .text(e.to_string()))
            }
            other => other,
        }
    }
}

impl Middleware for Pipeline {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        let response = self.handle(request.clone(), response)?;
        next.run(request, response)
    }

    fn name(&self) -> String {
        "Pipeline".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use crate::resolver::CallableResolver;
    use crate::router::RegexRouter;

    fn pass(name: &'static str) -> impl Middleware {
        FnMiddleware::new(name, |req: Request, res: Response, next: Next<'_>| next.run(req, res))
    }

    #[test]
    fn stages_are_wired_in_order() {
        let pipeline = Pipeline::builder(RegexRouter::new("/"))
            .before_routing(pass("auth"))
            .after_responder(pass("log"))
            .build()
            .unwrap();

        assert_eq!(
            pipeline.stage_names(),
            [
                "auth",
                "RoutingMiddleware",
                "ActionResolverMiddleware",
                "ActionExecutorMiddleware",
                "ResponderResolverMiddleware",
                "ResponderExecutorMiddleware",
                "log",
            ],
        );
    }

    #[test]
    fn exposes_router_and_keys() {
        let router = RegexRouter::new("/")
            .with_route(crate::router::Route::get().from("/user/[:id]").to("user.show"))
            .unwrap();
        let keys = AttributeKeys { action: "custom.action".to_owned(), ..AttributeKeys::default() };
        let pipeline = Pipeline::builder(router).attribute_keys(keys).build().unwrap();

        assert_eq!(pipeline.router().create_link(&"user.show".into(), &[("id", "9")]).unwrap(), "/user/9");
        assert_eq!(pipeline.attribute_keys().action, "custom.action");
    }

    #[test]
    fn wrong_resolver_kinds_fail_the_build() {
        let result = Pipeline::default_with(
            RegexRouter::new("/"),
            vec![Arc::new(CallableResolver::for_responders()) as BoxedResolver],
            vec![],
        );

        assert!(matches!(result, Err(Error::InvalidResolver { index: 0, .. })));
    }
}
