use crate::error::{Error, ResolveError, Result};
use crate::identifier::Artifact;
use crate::middleware::{Middleware, Next};
use crate::request::{Attribute, Request};
use crate::resolver::{BoxedResolver, Capability, ResolverChain};
use crate::response::Response;
use crate::router::RoutingResult;

/// Resolves the routed action token into an action and stores it on the
/// request.
///
/// A failed routing result ends the request with [`Error::NoRoute`] before
/// any resolver runs.
#[derive(Debug)]
pub struct ActionResolverMiddleware {
    chain: ResolverChain,
    routing_result_attribute: String,
    action_attribute: String,
}

impl ActionResolverMiddleware {
    pub fn new(
        resolvers: Vec<BoxedResolver>,
        routing_result_attribute: impl Into<String>,
        action_attribute: impl Into<String>,
    ) -> Result<Self> {
        let chain = ResolverChain::new(resolvers, Capability::Action)?.with_predicate(Artifact::is_action);

        Ok(Self {
            chain,
            routing_result_attribute: routing_result_attribute.into(),
            action_attribute: action_attribute.into(),
        })
    }
}

impl Middleware for ActionResolverMiddleware {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        let target = match request.attribute(&self.routing_result_attribute) {
            Some(Attribute::RoutingResult(RoutingResult::Matched(matched))) => matched.target(),
            Some(Attribute::RoutingResult(RoutingResult::Failed(failure))) => {
                return Err(Error::NoRoute(failure.clone()));
            }
            _ => {
                return Err(Error::ActionResolve(ResolveError::MissingIdentifier {
                    attribute: self.routing_result_attribute.clone(),
                }));
            }
        };

        let action = self
            .chain
            .resolve(&request, target)
            .map_err(|failure| Error::ActionResolve(failure.into()))?;

        let request = request.with_attribute(&self.action_attribute, action.into());
        next.run(request, response)
    }

    fn name(&self) -> String {
        "ActionResolverMiddleware".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;

    use super::*;
    use crate::action::action_fn;
    use crate::error::ResolveFailure;
    use crate::resolver::{ArrayResolver, CallableResolver};
    use crate::router::{RouteMatch, RoutingFailure};

    fn middleware() -> ActionResolverMiddleware {
        let table = ArrayResolver::new([(
            "home",
            Artifact::action(action_fn("home", |_: &Request, res: Response| res)),
        )])
        .for_actions();

        ActionResolverMiddleware::new(
            vec![Arc::new(CallableResolver::for_actions()), Arc::new(table)],
            "routing",
            "action",
        )
        .unwrap()
    }

    fn routed(result: RoutingResult) -> Request {
        Request::get("/").with_attribute("routing", Attribute::RoutingResult(result))
    }

    fn matched(target: &str) -> RoutingResult {
        RoutingResult::Matched(RouteMatch::new(target, IndexMap::new()))
    }

    #[test]
    fn failed_routing_short_circuits() {
        let err = middleware()
            .process(routed(RoutingResult::Failed(RoutingFailure::NoTarget)), Response::default(), Next::new(&[]))
            .unwrap_err();

        assert!(matches!(err, Error::NoRoute(RoutingFailure::NoTarget)));
    }

    #[test]
    fn unknown_tokens_exhaust_the_chain() {
        let err = middleware()
            .process(routed(matched("missing")), Response::default(), Next::new(&[]))
            .unwrap_err();

        match err {
            Error::ActionResolve(ResolveError::Exhausted(failure)) => {
                assert_eq!(failure, ResolveFailure { identifier: "missing".into(), tried: 2 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_routing_result() {
        let err = middleware()
            .process(Request::get("/"), Response::default(), Next::new(&[]))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "none of the given resolvers could resolve an action: could not determine an identifier from request attribute \"routing\"",
        );
    }

    #[test]
    fn resolves_table_entries() {
        // with no further stage, the response passes straight through
        let response = middleware()
            .process(routed(matched("home")), Response::text("ok"), Next::new(&[]))
            .unwrap();

        assert_eq!(response.body_str(), Some("ok"));
    }
}
