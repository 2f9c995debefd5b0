use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::request::{Attribute, Request};
use crate::response::Response;
use crate::router::{Router, RoutingResult};

use super::{Middleware, Next};

/// Routes the request and stores the [`RoutingResult`] on it.
///
/// Parameters of a matched route are merged into the query parameters.
/// A route parameter replaces a query parameter of the same name.
#[derive(Clone)]
pub struct RoutingMiddleware {
    router: Arc<dyn Router>,
    routing_result_attribute: String,
}

impl RoutingMiddleware {
    pub fn new(router: Arc<dyn Router>, routing_result_attribute: impl Into<String>) -> Self {
        Self { router, routing_result_attribute: routing_result_attribute.into() }
    }
}

impl Middleware for RoutingMiddleware {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        let result = self.router.route(&request);

        let request = match &result {
            RoutingResult::Matched(matched) if !matched.params().is_empty() => {
                request.with_merged_query_params(matched.params())
            }
            RoutingResult::Matched(_) => request,
            RoutingResult::Failed(failure) => {
                debug!(method = %request.method(), path = request.path(), %failure, "routing failed");
                request
            }
        };

        let request = request.with_attribute(&self.routing_result_attribute, Attribute::RoutingResult(result));
        next.run(request, response)
    }

    fn name(&self) -> String {
        "RoutingMiddleware".to_owned()
    }
}
