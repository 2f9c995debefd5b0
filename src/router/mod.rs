//! Request routing.
//!
//! A [`Router`] maps a request to an action token and back: [`Router::route`]
//! finds the target for a request, [`Router::create_link`] builds the path
//! that would route to a target.
//!
//! Not finding a route is ordinary control flow. It is reported as a
//! [`RoutingResult::Failed`] value, never as an error.

mod matcher;
mod property;
mod regex_router;
mod route;

use indexmap::IndexMap;
use thiserror::Error;

use crate::identifier::Identifier;
use crate::request::Request;

pub use matcher::{BoxedMatcher, Matcher, NumericMatcher, RegexMatcher};
pub use property::PropertyRouter;
pub use regex_router::RegexRouter;
pub use route::Route;

/// Maps requests to action tokens.
pub trait Router: Send + Sync + 'static {
    fn route(&self, request: &Request) -> RoutingResult;

    /// Builds a link to `target` from the given parameters.
    fn create_link(&self, target: &Identifier, params: &[(&str, &str)]) -> Result<String, RouteError>;
}

/// Outcome of routing one request.
#[derive(Clone, Debug)]
pub enum RoutingResult {
    Matched(RouteMatch),
    Failed(RoutingFailure),
}

impl RoutingResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// A matched route: the target plus the decoded path parameters.
#[derive(Clone, Debug)]
pub struct RouteMatch {
    target: Identifier,
    params: IndexMap<String, String>,
}

impl RouteMatch {
    pub fn new(target: impl Into<Identifier>, params: IndexMap<String, String>) -> Self {
        Self { target: target.into(), params }
    }

    pub fn target(&self) -> &Identifier {
        &self.target
    }

    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Why routing produced no target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingFailure {
    #[error("no routes are registered for method {0}")]
    NoRoutesForMethod(String),

    #[error("no route matches {method} {path}")]
    NoMatchingRoute { method: String, path: String },

    /// The request did not name a target and no default is configured.
    #[error("the request names no target")]
    NoTarget,
}

/// Invalid routes and failed link generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route has no path")]
    MissingPath,

    #[error("route {path} has no target")]
    MissingTarget { path: String },

    #[error("route {path} accepts no method")]
    NoMethods { path: String },

    #[error("route pattern {path} does not compile: {reason}")]
    InvalidPattern { path: String, reason: String },

    #[error("please provide a target, otherwise a link cannot be created")]
    EmptyTarget,

    #[error("no route leads to target \"{0}\"")]
    UnknownTarget(String),

    #[error("value \"{value}\" for parameter \"{param}\" is rejected by its matcher")]
    MatcherRejected { param: String, value: String },

    #[error("link {link} still has unresolved parameters")]
    MissingParams { link: String },

    #[error("link parameters could not be encoded: {0}")]
    InvalidLinkParams(String),
}
