use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::identifier::Identifier;
use crate::request::Request;

use super::{Route, RouteError, RouteMatch, Router, RoutingFailure, RoutingResult};

/// `[:name]` placeholders in route paths.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[:(.+?)\]").expect("placeholder pattern is valid"));

/// A route with its path compiled to an anchored, case-insensitive regex.
#[derive(Debug)]
struct CompiledRoute {
    route: Route,
    path: String,
    target: Identifier,
    pattern: Regex,
    params: Vec<String>,
}

impl CompiledRoute {
    fn compile(route: Route) -> Result<Self, RouteError> {
        route.validate()?;
        let (Some(path), Some(target)) = (route.path(), route.target()) else {
            return Err(RouteError::MissingPath);
        };

        let mut pattern = String::from("(?i)^");
        let mut params = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(path) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            pattern.push_str(&regex::escape(&path[last..whole.start()]));
            pattern.push_str(&format!("(?P<{}>[^/]+?)/?", name.as_str()));
            params.push(name.as_str().to_owned());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&path[last..]));
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|e| RouteError::InvalidPattern {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_owned(),
            target: target.clone(),
            pattern,
            params,
            route,
        })
    }

    /// Decoded parameters, if `path` matches and every matcher accepts.
    fn match_path(&self, path: &str) -> Option<IndexMap<String, String>> {
        let caps = self.pattern.captures(path)?;

        let params: IndexMap<String, String> = self
            .params
            .iter()
            .filter_map(|name| {
                let value = caps.name(name)?;
                Some((name.clone(), decode(value.as_str())))
            })
            .collect();

        let rejected = params.iter().find(|(name, value)| {
            !self.route.matchers(name).iter().all(|m| m.matches(value))
        });
        if let Some((name, value)) = rejected {
            debug!(route = %self.path, param = %name, value = %value, "parameter rejected by matcher");
            return None;
        }

        Some(params)
    }
}

/// URL-decodes a captured value, `+` included. Invalid UTF-8 is kept raw.
fn decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| spaced.clone())
}

/// Routes by matching the request path against `[:name]` patterns.
///
/// Routes are indexed by method and tried in registration order. The first
/// route whose pattern matches and whose matchers all accept wins.
///
/// ```rust
/// use adroit::router::{NumericMatcher, RegexRouter, Route, Router};
/// use adroit::Request;
///
/// let router = RegexRouter::new("/")
///     .with_route(Route::get().from("/user/[:id]").to("user.show").if_matches("id", NumericMatcher))
///     .unwrap();
///
/// let link = router.create_link(&"user.show".into(), &[("id", "123")]).unwrap();
/// assert_eq!(link, "/user/123");
/// assert!(router.route(&Request::get("/user/123")).is_matched());
/// ```
#[derive(Clone, Debug)]
pub struct RegexRouter {
    base_url: String,
    default_target: Option<Identifier>,
    routes: IndexMap<String, Vec<Arc<CompiledRoute>>>,
}

impl RegexRouter {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            default_target: None,
            routes: IndexMap::new(),
        }
    }

    /// Target used when no route matches.
    pub fn with_default_target(mut self, target: impl Into<Identifier>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    /// Compiles and registers `route` for each of its methods.
    pub fn with_route(mut self, route: Route) -> Result<Self, RouteError> {
        let compiled = Arc::new(CompiledRoute::compile(route)?);
        for method in compiled.route.methods() {
            self.routes
                .entry(method.clone())
                .or_default()
                .push(Arc::clone(&compiled));
        }
        Ok(self)
    }

    pub fn with_routes<I>(self, routes: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Route>,
    {
        routes.into_iter().try_fold(self, Self::with_route)
    }

    /// Appends every route of `other` after the routes already registered.
    pub fn merge(mut self, other: RegexRouter) -> Self {
        for (method, routes) in other.routes {
            self.routes.entry(method).or_default().extend(routes);
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_target(&self) -> Option<&Identifier> {
        self.default_target.as_ref()
    }

    /// Number of registered routes, counted once per method.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn prefix(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// The path below the base URL. The bare base path is `/`.
    fn strip_base<'p>(&self, path: &'p str) -> Option<&'p str> {
        match path.strip_prefix(self.prefix())? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    fn fallback(&self, failure: RoutingFailure) -> RoutingResult {
        match &self.default_target {
            Some(target) => {
                debug!(target = %target, "using default target");
                RoutingResult::Matched(RouteMatch::new(target.clone(), IndexMap::new()))
            }
            None => RoutingResult::Failed(failure),
        }
    }
}

impl Router for RegexRouter {
    fn route(&self, request: &Request) -> RoutingResult {
        let method = request.method().as_str();
        let Some(routes) = self.routes.get(method) else {
            debug!(method, "no routes registered for method");
            return self.fallback(RoutingFailure::NoRoutesForMethod(method.to_owned()));
        };

        let full_path = request.path().split('?').next().unwrap_or_default();
        debug!(path = full_path, "analysing request path");

        if let Some(path) = self.strip_base(full_path) {
            for compiled in routes {
                debug!(route = %compiled.path, "trying route");
                if let Some(params) = compiled.match_path(path) {
                    debug!(route = %compiled.path, target = %compiled.target, "route matched");
                    return RoutingResult::Matched(RouteMatch::new(compiled.target.clone(), params));
                }
            }
        }

        self.fallback(RoutingFailure::NoMatchingRoute {
            method: method.to_owned(),
            path: full_path.to_owned(),
        })
    }

    fn create_link(&self, target: &Identifier, params: &[(&str, &str)]) -> Result<String, RouteError> {
        if target.is_empty() {
            return Err(RouteError::EmptyTarget);
        }

        let compiled = self
            .routes
            .values()
            .flatten()
            .find(|compiled| compiled.target == *target)
            .ok_or_else(|| RouteError::UnknownTarget(target.to_string()))?;

        let mut link = compiled.path.clone();
        for (name, value) in params {
            if !compiled.route.matchers(name).iter().all(|m| m.matches(value)) {
                return Err(RouteError::MatcherRejected {
                    param: (*name).to_owned(),
                    value: (*value).to_owned(),
                });
            }
            let encoded: Cow<'_, str> = urlencoding::encode(value);
            link = link.replace(&format!("[:{name}]"), &encoded);
        }

        if PLACEHOLDER.is_match(&link) {
            return Err(RouteError::MissingParams { link });
        }

        Ok(format!("{}{link}", self.prefix()))
    }
}
