use indexmap::IndexMap;
use tracing::debug;

use crate::identifier::Identifier;
use crate::request::Request;

use super::{RouteError, RouteMatch, Router, RoutingFailure, RoutingResult};

/// Reads the target from a query parameter (`?action=user.show`).
#[derive(Clone, Debug)]
pub struct PropertyRouter {
    base_url: String,
    listener: String,
    default_target: Option<Identifier>,
}

impl PropertyRouter {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            listener: "action".to_owned(),
            default_target: None,
        }
    }

    /// Query parameter holding the target. Defaults to `action`.
    pub fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = listener.into();
        self
    }

    pub fn with_default_target(mut self, target: impl Into<Identifier>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    pub fn listener(&self) -> &str {
        &self.listener
    }
}

impl Router for PropertyRouter {
    fn route(&self, request: &Request) -> RoutingResult {
        let target = match request.query_param(&self.listener).filter(|t| !t.is_empty()) {
            Some(token) => Identifier::from(token),
            None => match &self.default_target {
                Some(target) => target.clone(),
                None => return RoutingResult::Failed(RoutingFailure::NoTarget),
            },
        };
        debug!(listener = %self.listener, %target, "target read from query");

        RoutingResult::Matched(RouteMatch::new(target, IndexMap::new()))
    }

    fn create_link(&self, target: &Identifier, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let Some(name) = target.as_name().filter(|n| !n.is_empty()) else {
            return Err(RouteError::EmptyTarget);
        };

        let mut pairs = vec![(self.listener.as_str(), name)];
        pairs.extend_from_slice(params);
        let query = serde_urlencoded::to_string(&pairs)
            .map_err(|e| RouteError::InvalidLinkParams(e.to_string()))?;

        Ok(format!("{}?{query}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_listener_parameter() {
        let router = PropertyRouter::new("/index.php").with_listener("cmd");
        let request = Request::get("/index.php").with_query_params([("cmd", "user.show")]);

        let RoutingResult::Matched(matched) = router.route(&request) else {
            panic!("expected a match");
        };
        assert_eq!(matched.target(), &Identifier::from("user.show"));
    }

    #[test]
    fn falls_back_to_the_default_target() {
        let router = PropertyRouter::new("/");
        assert!(matches!(
            router.route(&Request::get("/")),
            RoutingResult::Failed(RoutingFailure::NoTarget)
        ));

        let router = router.with_default_target("home");
        let RoutingResult::Matched(matched) = router.route(&Request::get("/")) else {
            panic!("expected a match");
        };
        assert_eq!(matched.target().to_string(), "home");
    }

    #[test]
    fn builds_query_links() {
        let router = PropertyRouter::new("http://localhost");

        assert_eq!(
            router.create_link(&"user.show".into(), &[("id", "1"), ("q", "a b&c")]).unwrap(),
            "http://localhost/?action=user.show&id=1&q=a+b%26c",
        );
        assert_eq!(router.create_link(&"".into(), &[]), Err(RouteError::EmptyTarget));
    }
}
