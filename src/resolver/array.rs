use indexmap::IndexMap;

use crate::identifier::{Artifact, Identifier};
use crate::request::Request;

use super::{Capability, Resolver};

/// Looks names up in a table fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct ArrayResolver {
    mappings: IndexMap<String, Artifact>,
    capability: Capability,
}

impl ArrayResolver {
    pub fn new<I, K>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, Artifact)>,
        K: Into<String>,
    {
        Self {
            mappings: mappings.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            capability: Capability::Generic,
        }
    }

    /// Declares the table as holding actions.
    pub fn for_actions(mut self) -> Self {
        self.capability = Capability::Action;
        self
    }

    /// Declares the table as holding responders.
    pub fn for_responders(mut self) -> Self {
        self.capability = Capability::Responder;
        self
    }
}

impl Resolver for ArrayResolver {
    fn resolve(&self, _request: &Request, identifier: &Identifier) -> Option<Artifact> {
        self.mappings.get(identifier.as_name()?).cloned()
    }

    fn capability(&self) -> Capability {
        self.capability
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::action::action_fn;
    use crate::response::Response;

    #[test]
    fn resolves_mapped_names() {
        let resolver = ArrayResolver::new([
            ("home", Artifact::action(action_fn("home", |_: &Request, res: Response| res))),
            ("answer", Artifact::from(json!(42))),
        ])
        .for_actions();
        let request = Request::get("/");

        assert_eq!(resolver.resolve(&request, &"home".into()).map(|a| a.describe()).as_deref(), Some("home"));
        assert!(resolver.resolve(&request, &"answer".into()).is_some_and(|a| !a.is_invocable()));
        assert!(resolver.resolve(&request, &"unknown".into()).is_none());
    }
}
