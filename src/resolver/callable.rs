use crate::identifier::{Artifact, Identifier};
use crate::request::Request;

use super::{Capability, Resolver};

/// Returns the identifier itself when it already is an action or responder.
///
/// Lets a route target be a closure, or a payload type be the responder
/// that renders it. A typed resolver only hands back its own kind.
#[derive(Clone, Copy, Debug)]
pub struct CallableResolver {
    capability: Capability,
}

impl CallableResolver {
    pub fn new() -> Self {
        Self { capability: Capability::Generic }
    }

    pub fn for_actions() -> Self {
        Self { capability: Capability::Action }
    }

    pub fn for_responders() -> Self {
        Self { capability: Capability::Responder }
    }
}

impl Default for CallableResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for CallableResolver {
    fn resolve(&self, _request: &Request, identifier: &Identifier) -> Option<Artifact> {
        match (identifier, self.capability) {
            (Identifier::Action(action), Capability::Generic | Capability::Action) => {
                Some(Artifact::Action(action.clone()))
            }
            (Identifier::Responder(responder), Capability::Generic | Capability::Responder) => {
                Some(Artifact::Responder(responder.clone()))
            }
            _ => None,
        }
    }

    fn capability(&self) -> Capability {
        self.capability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::action_fn;
    use crate::response::Response;

    fn closure() -> Identifier {
        Identifier::action(action_fn("inline", |_: &Request, res: Response| res))
    }

    #[test]
    fn invocable_identifiers_resolve_to_themselves() {
        let artifact = CallableResolver::for_actions().resolve(&Request::get("/"), &closure());
        assert_eq!(artifact.map(|a| a.describe()).as_deref(), Some("inline"));
    }

    #[test]
    fn names_are_not_found() {
        let resolver = CallableResolver::new();
        assert!(resolver.resolve(&Request::get("/"), &"user.show".into()).is_none());
    }

    #[test]
    fn typed_resolvers_ignore_the_other_kind() {
        assert!(CallableResolver::for_responders().resolve(&Request::get("/"), &closure()).is_none());
        assert_eq!(CallableResolver::for_responders().capability(), Capability::Responder);
    }
}
