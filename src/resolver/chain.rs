use std::fmt;

use tracing::{debug, error};

use crate::error::{Error, ResolveFailure, Result};
use crate::identifier::{Artifact, Identifier};
use crate::request::Request;

use super::{BoxedResolver, Capability};

/// Decides whether a resolved artifact is usable by the consuming stage.
pub type ResultPredicate = fn(&Artifact) -> bool;

/// An ordered list of resolvers where the first valid result wins.
///
/// Resolvers run strictly in the order given. The first one whose result
/// passes the predicate ends the walk; the rest are never called.
#[derive(Clone)]
pub struct ResolverChain {
    resolvers: Vec<BoxedResolver>,
    expected: Capability,
    predicate: ResultPredicate,
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.resolvers)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

impl ResolverChain {
    /// Builds a chain, rejecting any resolver whose capability differs from
    /// `expected`. A `Generic` chain accepts every resolver.
    pub fn new(resolvers: Vec<BoxedResolver>, expected: Capability) -> Result<Self> {
        if expected != Capability::Generic {
            if let Some((index, resolver)) = resolvers
                .iter()
                .enumerate()
                .find(|(_, r)| r.capability() != expected)
            {
                return Err(Error::InvalidResolver {
                    index,
                    resolver: resolver.name(),
                    expected,
                });
            }
        }

        Ok(Self { resolvers, expected, predicate: Artifact::is_invocable })
    }

    /// Replaces the default "is invocable" validity check.
    pub fn with_predicate(mut self, predicate: ResultPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn expected(&self) -> Capability {
        self.expected
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn resolve(
        &self,
        request: &Request,
        identifier: &Identifier,
    ) -> Result<Artifact, ResolveFailure> {
        for (index, resolver) in self.resolvers.iter().enumerate() {
            match resolver.resolve(request, identifier) {
                Some(artifact) if (self.predicate)(&artifact) => {
                    debug!(
                        %identifier,
                        index,
                        resolver = %resolver.name(),
                        resolved = %artifact.describe(),
                        "identifier resolved",
                    );
                    return Ok(artifact);
                }
                Some(artifact) => {
                    debug!(
                        %identifier,
                        index,
                        resolver = %resolver.name(),
                        resolved = %artifact.describe(),
                        "resolved artifact is not valid, skipped",
                    );
                }
                None => {
                    debug!(%identifier, index, resolver = %resolver.name(), "not found, skipped");
                }
            }
        }

        let failure = ResolveFailure {
            identifier: identifier.to_string(),
            tried: self.resolvers.len(),
        };
        error!(%identifier, tried = failure.tried, "identifier could not be resolved");
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::action::action_fn;
    use crate::resolver::Resolver;
    use crate::response::Response;

    struct Counting {
        result: Option<Artifact>,
        calls: AtomicUsize,
        capability: Capability,
    }

    impl Counting {
        fn new(result: Option<Artifact>) -> Arc<Self> {
            Arc::new(Self { result, calls: AtomicUsize::new(0), capability: Capability::Action })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Resolver for Counting {
        fn resolve(&self, _: &Request, _: &Identifier) -> Option<Artifact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        fn capability(&self) -> Capability {
            self.capability
        }
    }

    fn boxed(resolver: &Arc<Counting>) -> BoxedResolver {
        resolver.clone()
    }

    fn action() -> Artifact {
        Artifact::action(action_fn("found", |_: &Request, res: Response| res))
    }

    #[test]
    fn first_valid_result_wins_and_later_resolvers_are_not_called() {
        let misses = Counting::new(None);
        let value = Counting::new(Some(json!("not invocable").into()));
        let hit = Counting::new(Some(action()));
        let after = Counting::new(Some(action()));

        let chain = ResolverChain::new(
            vec![boxed(&misses), boxed(&value), boxed(&hit), boxed(&after)],
            Capability::Action,
        )
        .unwrap();
        let artifact = chain.resolve(&Request::get("/"), &"token".into()).unwrap();

        assert_eq!(artifact.describe(), "found");
        assert_eq!((misses.calls(), value.calls(), hit.calls()), (1, 1, 1));
        assert_eq!(after.calls(), 0);
    }

    #[test]
    fn exhaustion_consults_every_resolver_once() {
        let resolvers: Vec<_> = (0..3).map(|_| Counting::new(None)).collect();
        let chain = ResolverChain::new(
            resolvers.iter().map(boxed).collect(),
            Capability::Action,
        )
        .unwrap();

        let failure = chain.resolve(&Request::get("/"), &"missing".into()).unwrap_err();

        assert_eq!(failure, ResolveFailure { identifier: "missing".into(), tried: 3 });
        assert!(resolvers.iter().all(|r| r.calls() == 1));
    }

    #[test]
    fn wrong_capability_is_rejected_at_construction() {
        let generic = Arc::new(Counting {
            result: None,
            calls: AtomicUsize::new(0),
            capability: Capability::Generic,
        });
        let err = ResolverChain::new(vec![boxed(&Counting::new(None)), boxed(&generic)], Capability::Action)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidResolver { index: 1, expected: Capability::Action, .. }
        ));
    }

    #[test]
    fn predicate_is_configurable() {
        let value = Counting::new(Some(json!(42).into()));
        let chain = ResolverChain::new(vec![boxed(&value)], Capability::Action)
            .unwrap()
            .with_predicate(|_| true);

        let artifact = chain.resolve(&Request::get("/"), &"answer".into()).unwrap();
        assert!(matches!(artifact, Artifact::Value(v) if v == json!(42)));
    }
}
