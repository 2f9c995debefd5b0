use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::identifier::{Artifact, Identifier};
use crate::negotiation::ContentNegotiationManager;
use crate::request::Request;
use crate::resolver::{BoxedResolver, Capability, Resolver};

use super::{BoxedResponder, HttpStatusCodeResponder};

/// Delegates to the responder resolvers registered for the negotiated
/// media type.
///
/// When negotiation picks nothing, or none of that type's resolvers finds a
/// responder, the not-acceptable responder (`406` by default) is returned
/// instead of failing the chain.
pub struct NegotiatingResponderResolver {
    manager: ContentNegotiationManager,
    resolvers: IndexMap<String, Vec<BoxedResolver>>,
    not_acceptable: BoxedResponder,
}

impl NegotiatingResponderResolver {
    pub fn new(manager: ContentNegotiationManager) -> Self {
        Self {
            manager,
            resolvers: IndexMap::new(),
            not_acceptable: Arc::new(HttpStatusCodeResponder::not_acceptable()),
        }
    }

    /// Registers `resolvers` for `media_type`, after those already present.
    /// Resolvers that are not responder resolvers are dropped.
    pub fn on<I>(mut self, media_type: impl Into<String>, resolvers: I) -> Self
    where
        I: IntoIterator<Item = BoxedResolver>,
    {
        let media_type = media_type.into();
        let valid = resolvers.into_iter().filter(|resolver| {
            let keep = resolver.capability() == Capability::Responder;
            if !keep {
                warn!(
                    media_type = %media_type,
                    resolver = %resolver.name(),
                    "ignoring resolver that does not resolve responders",
                );
            }
            keep
        });
        let valid: Vec<_> = valid.collect();
        self.resolvers.entry(media_type).or_default().extend(valid);
        self
    }

    pub fn with_not_acceptable(mut self, responder: BoxedResponder) -> Self {
        self.not_acceptable = responder;
        self
    }

    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }
}

impl Resolver for NegotiatingResponderResolver {
    fn resolve(&self, request: &Request, identifier: &Identifier) -> Option<Artifact> {
        let priorities: Vec<&str> = self.media_types().collect();
        let negotiated = self.manager.best_match(request, &priorities);

        if let Some(media_type) = &negotiated {
            let candidates = self.resolvers.get(media_type).map(Vec::as_slice).unwrap_or_default();
            for resolver in candidates {
                if let Some(artifact @ Artifact::Responder(_)) = resolver.resolve(request, identifier) {
                    debug!(%identifier, media_type = %media_type, resolver = %resolver.name(), "responder negotiated");
                    return Some(artifact);
                }
            }
        }

        info!(
            %identifier,
            negotiated = negotiated.as_deref().unwrap_or("none"),
            "no responder for the negotiated media type, responding not acceptable",
        );
        Some(Artifact::Responder(Arc::clone(&self.not_acceptable)))
    }

    fn capability(&self) -> Capability {
        Capability::Responder
    }

    fn name(&self) -> String {
        "NegotiatingResponderResolver".to_owned()
    }
}
