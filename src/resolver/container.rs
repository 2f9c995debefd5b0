use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::identifier::{Artifact, Identifier};
use crate::request::Request;

use super::{Capability, Resolver};

/// A service locator the container resolver reads from.
pub trait Container: Send + Sync + 'static {
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Result<Artifact, ContainerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("no entry was found for \"{0}\"")]
    NotFound(String),

    #[error("failed to build entry \"{id}\": {reason}")]
    Failed { id: String, reason: String },
}

/// Resolves names through a [`Container`].
///
/// With no remappings configured, the identifier is the container id.
/// Once any remapping exists, only remapped identifiers are looked up; the
/// others are not found and the container is not consulted.
///
/// Every failure folds into "not found": a missing entry, a locator error,
/// and an entry of the wrong kind for a typed resolver.
pub struct ContainerResolver {
    container: Arc<dyn Container>,
    remappings: IndexMap<String, String>,
    capability: Capability,
}

impl ContainerResolver {
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self {
            container,
            remappings: IndexMap::new(),
            capability: Capability::Generic,
        }
    }

    pub fn with_remappings<I, K, V>(mut self, remappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.remappings
            .extend(remappings.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn for_actions(mut self) -> Self {
        self.capability = Capability::Action;
        self
    }

    pub fn for_responders(mut self) -> Self {
        self.capability = Capability::Responder;
        self
    }

    fn container_id<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.remappings.is_empty() {
            return Some(name);
        }
        self.remappings.get(name).map(String::as_str)
    }

    fn accepts(&self, artifact: &Artifact) -> bool {
        match self.capability {
            Capability::Generic => true,
            Capability::Action => artifact.is_action(),
            Capability::Responder => artifact.is_responder(),
        }
    }
}

impl Resolver for ContainerResolver {
    fn resolve(&self, _request: &Request, identifier: &Identifier) -> Option<Artifact> {
        let name = identifier.as_name()?;
        let Some(id) = self.container_id(name) else {
            warn!(identifier = name, "no remapping for identifier");
            return None;
        };

        if !self.container.has(id) {
            debug!(id, "container has no entry");
            return None;
        }

        match self.container.get(id) {
            Ok(artifact) if self.accepts(&artifact) => Some(artifact),
            Ok(artifact) => {
                debug!(id, found = %artifact.describe(), expected = %self.capability, "container entry has the wrong kind");
                None
            }
            Err(e) => {
                error!(id, "container lookup failed: {e}");
                None
            }
        }
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn name(&self) -> String {
        format!("ContainerResolver<{}>", self.capability)
    }
}
