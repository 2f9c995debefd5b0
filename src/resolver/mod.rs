//! Resolver abstraction and the concrete lookup strategies.
//!
//! A [`Resolver`] turns an [`Identifier`] into an [`Artifact`], or returns
//! `None` so the next resolver of a [`ResolverChain`] can try. Every resolver
//! declares a [`Capability`]; chains check it once, when they are built.

mod array;
mod callable;
mod chain;
mod container;

use std::fmt;
use std::sync::Arc;

use crate::identifier::{Artifact, Identifier};
use crate::request::Request;

pub use array::ArrayResolver;
pub use callable::CallableResolver;
pub use chain::ResolverChain;
pub use container::{Container, ContainerError, ContainerResolver};

/// A shared, type-erased resolver.
pub type BoxedResolver = Arc<dyn Resolver>;

/// What kind of artifact a resolver is meant to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Capability {
    /// Resolves anything; accepted by no typed chain.
    #[default]
    Generic,
    Action,
    Responder,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generic => "generic",
            Self::Action => "action",
            Self::Responder => "responder",
        })
    }
}

/// Finds the artifact behind an identifier.
pub trait Resolver: Send + Sync + 'static {
    /// `None` means "not found here": the chain moves on to the next resolver.
    fn resolve(&self, request: &Request, identifier: &Identifier) -> Option<Artifact>;

    fn capability(&self) -> Capability {
        Capability::Generic
    }

    /// Name used in logs and configuration errors.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_owned()
    }
}

impl fmt::Debug for dyn Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolver({}, {})", self.name(), self.capability())
    }
}
