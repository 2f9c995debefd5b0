//! Unified error type.
//!
//! Ordinary "nothing found" outcomes never show up here: a resolver that
//! cannot resolve returns `None`, a router that finds no route returns a
//! failed [`RoutingResult`](crate::router::RoutingResult). The variants below
//! are the conditions a pipeline stage cannot recover from on its own.

use std::path::PathBuf;

use thiserror::Error;

use crate::resolver::Capability;
use crate::router::{RouteError, RoutingFailure};

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by adroit's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    /// None of the configured action resolvers produced an action.
    #[error("none of the given resolvers could resolve an action: {0}")]
    ActionResolve(#[source] ResolveError),

    /// None of the configured responder resolvers produced a responder.
    #[error("none of the given resolvers could resolve a responder: {0}")]
    ResponderResolve(#[source] ResolveError),

    /// A resolver chain was configured with a resolver of the wrong kind.
    #[error("resolver at index {index} of type \"{resolver}\" is not a valid {expected} resolver")]
    InvalidResolver {
        index: usize,
        resolver: String,
        expected: Capability,
    },

    #[error(transparent)]
    ActionExecution(#[from] ActionExecutionError),

    #[error(transparent)]
    ResponderExecution(#[from] ResponderExecutionError),

    /// The routing stage found no target for the request.
    #[error("no route: {0}")]
    NoRoute(RoutingFailure),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid socket address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Every resolver of a chain was consulted and none produced a valid result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier \"{identifier}\" could not be resolved by any of {tried} resolver(s)")]
pub struct ResolveFailure {
    /// String form of the identifier that was looked up.
    pub identifier: String,
    /// Number of resolvers consulted.
    pub tried: usize,
}

/// Why a resolver stage could not produce its artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("could not determine an identifier from request attribute \"{attribute}\"")]
    MissingIdentifier { attribute: String },

    #[error(transparent)]
    Exhausted(#[from] ResolveFailure),
}

/// Failures of the action executor stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionExecutionError {
    #[error("could not find an action in request attribute \"{attribute}\"")]
    MissingAction { attribute: String },

    #[error("request attribute \"{attribute}\" holds {found}, which is not an action")]
    NotInvocable { attribute: String, found: &'static str },

    #[error(
        "the action \"{action}\" returned \"{returned}\", which is neither a domain payload nor a response"
    )]
    InvalidReturn { action: String, returned: String },
}

/// Failures of the responder executor stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponderExecutionError {
    #[error("could not find a responder in request attribute \"{attribute}\"")]
    MissingResponder { attribute: String },

    #[error("could not find a domain payload in request attribute \"{attribute}\"")]
    MissingPayload { attribute: String },

    #[error("could not execute \"{found}\" from request attribute \"{attribute}\" because it is not a responder")]
    NotInvocable { attribute: String, found: String },

    #[error("the responder \"{responder}\" returned \"{returned}\" instead of a response")]
    InvalidReturn { responder: String, returned: String },

    #[error("the responder \"{responder}\" failed: {reason}")]
    Failed { responder: String, reason: String },
}

/// Errors raised while loading a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
