//! Identifiers handed to resolvers and the artifacts they resolve to.
//!
//! Route targets and payload types are not stringly typed: an identifier is
//! either a name to look up, or the action/responder itself. A resolver turns
//! an identifier into an [`Artifact`], and each pipeline stage decides with a
//! plain `match` whether the artifact is usable.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::action::{Action, BoxedAction};
use crate::responder::{BoxedResponder, Responder};

/// What a resolver is asked to resolve: an action token or a payload type.
#[derive(Clone)]
pub enum Identifier {
    /// A symbolic name, looked up in a table or container.
    Name(String),
    /// An action used directly as route target.
    Action(BoxedAction),
    /// A responder used directly as payload type.
    Responder(BoxedResponder),
}

impl Identifier {
    pub fn action(action: impl Action) -> Self {
        Self::Action(Arc::new(action))
    }

    pub fn responder(responder: impl Responder) -> Self {
        Self::Responder(Arc::new(responder))
    }

    /// The symbolic name, if this identifier is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// `true` for the empty name, which can never be routed to or linked.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Name(name) if name.is_empty())
    }
}

/// Names compare by value, actions and responders by identity.
impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Name(a), Self::Name(b)) => a == b,
            (Self::Action(a), Self::Action(b)) => Arc::ptr_eq(a, b),
            (Self::Responder(a), Self::Responder(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Action(action) => f.write_str(&action.name()),
            Self::Responder(responder) => f.write_str(&responder.name()),
        }
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Action(action) => f.debug_tuple("Action").field(&action.name()).finish(),
            Self::Responder(r) => f.debug_tuple("Responder").field(&r.name()).finish(),
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for Identifier {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<BoxedAction> for Identifier {
    fn from(action: BoxedAction) -> Self {
        Self::Action(action)
    }
}

impl From<BoxedResponder> for Identifier {
    fn from(responder: BoxedResponder) -> Self {
        Self::Responder(responder)
    }
}

/// The result of a successful resolve.
#[derive(Clone)]
pub enum Artifact {
    Action(BoxedAction),
    Responder(BoxedResponder),
    /// Anything else a table or container may hold. Never invocable.
    Value(Value),
}

impl Artifact {
    pub fn action(action: impl Action) -> Self {
        Self::Action(Arc::new(action))
    }

    pub fn responder(responder: impl Responder) -> Self {
        Self::Responder(Arc::new(responder))
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    pub fn is_responder(&self) -> bool {
        matches!(self, Self::Responder(_))
    }

    /// Actions and responders can be invoked, plain values cannot.
    pub fn is_invocable(&self) -> bool {
        !matches!(self, Self::Value(_))
    }

    /// Short human-readable description used in logs and errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Action(action) => action.name(),
            Self::Responder(responder) => responder.name(),
            Self::Value(value) => format!("value {value}"),
        }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(&action.name()).finish(),
            Self::Responder(r) => f.debug_tuple("Responder").field(&r.name()).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<Value> for Artifact {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<BoxedAction> for Artifact {
    fn from(action: BoxedAction) -> Self {
        Self::Action(action)
    }
}

impl From<BoxedResponder> for Artifact {
    fn from(responder: BoxedResponder) -> Self {
        Self::Responder(responder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::action_fn;
    use crate::{DomainPayload, Request, Response};

    #[test]
    fn names_compare_by_value() {
        assert_eq!(Identifier::from("a"), Identifier::from("a".to_owned()));
        assert_ne!(Identifier::from("a"), Identifier::from("b"));
    }

    #[test]
    fn actions_compare_by_identity() {
        let action: BoxedAction =
            Arc::new(action_fn("noop", |_: &Request, _| DomainPayload::new("x")));
        let other: BoxedAction =
            Arc::new(action_fn("noop", |_: &Request, _| DomainPayload::new("x")));

        assert_eq!(Identifier::Action(action.clone()), Identifier::Action(action.clone()));
        assert_ne!(Identifier::Action(action), Identifier::Action(other));
    }

    #[test]
    fn display_uses_the_action_name() {
        let id = Identifier::action(action_fn("user.show", |_: &Request, res: Response| res));
        assert_eq!(id.to_string(), "user.show");
        assert!(!id.is_empty());
        assert!(Identifier::from("").is_empty());
    }

    #[test]
    fn values_are_not_invocable() {
        let value = Artifact::from(serde_json::json!({"k": 1}));
        assert!(!value.is_invocable());
        assert!(!value.is_action());

        let action = Artifact::action(action_fn("a", |_: &Request, res: Response| res));
        assert!(action.is_invocable());
        assert!(action.is_action());
        assert!(!action.is_responder());
    }
}
