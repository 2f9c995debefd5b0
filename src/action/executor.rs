use tracing::debug;

use crate::error::{ActionExecutionError, Result};
use crate::middleware::{Middleware, Next};
use crate::request::{Attribute, Request};
use crate::response::Response;

use super::ActionOutput;

/// Invokes the resolved action and stores what it returned in the payload
/// slot: a domain payload, or a finished response.
#[derive(Clone, Debug)]
pub struct ActionExecutorMiddleware {
    action_attribute: String,
    payload_attribute: String,
}

impl ActionExecutorMiddleware {
    pub fn new(action_attribute: impl Into<String>, payload_attribute: impl Into<String>) -> Self {
        Self {
            action_attribute: action_attribute.into(),
            payload_attribute: payload_attribute.into(),
        }
    }
}

impl Middleware for ActionExecutorMiddleware {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        let action = match request.attribute(&self.action_attribute) {
            Some(Attribute::Action(action)) => action.clone(),
            Some(other) => {
                return Err(ActionExecutionError::NotInvocable {
                    attribute: self.action_attribute.clone(),
                    found: other.kind(),
                }
                .into());
            }
            None => {
                return Err(ActionExecutionError::MissingAction {
                    attribute: self.action_attribute.clone(),
                }
                .into());
            }
        };

        let stored = match action.execute(&request, response.clone()) {
            ActionOutput::Payload(payload) => Attribute::Payload(payload),
            ActionOutput::Response(direct) => Attribute::Response(direct),
            ActionOutput::Unexpected(returned) => {
                return Err(ActionExecutionError::InvalidReturn {
                    action: action.name(),
                    returned: returned.to_string(),
                }
                .into());
            }
        };
        debug!(action = %action.name(), result = stored.kind(), "action executed");

        next.run(request.with_attribute(&self.payload_attribute, stored), response)
    }

    fn name(&self) -> String {
        "ActionExecutorMiddleware".to_owned()
    }
}
