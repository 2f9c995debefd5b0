use tracing::debug;

use crate::error::{Error, ResolveError, Result};
use crate::identifier::Artifact;
use crate::middleware::{Middleware, Next};
use crate::request::{Attribute, Request};
use crate::resolver::{BoxedResolver, Capability, ResolverChain};
use crate::response::Response;

/// Resolves the responder for the payload type and stores it on the request.
///
/// When the payload slot already holds a [`Response`] (the action answered
/// directly), no resolver runs: that response is stored in the responder
/// slot and passed on unchanged.
#[derive(Debug)]
pub struct ResponderResolverMiddleware {
    chain: ResolverChain,
    payload_attribute: String,
    responder_attribute: String,
}

impl ResponderResolverMiddleware {
    pub fn new(
        resolvers: Vec<BoxedResolver>,
        payload_attribute: impl Into<String>,
        responder_attribute: impl Into<String>,
    ) -> Result<Self> {
        let chain =
            ResolverChain::new(resolvers, Capability::Responder)?.with_predicate(Artifact::is_responder);

        Ok(Self {
            chain,
            payload_attribute: payload_attribute.into(),
            responder_attribute: responder_attribute.into(),
        })
    }
}

impl Middleware for ResponderResolverMiddleware {
    fn process(&self, request: Request, response: Response, next: Next<'_>) -> Result<Response> {
        let payload = match request.attribute(&self.payload_attribute) {
            Some(Attribute::Response(direct)) => {
                debug!("received a response, skipping responder resolvers");
                let direct = direct.clone();
                let request = request
                    .with_attribute(&self.responder_attribute, Attribute::Response(direct.clone()));
                return next.run(request, direct);
            }
            Some(Attribute::Payload(payload)) => payload,
            _ => {
                return Err(Error::ResponderResolve(ResolveError::MissingIdentifier {
                    attribute: self.payload_attribute.clone(),
                }));
            }
        };

        let responder = self
            .chain
            .resolve(&request, payload.payload_type())
            .map_err(|failure| Error::ResponderResolve(failure.into()))?;

        let request = request.with_attribute(&self.responder_attribute, responder.into());
        next.run(request, response)
    }

    fn name(&self) -> String {
        "ResponderResolverMiddleware".to_owned()
    }
}
