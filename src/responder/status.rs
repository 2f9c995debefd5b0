use http::StatusCode;

use crate::domain::DomainPayload;
use crate::response::Response;

use super::{Responder, ResponderOutput};

/// Answers with a fixed status code and leaves everything else as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpStatusCodeResponder {
    status: StatusCode,
}

impl HttpStatusCodeResponder {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// `406 Not Acceptable`, the content negotiation fallback.
    pub fn not_acceptable() -> Self {
        Self::new(StatusCode::NOT_ACCEPTABLE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl Responder for HttpStatusCodeResponder {
    fn respond(&self, _payload: &DomainPayload, response: Response) -> ResponderOutput {
        response.with_status(self.status).into()
    }

    fn name(&self) -> String {
        format!("HttpStatusCodeResponder({})", self.status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_only_the_status() {
        let output = HttpStatusCodeResponder::new(StatusCode::GONE)
            .respond(&DomainPayload::new("x"), Response::text("kept"));

        match output {
            ResponderOutput::Response(response) => {
                assert_eq!(response.status_code(), StatusCode::GONE);
                assert_eq!(response.body_str(), Some("kept"));
            }
            other => panic!("expected a response, got {other:?}"),
        }
    }
}
