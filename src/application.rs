//! The application pipe and its emitters.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::middleware::{BoxedMiddleware, Middleware, run_chain};
use crate::request::Request;
use crate::response::Response;

/// Writes the final response to the real transport.
pub trait Emitter: Send + Sync + 'static {
    fn emit(&self, response: &Response) -> io::Result<()>;
}

/// Emits an HTTP/1.1 message to any [`Write`].
///
/// ```
/// use adroit::{Emitter, Response, WriterEmitter};
///
/// let emitter = WriterEmitter::new(Vec::new());
/// emitter.emit(&Response::text("hi")).unwrap();
///
/// let bytes = emitter.into_inner();
/// assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
/// assert!(bytes.ends_with(b"\r\n\r\nhi"));
/// ```
pub struct WriterEmitter<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> WriterEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send + 'static> Emitter for WriterEmitter<W> {
    fn emit(&self, response: &Response) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        response.write_to(&mut *writer)
    }
}

/// A web application.
///
/// Middlewares run in the order they were piped. The last one sees an
/// empty continuation and must produce the response. The emitter is
/// supplied per run: a writer for standalone use, or the connection when
/// the application is served by [`Server`](crate::Server).
#[derive(Default)]
pub struct WebApplication {
    pipe: Vec<BoxedMiddleware>,
}

impl WebApplication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to the pipe.
    pub fn pipe(mut self, middleware: impl Middleware) -> Self {
        self.pipe.push(Arc::new(middleware));
        self
    }

    pub fn pipe_shared(mut self, middleware: BoxedMiddleware) -> Self {
        self.pipe.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.pipe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipe.is_empty()
    }

    /// Runs the pipe without emitting.
    pub fn handle(&self, request: Request, response: Response) -> Result<Response> {
        run_chain(&self.pipe, request, response)
    }

    /// Runs the pipe and emits the result through `emitter`, once.
    ///
    /// Nothing is emitted when the pipe fails.
    pub fn run(&self, request: Request, response: Response, emitter: &dyn Emitter) -> Result<()> {
        let response = self.handle(request, response)?;
        debug!(status = response.status_code().as_u16(), "emitting response");
        emitter.emit(&response)?;
        Ok(())
    }
}
