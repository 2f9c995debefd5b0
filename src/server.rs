//! HTTP server and graceful shutdown.
//!
//! The pipeline itself never touches a socket. This module is the thin
//! transport around it: hyper accepts connections, each request body is
//! collected, and the resulting [`Request`] is run through a
//! [`WebApplication`]. The connection is the application's emitter: the
//! response it emits is the one hyper writes back.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Stops calling `listener.accept()`.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`].

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::application::{Emitter, WebApplication};
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use adroit::Server;
    /// let server = Server::bind("0.0.0.0:3000")?;
    /// # Ok::<(), adroit::Error>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self> {
        Ok(Self { addr: addr.parse()? })
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Accepts connections and runs every request through `app`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, app: WebApplication) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on(listener, app, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve) on an already bound listener, stopping
    /// when `shutdown` resolves.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        app: WebApplication,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let app = Arc::new(app);
        info!(addr = %listener.local_addr()?, "adroit listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(&app, req, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("adroit stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads the request body and hands the request to [`respond`].
///
/// Every failure is turned into a response here, so hyper never sees an
/// error.
async fn dispatch(
    app: &WebApplication,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> std::result::Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(peer = %remote_addr, "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_http());
        }
    };

    Ok(respond(app, Request::from_parts(parts, body), remote_addr).into_http())
}

/// Runs the application with the connection as its emitter.
fn respond(app: &WebApplication, request: Request, remote_addr: SocketAddr) -> Response {
    let method = request.method().clone();
    let path = request.path().to_owned();

    let connection = ConnectionEmitter::default();
    if let Err(e) = app.run(request, Response::default(), &connection) {
        error!(%method, %path, peer = %remote_addr, "pipeline error: {e}");
    }

    connection
        .into_response()
        .unwrap_or_else(|| Response::status(StatusCode::INTERNAL_SERVER_ERROR))
}

/// Emitter of one served request. Keeps the emitted response for hyper to
/// write and refuses a second one.
#[derive(Default)]
struct ConnectionEmitter {
    response: Mutex<Option<Response>>,
}

impl ConnectionEmitter {
    fn into_response(self) -> Option<Response> {
        self.response.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Emitter for ConnectionEmitter {
    fn emit(&self, response: &Response) -> io::Result<()> {
        let mut slot = self.response.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "response already emitted"));
        }
        *slot = Some(response.clone());
        Ok(())
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C. Only Ctrl-C on non-Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::error::Error;
    use crate::middleware::{FnMiddleware, Next};

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 4000))
    }

    #[test]
    fn rejects_invalid_addresses() {
        assert!(Server::bind("not an address").is_err());
        assert_eq!(Server::bind("127.0.0.1:8080").unwrap().addr().port(), 8080);
    }

    #[test]
    fn connection_accepts_a_single_response() {
        let connection = ConnectionEmitter::default();

        connection.emit(&Response::text("first")).unwrap();
        let err = connection.emit(&Response::text("second")).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(connection.into_response().unwrap().body_str(), Some("first"));
    }

    #[test]
    fn served_responses_are_the_emitted_ones() {
        let app = WebApplication::new().pipe(FnMiddleware::new("ok", |_: Request, res: Response, _: Next<'_>| {
            Ok(res.with_status(StatusCode::CREATED).with_body("made"))
        }));

        let response = respond(&app, Request::post("/things"), peer());

        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.body_str(), Some("made"));
    }

    #[test]
    fn failed_pipelines_are_served_as_500() {
        let app = WebApplication::new().pipe(FnMiddleware::new("fail", |_: Request, _: Response, _: Next<'_>| {
            Err(Error::Io(io::Error::other("boom")))
        }));

        let response = respond(&app, Request::get("/"), peer());

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn serves_requests_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = WebApplication::new().pipe(FnMiddleware::new(
            "echo",
            |req: Request, _: Response, _: Next<'_>| {
                Ok(Response::text(format!("hello {}", req.query_param("name").unwrap_or_default())))
            },
        ));
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(Server::from_addr(addr).serve_on(listener, app, async {
            let _ = stopped.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /?name=ada HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let raw = String::from_utf8(raw).unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "{raw}");
        assert!(raw.ends_with("hello ada"), "{raw}");

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
