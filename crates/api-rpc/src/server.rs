//! JSON-RPC HTTP Server
//!
//! POST `/` with a JSON-RPC body. The body bytes and the peer address go to
//! the [`RequestPipeline`]; its reply becomes the HTTP response.

use crate::pipeline::{RequestPipeline, RpcReply};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 5005;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Accept callers that are not on a loopback address
    pub allow_remote: bool,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            allow_remote: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<RequestPipeline>,
    allow_remote: bool,
}

/// Running server. Dropping the handle does not stop the server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Ask the server to finish in-flight requests and exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the server task has exited.
    pub async fn stopped(self) -> Result<(), ServerError> {
        match self.task.await {
            Ok(result) => result.map_err(ServerError::from),
            Err(e) => Err(ServerError::Io(std::io::Error::other(e))),
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    pipeline: Arc<RequestPipeline>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, pipeline: Arc<RequestPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            pipeline: self.pipeline.clone(),
            allow_remote: self.config.allow_remote,
        };
        // One byte over the limit still reaches the pipeline, which owns the
        // oversize reply
        let body_limit = self.pipeline.max_request_size().saturating_add(1);
        Router::new()
            .route("/", post(rpc_handler))
            .layer(DefaultBodyLimit::max(body_limit))
            .with_state(state)
    }

    /// Bind and start serving in a background task.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        info!(
            addr = %local_addr,
            allow_remote = self.config.allow_remote,
            "Starting JSON-RPC server"
        );

        let app = self.router();
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                rx.await.ok();
                info!("JSON-RPC server shutting down");
            })
            .await
        });

        Ok(ServerHandle {
            local_addr,
            shutdown: Some(tx),
            task,
        })
    }
}

async fn rpc_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if !state.allow_remote && !remote.ip().to_canonical().is_loopback() {
        warn!(%remote, "Refusing remote caller");
        return text_response(StatusCode::FORBIDDEN, "Forbidden");
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(%remote, error = %rejection, "Request body rejected");
            return text_response(StatusCode::BAD_REQUEST, "Unable to parse request");
        }
    };

    let reply = state.pipeline.process(&body, remote).await;
    into_response(reply)
}

fn text_response(status: StatusCode, text: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], text).into_response()
}

fn into_response(reply: RpcReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, reply.content_type())],
        reply.body_string(),
    )
        .into_response()
}
