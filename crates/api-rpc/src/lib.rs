//! JSON-RPC API Layer
//!
//! Command dispatch table, per-endpoint admission control, role
//! classification and the request pipeline, bound to HTTP with axum.

pub mod admission;
pub mod error;
pub mod function_manager;
pub mod handlers;
pub mod pipeline;
pub mod role;
pub mod server;
pub mod types;

pub use admission::{Consumer, Disposition, Endpoint, ResourceConfig, ResourceManager};
pub use function_manager::{
    FunctionManager, FunctionManagerBuilder, Handler, HelpDetail, NodeInfo, RegistryError, Request,
};
pub use handlers::register_all;
pub use pipeline::{ReplyBody, RequestPipeline, RpcReply, DEFAULT_MAX_REQUEST_SIZE};
pub use role::AdminPolicy;
pub use server::{RpcServer, RpcServerConfig, ServerError, ServerHandle};
