//! Request Pipeline
//!
//! One HTTP body in, one reply out. Stages run in a fixed order and stop at
//! the first failure: size check, parse, role, admission gate, forbidden
//! check, method/params validation, dispatch, charge, envelope.
//!
//! The gate only looks at usage already recorded for the caller; the cost of
//! this request is debited after the handler returns, so it affects later
//! requests only.

use crate::admission::{Consumer, Disposition, ResourceManager};
use crate::error::{error_envelope, success_envelope};
use crate::function_manager::{FunctionManager, NodeInfo, Request};
use ledger_rpc_core::domain::charge::FEE_EXCEPTION_RPC;
use ledger_rpc_core::domain::Role;
use ledger_rpc_core::error::RpcError;
use ledger_rpc_core::port::{LedgerState, RolePolicy};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1_000_000;

pub const HTTP_OK: u16 = 200;
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_FORBIDDEN: u16 = 403;
pub const HTTP_UNAVAILABLE: u16 = 503;

const UNPARSEABLE: &str = "Unable to parse request";
const NULL_METHOD: &str = "Null method";
const METHOD_NOT_STRING: &str = "method is not string";
const METHOD_EMPTY: &str = "method is empty";
const PARAMS_UNPARSEABLE: &str = "params unparseable";
const FORBIDDEN: &str = "Forbidden";
const OVERLOADED: &str = "Server is overloaded";

/// Reply body: plain text for boundary rejections, JSON otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Text(String),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl RpcReply {
    fn text(status: u16, text: &str) -> Self {
        Self {
            status,
            body: ReplyBody::Text(text.to_string()),
        }
    }

    fn json(value: Value) -> Self {
        Self {
            status: HTTP_OK,
            body: ReplyBody::Json(value),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self.body {
            ReplyBody::Text(_) => "text/plain",
            ReplyBody::Json(_) => "application/json",
        }
    }

    /// Serialized body.
    pub fn body_string(&self) -> String {
        match &self.body {
            ReplyBody::Text(text) => text.clone(),
            ReplyBody::Json(value) => value.to_string(),
        }
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ReplyBody::Json(value) => Some(value),
            ReplyBody::Text(_) => None,
        }
    }
}

/// A validated `{method, params, id}` envelope.
struct Envelope<'a> {
    method: &'a str,
    params: Value,
    id: Value,
}

impl<'a> Envelope<'a> {
    fn from_request(request: &'a Map<String, Value>) -> Result<Self, RpcError> {
        let method = match request.get("method") {
            None | Some(Value::Null) => return Err(RpcError::MalformedRequest(NULL_METHOD.into())),
            Some(Value::String(m)) if m.is_empty() => {
                return Err(RpcError::MalformedRequest(METHOD_EMPTY.into()))
            }
            Some(Value::String(m)) => m.as_str(),
            Some(_) => return Err(RpcError::MalformedRequest(METHOD_NOT_STRING.into())),
        };

        // Only the first element of `params` is used
        let params = match request.get("params") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(Value::Array(items)) => match items.first() {
                None => Value::Object(Map::new()),
                Some(first @ Value::Object(_)) => first.clone(),
                Some(_) => return Err(RpcError::MalformedRequest(PARAMS_UNPARSEABLE.into())),
            },
            Some(_) => return Err(RpcError::MalformedRequest(PARAMS_UNPARSEABLE.into())),
        };

        Ok(Self {
            method,
            params,
            id: request.get("id").cloned().unwrap_or(Value::Null),
        })
    }
}

/// Everything needed to serve requests; shared by all connections.
pub struct RequestPipeline {
    functions: Arc<FunctionManager>,
    resources: Arc<ResourceManager>,
    roles: Arc<dyn RolePolicy>,
    ledgers: Arc<dyn LedgerState>,
    node: NodeInfo,
    max_request_size: usize,
}

impl RequestPipeline {
    pub fn new(
        functions: Arc<FunctionManager>,
        resources: Arc<ResourceManager>,
        roles: Arc<dyn RolePolicy>,
        ledgers: Arc<dyn LedgerState>,
    ) -> Self {
        Self {
            functions,
            resources,
            roles,
            ledgers,
            node: NodeInfo::default(),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }

    pub fn with_node(mut self, node: NodeInfo) -> Self {
        self.node = node;
        self
    }

    pub fn with_max_request_size(mut self, max_request_size: usize) -> Self {
        self.max_request_size = max_request_size;
        self
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    pub fn functions(&self) -> &Arc<FunctionManager> {
        &self.functions
    }

    fn consumer_for(&self, role: Role, remote: SocketAddr) -> Consumer {
        if role.is_admin() {
            self.resources.new_admin_endpoint(remote.ip().to_string())
        } else {
            self.resources.new_inbound_endpoint(remote)
        }
    }

    /// Serve one request body received from `remote`.
    pub async fn process(&self, body: &[u8], remote: SocketAddr) -> RpcReply {
        if body.len() > self.max_request_size {
            warn!(%remote, size = body.len(), "Request exceeds maximum size");
            return RpcReply::text(HTTP_BAD_REQUEST, UNPARSEABLE);
        }

        let request_value = match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                debug!(%remote, "Unparseable request body");
                return RpcReply::text(HTTP_BAD_REQUEST, UNPARSEABLE);
            }
        };

        let role = self.roles.classify(&request_value, remote.ip());

        let consumer = self.consumer_for(role, remote);
        if consumer.disconnect() {
            warn!(%remote, endpoint = %consumer.endpoint(), "Rejecting overloaded consumer");
            return RpcReply::text(HTTP_UNAVAILABLE, OVERLOADED);
        }

        if role == Role::Forbidden {
            warn!(%remote, "Forbidden request");
            return RpcReply::text(HTTP_FORBIDDEN, FORBIDDEN);
        }

        let Value::Object(request) = &request_value else {
            return RpcReply::text(HTTP_BAD_REQUEST, UNPARSEABLE);
        };
        let envelope = match Envelope::from_request(request) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(%remote, error = %err, "Malformed request");
                return RpcReply::text(HTTP_BAD_REQUEST, &err.to_string());
            }
        };

        debug!(method = envelope.method, params = %envelope.params, %role, "Query");

        let mut req = Request::new(
            envelope.method,
            &envelope.params,
            role,
            self.ledgers.as_ref(),
            self.functions.as_ref(),
            &self.node,
        );
        let outcome = self.functions.dispatch(envelope.method, &mut req).await;
        let charge = match &outcome {
            Some(Err(status)) if status.code().is_exception() => FEE_EXCEPTION_RPC,
            _ => req.charge,
        };

        let reply = match outcome {
            None => {
                debug!(method = envelope.method, "Unknown command");
                let status = RpcError::UnknownCommand(envelope.method.to_string()).into_status();
                error_envelope(&status, envelope.id)
            }
            Some(result) => {
                match consumer.charge(charge) {
                    Disposition::Ok => {}
                    Disposition::Warn => warn!(
                        endpoint = %consumer.endpoint(),
                        balance = consumer.balance(),
                        "Consumer over warning threshold"
                    ),
                    Disposition::Drop => warn!(
                        endpoint = %consumer.endpoint(),
                        balance = consumer.balance(),
                        "Consumer over drop threshold"
                    ),
                }
                match result {
                    Ok(result) => success_envelope(result, envelope.id),
                    Err(status) => error_envelope(&status, envelope.id),
                }
            }
        };

        debug!(method = envelope.method, reply = %reply, "Reply");
        RpcReply::json(reply)
    }
}
