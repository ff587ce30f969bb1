// ping, help, server_info

use super::dictionary_help;
use crate::function_manager::{Handler, HelpDetail, Request};
use crate::types::{LedgerRef, ServerInfo as ServerInfoBody, ServerInfoResponse};
use async_trait::async_trait;
use ledger_rpc_core::field::typed::{Text, TypedField};
use ledger_rpc_core::field::{Dictionary, FieldDescriptor, FieldKind, Required};
use ledger_rpc_core::status::{RpcErrorCode, Status};
use serde_json::{json, Map, Value};

static NO_PARAMS: Dictionary = Dictionary::new(&[]);

static HELP_PARAMS: Dictionary = Dictionary::new(&[(
    "command",
    FieldDescriptor::new(FieldKind::String, Required::No, &["Command to describe."]),
)]);

pub struct Ping;

#[async_trait]
impl Handler for Ping {
    async fn handle(&self, _req: &mut Request<'_>) -> Result<Value, Status> {
        Ok(json!({}))
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("ping: check that the server answers.", &NO_PARAMS, detail)
    }
}

pub struct Help;

#[async_trait]
impl Handler for Help {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        let mut command = TypedField::<Text>::bind(&HELP_PARAMS, "command")?;
        command.set_from(req.params)?;

        if let Some(name) = command.get() {
            return match req.functions.help(name, HelpDetail::Full) {
                Some(text) => Ok(json!({"command": name, "help": text})),
                None => Err(Status::with_message(
                    RpcErrorCode::UnknownCommand,
                    format!("Unknown method '{}'.", name),
                )),
            };
        }

        let commands: Map<String, Value> = req
            .functions
            .names()
            .filter_map(|name| {
                req.functions
                    .help(name, HelpDetail::OneLine)
                    .map(|text| (name.to_string(), Value::String(text)))
            })
            .collect();
        Ok(json!({"commands": commands}))
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("help: list commands or describe one.", &HELP_PARAMS, detail)
    }
}

pub struct ServerInfo;

#[async_trait]
impl Handler for ServerInfo {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        // A node without closed ledgers still answers
        let validated = req.ledgers.validated_ledger().await.ok();
        let closed = req.ledgers.closed_ledger().await.ok();

        let complete_ledgers = match &validated {
            Some(ledger) => format!("1-{}", ledger.seq),
            None => "empty".to_string(),
        };
        let server_state = if validated.is_some() { "full" } else { "connected" };

        let body = ServerInfoResponse {
            info: ServerInfoBody {
                build_version: req.node.version.clone(),
                uptime: req.node.started.elapsed().as_secs(),
                complete_ledgers,
                server_state,
                validated_ledger: validated.as_deref().map(LedgerRef::from),
                closed_ledger: closed.as_deref().map(LedgerRef::from),
            },
        };
        serde_json::to_value(body)
            .map_err(|e| Status::with_message(RpcErrorCode::Internal, e.to_string()))
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("server_info: build, uptime and ledger state.", &NO_PARAMS, detail)
    }
}
