// ledger, ledger_entry

use super::{dictionary_help, resolve_ledger};
use crate::function_manager::{Handler, HelpDetail, Request};
use crate::types::{LedgerEntryResponse, LedgerResponse, LedgerSummary};
use async_trait::async_trait;
use ledger_rpc_core::domain::charge::FEE_LOW_BURDEN_RPC;
use ledger_rpc_core::domain::Hash256;
use ledger_rpc_core::error::RpcError;
use ledger_rpc_core::field::typed::{self, Boolean, TypedField};
use ledger_rpc_core::field::{Dictionary, FieldDescriptor, FieldKind, Required};
use ledger_rpc_core::status::{RpcErrorCode, Status};
use serde::Serialize;
use serde_json::Value;

const LEDGER_HELP: &[&str] = &["Ledger reference: one of hash, index or name."];

static LEDGER_PARAMS: Dictionary = Dictionary::new(&[
    ("ledger", FieldDescriptor::new(FieldKind::Ledger, Required::No, LEDGER_HELP)),
    (
        "full",
        FieldDescriptor::new(FieldKind::Boolean, Required::No, &["Include every account (admin)."]),
    ),
]);

static LEDGER_ENTRY_PARAMS: Dictionary = Dictionary::new(&[
    ("ledger", FieldDescriptor::new(FieldKind::Ledger, Required::No, LEDGER_HELP)),
    ("index", FieldDescriptor::new(FieldKind::Hash, Required::No, &["Entry index."])),
    (
        "directory",
        FieldDescriptor::new(
            FieldKind::Directory,
            Required::No,
            &["Directory page: index, or {dir_root | owner, sub_index}."],
        ),
    ),
    (
        "offer",
        FieldDescriptor::new(FieldKind::Offer, Required::No, &["Offer: index, or {account, seq}."]),
    ),
]);

fn to_result<T: Serialize>(body: T) -> Result<Value, Status> {
    serde_json::to_value(body)
        .map_err(|e| Status::with_message(RpcErrorCode::Internal, e.to_string()))
}

/// `ledger`: header of one ledger.
pub struct LedgerHeaderCommand;

#[async_trait]
impl Handler for LedgerHeaderCommand {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        let mut full = TypedField::<Boolean>::bind(&LEDGER_PARAMS, "full")?;
        full.set_from(req.params)?;
        let full = full.take().unwrap_or(false);
        if full && !req.role.is_admin() {
            return Err(Status::with_message(
                RpcErrorCode::NoPermission,
                "You don't have permission for this command.",
            ));
        }

        let ledger = resolve_ledger(req, &LEDGER_PARAMS).await?;
        let mut summary = LedgerSummary::from(ledger.as_ref());
        if full {
            summary.accounts = Some(req.ledgers.accounts(&ledger).await?);
        }
        to_result(LedgerResponse { ledger: summary })
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("ledger: header of the selected ledger.", &LEDGER_PARAMS, detail)
    }
}

/// `ledger_entry`: one raw ledger object.
pub struct LedgerEntry;

impl LedgerEntry {
    /// Exactly one of `index`, `directory` or `offer`.
    fn entry_index(params: &Value) -> Result<Hash256, Status> {
        let mut index = TypedField::<typed::Hash>::bind(&LEDGER_ENTRY_PARAMS, "index")?;
        let mut directory = TypedField::<typed::Directory>::bind(&LEDGER_ENTRY_PARAMS, "directory")?;
        let mut offer = TypedField::<typed::Offer>::bind(&LEDGER_ENTRY_PARAMS, "offer")?;
        index.set_from(params)?;
        directory.set_from(params)?;
        offer.set_from(params)?;

        let chosen: Vec<Hash256> = [index.take(), directory.take(), offer.take()]
            .into_iter()
            .flatten()
            .collect();
        match chosen.as_slice() {
            [one] => Ok(*one),
            [] => Err(RpcError::missing("index").into()),
            _ => Err(Status::with_message(
                RpcErrorCode::InvalidParams,
                "Only one of index, directory or offer may be set.",
            )),
        }
    }
}

#[async_trait]
impl Handler for LedgerEntry {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        req.charge = FEE_LOW_BURDEN_RPC;
        let index = Self::entry_index(req.params)?;
        let ledger = resolve_ledger(req, &LEDGER_ENTRY_PARAMS).await?;

        let Some(node) = req.ledgers.ledger_entry(&ledger, &index).await? else {
            return Err(Status::with_message(RpcErrorCode::EntryNotFound, "entryNotFound"));
        };
        to_result(LedgerEntryResponse {
            index,
            node,
            ledger_index: ledger.seq,
        })
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("ledger_entry: one ledger object.", &LEDGER_ENTRY_PARAMS, detail)
    }
}
