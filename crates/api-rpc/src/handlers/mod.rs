//! Built-in Commands
//!
//! Each command is a unit struct implementing [`Handler`]; its parameters are
//! declared in a static [`Dictionary`] that also drives its help text.

mod account;
mod ledger;
mod utility;

pub use account::{AccountInfo, AccountOffers, GatewayBalances};
pub use ledger::{LedgerEntry, LedgerHeaderCommand};
pub use utility::{Help, Ping, ServerInfo};

use crate::function_manager::{FunctionManagerBuilder, Handler, HelpDetail, RegistryError, Request};
use ledger_rpc_core::domain::LedgerHandle;
use ledger_rpc_core::field::typed::{self, TypedField};
use ledger_rpc_core::field::Dictionary;
use ledger_rpc_core::field_reader::read_ledger;
use ledger_rpc_core::status::Status;
use std::sync::Arc;

/// Register every built-in command.
pub fn register_all(builder: &mut FunctionManagerBuilder) -> Result<(), RegistryError> {
    let commands: [(&str, Arc<dyn Handler>); 8] = [
        ("ping", Arc::new(Ping)),
        ("help", Arc::new(Help)),
        ("server_info", Arc::new(ServerInfo)),
        ("ledger", Arc::new(LedgerHeaderCommand)),
        ("ledger_entry", Arc::new(LedgerEntry)),
        ("account_info", Arc::new(AccountInfo)),
        ("account_offers", Arc::new(AccountOffers)),
        ("gateway_balances", Arc::new(GatewayBalances)),
    ];
    for (name, handler) in commands {
        builder.register(name, handler)?;
    }
    Ok(())
}

/// Help text built from a command summary and its parameter dictionary.
fn dictionary_help(summary: &str, dictionary: &Dictionary, detail: HelpDetail) -> String {
    match detail {
        HelpDetail::OneLine => summary.to_string(),
        HelpDetail::Normal if dictionary.is_empty() => summary.to_string(),
        HelpDetail::Normal => format!("{}\n{}", summary, dictionary.describe_text()),
        HelpDetail::Full => {
            let fields = serde_json::to_string_pretty(&dictionary.describe()).unwrap_or_default();
            format!("{}\n{}", summary, fields)
        }
    }
}

/// The ledger a command targets.
///
/// A `ledger` reference object wins; without one the legacy
/// `ledger_hash` / `ledger_index` members apply, defaulting to current.
async fn resolve_ledger(
    req: &Request<'_>,
    dictionary: &'static Dictionary,
) -> Result<LedgerHandle, Status> {
    let mut field = TypedField::<typed::Ledger>::bind(dictionary, "ledger")?;
    field.set_from(req.params)?;
    let selector = match field.take() {
        Some(selector) => selector,
        None => read_ledger(req.params)?,
    };
    selector.resolve(req.ledgers).await
}
