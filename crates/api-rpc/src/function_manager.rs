//! Command Dispatch Table
//!
//! Name → handler registry, built once during startup and read-only while
//! requests are served. Registration goes through [`FunctionManagerBuilder`];
//! a duplicate name is a startup error.

use async_trait::async_trait;
use ledger_rpc_core::domain::charge::FEE_REFERENCE_RPC;
use ledger_rpc_core::domain::{Charge, Role};
use ledger_rpc_core::port::LedgerState;
use ledger_rpc_core::status::{RpcErrorCode, Status};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// How much help text to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpDetail {
    OneLine,
    #[default]
    Normal,
    Full,
}

/// Static facts about the running node, shown by `server_info`.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub version: String,
    pub started: Instant,
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started: Instant::now(),
        }
    }
}

/// Everything a handler may read while serving one command.
pub struct Request<'a> {
    pub method: &'a str,
    /// First element of `params`, or an empty object
    pub params: &'a Value,
    pub role: Role,
    /// Cost debited after the handler returns; handlers may raise it
    pub charge: Charge,
    pub ledgers: &'a dyn LedgerState,
    pub functions: &'a FunctionManager,
    pub node: &'a NodeInfo,
}

impl<'a> Request<'a> {
    pub fn new(
        method: &'a str,
        params: &'a Value,
        role: Role,
        ledgers: &'a dyn LedgerState,
        functions: &'a FunctionManager,
        node: &'a NodeInfo,
    ) -> Self {
        Self {
            method,
            params,
            role,
            charge: FEE_REFERENCE_RPC,
            ledgers,
            functions,
            node,
        }
    }
}

/// One JSON-RPC command.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status>;

    fn help(&self, detail: HelpDetail) -> String;

    /// Admin-only commands are refused for every other role
    fn admin_only(&self) -> bool {
        false
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{0}' registered twice")]
    DuplicateCommand(String),
}

/// Collects handlers during startup.
#[derive(Default)]
pub struct FunctionManagerBuilder {
    map: BTreeMap<String, Arc<dyn Handler>>,
}

impl FunctionManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        if self.map.contains_key(&name) {
            return Err(RegistryError::DuplicateCommand(name));
        }
        self.map.insert(name, handler);
        Ok(self)
    }

    pub fn build(self) -> FunctionManager {
        FunctionManager { map: self.map }
    }
}

/// Immutable dispatch table.
pub struct FunctionManager {
    map: BTreeMap<String, Arc<dyn Handler>>,
}

impl FunctionManager {
    pub fn builder() -> FunctionManagerBuilder {
        FunctionManagerBuilder::new()
    }

    /// Run the named handler. `None` means the name is unknown and nothing
    /// ran; the caller decides how to report that.
    pub async fn dispatch(&self, name: &str, req: &mut Request<'_>) -> Option<Result<Value, Status>> {
        let handler = self.map.get(name)?;
        if handler.admin_only() && !req.role.is_admin() {
            return Some(Err(Status::with_message(
                RpcErrorCode::NoPermission,
                "You don't have permission for this command.",
            )));
        }
        Some(handler.handle(req).await)
    }

    /// Help text for `name`, `None` when unknown.
    pub fn help(&self, name: &str, detail: HelpDetail) -> Option<String> {
        self.map.get(name).map(|h| h.help(detail))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_rpc_core::port::ledger_state::mocks::MockLedgerState;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        admin: bool,
    }

    #[async_trait]
    impl Handler for Counting {
        async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"method": req.method}))
        }

        fn help(&self, detail: HelpDetail) -> String {
            format!("counting {:?}", detail)
        }

        fn admin_only(&self) -> bool {
            self.admin
        }
    }

    fn counting(admin: bool) -> Arc<Counting> {
        Arc::new(Counting {
            calls: AtomicUsize::new(0),
            admin,
        })
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = FunctionManager::builder();
        builder.register("ping", counting(false)).unwrap();
        let err = builder.register("ping", counting(false)).err();
        assert_eq!(err, Some(RegistryError::DuplicateCommand("ping".to_string())));
    }

    #[tokio::test]
    async fn test_dispatch_known_and_unknown() {
        let handler = counting(false);
        let mut builder = FunctionManager::builder();
        builder.register("echo", handler.clone()).unwrap();
        let functions = builder.build();

        let ledgers = MockLedgerState::with_chain(2);
        let node = NodeInfo::default();
        let params = json!({});
        let mut req = Request::new("echo", &params, Role::Guest, &ledgers, &functions, &node);

        let result = functions.dispatch("echo", &mut req).await;
        assert_eq!(result, Some(Ok(json!({"method": "echo"}))));
        assert!(functions.dispatch("nope", &mut req).await.is_none());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_admin_only_refuses_guests() {
        let handler = counting(true);
        let mut builder = FunctionManager::builder();
        builder.register("stop", handler.clone()).unwrap();
        let functions = builder.build();

        let ledgers = MockLedgerState::with_chain(2);
        let node = NodeInfo::default();
        let params = json!({});
        let mut req = Request::new("stop", &params, Role::Guest, &ledgers, &functions, &node);
        let status = functions.dispatch("stop", &mut req).await.unwrap().unwrap_err();
        assert_eq!(status.to_rpc(), Some(RpcErrorCode::NoPermission));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

        req.role = Role::Admin;
        assert!(functions.dispatch("stop", &mut req).await.unwrap().is_ok());
    }

    #[test]
    fn test_help_lookup() {
        let mut builder = FunctionManager::builder();
        builder.register("b", counting(false)).unwrap();
        builder.register("a", counting(false)).unwrap();
        let functions = builder.build();
        assert_eq!(functions.help("a", HelpDetail::Full).as_deref(), Some("counting Full"));
        assert!(functions.help("zzz", HelpDetail::Full).is_none());
        assert_eq!(functions.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
