//! Shared wiring for the cross-crate scenarios

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use ledger_rpc_api::{
    register_all, AdminPolicy, FunctionManager, RequestPipeline, ResourceConfig, ResourceManager,
    RpcReply,
};
use ledger_rpc_core::port::time_provider::mocks::ManualTimeProvider;
use ledger_rpc_infra_memory::{InMemoryLedgerState, LedgerFixture};
use serde_json::{json, Value};

pub const GATEWAY: &str = "raJ1Aqkhf19P7cyUc33MMVAzgvHPvtNFC";
pub const HOT: &str = "rBcktgVfNjHmxNAQDEE66ztz4qZkdngdm";
pub const CUSTOMER: &str = "rGvdqXNwMbSwRiubF4PhhVqzhkiaTDPgU";
pub const UNFUNDED: &str = "r4NW8MyD7T2Yu71oRVWQQz8ykg3YcpY88";

pub const START_MILLIS: i64 = 1_700_000_000_000;

pub fn devnet() -> Arc<InMemoryLedgerState> {
    let fixture = LedgerFixture::from_json(include_str!("../../../infra-memory/fixtures/devnet.json"))
        .expect("devnet fixture");
    Arc::new(InMemoryLedgerState::from_fixture(fixture))
}

pub fn all_commands() -> Arc<FunctionManager> {
    let mut builder = FunctionManager::builder();
    register_all(&mut builder).expect("register commands");
    Arc::new(builder.build())
}

/// A full pipeline over devnet; only loopback is admin.
pub struct Harness {
    pub pipeline: Arc<RequestPipeline>,
    pub clock: Arc<ManualTimeProvider>,
    pub ledgers: Arc<InMemoryLedgerState>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_functions(all_commands())
    }

    pub fn with_functions(functions: Arc<FunctionManager>) -> Self {
        let clock = Arc::new(ManualTimeProvider::new(START_MILLIS));
        let ledgers = devnet();
        let resources = Arc::new(ResourceManager::new(ResourceConfig::default(), clock.clone()));
        let policy = AdminPolicy::new(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        let pipeline = RequestPipeline::new(functions, resources, Arc::new(policy), ledgers.clone());
        Self {
            pipeline: Arc::new(pipeline),
            clock,
            ledgers,
        }
    }

    pub async fn send(&self, body: &Value, remote: SocketAddr) -> RpcReply {
        self.pipeline.process(body.to_string().as_bytes(), remote).await
    }

    /// Send `{method, params: [params], id: 1}` and return the JSON reply.
    pub async fn call(&self, method: &str, params: Value, remote: SocketAddr) -> Value {
        let reply = self
            .send(&json!({"method": method, "params": [params], "id": 1}), remote)
            .await;
        assert_eq!(reply.status, 200, "unexpected reply {:?}", reply);
        reply.json_body().cloned().expect("json body")
    }
}

pub fn guest(last_octet: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)), 40_000)
}

pub fn admin() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 40_000)
}
