//! Request pipeline scenarios over the devnet fixture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ledger_rpc_api::{FunctionManager, Handler, HelpDetail, ReplyBody, Request};
use ledger_rpc_core::status::{RpcErrorCode, Status, RPC_OFFSET};
use serde_json::{json, Value};

mod common;
use common::{admin, guest, Harness, CUSTOMER, GATEWAY, HOT, UNFUNDED};

fn rpc_code(code: RpcErrorCode) -> i32 {
    RPC_OFFSET + code.raw()
}

/// Counts invocations so tests can prove a handler never ran
struct Counting(Arc<AtomicUsize>);

#[async_trait]
impl Handler for Counting {
    async fn handle(&self, _req: &mut Request<'_>) -> Result<Value, Status> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(json!({}))
    }

    fn help(&self, _detail: HelpDetail) -> String {
        "Counts calls.".to_string()
    }
}

#[tokio::test]
async fn test_oversized_body_is_rejected_unparsed() {
    let harness = Harness::new();
    let mut body = br#"{"method":"ping","params":[{"pad":""#.to_vec();
    body.resize(1_000_001, b'x');

    let reply = harness.pipeline.process(&body, guest(1)).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body, ReplyBody::Text("Unable to parse request".to_string()));
    assert!(harness.pipeline.resources().is_empty());
}

#[tokio::test]
async fn test_unregistered_command_has_no_side_effect() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = FunctionManager::builder();
    builder
        .register("server_info", Arc::new(Counting(calls.clone())))
        .unwrap();
    let harness = Harness::with_functions(Arc::new(builder.build()));

    let reply = harness.call("ping", json!({}), guest(2)).await;
    assert_eq!(reply["error"]["code"], rpc_code(RpcErrorCode::UnknownCommand));
    assert_eq!(reply["error"]["message"], "Unknown method 'ping'.");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Nothing was debited for the unknown command
    let consumer = harness.pipeline.resources().new_inbound_endpoint(guest(2));
    assert_eq!(consumer.balance(), 0);
}

#[tokio::test]
async fn test_costly_request_gates_the_next_one_before_validation() {
    let harness = Harness::new();
    let caller = guest(3);

    // High burden charge crosses the drop threshold after the work is done
    let reply = harness.call("gateway_balances", json!({"account": GATEWAY}), caller).await;
    assert!(reply.get("result").is_some());

    // Invalid params would fail validation, but the gate answers first
    let reply = harness
        .send(&json!({"method": "account_info", "params": [{"account": 7}]}), caller)
        .await;
    assert_eq!(reply.status, 503);
    assert_eq!(reply.body_string(), "Server is overloaded");

    // Rejections are free; usage only decays
    let consumer = harness.pipeline.resources().new_inbound_endpoint(caller);
    assert_eq!(consumer.balance(), 3000);

    // Other callers are unaffected
    let reply = harness.call("ping", json!({}), guest(4)).await;
    assert_eq!(reply["result"], json!({}));

    harness.clock.advance_secs(120);
    let reply = harness.call("ping", json!({}), caller).await;
    assert_eq!(reply["result"], json!({}));
}

#[tokio::test]
async fn test_admin_callers_are_never_gated() {
    let harness = Harness::new();
    for _ in 0..3 {
        let reply = harness.call("gateway_balances", json!({"account": GATEWAY}), admin()).await;
        assert!(reply.get("result").is_some());
    }
}

#[tokio::test]
async fn test_account_commands_on_devnet() {
    let harness = Harness::new();

    let reply = harness.call("account_info", json!({"account": CUSTOMER}), guest(5)).await;
    let result = &reply["result"];
    assert_eq!(result["account_data"]["account"], CUSTOMER);
    assert_eq!(result["account_data"]["sequence"], 5);
    assert_eq!(result["ledger_index"], 5);
    assert_eq!(reply["jsonrpc"], "2.0");
    assert_eq!(reply["id"], 1);

    let reply = harness.call("account_info", json!({"account": UNFUNDED}), guest(5)).await;
    assert_eq!(reply["error"]["code"], rpc_code(RpcErrorCode::ActNotFound));
    assert_eq!(reply["error"]["data"], json!([UNFUNDED]));

    let reply = harness
        .call("account_offers", json!({"account": CUSTOMER, "limit": 1}), guest(5))
        .await;
    assert_eq!(reply["result"]["offers"].as_array().unwrap().len(), 1);
    assert_eq!(reply["result"]["limit"], 1);

    let params = json!({"account": GATEWAY, "hotwallet": [HOT]});
    let reply = harness.call("gateway_balances", params, guest(6)).await;
    let result = &reply["result"];
    assert_eq!(result["obligations"], json!({"USD": "100"}));
    assert_eq!(result["balances"][HOT], json!([{"currency": "USD", "value": "50.25"}]));
}

#[tokio::test]
async fn test_ledger_commands_on_devnet() {
    let harness = Harness::new();

    let reply = harness
        .call("ledger", json!({"ledger": {"name": "validated"}}), guest(7))
        .await;
    assert_eq!(reply["result"]["ledger"]["ledger_index"], 3);
    assert_eq!(reply["result"]["ledger"]["validated"], true);

    let reply = harness.call("ledger", json!({"ledger_index": 2}), guest(7)).await;
    assert_eq!(reply["result"]["ledger"]["ledger_index"], 2);

    let params = json!({"ledger": {"index": 4, "name": "closed"}});
    let reply = harness.call("ledger", params, guest(7)).await;
    assert_eq!(reply["error"]["code"], rpc_code(RpcErrorCode::InvalidParams));
    assert_eq!(reply["error"]["message"], "More than one of hash, index or name are set.");

    // Full listings are for admins only
    let reply = harness.call("ledger", json!({"full": true}), guest(7)).await;
    assert_eq!(reply["error"]["code"], rpc_code(RpcErrorCode::NoPermission));
    let reply = harness.call("ledger", json!({"full": true}), admin()).await;
    assert_eq!(reply["result"]["ledger"]["accounts"].as_array().unwrap().len(), 4);

    let params = json!({"offer": {"account": CUSTOMER, "seq": 3}});
    let reply = harness.call("ledger_entry", params, guest(8)).await;
    assert_eq!(reply["result"]["node"]["LedgerEntryType"], "Offer");

    let params = json!({"index": "00".repeat(32)});
    let reply = harness.call("ledger_entry", params, guest(8)).await;
    assert_eq!(reply["error"]["code"], rpc_code(RpcErrorCode::EntryNotFound));
}

#[tokio::test]
async fn test_closed_ledger_moves_tags() {
    let harness = Harness::new();
    harness.ledgers.close_ledger().unwrap();

    let reply = harness.call("server_info", json!({}), guest(9)).await;
    let info = &reply["result"]["info"];
    assert_eq!(info["complete_ledgers"], "1-4");
    assert_eq!(info["validated_ledger"]["seq"], 4);
    assert_eq!(info["closed_ledger"]["seq"], 5);
}

#[tokio::test]
async fn test_forbidden_credentials() {
    let harness = Harness::new();
    let body = json!({"method": "ping", "admin_user": "root", "admin_password": "guess"});
    let reply = harness.send(&body, guest(10)).await;
    assert_eq!(reply.status, 403);
    assert_eq!(reply.body_string(), "Forbidden");
}

#[tokio::test]
async fn test_concurrent_callers_are_accounted_separately() {
    let harness = Arc::new(Harness::new());

    let mut handles = Vec::new();
    for octet in 1..=16u8 {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..5 {
                let reply = harness.call("ping", json!({}), guest(octet)).await;
                assert_eq!(reply["result"], json!({}));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let resources = harness.pipeline.resources();
    assert_eq!(resources.len(), 16);
    for octet in 1..=16u8 {
        assert_eq!(resources.new_inbound_endpoint(guest(octet)).balance(), 100);
    }
}

#[tokio::test]
async fn test_concurrent_charges_from_one_caller_are_not_lost() {
    let harness = Arc::new(Harness::new());

    let mut handles = Vec::new();
    for _ in 0..20 {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            harness.call("ping", json!({}), guest(42)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let consumer = harness.pipeline.resources().new_inbound_endpoint(guest(42));
    assert_eq!(consumer.balance(), 400);
}
