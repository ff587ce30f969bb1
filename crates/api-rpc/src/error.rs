//! RPC Envelopes
//!
//! Wraps handler results and failed statuses into the reply body. The
//! `error` member is written by [`Status::fill_json`].

use ledger_rpc_core::status::Status;
use serde_json::{json, Map, Value};

const JSONRPC_VERSION: &str = "2.0";

/// `{"result": ..., "id": ..., "jsonrpc": "2.0"}`
pub fn success_envelope(result: Value, id: Value) -> Value {
    json!({
        "result": result,
        "id": id,
        "jsonrpc": JSONRPC_VERSION,
    })
}

/// `{"error": {code, message, data}, "id": ...}`
pub fn error_envelope(status: &Status, id: Value) -> Value {
    let mut object = Map::new();
    status.fill_json(&mut object);
    object.insert("id".to_string(), id);
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_rpc_core::status::{RpcErrorCode, RPC_OFFSET};

    #[test]
    fn test_error_member_matches_status_encoding() {
        let status = Status::new(
            RpcErrorCode::InvalidParams,
            vec!["actMalformed".to_string(), "account".to_string()],
        );
        let reply = error_envelope(&status, json!(7));
        assert_eq!(reply["id"], 7);
        assert_eq!(reply["error"], status.error_object().unwrap());
        assert_eq!(reply["error"]["code"], RPC_OFFSET + 31);
        assert_eq!(reply["error"]["message"], "actMalformed");
        assert_eq!(reply["error"]["data"], json!(["account"]));
        assert!(reply.get("result").is_none());
    }

    #[test]
    fn test_bare_status_uses_code_string() {
        let reply = error_envelope(&Status::from(RpcErrorCode::UnknownCommand), Value::Null);
        assert_eq!(reply["error"]["message"], "unknownCmd: Unknown method.");
        assert_eq!(reply["error"]["data"], json!([]));
        assert_eq!(reply["id"], Value::Null);
    }

    #[test]
    fn test_success_envelope() {
        let reply = success_envelope(json!({"ok": true}), json!("abc"));
        assert_eq!(reply, json!({"result": {"ok": true}, "id": "abc", "jsonrpc": "2.0"}));
    }
}
