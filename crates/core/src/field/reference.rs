// Directory and offer references, decoded to ledger entry indexes

use super::kinds::parse_hash;
use crate::domain::{keylet, AccountId, Hash256};
use crate::error::{MalformedReason, RpcError};
use serde_json::Value;

/// `"<hex index>"` or `{dir_root | owner, sub_index?}`.
pub fn directory_index(json: &Value, name: &str) -> Result<Hash256, RpcError> {
    if json.is_string() {
        return parse_hash(json, name);
    }

    let malformed = || RpcError::malformed(name, MalformedReason::Directory);
    let sub_index = match json.get("sub_index") {
        None => 0,
        Some(v) => v.as_u64().ok_or_else(malformed)?,
    };

    let root = match (json.get("dir_root"), json.get("owner")) {
        (Some(_), Some(_)) | (None, None) => return Err(malformed()),
        (Some(root), None) => {
            if !root.is_string() {
                return Err(malformed());
            }
            parse_hash(root, "dir_root")?
        }
        (None, Some(owner)) => {
            let owner = owner
                .as_str()
                .and_then(|s| AccountId::from_base58(s).ok())
                .ok_or_else(|| RpcError::malformed("owner", MalformedReason::Account))?;
            keylet::owner_dir(&owner)
        }
    };
    Ok(keylet::dir_page(&root, sub_index))
}

/// `"<hex index>"` or `{account, seq}`.
pub fn offer_index(json: &Value, name: &str) -> Result<Hash256, RpcError> {
    if json.is_string() {
        return parse_hash(json, name);
    }

    let malformed = || RpcError::malformed(name, MalformedReason::Offer);
    let (Some(account), Some(seq)) = (json.get("account"), json.get("seq")) else {
        return Err(malformed());
    };
    let seq = seq
        .as_u64()
        .and_then(|s| u32::try_from(s).ok())
        .ok_or_else(malformed)?;
    let account = account
        .as_str()
        .and_then(|s| AccountId::from_base58(s).ok())
        .ok_or_else(|| RpcError::malformed("account", MalformedReason::Account))?;
    Ok(keylet::offer(&account, seq))
}
