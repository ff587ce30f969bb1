// Account identifiers and their base58 encodings

use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Version byte of an encoded account id.
pub const ACCOUNT_ID_VERSION: u8 = 0;
/// Version byte of an encoded account public key.
pub const ACCOUNT_PUBLIC_VERSION: u8 = 35;

const CHECKSUM_LEN: usize = 4;
const ACCOUNT_ID_LEN: usize = 20;
const PUBLIC_KEY_LEN: usize = 33;

/// 160-bit account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountParseError {
    #[error("not valid base58")]
    Base58,
    #[error("checksum mismatch")]
    Checksum,
    #[error("unexpected version byte {0}")]
    Version(u8),
    #[error("unexpected payload length {0}")]
    Length(usize),
}

impl AccountId {
    pub const fn new(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Account id of a public key: RIPEMD-160(SHA-256(key)).
    pub fn from_public_key(key: &[u8]) -> Self {
        let sha = Sha256::digest(key);
        let ripe = Ripemd160::digest(sha);
        let mut out = [0u8; ACCOUNT_ID_LEN];
        out.copy_from_slice(&ripe);
        Self(out)
    }

    /// Decode a base58 account id (`r...`).
    pub fn from_base58(s: &str) -> Result<Self, AccountParseError> {
        let payload = decode_versioned(s, ACCOUNT_ID_VERSION)?;
        let bytes: [u8; ACCOUNT_ID_LEN] = payload
            .as_slice()
            .try_into()
            .map_err(|_| AccountParseError::Length(payload.len()))?;
        Ok(Self(bytes))
    }

    /// Decode a base58 account public key (`a...`) and derive its account id.
    pub fn from_public_base58(s: &str) -> Result<Self, AccountParseError> {
        let payload = decode_versioned(s, ACCOUNT_PUBLIC_VERSION)?;
        if payload.len() != PUBLIC_KEY_LEN {
            return Err(AccountParseError::Length(payload.len()));
        }
        Ok(Self::from_public_key(&payload))
    }

    pub fn to_base58(&self) -> String {
        encode_versioned(ACCOUNT_ID_VERSION, &self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for AccountId {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let twice = Sha256::digest(Sha256::digest(data));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&twice[..CHECKSUM_LEN]);
    out
}

pub fn encode_versioned(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

pub fn decode_versioned(s: &str, version: u8) -> Result<Vec<u8>, AccountParseError> {
    let data = bs58::decode(s)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| AccountParseError::Base58)?;
    if data.len() < 1 + CHECKSUM_LEN {
        return Err(AccountParseError::Length(data.len()));
    }
    let (body, check) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(body) != check {
        return Err(AccountParseError::Checksum);
    }
    if body[0] != version {
        return Err(AccountParseError::Version(body[0]));
    }
    Ok(body[1..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known genesis account
    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    #[test]
    fn test_zero_account_encoding() {
        assert_eq!(
            AccountId::new([0u8; 20]).to_base58(),
            "rrrrrrrrrrrrrrrrrrrrrhoLvTp"
        );
    }

    #[test]
    fn test_base58_round_trip() {
        let account = AccountId::from_base58(GENESIS).unwrap();
        assert_eq!(account.to_base58(), GENESIS);
    }

    #[test]
    fn test_checksum_is_verified() {
        let mut corrupted = GENESIS.to_string();
        corrupted.pop();
        corrupted.push('j');
        assert!(AccountId::from_base58(&corrupted).is_err());
    }

    #[test]
    fn test_public_key_derivation() {
        let key = [0x02u8; 33];
        let encoded = encode_versioned(ACCOUNT_PUBLIC_VERSION, &key);
        let account = AccountId::from_public_base58(&encoded).unwrap();
        assert_eq!(account, AccountId::from_public_key(&key));
        // A public key is not an account id
        assert_eq!(
            AccountId::from_base58(&encoded),
            Err(AccountParseError::Version(ACCOUNT_PUBLIC_VERSION))
        );
    }
}
