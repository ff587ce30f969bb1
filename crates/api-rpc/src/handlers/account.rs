// account_info, account_offers, gateway_balances

use super::{dictionary_help, resolve_ledger};
use crate::function_manager::{Handler, HelpDetail, Request};
use crate::types::{
    AccountInfoResponse, AccountOffersResponse, CurrencyBalance, GatewayBalancesResponse,
};
use async_trait::async_trait;
use ledger_rpc_core::bail_status;
use ledger_rpc_core::domain::charge::{FEE_HIGH_BURDEN_RPC, FEE_MEDIUM_BURDEN_RPC};
use ledger_rpc_core::domain::{AccountId, AccountRoot, LedgerHeader};
use ledger_rpc_core::field::typed::{TypedField, Unsigned};
use ledger_rpc_core::field::{Dictionary, FieldDescriptor, FieldKind, Required};
use ledger_rpc_core::field_reader::{read_account_address, read_optional};
use ledger_rpc_core::port::LedgerState;
use ledger_rpc_core::status::{RpcErrorCode, Status};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

const ACCOUNT_HELP: &[&str] = &["Account id, or account public key unless strict."];
const LEDGER_HELP: &[&str] = &["Ledger reference; defaults to ledger_hash / ledger_index."];

static ACCOUNT_INFO_PARAMS: Dictionary = Dictionary::new(&[
    ("account", FieldDescriptor::new(FieldKind::String, Required::Yes, ACCOUNT_HELP)),
    ("strict", FieldDescriptor::new(FieldKind::Boolean, Required::No, &["Only accept account ids."])),
    ("ledger", FieldDescriptor::new(FieldKind::Ledger, Required::No, LEDGER_HELP)),
]);

static ACCOUNT_OFFERS_PARAMS: Dictionary = Dictionary::new(&[
    ("account", FieldDescriptor::new(FieldKind::String, Required::Yes, ACCOUNT_HELP)),
    ("strict", FieldDescriptor::new(FieldKind::Boolean, Required::No, &["Only accept account ids."])),
    ("ledger", FieldDescriptor::new(FieldKind::Ledger, Required::No, LEDGER_HELP)),
    (
        "limit",
        FieldDescriptor::new(FieldKind::UnsignedSmallInteger, Required::No, &["Maximum offers returned."]),
    ),
    (
        "account_index",
        FieldDescriptor::new(FieldKind::UnsignedSmallInteger, Required::No, &["Account index, defaults to 0."]),
    ),
]);

static GATEWAY_BALANCES_PARAMS: Dictionary = Dictionary::new(&[
    ("account", FieldDescriptor::new(FieldKind::String, Required::Yes, &["Issuing account."])),
    ("strict", FieldDescriptor::new(FieldKind::Boolean, Required::No, &["Only accept account ids."])),
    ("ledger", FieldDescriptor::new(FieldKind::Ledger, Required::No, LEDGER_HELP)),
    (
        "hotwallet",
        FieldDescriptor::new(
            FieldKind::String,
            Required::No,
            &["Operational account or list of accounts excluded from obligations."],
        ),
    ),
]);

fn to_result<T: Serialize>(body: T) -> Result<Value, Status> {
    serde_json::to_value(body)
        .map_err(|e| Status::with_message(RpcErrorCode::Internal, e.to_string()))
}

/// Account root of `account`, or `actNotFound`.
async fn existing_account(
    ledgers: &dyn LedgerState,
    ledger: &LedgerHeader,
    account: &AccountId,
) -> Result<AccountRoot, Status> {
    match ledgers.account_root(ledger, account).await? {
        Some(root) => Ok(root),
        None => Err(Status::new(
            RpcErrorCode::ActNotFound,
            vec!["actNotFound".to_string(), account.to_base58()],
        )),
    }
}

pub struct AccountInfo;

#[async_trait]
impl Handler for AccountInfo {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        let account = read_account_address(req.params)?;
        let ledger = resolve_ledger(req, &ACCOUNT_INFO_PARAMS).await?;
        let root = existing_account(req.ledgers, &ledger, &account).await?;
        to_result(AccountInfoResponse {
            account_data: root,
            ledger_index: ledger.seq,
            validated: ledger.validated,
        })
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("account_info: account root of one account.", &ACCOUNT_INFO_PARAMS, detail)
    }
}

pub struct AccountOffers;

#[async_trait]
impl Handler for AccountOffers {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        req.charge = FEE_MEDIUM_BURDEN_RPC;
        let account = read_account_address(req.params)?;
        let mut limit = TypedField::<Unsigned>::bind(&ACCOUNT_OFFERS_PARAMS, "limit")?;
        limit.set_from(req.params)?;
        let mut account_index =
            TypedField::<Unsigned>::bind(&ACCOUNT_OFFERS_PARAMS, "account_index")?;
        account_index.set_from(req.params)?;

        let ledger = resolve_ledger(req, &ACCOUNT_OFFERS_PARAMS).await?;
        existing_account(req.ledgers, &ledger, &account).await?;

        let mut offers = req.ledgers.account_offers(&ledger, &account).await?;
        let limit = limit.take().filter(|l| (*l as usize) < offers.len());
        if let Some(limit) = limit {
            offers.truncate(limit as usize);
        }
        to_result(AccountOffersResponse {
            account,
            offers,
            ledger_index: ledger.seq,
            limit,
            account_index: account_index.take(),
        })
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help("account_offers: offers owned by one account.", &ACCOUNT_OFFERS_PARAMS, detail)
    }
}

pub struct GatewayBalances;

#[async_trait]
impl Handler for GatewayBalances {
    async fn handle(&self, req: &mut Request<'_>) -> Result<Value, Status> {
        req.charge = FEE_HIGH_BURDEN_RPC;
        let account = read_account_address(req.params)?;
        let hot_wallets: BTreeSet<AccountId> =
            read_optional(req.params, "hotwallet")?.unwrap_or_default();

        let ledger = resolve_ledger(req, &GATEWAY_BALANCES_PARAMS).await?;
        existing_account(req.ledgers, &ledger, &account).await?;

        let mut body = GatewayBalancesResponse {
            account: account.to_base58(),
            ledger_index: ledger.seq,
            ..Default::default()
        };

        for line in req.ledgers.trust_lines(&ledger, &account).await? {
            if line.balance.is_zero() {
                continue;
            }
            if !line.balance.is_negative() {
                body.assets.entry(line.peer.to_base58()).or_default().push(CurrencyBalance {
                    currency: line.currency,
                    value: line.balance,
                });
                continue;
            }

            let issued = line.balance.negate();
            if hot_wallets.contains(&line.peer) {
                body.balances.entry(line.peer.to_base58()).or_default().push(CurrencyBalance {
                    currency: line.currency,
                    value: issued,
                });
                continue;
            }

            let total = body.obligations.entry(line.currency).or_default();
            let Some(sum) = total.checked_add(issued) else {
                bail_status!(RpcErrorCode::Internal, "obligation total out of range");
            };
            *total = sum;
        }

        to_result(body)
    }

    fn help(&self, detail: HelpDetail) -> String {
        dictionary_help(
            "gateway_balances: amounts issued and held by a gateway.",
            &GATEWAY_BALANCES_PARAMS,
            detail,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::call;
    use ledger_rpc_core::domain::{AccountId, AccountRoot, OfferEntry, Role, TrustLine};
    use ledger_rpc_core::port::ledger_state::mocks::MockLedgerState;
    use ledger_rpc_core::status::RpcErrorCode;
    use serde_json::json;

    const GATEWAY: &str = "raJ1Aqkhf19P7cyUc33MMVAzgvHPvtNFC";
    const HOT: &str = "rBcktgVfNjHmxNAQDEE66ztz4qZkdngdm";
    const CUSTOMER: &str = "rGvdqXNwMbSwRiubF4PhhVqzhkiaTDPgU";
    const OTHER: &str = "r4NW8MyD7T2Yu71oRVWQQz8ykg3YcpY88";

    fn id(s: &str) -> AccountId {
        AccountId::from_base58(s).unwrap()
    }

    fn root(s: &str) -> AccountRoot {
        AccountRoot {
            account: id(s),
            balance: 1_000_000,
            sequence: 5,
            owner_count: 2,
            flags: 0,
        }
    }

    fn line(account: &str, peer: &str, currency: &str, balance: &str) -> TrustLine {
        TrustLine {
            account: id(account),
            peer: id(peer),
            currency: currency.to_string(),
            balance: balance.parse().unwrap(),
        }
    }

    fn offer(seq: u32) -> OfferEntry {
        OfferEntry {
            seq,
            flags: 0,
            taker_pays: "10".parse().unwrap(),
            taker_gets: "1.5".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_account_info() {
        let ledgers = MockLedgerState::with_chain(3);
        ledgers.add_account(root(CUSTOMER));

        let (result, cost) = call(&ledgers, "account_info", json!({"account": CUSTOMER}), Role::Guest).await;
        let body = result.unwrap();
        assert_eq!(body["account_data"]["account"], CUSTOMER);
        assert_eq!(body["account_data"]["sequence"], 5);
        assert_eq!(body["ledger_index"], 3);
        assert_eq!(cost, 20);

        let params = json!({"account": CUSTOMER, "ledger_index": "validated"});
        let (result, _) = call(&ledgers, "account_info", params, Role::Guest).await;
        assert_eq!(result.unwrap()["validated"], true);
    }

    #[tokio::test]
    async fn test_account_info_failures() {
        let ledgers = MockLedgerState::with_chain(3);

        let (result, _) = call(&ledgers, "account_info", json!({}), Role::Guest).await;
        assert_eq!(result.unwrap_err().message(), "Missing field 'account'.");

        let (result, _) = call(&ledgers, "account_info", json!({"account": "bogus"}), Role::Guest).await;
        assert_eq!(result.unwrap_err().to_rpc(), Some(RpcErrorCode::ActMalformed));

        let (result, _) = call(&ledgers, "account_info", json!({"account": OTHER}), Role::Guest).await;
        assert_eq!(result.unwrap_err().to_rpc(), Some(RpcErrorCode::ActNotFound));

        let params = json!({"account": CUSTOMER, "ledger_index": "sideways"});
        let (result, _) = call(&ledgers, "account_info", params, Role::Guest).await;
        assert_eq!(result.unwrap_err().to_rpc(), Some(RpcErrorCode::InvalidParams));
    }

    #[tokio::test]
    async fn test_account_offers_limit_and_charge() {
        let ledgers = MockLedgerState::with_chain(3);
        ledgers.add_account(root(CUSTOMER));
        for seq in [3, 4, 9] {
            ledgers.add_offer(id(CUSTOMER), offer(seq));
        }

        let (result, cost) = call(&ledgers, "account_offers", json!({"account": CUSTOMER}), Role::Guest).await;
        let body = result.unwrap();
        assert_eq!(body["offers"].as_array().unwrap().len(), 3);
        assert_eq!(body["offers"][0]["taker_gets"], "1.5");
        assert!(body.get("limit").is_none());
        assert_eq!(cost, 400);

        let params = json!({"account": CUSTOMER, "limit": 2});
        let (result, _) = call(&ledgers, "account_offers", params, Role::Guest).await;
        let body = result.unwrap();
        assert_eq!(body["offers"].as_array().unwrap().len(), 2);
        assert_eq!(body["limit"], 2);

        let params = json!({"account": CUSTOMER, "limit": -1});
        let (result, cost) = call(&ledgers, "account_offers", params, Role::Guest).await;
        assert_eq!(result.unwrap_err().to_rpc(), Some(RpcErrorCode::InvalidParams));
        assert_eq!(cost, 400);
    }

    #[tokio::test]
    async fn test_account_offers_echoes_account_index() {
        let ledgers = MockLedgerState::with_chain(3);
        ledgers.add_account(root(CUSTOMER));
        ledgers.add_offer(id(CUSTOMER), offer(3));

        let (result, _) = call(&ledgers, "account_offers", json!({"account": CUSTOMER}), Role::Guest).await;
        assert!(result.unwrap().get("account_index").is_none());

        let params = json!({"account": CUSTOMER, "account_index": 1});
        let (result, _) = call(&ledgers, "account_offers", params, Role::Guest).await;
        let body = result.unwrap();
        assert_eq!(body["account_index"], 1);
        assert_eq!(body["offers"].as_array().unwrap().len(), 1);

        let params = json!({"account": CUSTOMER, "account_index": -1});
        let (result, _) = call(&ledgers, "account_offers", params, Role::Guest).await;
        assert_eq!(result.unwrap_err().to_rpc(), Some(RpcErrorCode::InvalidParams));
    }

    #[tokio::test]
    async fn test_gateway_balances() {
        let ledgers = MockLedgerState::with_chain(3);
        ledgers.add_account(root(GATEWAY));
        ledgers.add_trust_line(line(GATEWAY, CUSTOMER, "USD", "-100"));
        ledgers.add_trust_line(line(GATEWAY, OTHER, "USD", "-0.5"));
        ledgers.add_trust_line(line(GATEWAY, HOT, "USD", "-50.25"));
        ledgers.add_trust_line(line(GATEWAY, OTHER, "EUR", "7"));

        let params = json!({"account": GATEWAY, "hotwallet": HOT});
        let (result, cost) = call(&ledgers, "gateway_balances", params, Role::Guest).await;
        let body = result.unwrap();
        assert_eq!(body["obligations"], json!({"USD": "100.5"}));
        assert_eq!(body["balances"][HOT], json!([{"currency": "USD", "value": "50.25"}]));
        assert_eq!(body["assets"][OTHER], json!([{"currency": "EUR", "value": "7"}]));
        assert_eq!(cost, 3000);

        // Without hot wallets everything issued counts as an obligation
        let (result, _) = call(&ledgers, "gateway_balances", json!({"account": GATEWAY}), Role::Guest).await;
        assert_eq!(result.unwrap()["obligations"], json!({"USD": "150.75"}));
    }

    #[tokio::test]
    async fn test_gateway_balances_bad_hotwallet_list() {
        let ledgers = MockLedgerState::with_chain(3);
        ledgers.add_account(root(GATEWAY));
        let params = json!({"account": GATEWAY, "hotwallet": [HOT, "nope"]});
        let (result, _) = call(&ledgers, "gateway_balances", params, Role::Guest).await;
        let status = result.unwrap_err();
        assert_eq!(status.to_rpc(), Some(RpcErrorCode::ActMalformed));
        assert_eq!(status.messages()[1], "hotwallet");
    }
}
