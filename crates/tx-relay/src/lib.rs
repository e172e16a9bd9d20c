//! # tx-relay
//!
//! Builds, signs and submits contract calls as raw legacy transactions, so
//! the node never manages keys or fills in transactions on its own.
//!
//! ```text
//! encode call -> resolve attributes -> sign -> submit -> Envelope
//! ```
//!
//! Every stage short-circuits on failure and nothing is retried. The
//! pipeline entry points ([`TxRelay::build_and_send`], [`TxRelay::submit`],
//! [`TxRelay::get_receipt`]) return an [`Envelope`] instead of an error.

pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

use alloy_primitives::{hex, Address, Bytes, U256};
use chain_eth::address::verifying_key_to_address;
use chain_eth::interface::{self, ContractInterface};
use chain_eth::transaction::{self, SignedTransaction, TxAttributes};
use crypto_utils::PrivateKey;
use ledger_client::LedgerClient;
use serde_json::Value;

pub use config::{RelayConfig, DEFAULT_GAS_LIMIT};
pub use envelope::Envelope;
pub use error::{FailureKind, RelayError};
pub use resolver::AttributeRequest;

/// A contract method invocation to build and send.
#[derive(Debug, Clone, Copy)]
pub struct ContractCall<'a> {
    pub abi: &'a ContractInterface,
    pub contract: Address,
    pub method: &'a str,
    pub args: &'a [Value],
    /// Wei attached to the call.
    pub value: U256,
    /// `None` estimates (or falls back, per [`RelayConfig`]).
    pub gas_limit: Option<u64>,
}

impl<'a> ContractCall<'a> {
    pub fn new(
        abi: &'a ContractInterface,
        contract: Address,
        method: &'a str,
        args: &'a [Value],
    ) -> Self {
        Self {
            abi,
            contract,
            method,
            args,
            value: U256::ZERO,
            gas_limit: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// A pipeline bound to one ledger client. Holds no per-call state; concurrent
/// calls from one sender may still race on the nonce.
pub struct TxRelay<C> {
    client: C,
    config: RelayConfig,
}

impl<C: LedgerClient> TxRelay<C> {
    pub fn new(client: C, config: RelayConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// `0x` + selector + encoded arguments for `method`.
    pub fn encode_function_call(
        &self,
        abi: &ContractInterface,
        method: &str,
        args: &[Value],
    ) -> Result<String, RelayError> {
        Ok(interface::encode_function_call(abi, method, args)?)
    }

    /// Encoded constructor arguments, chosen by argument count.
    pub fn encode_constructor_call(
        &self,
        abi: &ContractInterface,
        args: &[Value],
    ) -> Result<String, RelayError> {
        Ok(interface::encode_constructor_call(abi, args)?)
    }

    /// Encoded constructor arguments for the `index`-th declared constructor.
    pub fn encode_constructor_call_at(
        &self,
        abi: &ContractInterface,
        index: usize,
        args: &[Value],
    ) -> Result<String, RelayError> {
        Ok(interface::encode_constructor_call_at(abi, index, args)?)
    }

    pub async fn resolve_attributes(
        &self,
        request: AttributeRequest,
    ) -> Result<TxAttributes, RelayError> {
        resolver::resolve_attributes(&self.client, request, &self.config).await
    }

    /// Encodes, resolves and signs `call` without submitting it.
    #[tracing::instrument(
        skip(self, call, private_key),
        fields(method = call.method, contract = %call.contract)
    )]
    pub async fn build_signed(
        &self,
        call: &ContractCall<'_>,
        sender: Address,
        private_key: &PrivateKey,
    ) -> Result<SignedTransaction, RelayError> {
        let derived = verifying_key_to_address(private_key.signing_key()?.verifying_key());
        if derived != sender {
            return Err(RelayError::SenderMismatch { sender, derived });
        }

        let data = Bytes::from(interface::function_call_data(call.abi, call.method, call.args)?);
        tracing::debug!(selector = %hex::encode(&data[..4.min(data.len())]), "encoded call");

        let mut request = AttributeRequest {
            nonce: None,
            from: sender,
            to: call.contract,
            value: call.value,
            data,
            gas_limit: call.gas_limit,
            gas_price: None,
        };
        if request.gas_limit.is_none() && self.config.estimate_gas {
            request.gas_limit = Some(resolver::estimate_gas_limit(&self.client, &request).await?);
        }

        let attributes = self.resolve_attributes(request).await?;
        let signed = transaction::sign_transaction(&attributes, private_key)?;
        tracing::debug!(tx_hash = %signed.tx_hash, "signed transaction");
        Ok(signed)
    }

    /// The whole pipeline: encode, resolve, sign, submit. The envelope carries
    /// the method name as `functionName`.
    pub async fn build_and_send(
        &self,
        call: &ContractCall<'_>,
        sender: Address,
        private_key: &PrivateKey,
    ) -> Envelope {
        let result = match self.build_signed(call, sender, private_key).await {
            Ok(signed) => gateway::submit(&self.client, &signed.raw_hex()).await,
            Err(err) => {
                tracing::warn!(method = call.method, error = %err, "failed to build transaction");
                Err(err)
            }
        };
        Envelope::from_result(result).with_function_name(call.method)
    }

    /// Broadcasts an already-signed `0x` raw transaction.
    pub async fn submit(&self, raw_tx: &str) -> Envelope {
        Envelope::from_result(gateway::submit(&self.client, raw_tx).await)
    }

    pub async fn submit_signed(&self, signed: &SignedTransaction) -> Envelope {
        self.submit(&signed.raw_hex()).await
    }

    /// Transaction info for `tx_hash`. Not-found and lookup failures both give
    /// status 0 but different `kind`s.
    pub async fn get_receipt(&self, tx_hash: &str) -> Envelope {
        Envelope::from_result(self.fetch_transaction(tx_hash).await)
    }

    pub async fn fetch_transaction(&self, tx_hash: &str) -> Result<Value, RelayError> {
        gateway::fetch_transaction(&self.client, tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockLedger;
    use ledger_client::ClientError;
    use serde_json::json;

    const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    fn key() -> PrivateKey {
        PrivateKey::from_hex(KEY_ONE).unwrap()
    }

    fn sender() -> Address {
        chain_eth::address::parse_address("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf").unwrap()
    }

    fn store_abi() -> ContractInterface {
        ContractInterface::from_json_value(json!([
            {"type": "function", "name": "set", "inputs": [{"name": "x", "type": "uint256"}]},
            {"type": "function", "name": "get", "inputs": []}
        ]))
        .unwrap()
    }

    fn relay(ledger: MockLedger) -> TxRelay<MockLedger> {
        TxRelay::new(ledger, RelayConfig::default().with_chain_id(1))
    }

    #[test]
    fn encode_set_42() {
        let relay = relay(MockLedger::default());
        let data = relay
            .encode_function_call(&store_abi(), "set", &[json!(42)])
            .unwrap();
        assert_eq!(
            data,
            "0x60fe47b1000000000000000000000000000000000000000000000000000000000000002a"
        );
    }

    #[test]
    fn encode_unknown_method_is_abi_mismatch() {
        let relay = relay(MockLedger::default());
        let err = relay
            .encode_function_call(&store_abi(), "frob", &[])
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::AbiMismatch);
    }

    #[test]
    fn encode_constructor_without_declared_constructor() {
        let relay = relay(MockLedger::default());
        assert_eq!(relay.encode_constructor_call(&store_abi(), &[]).unwrap(), "0x");
    }

    #[tokio::test]
    async fn build_and_send_success() {
        let relay = relay(MockLedger {
            send_result: Ok("0xabc".into()),
            ..Default::default()
        });
        let abi = store_abi();
        let args = [json!(42)];
        let call = ContractCall::new(&abi, Address::repeat_byte(0x22), "set", &args);

        let envelope = relay.build_and_send(&call, sender(), &key()).await;

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 1, "message": "0xabc", "functionName": "set"})
        );
        let ledger = relay.client();
        assert_eq!(MockLedger::calls(&ledger.nonce_calls), 1);
        assert_eq!(MockLedger::calls(&ledger.estimate_calls), 1);
        assert_eq!(MockLedger::calls(&ledger.gas_price_calls), 1);
        assert_eq!(MockLedger::calls(&ledger.chain_id_calls), 0);
        let sent = ledger.sent.lock().unwrap();
        assert!(sent[0].starts_with("0xf8"));
        assert!(sent[0].contains(
            "60fe47b1000000000000000000000000000000000000000000000000000000000000002a"
        ));
    }

    #[tokio::test]
    async fn build_and_send_nonce_too_low() {
        let relay = relay(MockLedger {
            send_result: Err(ClientError::Rpc {
                code: -32000,
                message: "nonce too low".into(),
            }),
            ..Default::default()
        });
        let abi = store_abi();
        let args = [json!(1)];
        let call = ContractCall::new(&abi, Address::repeat_byte(0x22), "set", &args);

        let envelope = relay.build_and_send(&call, sender(), &key()).await;

        assert_eq!(envelope.status, 0);
        assert_eq!(envelope.message, json!("nonce too low"));
        assert_eq!(envelope.function_name.as_deref(), Some("set"));
        assert_eq!(envelope.kind, Some(FailureKind::Rejected));
    }

    #[tokio::test]
    async fn explicit_gas_limit_skips_estimate() {
        let relay = relay(MockLedger::default());
        let abi = store_abi();
        let args = [json!(1)];
        let call =
            ContractCall::new(&abi, Address::repeat_byte(0x22), "set", &args).with_gas_limit(60_000);

        let signed = relay.build_signed(&call, sender(), &key()).await.unwrap();

        assert_eq!(MockLedger::calls(&relay.client().estimate_calls), 0);
        assert!(signed.raw_hex().starts_with("0xf8"));
    }

    #[tokio::test]
    async fn estimate_disabled_uses_fallback() {
        let config = RelayConfig {
            estimate_gas: false,
            ..RelayConfig::default().with_chain_id(1)
        };
        let relay = TxRelay::new(MockLedger::default(), config);
        let abi = store_abi();
        let args = [json!(1)];
        let call = ContractCall::new(&abi, Address::repeat_byte(0x22), "set", &args);

        let signed = relay.build_signed(&call, sender(), &key()).await.unwrap();

        assert_eq!(MockLedger::calls(&relay.client().estimate_calls), 0);
        // 750000 = 0x0b71b0, RLP-encoded as 83 0b71b0.
        assert!(signed.raw_hex().contains("830b71b0"));
    }

    #[tokio::test]
    async fn wrong_sender_is_rejected_before_any_lookup() {
        let relay = relay(MockLedger::default());
        let abi = store_abi();
        let args = [json!(1)];
        let call = ContractCall::new(&abi, Address::repeat_byte(0x22), "set", &args);

        let envelope = relay
            .build_and_send(&call, Address::repeat_byte(0x33), &key())
            .await;

        assert_eq!(envelope.kind, Some(FailureKind::InvalidKey));
        assert_eq!(MockLedger::calls(&relay.client().nonce_calls), 0);
        assert_eq!(MockLedger::calls(&relay.client().send_calls), 0);
    }

    #[tokio::test]
    async fn bad_arguments_never_reach_the_node() {
        let relay = relay(MockLedger::default());
        let abi = store_abi();
        let args = [json!("not a number")];
        let call = ContractCall::new(&abi, Address::repeat_byte(0x22), "set", &args);

        let envelope = relay.build_and_send(&call, sender(), &key()).await;

        assert_eq!(envelope.kind, Some(FailureKind::AbiMismatch));
        assert_eq!(MockLedger::calls(&relay.client().nonce_calls), 0);
    }

    #[tokio::test]
    async fn submit_wraps_hash() {
        let relay = relay(MockLedger {
            send_result: Ok("0xabc".into()),
            ..Default::default()
        });
        let envelope = relay.submit("0xf86c").await;
        assert_eq!(envelope, Envelope::success("0xabc"));
    }

    #[tokio::test]
    async fn receipt_found_and_missing() {
        let relay_found = relay(MockLedger {
            transaction: Ok(Some(json!({"hash": "0x01"}))),
            ..Default::default()
        });
        let envelope = relay_found.get_receipt("0x01").await;
        assert_eq!(envelope.status, 1);
        assert_eq!(envelope.message["hash"], "0x01");

        let relay_missing = relay(MockLedger::default());
        let envelope = relay_missing.get_receipt("0x01").await;
        assert_eq!(envelope.status, 0);
        assert_eq!(envelope.kind, Some(FailureKind::NotFound));
    }
}
