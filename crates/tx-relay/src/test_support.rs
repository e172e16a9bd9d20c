//! In-memory ledger used by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::Address;
use async_trait::async_trait;
use ledger_client::{BlockTag, CallRequest, ClientError, LedgerClient};
use serde_json::Value;

pub(crate) struct MockLedger {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_estimate: Result<u64, ClientError>,
    pub chain_id: u64,
    pub send_result: Result<String, ClientError>,
    pub transaction: Result<Option<Value>, ClientError>,
    pub nonce_fails: Option<ClientError>,

    pub nonce_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub chain_id_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub nonce_requests: Mutex<Vec<(Address, BlockTag)>>,
    pub sent: Mutex<Vec<String>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            nonce: 7,
            gas_price: 20_000_000_000,
            gas_estimate: Ok(43_000),
            chain_id: 1,
            send_result: Ok(format!("0x{}", "ab".repeat(32))),
            transaction: Ok(None),
            nonce_fails: None,
            nonce_calls: AtomicUsize::new(0),
            gas_price_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            chain_id_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            nonce_requests: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockLedger {
    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_transaction_count(
        &self,
        address: Address,
        block: BlockTag,
    ) -> Result<u64, ClientError> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        self.nonce_requests.lock().unwrap().push((address, block));
        match &self.nonce_fails {
            Some(err) => Err(err.clone()),
            None => Ok(self.nonce),
        }
    }

    async fn get_gas_price(&self) -> Result<u128, ClientError> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> Result<u64, ClientError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.gas_estimate.clone()
    }

    async fn send_signed_transaction(&self, raw_tx: &str) -> Result<String, ClientError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(raw_tx.to_string());
        self.send_result.clone()
    }

    async fn get_transaction(&self, _tx_hash: &str) -> Result<Option<Value>, ClientError> {
        self.transaction.clone()
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_id)
    }
}
