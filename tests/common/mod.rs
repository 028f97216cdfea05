// Test doubles for the executor's collaborators. Every call sleeps for a fixed
// delay so runs under a paused tokio clock produce exact durations.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sui_sdk::types::base_types::{ObjectID, SequenceNumber, SuiAddress};
use sui_sdk::types::digests::ObjectDigest;
use sui_sdk::types::programmable_transaction_builder::ProgrammableTransactionBuilder;
use sui_sdk::types::transaction::{
    Argument, CallArg, Command, TransactionData, TransactionDataAPI, TransactionKind,
};
use swap_bench::errors::SwapError;
use swap_bench::proposal::{TransactionFinalizer, TransactionProposal};
use swap_bench::strategy::{
    Broadcaster, Collaborators, Endpoints, StrategyExecutor, TransactionRecord,
};
use swap_bench::tip::{FeeEstimate, FeeEstimator, TransferTip};
use swap_bench::venues::{RouteResolver, SwapRequest, TradeRoute};
use swap_bench::wallet::{SignableTransaction, SignedTransaction, WalletSigner};

pub const ROUTE_MS: u64 = 40;
pub const BUILD_MS: u64 = 30;
pub const ESTIMATE_MS: u64 = 70;
pub const FINALIZE_MS: u64 = 20;
pub const SIGN_MS: u64 = 50;
pub const FAST_SUBMIT_MS: u64 = 120;
pub const STANDARD_SUBMIT_MS: u64 = 200;
pub const LOOKUP_MS: u64 = 310;

pub const ESTIMATE: FeeEstimate = FeeEstimate {
    gas_budget: 6_000_000,
    tip_amount: 300_000,
};

async fn pause(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[derive(Default)]
pub struct MockRouter {
    pub routes: AtomicUsize,
    pub builds: AtomicUsize,
}

#[async_trait]
impl RouteResolver for MockRouter {
    async fn resolve_route(
        &self,
        amount_in: u64,
        _coin_in_type: &str,
        _coin_out_type: &str,
    ) -> Result<TradeRoute, SwapError> {
        pause(ROUTE_MS).await;
        self.routes.fetch_add(1, Ordering::SeqCst);
        Ok(TradeRoute(json!({ "amountIn": amount_in })))
    }

    async fn build_transaction(
        &self,
        _route: TradeRoute,
        _slippage: f64,
        wallet: SuiAddress,
    ) -> Result<TransactionProposal, SwapError> {
        pause(BUILD_MS).await;
        self.builds.fetch_add(1, Ordering::SeqCst);
        let mut ptb = ProgrammableTransactionBuilder::new();
        ptb.pure(42u64).expect("pure input");
        let mut proposal = TransactionProposal::new(ptb.finish());
        proposal.set_sender(wallet);
        Ok(proposal)
    }
}

pub struct MockEstimator {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl Default for MockEstimator {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl FeeEstimator for MockEstimator {
    async fn estimate(&self, proposal: &TransactionProposal) -> Result<FeeEstimate, SwapError> {
        assert!(proposal.sender().is_some(), "sender must be set before estimation");
        pause(ESTIMATE_MS).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SwapError::FeeEstimation("estimator unavailable".into()));
        }
        Ok(ESTIMATE)
    }
}

#[derive(Default)]
pub struct MockFinalizer {
    pub calls: AtomicUsize,
    /// Fail with a raw node error, as the client would on a lost connection
    pub fail: AtomicBool,
}

#[async_trait]
impl TransactionFinalizer for MockFinalizer {
    async fn finalize(&self, proposal: TransactionProposal) -> Result<TransactionData, SwapError> {
        pause(FINALIZE_MS).await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SwapError::Transport("select gas: connection reset".into()));
        }
        let gas = (
            ObjectID::random(),
            SequenceNumber::from_u64(7),
            ObjectDigest::random(),
        );
        proposal.into_transaction_data(vec![gas], 1_000)
    }
}

/// What the wallet was asked to sign.
#[derive(Debug, Clone)]
pub struct SignRecord {
    pub built: bool,
    pub gas_budget: Option<u64>,
    /// Amounts of every SplitCoins taken from the gas coin
    pub gas_splits: Vec<u64>,
}

pub struct MockWallet {
    pub account: Option<SuiAddress>,
    pub reject: AtomicBool,
    pub records: Mutex<Vec<SignRecord>>,
}

impl MockWallet {
    pub fn new(account: Option<SuiAddress>) -> Self {
        Self {
            account,
            reject: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn last(&self) -> SignRecord {
        self.records.lock().unwrap().last().cloned().expect("a signing request")
    }
}

fn gas_split_amounts(inputs: &[CallArg], commands: &[Command]) -> Vec<u64> {
    commands
        .iter()
        .filter_map(|cmd| match cmd {
            Command::SplitCoins(Argument::GasCoin, amounts) => Some(amounts),
            _ => None,
        })
        .flatten()
        .map(|arg| match arg {
            Argument::Input(i) => match &inputs[*i as usize] {
                CallArg::Pure(bytes) => bcs::from_bytes::<u64>(bytes).expect("u64 amount"),
                other => panic!("split amount is not pure: {other:?}"),
            },
            other => panic!("unexpected split argument: {other:?}"),
        })
        .collect()
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn current_account(&self) -> Option<SuiAddress> {
        self.account
    }

    async fn sign(&self, tx: SignableTransaction) -> Result<SignedTransaction, SwapError> {
        pause(SIGN_MS).await;
        if self.reject.load(Ordering::SeqCst) {
            return Err(SwapError::SigningRejected("user declined".into()));
        }
        let (record, tx_bytes) = match tx {
            SignableTransaction::Proposal(p) => (
                SignRecord {
                    built: false,
                    gas_budget: p.gas_budget(),
                    gas_splits: gas_split_amounts(&p.programmable().inputs, &p.programmable().commands),
                },
                Vec::new(),
            ),
            SignableTransaction::Built(bytes) => {
                let data: TransactionData = bcs::from_bytes(&bytes).expect("transaction data");
                let splits = match data.kind() {
                    TransactionKind::ProgrammableTransaction(pt) => {
                        gas_split_amounts(&pt.inputs, &pt.commands)
                    }
                    other => panic!("unexpected kind {other:?}"),
                };
                (
                    SignRecord {
                        built: true,
                        gas_budget: Some(data.gas_budget()),
                        gas_splits: splits,
                    },
                    bytes,
                )
            }
        };
        self.records.lock().unwrap().push(record);
        Ok(SignedTransaction {
            tx_bytes,
            signatures: vec![vec![0u8; 97]],
        })
    }
}

pub struct MockBroadcaster {
    pub name: &'static str,
    pub submit_ms: u64,
    pub submits: AtomicUsize,
    pub lookups: AtomicUsize,
    pub fail_lookup: AtomicBool,
}

impl MockBroadcaster {
    pub fn new(name: &'static str, submit_ms: u64) -> Self {
        Self {
            name,
            submit_ms,
            submits: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
            fail_lookup: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Broadcaster for MockBroadcaster {
    fn endpoint(&self) -> &str {
        self.name
    }

    async fn submit(&self, _signed: SignedTransaction) -> Result<String, SwapError> {
        pause(self.submit_ms).await;
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-digest-{n}", self.name))
    }

    async fn transaction_by_digest(&self, digest: &str) -> Result<TransactionRecord, SwapError> {
        pause(LOOKUP_MS).await;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(SwapError::Confirmation(format!("{digest} not found")));
        }
        Ok(TransactionRecord {
            digest: digest.to_string(),
            checkpoint: Some("1".into()),
        })
    }
}

pub struct Harness {
    pub router: Arc<MockRouter>,
    pub estimator: Arc<MockEstimator>,
    pub finalizer: Arc<MockFinalizer>,
    pub wallet: Arc<MockWallet>,
    pub fast: Arc<MockBroadcaster>,
    pub standard: Arc<MockBroadcaster>,
    pub executor: Arc<StrategyExecutor>,
}

pub fn harness() -> Harness {
    harness_with_account(Some(SuiAddress::random_for_testing_only()))
}

pub fn harness_with_account(account: Option<SuiAddress>) -> Harness {
    let router = Arc::new(MockRouter::default());
    let estimator = Arc::new(MockEstimator::default());
    let finalizer = Arc::new(MockFinalizer::default());
    let wallet = Arc::new(MockWallet::new(account));
    let fast = Arc::new(MockBroadcaster::new("fast", FAST_SUBMIT_MS));
    let standard = Arc::new(MockBroadcaster::new("standard", STANDARD_SUBMIT_MS));

    let executor = StrategyExecutor::new(
        Collaborators {
            router: router.clone(),
            estimator: estimator.clone(),
            tipper: Arc::new(TransferTip::new(SuiAddress::random_for_testing_only())),
            fast_finalizer: finalizer.clone(),
            wallet: wallet.clone(),
            endpoints: Endpoints::new(fast.clone(), standard.clone()),
        },
        SwapRequest {
            amount_in: 1_000_000,
            coin_in_type: "0x2::sui::SUI".into(),
            coin_out_type: "0x2::coin::USDC".into(),
            slippage: 0.1,
        },
    );

    Harness {
        router,
        estimator,
        finalizer,
        wallet,
        fast,
        standard,
        executor: Arc::new(executor),
    }
}
