// Fee estimation and priority tip module
// This file handles gas budget estimation on the fast endpoint and the
// attachment of a tip coin split from the gas coin
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::proposal::{to_bcs, RpcFinalizer, TransactionFinalizer, TransactionProposal};
use crate::transport::jsonrpc::GasUsed;
use crate::transport::JsonRpc;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use sui_sdk::types::base_types::SuiAddress;
use sui_sdk::types::transaction::{Argument, Command};
use tracing::{debug, info};

const BPS: u128 = 10_000;

/// Gas budget and tip for one transaction, in MIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeEstimate {
    pub gas_budget: u64,
    pub tip_amount: u64,
}

/// Tunables for the dry-run based estimator.
#[derive(Debug, Clone)]
pub struct FeePolicy {
    pub tip_bps: u64,
    pub min_tip: u64,
    pub margin_bps: u64,
    pub min_gas_budget: u64,
    pub dry_run_budget: u64,
}

impl FeePolicy {
    /// Budget = (computation + storage) plus margin, floored; tip = share of budget, floored.
    pub fn estimate_from(&self, gas: &GasUsed) -> FeeEstimate {
        let used = gas.computation_cost as u128 + gas.storage_cost as u128;
        let with_margin = used * (BPS + self.margin_bps as u128) / BPS;
        let gas_budget = clamp_u64(with_margin).max(self.min_gas_budget);
        let tip = gas_budget as u128 * self.tip_bps as u128 / BPS;
        let tip_amount = clamp_u64(tip).max(self.min_tip);
        FeeEstimate {
            gas_budget,
            tip_amount,
        }
    }
}

fn clamp_u64(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[async_trait]
pub trait FeeEstimator: Send + Sync {
    async fn estimate(&self, proposal: &TransactionProposal) -> Result<FeeEstimate, SwapError>;
}

/// Estimates fees by dry-running the proposal on the fast endpoint.
pub struct DryRunFeeEstimator {
    rpc: Arc<JsonRpc>,
    finalizer: RpcFinalizer,
    policy: FeePolicy,
}

impl DryRunFeeEstimator {
    /// `finalizer` must resolve gas against the same node as `rpc`.
    pub fn new(rpc: Arc<JsonRpc>, finalizer: RpcFinalizer, policy: FeePolicy) -> Self {
        Self {
            rpc,
            finalizer,
            policy,
        }
    }
}

#[async_trait]
impl FeeEstimator for DryRunFeeEstimator {
    async fn estimate(&self, proposal: &TransactionProposal) -> Result<FeeEstimate, SwapError> {
        let mut probe = proposal.clone();
        probe.set_gas_budget(self.policy.dry_run_budget);
        let tx_data = self
            .finalizer
            .finalize(probe)
            .await
            .map_err(|e| SwapError::FeeEstimation(format!("prepare dry run: {e}")))?;
        let tx_bcs = to_bcs(&tx_data).map_err(|e| SwapError::FeeEstimation(e.to_string()))?;

        let resp = self
            .rpc
            .dry_run(&tx_bcs)
            .await
            .map_err(|e| e.during(SwapError::FeeEstimation))?;
        if resp.effects.status.status != "success" {
            return Err(SwapError::FeeEstimation(format!(
                "dry run failed: {}",
                resp.effects.status.error.unwrap_or_default()
            )));
        }

        let estimate = self.policy.estimate_from(&resp.effects.gas_used);
        debug!(
            computation = resp.effects.gas_used.computation_cost,
            storage = resp.effects.gas_used.storage_cost,
            gas_budget = estimate.gas_budget,
            tip = estimate.tip_amount,
            "fee estimate"
        );
        Ok(estimate)
    }
}

/// Appends an already split coin to the transaction as a priority tip.
///
/// `coin` already holds the tip value; `amount` is that value, passed for
/// logging and accounting only. Implementations must not split again.
pub trait TipAppender: Send + Sync {
    fn append_tip(
        &self,
        proposal: &mut TransactionProposal,
        coin: Argument,
        amount: u64,
    ) -> Result<(), SwapError>;
}

/// Tips by transferring the coin to a fixed recipient.
pub struct TransferTip {
    recipient: SuiAddress,
}

impl TransferTip {
    pub fn new(recipient: SuiAddress) -> Self {
        Self { recipient }
    }
}

impl TipAppender for TransferTip {
    fn append_tip(
        &self,
        proposal: &mut TransactionProposal,
        coin: Argument,
        amount: u64,
    ) -> Result<(), SwapError> {
        let recipient = proposal.pure(&self.recipient)?;
        proposal.command(Command::TransferObjects(vec![coin], recipient))?;
        debug!(recipient = %self.recipient, amount = amount, "tip appended");
        Ok(())
    }
}

/// Steps 1-5 of the tip path: sender, estimate, budget, split, append.
/// Finalization is left to the caller.
pub async fn attach_priority_tip(
    proposal: &mut TransactionProposal,
    sender: SuiAddress,
    estimator: &dyn FeeEstimator,
    tipper: &dyn TipAppender,
) -> Result<FeeEstimate, SwapError> {
    proposal.set_sender(sender);
    let estimate = estimator.estimate(proposal).await?;
    proposal.set_gas_budget(estimate.gas_budget);
    let tip_coin = proposal.split_gas(estimate.tip_amount)?;
    tipper.append_tip(proposal, tip_coin, estimate.tip_amount)?;
    info!(
        gas_budget = estimate.gas_budget,
        tip = estimate.tip_amount,
        "priority tip attached"
    );
    Ok(estimate)
}
