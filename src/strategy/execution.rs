// Strategy execution engine
// One pipeline for every strategy: resolve the route, attach a tip when the
// profile asks for it, sign, submit, optionally confirm, and time the
// profile's window
//
// Numan Thabit 2025 Nov

use super::dispatch::Endpoints;
use super::profiles::{PipelineEvent, Strategy};
use super::timing::{format_duration, Stopwatch};
use crate::errors::SwapError;
use crate::metrics::{STRATEGY_DURATION, STRATEGY_RUNS};
use crate::proposal::{to_bcs, TransactionFinalizer};
use crate::tip::{attach_priority_tip, FeeEstimate, FeeEstimator, TipAppender};
use crate::venues::{RouteResolver, SwapRequest};
use crate::wallet::{SignableTransaction, WalletSigner};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub strategy: Strategy,
    pub digest: String,
    #[serde(skip)]
    pub elapsed: Duration,
    /// `MM:SS.mmm`
    pub execution_time: String,
    pub fee: Option<FeeEstimate>,
}

/// External collaborators the executor drives.
pub struct Collaborators {
    pub router: Arc<dyn RouteResolver>,
    pub estimator: Arc<dyn FeeEstimator>,
    pub tipper: Arc<dyn TipAppender>,
    /// Finalizes tip transactions against the fast endpoint's client
    pub fast_finalizer: Arc<dyn TransactionFinalizer>,
    pub wallet: Arc<dyn WalletSigner>,
    pub endpoints: Endpoints,
}

pub struct StrategyExecutor {
    parts: Collaborators,
    swap: SwapRequest,
}

impl StrategyExecutor {
    pub fn new(parts: Collaborators, swap: SwapRequest) -> Self {
        Self { parts, swap }
    }

    pub fn swap(&self) -> &SwapRequest {
        &self.swap
    }

    /// Run one strategy end to end.
    #[tracing::instrument(skip_all, fields(strategy = %strategy))]
    pub async fn run(&self, strategy: Strategy) -> Result<RunReport, SwapError> {
        let result = self.run_inner(strategy).await;
        match &result {
            Ok(report) => {
                STRATEGY_RUNS
                    .with_label_values(&[strategy.as_str(), "ok"])
                    .inc();
                STRATEGY_DURATION
                    .with_label_values(&[strategy.as_str()])
                    .observe(report.elapsed.as_secs_f64());
                info!(
                    digest = %report.digest,
                    execution_time = %report.execution_time,
                    "strategy run completed"
                );
            }
            Err(err) => {
                STRATEGY_RUNS
                    .with_label_values(&[strategy.as_str(), err.kind()])
                    .inc();
                warn!(error = %err, kind = err.kind(), "strategy run failed");
            }
        }
        result
    }

    async fn run_inner(&self, strategy: Strategy) -> Result<RunReport, SwapError> {
        let profile = strategy.profile();
        let parts = &self.parts;

        let sender = parts
            .wallet
            .current_account()
            .ok_or(SwapError::WalletDisconnected)?;

        // 1. Route and base transaction
        let route = parts
            .router
            .resolve_route(
                self.swap.amount_in,
                &self.swap.coin_in_type,
                &self.swap.coin_out_type,
            )
            .await?;
        let mut proposal = parts
            .router
            .build_transaction(route, self.swap.slippage, sender)
            .await?;

        // 2. Optional priority tip, finalized against the fast endpoint
        let (signable, fee) = if profile.attaches_tip {
            let fee = attach_priority_tip(
                &mut proposal,
                sender,
                parts.estimator.as_ref(),
                parts.tipper.as_ref(),
            )
            .await?;
            let tx_data = parts
                .fast_finalizer
                .finalize(proposal)
                .await
                .map_err(|e| e.during(SwapError::Build))?;
            (SignableTransaction::Built(to_bcs(&tx_data)?), Some(fee))
        } else {
            (SignableTransaction::Proposal(proposal), None)
        };

        // 3. Sign
        let signed = parts.wallet.sign(signable).await?;
        let mut watch = Stopwatch::new(profile.window);
        watch.observe(PipelineEvent::Signed);

        // 4. Submit, then confirm where the profile waits for it
        let digest = parts.endpoints.get(profile.submit_to).submit(signed).await?;
        watch.observe(PipelineEvent::Submitted);

        if let Some(endpoint) = profile.confirm_on {
            parts
                .endpoints
                .get(endpoint)
                .transaction_by_digest(&digest)
                .await?;
            watch.observe(PipelineEvent::Confirmed);
        }

        let elapsed = watch.elapsed().ok_or_else(|| {
            SwapError::Confirmation(format!("timing window for {strategy} never closed"))
        })?;

        Ok(RunReport {
            strategy,
            digest,
            elapsed,
            execution_time: format_duration(elapsed.as_millis()),
            fee,
        })
    }
}
