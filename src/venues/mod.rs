// Trade routing venues
// This file defines the route resolver contract the executor consumes and the
// swap request it resolves
//
// Numan Thabit 2025 Nov

pub mod aftermath;
pub mod trade_tx;

use crate::errors::SwapError;
use crate::proposal::TransactionProposal;
use async_trait::async_trait;
use sui_sdk::types::base_types::SuiAddress;

pub use aftermath::AftermathRouter;
pub use trade_tx::ObjectResolver;

/// The swap every strategy run submits.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub amount_in: u64,
    pub coin_in_type: String,
    pub coin_out_type: String,
    /// Accepted output degradation, within [0, 1]
    pub slippage: f64,
}

/// Opaque route as returned by the router; consumed once.
#[derive(Debug, Clone)]
pub struct TradeRoute(pub serde_json::Value);

#[async_trait]
pub trait RouteResolver: Send + Sync {
    async fn resolve_route(
        &self,
        amount_in: u64,
        coin_in_type: &str,
        coin_out_type: &str,
    ) -> Result<TradeRoute, SwapError>;

    async fn build_transaction(
        &self,
        route: TradeRoute,
        slippage: f64,
        wallet: SuiAddress,
    ) -> Result<TransactionProposal, SwapError>;
}

pub(crate) fn check_amount(amount_in: u64) -> Result<(), SwapError> {
    if amount_in == 0 {
        return Err(SwapError::RouteResolution(
            "input amount must be positive".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_slippage(slippage: f64) -> Result<(), SwapError> {
    if !slippage.is_finite() || !(0.0..=1.0).contains(&slippage) {
        return Err(SwapError::RouteResolution(format!(
            "slippage {slippage} outside [0, 1]"
        )));
    }
    Ok(())
}
