// Aftermath router client
// This file implements the route resolver over the Aftermath router HTTP API:
// quote a complete trade route, then fetch the swap transaction the router
// serializes for the wallet
//
// Numan Thabit 2025 Nov

use super::trade_tx::{decode_router_transaction, ObjectResolver};
use super::{check_amount, check_slippage, RouteResolver, TradeRoute};
use crate::errors::SwapError;
use crate::metrics::{REQ_ERRORS, REQ_LATENCY};
use crate::proposal::TransactionProposal;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sui_sdk::types::base_types::SuiAddress;
use tracing::debug;
use url::Url;

#[derive(Clone)]
pub struct AftermathRouter {
    base: String,
    client: reqwest::Client,
    objects: Arc<dyn ObjectResolver>,
}

impl AftermathRouter {
    pub fn new(endpoint: &Url, objects: Arc<dyn ObjectResolver>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .context("build HTTP client for router")?;
        Ok(Self {
            base: endpoint.as_str().trim_end_matches('/').to_string(),
            client,
            objects,
        })
    }

    async fn post(&self, path: &str, operation: &str, body: Value) -> Result<Value, SwapError> {
        let _timer = REQ_LATENCY
            .with_label_values(&["router", operation])
            .start_timer();
        let result = self.post_inner(path, body).await;
        if result.is_err() {
            REQ_ERRORS.with_label_values(&["router", operation]).inc();
        }
        result
    }

    async fn post_inner(&self, path: &str, body: Value) -> Result<Value, SwapError> {
        let url = format!("{}/{}", self.base, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapError::Transport(format!("router {path}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SwapError::Provider(format!(
                "router {path}: http {status}: {detail}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| SwapError::Transport(format!("router {path} json parse: {e}")))
    }
}

/// Decode the trade transaction body and resolve any object inputs left open.
pub async fn proposal_from_response(
    body: &Value,
    resolver: &dyn ObjectResolver,
) -> Result<TransactionProposal, SwapError> {
    let decoded = decode_router_transaction(body)?;
    let unresolved = decoded.unresolved_ids();
    let objects = if unresolved.is_empty() {
        HashMap::new()
    } else {
        debug!(objects = unresolved.len(), "resolving router input objects");
        resolver
            .resolve_objects(&unresolved)
            .await
            .map_err(|e| e.during(SwapError::RouteResolution))?
    };
    Ok(TransactionProposal::new(decoded.into_programmable(&objects)?))
}

#[async_trait]
impl RouteResolver for AftermathRouter {
    async fn resolve_route(
        &self,
        amount_in: u64,
        coin_in_type: &str,
        coin_out_type: &str,
    ) -> Result<TradeRoute, SwapError> {
        check_amount(amount_in)?;
        let route = self
            .post(
                "router/trade-route",
                "trade-route",
                json!({
                    "coinInType": coin_in_type,
                    "coinOutType": coin_out_type,
                    "coinInAmount": amount_in.to_string(),
                }),
            )
            .await
            .map_err(|e| e.during(SwapError::RouteResolution))?;
        debug!(coin_in = coin_in_type, coin_out = coin_out_type, "trade route resolved");
        Ok(TradeRoute(route))
    }

    async fn build_transaction(
        &self,
        route: TradeRoute,
        slippage: f64,
        wallet: SuiAddress,
    ) -> Result<TransactionProposal, SwapError> {
        check_slippage(slippage)?;
        let body = self
            .post(
                "router/transactions/trade",
                "trade",
                json!({
                    "walletAddress": wallet.to_string(),
                    "completeRoute": route.0,
                    "slippage": slippage,
                    "isSponsoredTx": false,
                }),
            )
            .await
            .map_err(|e| e.during(SwapError::RouteResolution))?;

        let mut proposal = proposal_from_response(&body, self.objects.as_ref()).await?;
        proposal.set_sender(wallet);
        Ok(proposal)
    }
}
