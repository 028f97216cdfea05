// Configuration management module
// This file handles loading and parsing of configuration settings
// from environment variables (prefix APP, nested keys separated by "__")
//
// Numan Thabit 2025 Nov

use crate::tip::FeePolicy;
use crate::venues::SwapRequest;
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::str::FromStr;
use sui_sdk::types::base_types::SuiAddress;
use url::Url;

const DEFAULT_STANDARD_RPC: &str = "https://fullnode.mainnet.sui.io:443";
const DEFAULT_ROUTER: &str = "https://aftermath.finance/api";
const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
const USDC_COIN_TYPE: &str =
    "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Standard fullnode JSON-RPC endpoint (Normal submissions, Hopper confirmation)
    pub standard_rpc: Url,
    /// Fast/priority JSON-RPC endpoint (Shio and Hopper submissions, fee estimation)
    pub fast_rpc: Url,
    /// Trade router HTTP API base
    pub router_endpoint: Url,
    /// Expected Sui address of the wallet; checked against the key when set
    pub address: Option<String>,
    /// Hex-encoded 32-byte Ed25519 private key (do not use in prod; replace with HSM)
    pub ed25519_secret_hex: String,
    /// Gas budget the wallet uses when it finalizes a proposal itself
    pub wallet_gas_budget: u64,
    /// HTTP API listen address
    pub api_listen: SocketAddr,
    pub trade: TradeConfig,
    pub fees: FeeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeConfig {
    pub amount_in: u64,
    pub coin_in_type: String,
    pub coin_out_type: String,
    pub slippage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
    /// Address that receives the priority tip coin
    pub tip_recipient: String,
    /// Tip as basis points of the gas budget
    pub tip_bps: u64,
    /// Floor for the tip amount (MIST)
    pub min_tip: u64,
    /// Safety margin added to the dry-run gas usage, in basis points
    pub margin_bps: u64,
    /// Floor for the estimated gas budget (MIST)
    pub min_gas_budget: u64,
    /// Provisional budget used for the estimation dry run (MIST)
    pub dry_run_budget: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Self::defaults()?.add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            ),
        )
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("standard_rpc", DEFAULT_STANDARD_RPC)?
            .set_default("router_endpoint", DEFAULT_ROUTER)?
            .set_default("wallet_gas_budget", 50_000_000_i64)?
            .set_default("api_listen", "0.0.0.0:8080")?
            .set_default("trade.amount_in", 1_000_000_i64)?
            .set_default("trade.coin_in_type", SUI_COIN_TYPE)?
            .set_default("trade.coin_out_type", USDC_COIN_TYPE)?
            .set_default("trade.slippage", 0.1)?
            .set_default("fees.tip_bps", 500_i64)?
            .set_default("fees.min_tip", 1_000_i64)?
            .set_default("fees.margin_bps", 2_000_i64)?
            .set_default("fees.min_gas_budget", 2_000_000_i64)?
            .set_default("fees.dry_run_budget", 50_000_000_i64)?)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let cfg: Self = builder.build()?.try_deserialize()?;
        ensure!(
            cfg.trade.slippage.is_finite() && (0.0..=1.0).contains(&cfg.trade.slippage),
            "trade.slippage must be within [0, 1], got {}",
            cfg.trade.slippage
        );
        ensure!(cfg.trade.amount_in > 0, "trade.amount_in must be positive");
        Ok(cfg)
    }

    pub fn sui_address(&self) -> Result<Option<SuiAddress>> {
        self.address
            .as_deref()
            .map(|raw| {
                SuiAddress::from_str(raw).with_context(|| format!("invalid Sui address: {raw}"))
            })
            .transpose()
    }

    pub fn swap_request(&self) -> SwapRequest {
        SwapRequest {
            amount_in: self.trade.amount_in,
            coin_in_type: self.trade.coin_in_type.clone(),
            coin_out_type: self.trade.coin_out_type.clone(),
            slippage: self.trade.slippage,
        }
    }

    pub fn tip_recipient(&self) -> Result<SuiAddress> {
        SuiAddress::from_str(&self.fees.tip_recipient)
            .with_context(|| format!("invalid tip recipient: {}", self.fees.tip_recipient))
    }

    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            tip_bps: self.fees.tip_bps,
            min_tip: self.fees.min_tip,
            margin_bps: self.fees.margin_bps,
            min_gas_budget: self.fees.min_gas_budget,
            dry_run_budget: self.fees.dry_run_budget,
        }
    }
}
