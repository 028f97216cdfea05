use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use swap_bench::config::AppConfig;
use swap_bench::proposal::RpcFinalizer;
use swap_bench::signing::Ed25519Key;
use swap_bench::state::ExecutionBoard;
use swap_bench::strategy::api::{create_api_router, ApiState};
use swap_bench::strategy::{Collaborators, Endpoints, StrategyExecutor};
use swap_bench::tip::{DryRunFeeEstimator, TransferTip};
use swap_bench::transport::JsonRpc;
use swap_bench::venues::AftermathRouter;
use swap_bench::wallet::LocalKeyWallet;
use sui_sdk::SuiClientBuilder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal swap-bench error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;

    let key = Ed25519Key::from_hex(&config.ed25519_secret_hex).context("load wallet key")?;
    if let Some(expected) = config.sui_address().context("parse Sui address")? {
        if expected != key.address() {
            bail!(
                "configured address {expected} does not match key address {}",
                key.address()
            );
        }
    }
    let address = key.address();

    let fast = Arc::new(JsonRpc::new(config.fast_rpc.to_string()));
    let standard = Arc::new(JsonRpc::new(config.standard_rpc.to_string()));

    let fast_sui = SuiClientBuilder::default()
        .build(config.fast_rpc.as_str())
        .await
        .context("connect Sui client to fast endpoint")?;
    let standard_sui = SuiClientBuilder::default()
        .build(config.standard_rpc.as_str())
        .await
        .context("connect Sui client to standard endpoint")?;

    let router = AftermathRouter::new(&config.router_endpoint, Arc::new(standard_sui.clone()))
        .context("initialize router")?;
    let tip_recipient = config.tip_recipient().context("parse tip recipient")?;

    let wallet = LocalKeyWallet::new(
        key,
        Box::new(RpcFinalizer::new(standard_sui, standard.endpoint())),
        config.wallet_gas_budget,
    );

    let executor = StrategyExecutor::new(
        Collaborators {
            router: Arc::new(router),
            estimator: Arc::new(DryRunFeeEstimator::new(
                fast.clone(),
                RpcFinalizer::new(fast_sui.clone(), fast.endpoint()),
                config.fee_policy(),
            )),
            tipper: Arc::new(TransferTip::new(tip_recipient)),
            fast_finalizer: Arc::new(RpcFinalizer::new(fast_sui, fast.endpoint())),
            wallet: Arc::new(wallet),
            endpoints: Endpoints::new(fast.clone(), standard.clone()),
        },
        config.swap_request(),
    );

    let app = App {
        config: Arc::new(config),
        state: ApiState {
            executor: Arc::new(executor),
            board: ExecutionBoard::new(),
        },
    };

    info!(
        address = %address,
        fast = %fast.endpoint(),
        standard = %standard.endpoint(),
        "swap-bench online"
    );
    app.run().await
}

struct App {
    config: Arc<AppConfig>,
    state: ApiState,
}

impl App {
    async fn run(self) -> Result<()> {
        let swap = self.state.executor.swap();
        info!(
            amount_in = swap.amount_in,
            coin_in = %swap.coin_in_type,
            coin_out = %swap.coin_out_type,
            slippage = swap.slippage,
            "swap under test"
        );

        let api_router = create_api_router(self.state.clone());
        let api_addr = self.config.api_listen;
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .with_context(|| format!("bind API server address {api_addr}"))?;

        info!(address = %api_addr, "HTTP API server starting");
        let _api_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api_router).await {
                warn!(error = %e, "API server error");
            }
        });

        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let times = self.state.board.snapshot().await;
                    info!(
                        normal = ?times.normal,
                        shio = ?times.shio,
                        hopper = ?times.hopper,
                        "execution times"
                    );
                }
                res = tokio::signal::ctrl_c() => {
                    if let Err(err) = res {
                        warn!(error = %err, "ctrl_c listener error");
                    }
                    info!("Shutdown signal received, exiting");
                    break;
                }
            }
        }
        Ok(())
    }
}

fn init_tracing() -> Result<()> {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
