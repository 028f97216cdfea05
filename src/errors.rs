// Error types and error handling module
// This file defines the failure taxonomy of a strategy run and the
// transport-level errors raised by the RPC and router clients
//
// Numan Thabit 2025 Nov

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("route resolution failed: {0}")]
    RouteResolution(String),
    #[error("fee estimation failed: {0}")]
    FeeEstimation(String),
    #[error("build tx error: {0}")]
    Build(String),
    #[error("signing rejected: {0}")]
    SigningRejected(String),
    #[error("submission failed: {0}")]
    Submission(String),
    #[error("confirmation failed: {0}")]
    Confirmation(String),
    #[error("no wallet account connected")]
    WalletDisconnected,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider error: {0}")]
    Provider(String),
}

impl SwapError {
    /// Stable machine-readable name, used for metrics labels and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::RouteResolution(_) => "route_resolution",
            SwapError::FeeEstimation(_) => "fee_estimation",
            SwapError::Build(_) => "build",
            SwapError::SigningRejected(_) => "signing_rejected",
            SwapError::Submission(_) => "submission",
            SwapError::Confirmation(_) => "confirmation",
            SwapError::WalletDisconnected => "wallet_disconnected",
            SwapError::Transport(_) => "transport",
            SwapError::Provider(_) => "provider",
        }
    }

    /// Re-tag a raw RPC failure with the pipeline stage that hit it.
    pub fn during(self, stage: fn(String) -> SwapError) -> SwapError {
        match self {
            SwapError::Transport(msg) | SwapError::Provider(msg) => stage(msg),
            other => other,
        }
    }
}
