// Library root module for swap-bench
// This file defines the public API and module structure for the swap-bench library
// It exports the strategy executor and the collaborators it drives
//
// Numan Thabit 2025 Nov

pub mod config;
pub mod errors;
pub mod metrics;
pub mod proposal;
pub mod signing;
pub mod state;
pub mod strategy;
pub mod tip;
pub mod transport;
pub mod venues;
pub mod wallet;
