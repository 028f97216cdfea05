// Strategy module - submission strategies and their execution plane
// This file wires the strategy profile table, the execution engine, timing,
// broadcast dispatch and the HTTP API
//
// Numan Thabit 2025 Nov

pub mod api;
pub mod dispatch;
pub mod execution;
pub mod profiles;
pub mod timing;

pub use dispatch::{Broadcaster, Endpoints, TransactionRecord};
pub use execution::{Collaborators, RunReport, StrategyExecutor};
pub use profiles::{EndpointKind, PipelineEvent, Strategy, StrategyProfile, UnknownStrategy};
pub use timing::{format_duration, Stopwatch};
