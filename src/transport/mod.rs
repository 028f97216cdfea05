// Transport layer
// Sui JSON-RPC client shared by the fee estimator and the broadcast dispatcher
//
// Numan Thabit 2025 Nov

pub mod jsonrpc;

pub use jsonrpc::JsonRpc;
