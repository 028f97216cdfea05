// Execution time board
//
// Per-strategy display state shared by concurrent runs. Each update merges a
// single strategy key; a failed run leaves the previous value in place.
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::strategy::{RunReport, Strategy, StrategyExecutor};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Clone, Default)]
pub struct ExecutionBoard {
	times: Arc<RwLock<HashMap<Strategy, String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
	pub normal: Option<String>,
	pub shio: Option<String>,
	pub hopper: Option<String>,
}

impl ExecutionBoard {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn record(&self, strategy: Strategy, execution_time: String) {
		let mut guard = self.times.write().await;
		guard.insert(strategy, execution_time);
		debug!(strategy = %strategy, "execution time recorded");
	}

	pub async fn get(&self, strategy: Strategy) -> Option<String> {
		self.times.read().await.get(&strategy).cloned()
	}

	pub async fn snapshot(&self) -> BoardSnapshot {
		let guard = self.times.read().await;
		BoardSnapshot {
			normal: guard.get(&Strategy::Normal).cloned(),
			shio: guard.get(&Strategy::Shio).cloned(),
			hopper: guard.get(&Strategy::Hopper).cloned(),
		}
	}

	/// Run a strategy and merge its time into the board on success.
	pub async fn run(
		&self,
		executor: &StrategyExecutor,
		strategy: Strategy,
	) -> Result<RunReport, SwapError> {
		match executor.run(strategy).await {
			Ok(report) => {
				self.record(strategy, report.execution_time.clone()).await;
				Ok(report)
			}
			Err(err) => {
				warn!(strategy = %strategy, error = %err, "run failed; board left unchanged");
				Err(err)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn record_merges_per_key() {
		let board = ExecutionBoard::new();
		board.record(Strategy::Normal, "00:01.000".into()).await;
		board.record(Strategy::Hopper, "00:02.500".into()).await;
		board.record(Strategy::Normal, "00:00.900".into()).await;

		assert_eq!(
			board.snapshot().await,
			BoardSnapshot {
				normal: Some("00:00.900".into()),
				shio: None,
				hopper: Some("00:02.500".into()),
			}
		);
		assert_eq!(board.get(Strategy::Shio).await, None);
	}
}
