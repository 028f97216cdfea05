// Broadcast dispatcher
// Submission and by-digest lookup over the two network endpoints.
// Single attempt per call; failures propagate to the run
//
// Numan Thabit 2025 Nov

use super::profiles::EndpointKind;
use crate::errors::SwapError;
use crate::metrics::LANDED_FAILURES;
use crate::transport::jsonrpc::ExecuteResp;
use crate::transport::JsonRpc;
use crate::wallet::SignedTransaction;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a by-digest lookup returned.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub digest: String,
    pub checkpoint: Option<String>,
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Submit a signed transaction and return its digest. The envelope is consumed.
    async fn submit(&self, signed: SignedTransaction) -> Result<String, SwapError>;

    async fn transaction_by_digest(&self, digest: &str) -> Result<TransactionRecord, SwapError>;
}

#[async_trait]
impl Broadcaster for JsonRpc {
    fn endpoint(&self) -> &str {
        JsonRpc::endpoint(self)
    }

    async fn submit(&self, signed: SignedTransaction) -> Result<String, SwapError> {
        let resp = self
            .execute_tx_block(&signed.tx_bytes, &signed.signatures_b64())
            .await
            .map_err(|e| e.during(SwapError::Submission))?;
        let digest = resp
            .digest
            .clone()
            .ok_or_else(|| SwapError::Submission("execute response carried no digest".into()))?;
        landed_ok(&resp, &digest, self.endpoint());
        debug!(endpoint = %self.endpoint(), digest = %digest, "transaction submitted");
        Ok(digest)
    }

    async fn transaction_by_digest(&self, digest: &str) -> Result<TransactionRecord, SwapError> {
        let resp = self
            .get_transaction_block(digest)
            .await
            .map_err(|e| e.during(SwapError::Confirmation))?;
        Ok(TransactionRecord {
            digest: resp.digest.unwrap_or_else(|| digest.to_string()),
            checkpoint: resp.checkpoint,
        })
    }
}

/// False when the effects say the transaction executed and failed on chain.
/// The digest is still the run's result; the failure is logged and counted.
fn landed_ok(resp: &ExecuteResp, digest: &str, endpoint: &str) -> bool {
    match resp.execution_status() {
        Some(status) if status.status != "success" => {
            LANDED_FAILURES.with_label_values(&[endpoint]).inc();
            warn!(
                endpoint = %endpoint,
                digest = %digest,
                status = %status.status,
                error = status.error.as_deref().unwrap_or(""),
                "transaction landed with failed execution"
            );
            false
        }
        _ => true,
    }
}

/// The fast and standard endpoints.
#[derive(Clone)]
pub struct Endpoints {
    pub fast: Arc<dyn Broadcaster>,
    pub standard: Arc<dyn Broadcaster>,
}

impl Endpoints {
    pub fn new(fast: Arc<dyn Broadcaster>, standard: Arc<dyn Broadcaster>) -> Self {
        Self { fast, standard }
    }

    pub fn get(&self, kind: EndpointKind) -> &dyn Broadcaster {
        match kind {
            EndpointKind::Fast => self.fast.as_ref(),
            EndpointKind::Standard => self.standard.as_ref(),
        }
    }
}
