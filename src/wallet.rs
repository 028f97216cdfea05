// Wallet capability module
// This file defines the signing capability the executor delegates to and a
// local Ed25519 key wallet implementing it
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::proposal::{to_bcs, TransactionFinalizer, TransactionProposal};
use crate::signing::{serialize_signature_b64, Ed25519Key};
use async_trait::async_trait;
use sui_sdk::types::base_types::SuiAddress;
use sui_sdk::types::transaction::{TransactionData, TransactionDataAPI};
use tracing::{info, warn};

/// What the wallet is asked to sign.
#[derive(Debug)]
pub enum SignableTransaction {
    /// Unfinalized proposal; the wallet resolves gas itself.
    Proposal(TransactionProposal),
    /// Finalized BCS `TransactionData` bytes.
    Built(Vec<u8>),
}

/// Signed envelope handed to the broadcast dispatcher.
#[derive(Debug)]
pub struct SignedTransaction {
    pub tx_bytes: Vec<u8>,
    pub signatures: Vec<Vec<u8>>,
}

impl SignedTransaction {
    pub fn signatures_b64(&self) -> Vec<String> {
        self.signatures
            .iter()
            .map(|sig| serialize_signature_b64(sig))
            .collect()
    }
}

#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Currently connected account, if any.
    fn current_account(&self) -> Option<SuiAddress>;

    async fn sign(&self, tx: SignableTransaction) -> Result<SignedTransaction, SwapError>;
}

/// Wallet backed by an in-process Ed25519 key.
pub struct LocalKeyWallet {
    key: Ed25519Key,
    finalizer: Box<dyn TransactionFinalizer>,
    default_gas_budget: u64,
}

impl LocalKeyWallet {
    pub fn new(
        key: Ed25519Key,
        finalizer: Box<dyn TransactionFinalizer>,
        default_gas_budget: u64,
    ) -> Self {
        Self {
            key,
            finalizer,
            default_gas_budget,
        }
    }

    async fn finalize_proposal(
        &self,
        mut proposal: TransactionProposal,
    ) -> Result<Vec<u8>, SwapError> {
        if proposal.sender().is_none() {
            proposal.set_sender(self.key.address());
        }
        if proposal.gas_budget().is_none() {
            proposal.set_gas_budget(self.default_gas_budget);
        }
        let tx_data = self.finalizer.finalize(proposal).await?;
        to_bcs(&tx_data)
    }

    fn check_sender(&self, tx_bytes: &[u8]) -> Result<(), SwapError> {
        let tx_data: TransactionData = bcs::from_bytes(tx_bytes)
            .map_err(|e| SwapError::SigningRejected(format!("undecodable transaction: {e}")))?;
        if tx_data.sender() != self.key.address() {
            warn!(
                sender = %tx_data.sender(),
                wallet = %self.key.address(),
                "refusing to sign for another sender"
            );
            return Err(SwapError::SigningRejected(format!(
                "sender {} is not the wallet account",
                tx_data.sender()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl WalletSigner for LocalKeyWallet {
    fn current_account(&self) -> Option<SuiAddress> {
        Some(self.key.address())
    }

    async fn sign(&self, tx: SignableTransaction) -> Result<SignedTransaction, SwapError> {
        let tx_bytes = match tx {
            SignableTransaction::Built(bytes) => bytes,
            SignableTransaction::Proposal(proposal) => self.finalize_proposal(proposal).await?,
        };
        self.check_sender(&tx_bytes)?;
        let signature = self.key.sign_transaction(&tx_bytes);
        info!(bytes = tx_bytes.len(), "transaction signed");
        Ok(SignedTransaction {
            tx_bytes,
            signatures: vec![signature],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_sdk::types::base_types::{ObjectID, SequenceNumber};
    use sui_sdk::types::digests::ObjectDigest;
    use sui_sdk::types::programmable_transaction_builder::ProgrammableTransactionBuilder;

    const SECRET: &str = "9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

    struct FixedGas;

    #[async_trait]
    impl TransactionFinalizer for FixedGas {
        async fn finalize(
            &self,
            proposal: TransactionProposal,
        ) -> Result<TransactionData, SwapError> {
            let gas = (
                ObjectID::random(),
                SequenceNumber::from_u64(3),
                ObjectDigest::random(),
            );
            proposal.into_transaction_data(vec![gas], 1_000)
        }
    }

    fn wallet() -> LocalKeyWallet {
        LocalKeyWallet::new(
            Ed25519Key::from_hex(SECRET).unwrap(),
            Box::new(FixedGas),
            7_000_000,
        )
    }

    fn empty() -> TransactionProposal {
        TransactionProposal::new(ProgrammableTransactionBuilder::new().finish())
    }

    #[tokio::test]
    async fn raw_proposal_is_finalized_with_default_budget() {
        let wallet = wallet();
        let signed = wallet
            .sign(SignableTransaction::Proposal(empty()))
            .await
            .unwrap();
        let data: TransactionData = bcs::from_bytes(&signed.tx_bytes).unwrap();
        assert_eq!(data.gas_budget(), 7_000_000);
        assert_eq!(Some(data.sender()), wallet.current_account());
        assert_eq!(signed.signatures.len(), 1);
        assert_eq!(signed.signatures_b64().len(), 1);
    }

    #[tokio::test]
    async fn foreign_sender_is_rejected() {
        let mut proposal = empty();
        proposal.set_sender(SuiAddress::random_for_testing_only());
        proposal.set_gas_budget(1_000_000);
        let gas = (
            ObjectID::random(),
            SequenceNumber::from_u64(1),
            ObjectDigest::random(),
        );
        let bytes = to_bcs(&proposal.into_transaction_data(vec![gas], 1_000).unwrap()).unwrap();

        let err = wallet()
            .sign(SignableTransaction::Built(bytes))
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::SigningRejected(_)));
    }

    #[tokio::test]
    async fn garbage_bytes_are_rejected() {
        let err = wallet()
            .sign(SignableTransaction::Built(vec![1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::SigningRejected(_)));
    }
}
