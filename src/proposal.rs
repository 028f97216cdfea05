// Transaction proposal module
// Mutable builder around a programmable transaction received from the router.
// Accumulates sender, gas budget and extra commands before it is finalized
// into BCS TransactionData
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::metrics::{REQ_ERRORS, REQ_LATENCY};
use async_trait::async_trait;
use serde::Serialize;
use sui_sdk::types::base_types::{ObjectID, ObjectRef, SuiAddress};
use sui_sdk::types::transaction::{
    Argument, CallArg, Command, InputObjectKind, ProgrammableTransaction, TransactionData,
};
use sui_sdk::SuiClient;
use tracing::debug;

/// Unsigned transaction under construction.
#[derive(Debug, Clone)]
pub struct TransactionProposal {
    sender: Option<SuiAddress>,
    gas_budget: Option<u64>,
    pt: ProgrammableTransaction,
}

impl TransactionProposal {
    pub fn new(pt: ProgrammableTransaction) -> Self {
        Self {
            sender: None,
            gas_budget: None,
            pt,
        }
    }

    pub fn set_sender(&mut self, sender: SuiAddress) {
        self.sender = Some(sender);
    }

    pub fn sender(&self) -> Option<SuiAddress> {
        self.sender
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    pub fn programmable(&self) -> &ProgrammableTransaction {
        &self.pt
    }

    /// Total value split off the gas coin by every command in the transaction,
    /// including splits the router emitted. Amounts must be pure `u64` inputs.
    pub fn gas_draw(&self) -> Result<u64, SwapError> {
        let mut total: u64 = 0;
        for command in &self.pt.commands {
            let Command::SplitCoins(Argument::GasCoin, amounts) = command else {
                continue;
            };
            for amount in amounts {
                total = total
                    .checked_add(self.pure_u64(amount)?)
                    .ok_or_else(|| SwapError::Build("gas draw overflow".into()))?;
            }
        }
        Ok(total)
    }

    fn pure_u64(&self, arg: &Argument) -> Result<u64, SwapError> {
        let Argument::Input(idx) = arg else {
            return Err(SwapError::Build(format!(
                "gas split amount {arg:?} is not a transaction input"
            )));
        };
        match self.pt.inputs.get(*idx as usize) {
            Some(CallArg::Pure(bytes)) => bcs::from_bytes(bytes)
                .map_err(|e| SwapError::Build(format!("gas split amount input {idx}: {e}"))),
            _ => Err(SwapError::Build(format!(
                "gas split amount input {idx} is not a pure value"
            ))),
        }
    }

    /// Objects the transaction already uses; none of them may pay for gas.
    pub fn input_object_ids(&self) -> Result<Vec<ObjectID>, SwapError> {
        let objects = self
            .pt
            .input_objects()
            .map_err(|e| SwapError::Build(format!("collect input objects: {e}")))?;
        Ok(objects
            .into_iter()
            .map(|obj| InputObjectKind::object_id(&obj))
            .collect())
    }

    /// Add a BCS-encoded pure input and return its argument.
    pub fn pure<T: Serialize>(&mut self, value: &T) -> Result<Argument, SwapError> {
        let bytes = bcs::to_bytes(value)
            .map_err(|e| SwapError::Build(format!("encode pure input: {e}")))?;
        let idx = u16::try_from(self.pt.inputs.len())
            .map_err(|_| SwapError::Build("too many transaction inputs".into()))?;
        self.pt.inputs.push(CallArg::Pure(bytes));
        Ok(Argument::Input(idx))
    }

    /// Append a command and return the index of its result.
    pub fn command(&mut self, command: Command) -> Result<u16, SwapError> {
        let idx = u16::try_from(self.pt.commands.len())
            .map_err(|_| SwapError::Build("too many transaction commands".into()))?;
        self.pt.commands.push(command);
        Ok(idx)
    }

    /// Split a single coin of `amount` off the gas coin.
    pub fn split_gas(&mut self, amount: u64) -> Result<Argument, SwapError> {
        let amount_arg = self.pure(&amount)?;
        let idx = self.command(Command::SplitCoins(Argument::GasCoin, vec![amount_arg]))?;
        Ok(Argument::NestedResult(idx, 0))
    }

    /// Produce `TransactionData` from the proposal with resolved gas payment and price.
    pub fn into_transaction_data(
        self,
        gas_payment: Vec<ObjectRef>,
        gas_price: u64,
    ) -> Result<TransactionData, SwapError> {
        let sender = self
            .sender
            .ok_or_else(|| SwapError::Build("transaction sender not set".into()))?;
        let budget = self
            .gas_budget
            .ok_or_else(|| SwapError::Build("gas budget not set".into()))?;
        if gas_payment.is_empty() {
            return Err(SwapError::Build("no gas payment objects".into()));
        }
        Ok(TransactionData::new_programmable(
            sender,
            gas_payment,
            self.pt,
            budget,
            gas_price,
        ))
    }
}

/// What the gas payment has to satisfy for one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasRequirement {
    pub sender: SuiAddress,
    /// Budget plus everything split off the gas coin
    pub needed: u64,
    pub excluded: Vec<ObjectID>,
}

impl GasRequirement {
    pub fn of(proposal: &TransactionProposal) -> Result<Self, SwapError> {
        let sender = proposal
            .sender()
            .ok_or_else(|| SwapError::Build("transaction sender not set".into()))?;
        let budget = proposal
            .gas_budget()
            .ok_or_else(|| SwapError::Build("gas budget not set".into()))?;
        let needed = budget
            .checked_add(proposal.gas_draw()?)
            .ok_or_else(|| SwapError::Build("gas requirement overflow".into()))?;
        Ok(Self {
            sender,
            needed,
            excluded: proposal.input_object_ids()?,
        })
    }
}

/// Turns a proposal into signable BCS TransactionData bytes.
#[async_trait]
pub trait TransactionFinalizer: Send + Sync {
    async fn finalize(&self, proposal: TransactionProposal) -> Result<TransactionData, SwapError>;
}

/// Finalizer that resolves gas price and a gas coin through one node's client.
pub struct RpcFinalizer {
    sui: SuiClient,
    endpoint: String,
}

impl RpcFinalizer {
    pub fn new(sui: SuiClient, endpoint: impl Into<String>) -> Self {
        Self {
            sui,
            endpoint: endpoint.into(),
        }
    }

    async fn gas_payment(&self, req: &GasRequirement) -> Result<(ObjectRef, u64), SwapError> {
        let gas_price = self
            .sui
            .read_api()
            .get_reference_gas_price()
            .await
            .map_err(|e| SwapError::Transport(format!("fetch reference gas price: {e}")))?;
        let gas = self
            .sui
            .transaction_builder()
            .select_gas(req.sender, None, req.needed, req.excluded.clone(), gas_price)
            .await
            .map_err(|e| SwapError::Build(format!("select gas coin for {}: {e}", req.needed)))?;
        Ok((gas, gas_price))
    }
}

#[async_trait]
impl TransactionFinalizer for RpcFinalizer {
    async fn finalize(&self, proposal: TransactionProposal) -> Result<TransactionData, SwapError> {
        let req = GasRequirement::of(&proposal)?;

        let _timer = REQ_LATENCY
            .with_label_values(&["sui_client", "select_gas"])
            .start_timer();
        let (gas, gas_price) = match self.gas_payment(&req).await {
            Ok(found) => found,
            Err(err) => {
                REQ_ERRORS.with_label_values(&["sui_client", "select_gas"]).inc();
                return Err(err.during(SwapError::Build));
            }
        };

        debug!(
            endpoint = %self.endpoint,
            gas_price = gas_price,
            gas_coin = %gas.0,
            needed = req.needed,
            excluded = req.excluded.len(),
            "resolved gas payment"
        );
        proposal.into_transaction_data(vec![gas], gas_price)
    }
}

/// BCS bytes of finalized transaction data.
pub fn to_bcs(tx_data: &TransactionData) -> Result<Vec<u8>, SwapError> {
    bcs::to_bytes(tx_data).map_err(|e| SwapError::Build(format!("serialize transaction: {e}")))
}
