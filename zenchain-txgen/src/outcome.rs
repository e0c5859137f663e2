use alloy_primitives::{Address, TxHash, U256};
use chrono::{DateTime, Local};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Broadcast accepted by the node. Inclusion is not tracked.
    Success { tx_hash: TxHash },
    /// Sender could not cover the transfer amount; nothing was submitted.
    InsufficientBalance { balance: U256 },
    Failed { reason: String },
}

impl OutcomeKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Success { .. } => "success",
            OutcomeKind::InsufficientBalance { .. } => "insufficient balance",
            OutcomeKind::Failed { .. } => "failed",
        }
    }
}

/// Result of a single dispatch attempt.
#[derive(Clone, Debug)]
pub struct TransferOutcome {
    pub timestamp: DateTime<Local>,
    pub sender: Address,
    pub receiver: Address,
    pub amount: U256,
    /// Sender balance read before the attempt, if the read succeeded.
    pub sender_balance: Option<U256>,
    pub kind: OutcomeKind,
}

impl TransferOutcome {
    pub fn new(
        sender: Address,
        receiver: Address,
        amount: U256,
        sender_balance: Option<U256>,
        kind: OutcomeKind,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            sender,
            receiver,
            amount,
            sender_balance,
            kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.kind, OutcomeKind::Success { .. })
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self.kind {
            OutcomeKind::Success { tx_hash } => Some(tx_hash),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        match &self.kind {
            OutcomeKind::Success { .. } => None,
            OutcomeKind::InsufficientBalance { balance } => Some(format!(
                "insufficient balance: {} wei available, {} wei required",
                balance, self.amount
            )),
            OutcomeKind::Failed { reason } => Some(reason.clone()),
        }
    }
}
