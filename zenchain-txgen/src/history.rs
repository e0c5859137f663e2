use std::collections::VecDeque;

use crate::outcome::TransferOutcome;

/// Bounded FIFO of the most recent outcomes.
///
/// Never holds more than `capacity` entries; once full, recording evicts the oldest
/// entry by insertion order.
#[derive(Debug)]
pub struct HistoryLedger {
    entries: VecDeque<TransferOutcome>,
    capacity: usize,
}

impl HistoryLedger {
    /// `capacity` is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `outcome`, returning the evicted entry if the ledger was full.
    pub fn record(&mut self, outcome: TransferOutcome) -> Option<TransferOutcome> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(outcome);
        evicted
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = &TransferOutcome> + '_ {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, TxHash, U256};
    use test_case::test_case;

    use super::*;
    use crate::outcome::OutcomeKind;

    fn outcome(n: u64) -> TransferOutcome {
        TransferOutcome::new(
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            U256::from(n),
            None,
            OutcomeKind::Success {
                tx_hash: TxHash::with_last_byte(n as u8),
            },
        )
    }

    #[test_case(1, 1; "single")]
    #[test_case(9, 9; "under capacity")]
    #[test_case(10, 10; "at capacity")]
    #[test_case(11, 10; "one over")]
    #[test_case(250, 10; "far over")]
    fn length_is_bounded(recorded: u64, expected: usize) {
        let mut ledger = HistoryLedger::new(10);
        for n in 0..recorded {
            ledger.record(outcome(n));
            assert!(ledger.len() <= 10);
        }
        assert_eq!(ledger.len(), expected);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut ledger = HistoryLedger::new(3);
        for n in 0..3 {
            assert!(ledger.record(outcome(n)).is_none());
        }

        let evicted = ledger.record(outcome(3)).unwrap();
        assert_eq!(evicted.amount, U256::from(0));

        let evicted = ledger.record(outcome(4)).unwrap();
        assert_eq!(evicted.amount, U256::from(1));
    }

    #[test]
    fn recent_is_newest_first() {
        let mut ledger = HistoryLedger::new(4);
        for n in 0..6 {
            ledger.record(outcome(n));
        }

        let amounts: Vec<_> = ledger.recent().map(|o| o.amount.to::<u64>()).collect();
        assert_eq!(amounts, vec![5, 4, 3, 2]);
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut ledger = HistoryLedger::new(0);
        assert!(ledger.is_empty());

        ledger.record(outcome(1));
        ledger.record(outcome(2));

        assert_eq!(ledger.capacity(), 1);
        assert_eq!(ledger.recent().next().unwrap().amount, U256::from(2));
    }
}
