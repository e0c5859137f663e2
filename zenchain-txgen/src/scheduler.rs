use std::time::Duration;

use alloy_primitives::U256;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use crate::{
    accounts::AccountPool,
    client::ChainClient,
    config::RecordPolicy,
    dispatcher::Dispatcher,
    display::DisplaySink,
    history::HistoryLedger,
    outcome::TransferOutcome,
};

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Wei per transfer.
    pub amount: U256,
    /// Pause after every account, including the last one of a cycle.
    pub delay: Duration,
    pub record_policy: RecordPolicy,
}

/// Walks the pool in order, one transfer at a time, forever.
pub struct Scheduler<C, R, S> {
    config: SchedulerConfig,
    pool: AccountPool,
    dispatcher: Dispatcher<C, R>,
    history: HistoryLedger,
    sink: S,
    cycles: u64,
}

impl<C, R, S> Scheduler<C, R, S>
where
    C: ChainClient,
    R: RngCore + CryptoRng,
    S: DisplaySink,
{
    pub fn new(
        config: SchedulerConfig,
        pool: AccountPool,
        dispatcher: Dispatcher<C, R>,
        history: HistoryLedger,
        sink: S,
    ) -> Self {
        Self {
            config,
            pool,
            dispatcher,
            history,
            sink,
            cycles: 0,
        }
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Dispatches once for the account at `index` (wrapping) and reports the outcome.
    pub async fn step(&mut self, index: usize) -> TransferOutcome {
        let sender = self.pool.get(index);
        let outcome = self.dispatcher.dispatch(sender, self.config.amount).await;

        if self.config.record_policy.should_record(&outcome) {
            if let Some(evicted) = self.history.record(outcome.clone()) {
                debug!(sender = %evicted.sender, "Evicted oldest history entry");
            }
        }
        self.sink.report(&outcome, &self.history);

        outcome
    }

    /// One pass over the pool, sleeping after each account.
    pub async fn run_cycle(&mut self) {
        self.cycles += 1;
        debug!(cycle = self.cycles, accounts = self.pool.len(), "Starting cycle");

        for index in 0..self.pool.len() {
            self.step(index).await;
            tokio::time::sleep(self.config.delay).await;
        }
    }

    /// Never returns.
    pub async fn run(&mut self) {
        info!(
            accounts = self.pool.len(),
            delay = ?self.config.delay,
            "Starting transfer loop"
        );
        loop {
            self.run_cycle().await;
        }
    }
}
