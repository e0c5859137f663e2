use std::io::{self, Write};

use alloy_primitives::{utils::format_ether, U256};
use colored::Colorize;
use tracing::warn;

use crate::{
    history::HistoryLedger,
    outcome::{OutcomeKind, TransferOutcome},
};

const SEPARATOR_WIDTH: usize = 50;

/// Receives every dispatch outcome together with the current history.
pub trait DisplaySink {
    fn report(&mut self, outcome: &TransferOutcome, history: &HistoryLedger);
}

/// Human readable, colorized report. Honours `NO_COLOR`.
pub struct ConsoleDisplay<W = io::Stdout> {
    out: W,
    symbol: String,
}

impl ConsoleDisplay {
    pub fn stdout(symbol: impl Into<String>) -> Self {
        Self::new(io::stdout(), symbol)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, symbol: impl Into<String>) -> Self {
        Self {
            out,
            symbol: symbol.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn amount(&self, wei: U256) -> String {
        format!("{} {}", format_ether(wei), self.symbol)
    }

    fn render(&mut self, outcome: &TransferOutcome, history: &HistoryLedger) -> io::Result<()> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        writeln!(self.out)?;
        writeln!(self.out, "{}", separator.yellow())?;

        if let Some(balance) = outcome.sender_balance {
            let line = format!("Sender balance: {}", self.amount(balance));
            writeln!(self.out, "{}", line.blue())?;
        }
        writeln!(self.out, "{} {}", "Sender:".cyan(), outcome.sender)?;
        writeln!(self.out, "{} {}", "Receiver:".magenta(), outcome.receiver)?;
        writeln!(
            self.out,
            "{} {}",
            "Amount:".bright_yellow(),
            self.amount(outcome.amount)
        )?;

        let timestamp = outcome.timestamp.format("%Y-%m-%d %H:%M:%S");
        let result = match &outcome.kind {
            OutcomeKind::Success { tx_hash } => {
                format!("{timestamp} - Transaction sent! Hash: {tx_hash}").green()
            }
            OutcomeKind::InsufficientBalance { balance } => format!(
                "{timestamp} - Insufficient balance. Balance: {}, amount: {}",
                self.amount(*balance),
                self.amount(outcome.amount)
            )
            .red(),
            OutcomeKind::Failed { reason } => {
                format!("{timestamp} - Transaction failed: {reason}").red()
            }
        };
        writeln!(self.out, "{result}")?;

        writeln!(self.out, "{}", separator.yellow())?;
        writeln!(
            self.out,
            "{}",
            format!("Recent transactions ({}/{})", history.len(), history.capacity()).bold()
        )?;
        for entry in history.recent() {
            let detail = match &entry.kind {
                OutcomeKind::Success { tx_hash } => tx_hash.to_string(),
                _ => entry.failure_reason().unwrap_or_default(),
            };
            writeln!(
                self.out,
                "{} | {:<20} | {} -> {} | {} | {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.kind.label(),
                entry.sender,
                entry.receiver,
                self.amount(entry.amount),
                detail
            )?;
        }
        writeln!(self.out, "{}", separator.yellow())?;

        self.out.flush()
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn report(&mut self, outcome: &TransferOutcome, history: &HistoryLedger) {
        if let Err(e) = self.render(outcome, history) {
            warn!("Failed to write report: {e}");
        }
    }
}
