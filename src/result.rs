//! Result types for Market operations.

use crate::TradeRejection;

/// What happened when a triggered order was sent to the trader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Trade succeeded and the order left the book.
    Filled,
    /// Trade succeeded but the order was no longer in the book.
    ///
    /// Indicates an internal consistency bug; the trade is not rolled back.
    FilledUntracked,
    /// Trade was refused; the order keeps resting unchanged.
    Rejected(TradeRejection),
}

impl ExecutionOutcome {
    /// Returns true if the trade primitive succeeded.
    pub fn is_fill(self) -> bool {
        matches!(
            self,
            ExecutionOutcome::Filled | ExecutionOutcome::FilledUntracked
        )
    }
}

/// Counters from one or more evaluation passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Resting orders of the evaluated class and side
    pub examined: usize,
    /// Orders whose trigger condition held
    pub triggered: usize,
    /// Triggered orders whose trade succeeded
    pub filled: usize,
    /// Triggered orders whose trade was refused
    pub rejected: usize,
    /// Triggered orders skipped because their instrument was missing
    pub skipped: usize,
}

impl ProcessReport {
    /// Returns true if nothing triggered.
    pub fn is_quiet(&self) -> bool {
        self.triggered == 0
    }

    pub(crate) fn record(&mut self, outcome: ExecutionOutcome) {
        if outcome.is_fill() {
            self.filled += 1;
        } else {
            self.rejected += 1;
        }
    }
}

impl std::ops::AddAssign for ProcessReport {
    fn add_assign(&mut self, rhs: Self) {
        self.examined += rhs.examined;
        self.triggered += rhs.triggered;
        self.filled += rhs.filled;
        self.rejected += rhs.rejected;
        self.skipped += rhs.skipped;
    }
}
