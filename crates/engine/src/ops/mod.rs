//! Engine operations, split by concern.

mod balances;
mod commit;
mod maintenance;

pub use balances::{BalanceAdjustment, BalanceSummary, CORRECTION_DESCRIPTION};
pub use commit::{CommitOutcome, Source, render_report};
pub use maintenance::UndoneEntry;
