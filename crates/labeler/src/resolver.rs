//! Label state resolver — the pure decision table.
//!
//! Given the state derived from a subject's ledger history and the requested
//! action, decide what (if anything) should happen. Collapsing "already
//! labeled" and "already unlabeled" to no-ops makes the handler idempotent
//! under at-least-once delivery from the event source — redelivery is the
//! retry mechanism, so the same event arriving twice must be harmless.

use sortinghat_core::event::Action;
use sortinghat_core::label::{House, LabelState};

/// What the dispatcher should do for one (state, action) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No active label: fetch the profile and run the classifier.
    Classify,
    /// Already labeled; skip without even attempting classification.
    AlreadyLabeled(House),
    /// Negate the currently asserted category — always the one from the
    /// ledger, never a guess.
    Negate(House),
    /// Nothing to negate; reported, not an error.
    NothingToNegate,
    /// Ledger shows multiple simultaneously asserted categories. Refuse to
    /// act until an operator resolves it.
    Refuse(Vec<House>),
}

/// The state machine's transition table. Pure; no I/O, no clock.
pub fn decide(state: &LabelState, action: Action) -> Decision {
    match (state, action) {
        (LabelState::Unlabeled, Action::Assign) => Decision::Classify,
        (LabelState::Labeled(h), Action::Assign) => Decision::AlreadyLabeled(*h),
        (LabelState::Labeled(h), Action::Negate) => Decision::Negate(*h),
        (LabelState::Unlabeled, Action::Negate) => Decision::NothingToNegate,
        (LabelState::Conflicted(houses), _) => Decision::Refuse(houses.clone()),
    }
}
