//! `bakeops-allocation` — warehouse allocation core.
//!
//! Two collaborating pieces:
//!
//! - [`AvailabilityCalculator`]: the soft-reservation view requesters browse
//!   before submitting a cart (on-hand minus pending demand, clamped at 0).
//! - [`ApprovalEngine`]: the authoritative, stock-checked conversion of
//!   pending requests into ledger withdrawals, single or batched.
//!
//! The calculator is an estimate and is never trusted for the commit
//! decision; the engine always checks live main-warehouse quantities.

pub mod approval;
pub mod availability;

pub use approval::{ApprovalEngine, ApprovalError, BulkApprovalOutcome};
pub use availability::{AvailabilityCalculator, IngredientAvailability};

#[cfg(test)]
pub(crate) mod testing;
