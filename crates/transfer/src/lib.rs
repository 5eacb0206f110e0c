//! `bakeops-transfer` — transfer request domain.
//!
//! A transfer request records a requester's **intent** to draw ingredient
//! quantities from a store's main warehouse. Creation performs no stock
//! check; the one authoritative inventory check happens at approval time.
//! Requests are never deleted (audit trail) and move through an explicit
//! status lifecycle.

pub mod request;
pub mod store;

pub use request::{RequestItem, TransferRequest, TransferRequestId, TransferStatus};
pub use store::{RequestFilter, RequestStore, RequestStoreError};
