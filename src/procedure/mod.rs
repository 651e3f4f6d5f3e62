//! Version-Fenced Conditional Update
//!
//! Given ordered (key, expected version) pairs, the procedure checks each locally owned key's
//! current version and bumps it only when it matches. One invocation covers one partition.
//!
//! ## Per-pair outcomes
//! - **Not found**: the key lives on another partition. Skipped, never an error.
//! - **Match**: version + 1, payload updated, counted.
//! - **Mismatch**: `Conflict`. The hosting partition transaction rolls back every pair
//!   applied earlier in the same invocation.
//!
//! The procedure is a free function over a `RowAccess` handle and keeps no state between calls.

pub mod cas;
pub mod types;

pub use cas::check_and_update;
pub use types::{CasPair, CasRequest, PairOutcome, PayloadUpdate, RowAccess};
