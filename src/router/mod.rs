//! Invocation Routing
//!
//! Maps logical requests onto partition-local invocations of the conditional update procedure.
//!
//! - **`router`**: fan-out, per-partition invocation, and the caller-side refresh/retry loop.
//! - **`types`**: invocation ids and aggregated results.
//! - **`protocol`** / **`handlers`**: HTTP contract and axum handlers.
//!
//! Atomicity ends at the partition boundary: a logical request spanning several partitions can
//! be applied on some of them and rejected on others.

pub mod handlers;
pub mod protocol;
pub mod router;
pub mod types;
