//! Version-Fenced Partitioned Row Store
//!
//! A partitioned in-memory row store whose only write path is an optimistic, version-fenced
//! conditional update. The library crate holds every subsystem; `main.rs` wires them into an
//! HTTP node.
//!
//! ## Architecture Modules
//! - **`storage`**: versioned rows split over fixed partitions, each partition executing one
//!   invocation at a time inside a rollback-capable transaction.
//! - **`procedure`**: the compare-version-then-bump procedure run once per partition.
//! - **`router`**: fans a logical request out to its owning partitions, aggregates the
//!   per-partition counts, and offers the caller-side refresh/retry loop.
//! - **`codec`**: fixed-width packing of network endpoints into row payloads.
//! - **`aggregate`**: mergeable running average used for store statistics.
//! - **`client`**: HTTP client for a running node.
//! - **`config`**, **`error`**, **`retry`**, **`node`**: configuration, error taxonomy, backoff
//!   schedule and HTTP wiring.

pub mod aggregate;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod node;
pub mod procedure;
pub mod retry;
pub mod router;
pub mod storage;
