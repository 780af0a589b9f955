//! Augur domain core.
//!
//! Pure domain types and rules shared by every other crate: the
//! [`Prediction`](prediction::Prediction) payload, job records and their
//! status machine, text analysis, coin-symbol derivation, asset metadata,
//! and the presentation view returned to polling clients. Nothing in this
//! crate performs I/O.

pub mod analysis;
pub mod error;
pub mod job;
pub mod job_events;
pub mod metadata;
pub mod prediction;
pub mod symbol;
pub mod types;
pub mod view;
