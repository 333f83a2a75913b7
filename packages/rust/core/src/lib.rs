//! Core adaptive-loop logic for LitScout.
//!
//! This crate ties relevance scoring, deduplication, gap analysis, the
//! parameter controller, and query generation into the end-to-end run
//! pipeline. Source clients and report rendering live in sibling crates.

pub mod controller;
pub mod dedup;
pub mod gaps;
pub mod pipeline;
pub mod queries;
pub mod scorer;
