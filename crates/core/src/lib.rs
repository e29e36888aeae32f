//! Product record normalization for JSON uploads.
//!
//! Turns heterogeneous product JSON documents into a fixed five-column CSV:
//! alias-based field mapping, shape-aware record extraction, stable
//! deduplication and RFC-4180 CSV output. Everything here is synchronous and
//! free of shared mutable state, so it can be called from any number of
//! request handlers at once.

pub mod aliases;
pub mod conversion;
pub mod csv_writer;
pub mod dedup;
pub mod error;
pub mod normalizer;
pub mod record;
