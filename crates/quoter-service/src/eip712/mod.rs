//! EIP-712 encoding for compact claim payloads.
//!
//! This module computes the pieces of the typed-data tree the sponsor signs:
//! the packed compact id and the mandate witness hash. Both are pure; all
//! randomness (the mandate salt) is supplied by callers.

pub mod compact_id;
pub mod witness;

pub use compact_id::{pack_compact_id, unpack_compact_id};
pub use witness::{mandate_witness_values, WitnessType, WitnessValue};
