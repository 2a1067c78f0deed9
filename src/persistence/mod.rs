//! Durable alert state.
//!
//! The only state that survives between runs is the per-symbol cooldown
//! record, a flat JSON object on local disk.

mod cooldown;

pub use cooldown::{CooldownRecord, CooldownStore};
