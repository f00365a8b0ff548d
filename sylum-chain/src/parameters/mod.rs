//! Chain-wide consensus parameters (spec.md §3 "ChainParams", §4.1, §6).

pub mod constants;
mod network;

pub use network::{magic::Magic, ChainParams, Network};
