//! Consensus core for the Sylum proof-of-work chain.
//!
//! This crate contains the pieces whose correctness determines whether two
//! independent implementations agree on the canonical chain: proof-of-work
//! algorithm dispatch and validation (SHA256d / RandomX / Argon2id), the
//! bounded RandomX context pool, difficulty retargeting (with BIP94 timewarp
//! mitigation), transaction-input consensus checks, and the block-header
//! model and subsidy schedule.
//!
//! Wallets, the JSON-RPC server, the P2P transport, and mining-pool
//! coordination are independent subsystems built on top of this crate; none
//! of them live here.

pub mod address;
pub mod amount;
pub mod block;
pub mod chain_index;
pub mod parameters;
pub mod serialization;
pub mod transaction;
pub mod work;
