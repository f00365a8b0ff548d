//! Transaction-input consensus checks (spec.md §4.6): coinbase maturity,
//! value conservation, and overflow protection against a UTXO view.
//!
//! Full transaction parsing, scripts, and the segwit/witness rules are
//! inherited unchanged from the upstream Bitcoin-family format and are out
//! of scope here (spec.md §1 non-goals); this module only models the seam
//! these checks need: an outpoint, a spent coin, and a view that resolves
//! one to the other.

use thiserror::Error;
use tracing::instrument;

use crate::{
    amount::{Amount, AmountError, NonNegative},
    block::{Hash256, Height},
};

/// The number of confirmations a coinbase output must accumulate before it
/// is spendable (spec.md §4.6, §6).
pub const COINBASE_MATURITY: u32 = 100;

/// A reference to a previous transaction's output.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OutPoint {
    /// The hash of the transaction that created the referenced output.
    pub hash: Hash256,
    /// The index of the referenced output within that transaction.
    pub index: u32,
}

/// A spendable transaction output, as tracked by the UTXO set.
///
/// Mirrors the upstream `Coin` lifecycle (spec.md §3): created when its
/// transaction is included in a block, removed once spent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Coin {
    /// The value of the output.
    pub amount: Amount<NonNegative>,
    /// The height of the block that created this coin.
    pub height: Height,
    /// Whether this coin came from a coinbase transaction.
    pub is_coinbase: bool,
}

/// A transaction input, referencing the coin it spends.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TransparentInput {
    /// The previous output this input spends.
    pub prev_outpoint: OutPoint,
}

/// A transaction output being created.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TransparentOutput {
    /// The value of this output.
    pub value: Amount<NonNegative>,
}

/// A read-only view of the UTXO set, the seam a full chain-state database
/// (out of scope) would implement. `UtxoView::get` returns `None` for coins
/// that don't exist or have already been spent — both look identical to a
/// consensus check, which only cares whether the coin is currently usable.
pub trait UtxoView {
    /// Resolve `outpoint` to its coin, if unspent.
    fn get(&self, outpoint: &OutPoint) -> Option<Coin>;
}

/// Errors from [`check_tx_inputs`] (spec.md §4.6, §7).
#[derive(Debug, Error, Eq, PartialEq)]
pub enum TxVerifyError {
    /// An input's `prev_outpoint` did not resolve to an unspent coin.
    #[error("transaction references a missing or already-spent input")]
    MissingInputs,

    /// An input spent a coinbase coin before [`COINBASE_MATURITY`]
    /// confirmations had accumulated.
    #[error(
        "coinbase output created at height {created}, spent at height {spent}, \
         is not yet mature (requires {COINBASE_MATURITY} confirmations)"
    )]
    PrematureSpend {
        /// The height the coinbase coin was created at.
        created: Height,
        /// The height the (invalid) spend occurs at.
        spent: Height,
    },

    /// Value conservation was violated: an overflow, an out-of-range sum,
    /// or outputs exceeding inputs.
    #[error("transaction fails value-conservation check: {reason}")]
    Consensus {
        /// A short machine-stable description of which rule failed,
        /// matching the vocabulary of spec.md §4.6's literal test corpus
        /// (e.g. "vin/vout out of range", "belowout").
        reason: &'static str,
    },
}

impl From<AmountError> for TxVerifyError {
    fn from(_: AmountError) -> Self {
        TxVerifyError::Consensus {
            reason: "vin/vout out of range",
        }
    }
}

/// `CheckTxInputs` (spec.md §4.6): validate a non-coinbase transaction's
/// inputs against `view` at `spend_height`, returning the computed fee.
///
/// Accumulates `sum_in`/`sum_out` through [`Amount::checked_add`], which
/// rejects both `i64` overflow and excursions outside `[0, MAX_MONEY]` at
/// every step — sufficient headroom for `MAX_MONEY * number_of_inputs`
/// without undetected overflow, since `i64` comfortably holds a few
/// thousand `MAX_MONEY`-sized terms before wrapping.
#[instrument(
    name = "transaction.check_tx_inputs",
    skip(inputs, outputs, view),
    fields(inputs = inputs.len(), outputs = outputs.len(), spend_height = spend_height.0)
)]
pub fn check_tx_inputs(
    inputs: &[TransparentInput],
    outputs: &[TransparentOutput],
    view: &dyn UtxoView,
    spend_height: Height,
) -> Result<Amount<NonNegative>, TxVerifyError> {
    let mut sum_in = Amount::<NonNegative>::zero();

    for input in inputs {
        let coin = view
            .get(&input.prev_outpoint)
            .ok_or(TxVerifyError::MissingInputs)?;

        if coin.is_coinbase {
            let confirmations = spend_height.0.saturating_sub(coin.height.0);
            if confirmations < COINBASE_MATURITY {
                return Err(TxVerifyError::PrematureSpend {
                    created: coin.height,
                    spent: spend_height,
                });
            }
        }

        sum_in = sum_in.checked_add(coin.amount)?;
    }

    let mut sum_out = Amount::<NonNegative>::zero();
    for output in outputs {
        sum_out = sum_out.checked_add(output.value)?;
    }

    if sum_out.qirsh() > sum_in.qirsh() {
        return Err(TxVerifyError::Consensus { reason: "belowout" });
    }

    let fee = sum_in.checked_sub(sum_out)?;
    Ok(fee)
}
