// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! The Poseidon permutation in its circom-compatible, optimized form, and a
//! byte-string hasher built on top of it.
//!
//! The permutation follows the "optimized" round schedule: round constants are
//! pre-multiplied by the inverse MDS matrix and, during the partial rounds,
//! the MDS multiplication is replaced by a sparse update that only touches the
//! first state element and a single column. Digests are bit-identical with
//! circomlib / iden3 Poseidon for widths 2 through 17.
//!
//! This implementation was based upon the following resources:
//! - https://eprint.iacr.org/2019/458.pdf (Appendix B)
//! - https://github.com/iden3/circomlib/blob/master/circuits/poseidon.circom
//!
//! ```
//! # #[cfg(feature = "bn254")]
//! # {
//! use ark_bn254::Fr;
//! use jf_poseidon::constants::bn254::{hash_bytes_bn254, poseidon_bn254};
//!
//! let digest = poseidon_bn254(&[Fr::from(1u64), Fr::from(2u64)]).unwrap();
//! assert_eq!(
//!     digest.to_string(),
//!     "7853200120776062878684798364095072458815029376092732009249414926327459813530"
//! );
//! let _ = hash_bytes_bn254(b"hello world").unwrap();
//! # }
//! ```

#![deny(missing_docs)]

use ark_ff::PrimeField;
use ark_std::{marker::PhantomData, vec::Vec};

pub mod bytes;
pub mod constants;
mod errors;
mod full;
mod params;
mod partial;

pub use bytes::{
    digest_to_bytes_be, hash_bytes, hash_bytes_batch, ByteHasher, BATCH_SIZE, BLOCK_SIZE,
};
pub use errors::PoseidonError;
pub use params::{
    partial_rounds, round_constants_len, sparse_constants_len, PoseidonConstants,
    PoseidonParams, FULL_ROUNDS, MAX_INPUTS, MAX_WIDTH, MIN_WIDTH, PARTIAL_ROUNDS,
};

/// Exponent of the S-box `x -> x^ALPHA`.
pub const ALPHA: u64 = 5;

/// The Poseidon permutation family, parameterized by its constant tables.
pub struct Poseidon<F: PrimeField>(PhantomData<F>);

impl<F: PrimeField> Poseidon<F> {
    /// Hash 1 to 16 field elements into one.
    ///
    /// The state is `[0, inputs..]` of width `inputs.len() + 1`, permuted with
    /// the tables registered for that width; the digest is the first state
    /// element afterwards.
    pub fn hash(params: &PoseidonParams<F>, inputs: &[F]) -> Result<F, PoseidonError> {
        if inputs.is_empty() || inputs.len() > MAX_INPUTS {
            return Err(PoseidonError::InvalidInputLength(inputs.len()));
        }
        let width = inputs.len() + 1;
        let constants = params.for_width(width)?;

        let mut buf = [F::zero(); MAX_WIDTH];
        let state = &mut buf[..width];
        state[1..].copy_from_slice(inputs);
        Self::permute_mut(constants, state)?;
        Ok(state[0])
    }

    /// Apply the permutation on `input` and return the permuted state.
    pub fn permute(
        constants: &PoseidonConstants<F>,
        input: &[F],
    ) -> Result<Vec<F>, PoseidonError> {
        let mut state = input.to_vec();
        Self::permute_mut(constants, &mut state)?;
        Ok(state)
    }

    /// Apply the permutation on `state` in place. `state` must hold exactly
    /// `constants.width()` elements.
    pub fn permute_mut(
        constants: &PoseidonConstants<F>,
        state: &mut [F],
    ) -> Result<(), PoseidonError> {
        let width = constants.width();
        if state.len() != width {
            return Err(PoseidonError::InvalidStateWidth {
                expected: width,
                found: state.len(),
            });
        }
        let half = FULL_ROUNDS / 2;
        let mut rc = constants.round_constants();

        full::add_round_keys(state, next_constants(&mut rc, width));

        // Initial full rounds, the last one of which is the transition below
        for _ in 0..half - 1 {
            full::permute_state(state, next_constants(&mut rc, width), constants.mds());
        }
        full::permute_state(
            state,
            next_constants(&mut rc, width),
            constants.pre_sparse(),
        );

        // Partial rounds
        for segment in constants.sparse_constants().chunks_exact(2 * width - 1) {
            partial::permute_state(state, next_constants(&mut rc, 1)[0], segment);
        }

        // Terminal full rounds, the last one without round constants
        for _ in 0..half - 1 {
            full::permute_state(state, next_constants(&mut rc, width), constants.mds());
        }
        full::sbox_state(state);
        full::mix(state, constants.mds());

        debug_assert!(rc.is_empty(), "round constants left unconsumed");
        Ok(())
    }
}

/// Split the next `n` round constants off the front of `rc`.
///
/// Table lengths are checked when [`PoseidonConstants`] is built, so this
/// never runs past the end.
#[inline(always)]
fn next_constants<'a, F>(rc: &mut &'a [F], n: usize) -> &'a [F] {
    let (head, tail) = rc.split_at(n);
    *rc = tail;
    head
}

/// The S-box, `x -> x^5`.
#[inline(always)]
pub(crate) fn s_box<F: PrimeField>(val: &mut F) {
    #[cfg(test)]
    trace::record(|c| c.sbox += 1);
    *val = val.pow([ALPHA]);
}
