// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Partial rounds in their sparse form.

use ark_ff::PrimeField;

use crate::s_box;

/// Sparse linear layer of one partial round.
///
/// `segment` holds `2t - 1` elements: the first `t` form the row producing
/// the new `state[0]`, the remaining `t - 1` scale the old `state[0]` into
/// `state[1..]`. Every update reads the `state[0]` from before this layer.
#[inline(always)]
fn matmul_sparse<F: PrimeField>(state: &mut [F], segment: &[F]) {
    #[cfg(test)]
    crate::trace::record(|c| c.sparse += 1);
    let (row, col) = segment.split_at(state.len());
    let new_first: F = row.iter().zip(state.iter()).map(|(w, s)| *w * s).sum();
    let first = state[0];
    for (s, v) in state[1..].iter_mut().zip(col) {
        *s += first * v;
    }
    state[0] = new_first;
}

/// One partial round: S-box and round constant on `state[0]` only.
#[inline(always)]
pub(crate) fn permute_state<F: PrimeField>(state: &mut [F], rc: F, segment: &[F]) {
    s_box(&mut state[0]);
    #[cfg(test)]
    crate::trace::record(|c| c.round_keys += 1);
    state[0] += rc;
    matmul_sparse(state, segment);
}
