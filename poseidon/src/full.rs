// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Full rounds: S-box on every element, round constants, dense matrix mix.

use ark_ff::PrimeField;

use crate::{s_box, MAX_WIDTH};

/// `state[i] += rc[i]` for every element.
#[inline(always)]
pub(crate) fn add_round_keys<F: PrimeField>(state: &mut [F], rc: &[F]) {
    #[cfg(test)]
    crate::trace::record(|c| c.round_keys += rc.len());
    for (s, c) in state.iter_mut().zip(rc) {
        *s += c;
    }
}

#[inline(always)]
pub(crate) fn sbox_state<F: PrimeField>(state: &mut [F]) {
    for s in state.iter_mut() {
        s_box(s);
    }
}

/// `state := state * matrix`, i.e. `new[i] = sum_j matrix[j][i] * state[j]`,
/// with `matrix` stored row-major.
///
/// Each row `j` scales `state[j]` into the private accumulator, so the
/// result never aliases the input.
#[inline(always)]
pub(crate) fn mix<F: PrimeField>(state: &mut [F], matrix: &[F]) {
    #[cfg(test)]
    crate::trace::record(|c| c.mixes += 1);
    let width = state.len();
    let mut acc = [F::zero(); MAX_WIDTH];
    for (row, s) in matrix.chunks_exact(width).zip(state.iter()) {
        for (a, m) in acc[..width].iter_mut().zip(row) {
            *a += *m * s;
        }
    }
    state.copy_from_slice(&acc[..width]);
}

/// One full round.
#[inline(always)]
pub(crate) fn permute_state<F: PrimeField>(state: &mut [F], rc: &[F], matrix: &[F]) {
    sbox_state(state);
    add_round_keys(state, rc);
    mix(state, matrix);
}
