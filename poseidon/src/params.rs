// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Round numbers and the per-width constant tables consumed by the
//! permutation.

use ark_ff::PrimeField;
use ark_std::vec::Vec;

use crate::PoseidonError;

/// Number of full rounds (4 at the start, 4 at the end).
pub const FULL_ROUNDS: usize = 8;

/// Number of partial rounds for each state width, indexed by `width - 2`.
pub const PARTIAL_ROUNDS: [usize; 16] = [
    56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68,
];

/// Smallest supported state width (one input plus the capacity slot).
pub const MIN_WIDTH: usize = 2;
/// Largest supported state width.
pub const MAX_WIDTH: usize = MIN_WIDTH + PARTIAL_ROUNDS.len() - 1;
/// Largest number of field elements absorbed by a single permutation call.
pub const MAX_INPUTS: usize = MAX_WIDTH - 1;

/// Number of partial rounds for `width`, `None` if the width is unsupported.
#[inline]
pub fn partial_rounds(width: usize) -> Option<usize> {
    if (MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        Some(PARTIAL_ROUNDS[width - MIN_WIDTH])
    } else {
        None
    }
}

/// Length of the flat round-constant table `C`: one vector of `width`
/// constants per full round plus one scalar per partial round.
#[inline]
pub fn round_constants_len(width: usize) -> Option<usize> {
    partial_rounds(width).map(|rp| FULL_ROUNDS * width + rp)
}

/// Length of the flat sparse-matrix table `S`: a `2 * width - 1` segment per
/// partial round.
#[inline]
pub fn sparse_constants_len(width: usize) -> Option<usize> {
    partial_rounds(width).map(|rp| (2 * width - 1) * rp)
}

/// Constant tables for one state width.
///
/// Instances can only be obtained through [`PoseidonConstants::new`], which
/// checks every table against the sizes implied by the width, so the
/// permutation never reads past the end of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoseidonConstants<F: PrimeField> {
    width: usize,
    partial_rounds: usize,
    /// round constants, consumed in schedule order
    c: Vec<F>,
    /// sparse partial-round segments, `2 * width - 1` per round
    s: Vec<F>,
    /// MDS matrix, row-major `width x width`
    m: Vec<F>,
    /// pre-sparse matrix, row-major `width x width`
    p: Vec<F>,
}

impl<F: PrimeField> PoseidonConstants<F> {
    /// Validate and bundle the tables for state width `width`.
    pub fn new(
        width: usize,
        c: Vec<F>,
        s: Vec<F>,
        m: Vec<Vec<F>>,
        p: Vec<Vec<F>>,
    ) -> Result<Self, PoseidonError> {
        let partial_rounds = partial_rounds(width).ok_or(PoseidonError::MissingConstants(width))?;

        check_len(width, "C", FULL_ROUNDS * width + partial_rounds, c.len())?;
        check_len(width, "S", (2 * width - 1) * partial_rounds, s.len())?;
        let m = flatten_square(width, "M", m)?;
        let p = flatten_square(width, "P", p)?;

        Ok(Self {
            width,
            partial_rounds,
            c,
            s,
            m,
            p,
        })
    }

    /// State width `t` these tables were generated for.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of partial rounds for this width.
    #[inline]
    pub fn partial_rounds(&self) -> usize {
        self.partial_rounds
    }

    /// Flat round-constant table `C`.
    #[inline]
    pub fn round_constants(&self) -> &[F] {
        &self.c
    }

    /// Flat sparse-matrix table `S`.
    #[inline]
    pub fn sparse_constants(&self) -> &[F] {
        &self.s
    }

    /// Row `row` of the MDS matrix `M`.
    #[inline]
    pub fn mds_row(&self, row: usize) -> &[F] {
        &self.m[row * self.width..(row + 1) * self.width]
    }

    /// Row `row` of the pre-sparse matrix `P`.
    #[inline]
    pub fn pre_sparse_row(&self, row: usize) -> &[F] {
        &self.p[row * self.width..(row + 1) * self.width]
    }

    #[inline]
    pub(crate) fn mds(&self) -> &[F] {
        &self.m
    }

    #[inline]
    pub(crate) fn pre_sparse(&self) -> &[F] {
        &self.p
    }
}

#[inline]
fn check_len(
    width: usize,
    table: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), PoseidonError> {
    if expected != found {
        return Err(PoseidonError::ConstantsMismatch {
            width,
            table,
            expected,
            found,
        });
    }
    Ok(())
}

fn flatten_square<F: PrimeField>(
    width: usize,
    table: &'static str,
    rows: Vec<Vec<F>>,
) -> Result<Vec<F>, PoseidonError> {
    check_len(width, table, width, rows.len())?;
    let mut flat = Vec::with_capacity(width * width);
    for row in rows {
        check_len(width, table, width, row.len())?;
        flat.extend(row);
    }
    Ok(flat)
}

/// Read-only registry of constant tables, one slot per supported width.
///
/// This is the handle the permutation and the byte hasher are driven by; the
/// bundled BN254 instance lives in [`crate::constants::bn254`], tests may
/// build their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoseidonParams<F: PrimeField> {
    tables: Vec<Option<PoseidonConstants<F>>>,
}

impl<F: PrimeField> Default for PoseidonParams<F> {
    fn default() -> Self {
        Self {
            tables: (MIN_WIDTH..=MAX_WIDTH).map(|_| None).collect(),
        }
    }
}

impl<F: PrimeField> PoseidonParams<F> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constants` under its width, replacing any previous entry.
    pub fn insert(&mut self, constants: PoseidonConstants<F>) {
        let idx = constants.width() - MIN_WIDTH;
        self.tables[idx] = Some(constants);
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, constants: PoseidonConstants<F>) -> Self {
        self.insert(constants);
        self
    }

    /// Tables for state width `width`.
    pub fn for_width(&self, width: usize) -> Result<&PoseidonConstants<F>, PoseidonError> {
        width
            .checked_sub(MIN_WIDTH)
            .and_then(|idx| self.tables.get(idx))
            .and_then(Option::as_ref)
            .ok_or(PoseidonError::MissingConstants(width))
    }

    /// Widths that have tables loaded, in increasing order.
    pub fn widths(&self) -> impl Iterator<Item = usize> + '_ {
        self.tables
            .iter()
            .filter_map(|t| t.as_ref().map(PoseidonConstants::width))
    }
}
