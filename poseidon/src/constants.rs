// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Loading of optimized Poseidon constant tables.
//!
//! Tables use the layout of circomlibjs' `poseidon_constants_opt.json`:
//!
//! ```text
//! { "C": [[..], ..], "S": [[..], ..], "M": [[[..]..], ..], "P": [[[..]..], ..] }
//! ```
//!
//! where the outer index is `width - 2` and every entry is a 32-byte
//! big-endian hex string without `0x` prefix.

use ark_ff::{BigInteger, PrimeField};
use ark_std::{format, iter::repeat, string::String, vec::Vec};
use hex::FromHex;
use serde::Deserialize;

use crate::{PoseidonConstants, PoseidonError, PoseidonParams, MAX_WIDTH, MIN_WIDTH};

#[cfg(feature = "bn254")]
pub mod bn254;

#[derive(Deserialize)]
struct RawTables {
    #[serde(rename = "C")]
    c: Vec<Vec<String>>,
    #[serde(rename = "S")]
    s: Vec<Vec<String>>,
    #[serde(rename = "M")]
    m: Vec<Vec<Vec<String>>>,
    #[serde(rename = "P")]
    p: Vec<Vec<Vec<String>>>,
}

/// Parse a canonical field element from 32-byte big-endian hex.
pub fn try_from_hex<F: PrimeField>(s: &str) -> Result<F, PoseidonError> {
    let bytes = <[u8; 32]>::from_hex(s)
        .map_err(|e| PoseidonError::InvalidConstant(format!("{}: {}", s, e)))?;
    let elem = F::from_be_bytes_mod_order(&bytes);

    // reject anything that was reduced on the way in
    let repr = elem.into_bigint().to_bytes_be();
    let canonical = repr.iter().rev().skip(bytes.len()).all(|b| *b == 0)
        && repr
            .iter()
            .rev()
            .chain(repeat(&0u8))
            .take(bytes.len())
            .eq(bytes.iter().rev());
    if !canonical {
        return Err(PoseidonError::InvalidConstant(format!(
            "{} is not a canonical field element",
            s
        )));
    }
    Ok(elem)
}

fn parse_vec<F: PrimeField>(raw: &[String]) -> Result<Vec<F>, PoseidonError> {
    raw.iter().map(|s| try_from_hex(s)).collect()
}

fn parse_matrix<F: PrimeField>(raw: &[Vec<String>]) -> Result<Vec<Vec<F>>, PoseidonError> {
    raw.iter().map(|row| parse_vec(row)).collect()
}

impl<F: PrimeField> PoseidonParams<F> {
    /// Build a registry from tables in the circomlibjs JSON layout. Entry `i`
    /// of every table holds the constants for width `i + 2`.
    pub fn from_json(json: &str) -> Result<Self, PoseidonError> {
        let raw: RawTables = serde_json::from_str(json)?;
        let widths = raw.c.len();
        if raw.s.len() != widths || raw.m.len() != widths || raw.p.len() != widths {
            return Err(PoseidonError::Deserialization(format!(
                "table sets disagree on the number of widths: C={}, S={}, M={}, P={}",
                widths,
                raw.s.len(),
                raw.m.len(),
                raw.p.len()
            )));
        }
        let supported = MAX_WIDTH - MIN_WIDTH + 1;
        if widths > supported {
            return Err(PoseidonError::Deserialization(format!(
                "tables for {} widths, at most {} supported",
                widths, supported
            )));
        }

        let mut params = Self::new();
        for (i, (((c, s), m), p)) in raw.c.iter().zip(&raw.s).zip(&raw.m).zip(&raw.p).enumerate() {
            params.insert(PoseidonConstants::new(
                i + MIN_WIDTH,
                parse_vec(c)?,
                parse_vec(s)?,
                parse_matrix(m)?,
                parse_matrix(p)?,
            )?);
        }
        Ok(params)
    }
}
