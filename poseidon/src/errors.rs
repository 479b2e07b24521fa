// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Error types.

use ark_std::string::String;
use displaydoc::Display;

/// Various error modes of the Poseidon permutation and the byte hasher.
#[derive(Debug, Display, Clone, Eq, PartialEq)]
pub enum PoseidonError {
    /// Poseidon takes 1 to 16 inputs, got {0}
    InvalidInputLength(usize),
    /// State holds {found} elements but the constants are for width {expected}
    InvalidStateWidth {
        /// width the constants were generated for
        expected: usize,
        /// length of the state handed in
        found: usize,
    },
    /// No round constants loaded for state width {0}
    MissingConstants(usize),
    /// Constant table `{table}` for width {width} has {found} entries, expected {expected}
    ConstantsMismatch {
        /// state width of the offending table set
        width: usize,
        /// name of the table: `C`, `S`, `M` or `P`
        table: &'static str,
        /// length implied by the width and round numbers
        expected: usize,
        /// length actually supplied
        found: usize,
    },
    /// Invalid round constant, {0}
    InvalidConstant(String),
    /// Failed to deserialize constant tables: {0}
    Deserialization(String),
    /// Field of {0} bits cannot hold a 31-byte block
    FieldTooSmall(u32),
}

impl std::error::Error for PoseidonError {}

impl From<serde_json::Error> for PoseidonError {
    fn from(err: serde_json::Error) -> Self {
        PoseidonError::Deserialization(ark_std::format!("{}", err))
    }
}
