// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Poseidon constants for the scalar field of BN254, compatible with
//! circomlib and iden3's go-iden3-crypto.

use ark_bn254::Fr;
use ark_std::{end_timer, start_timer};
use lazy_static::lazy_static;

use crate::{hash_bytes, Poseidon, PoseidonError, PoseidonParams};

/// Optimized tables (`C`, `S`, `M`, `P`) for widths 2 through 17.
const BN254_OPT_JSON: &str = include_str!("bn254_opt.json");

lazy_static! {
    /// Constant tables for every supported width over `ark_bn254::Fr`,
    /// parsed on first use.
    pub static ref POSEIDON_BN254: PoseidonParams<Fr> = load();
}

fn load() -> PoseidonParams<Fr> {
    let timer = start_timer!(|| "Loading Poseidon BN254 constants");
    let params = PoseidonParams::from_json(BN254_OPT_JSON)
        .expect("Bundled Poseidon BN254 constants are corrupt");
    end_timer!(timer);
    params
}

/// Poseidon hash of 1 to 16 elements of `ark_bn254::Fr`.
pub fn poseidon_bn254(inputs: &[Fr]) -> Result<Fr, PoseidonError> {
    Poseidon::hash(&POSEIDON_BN254, inputs)
}

/// Hash an arbitrary byte string into an element of `ark_bn254::Fr`.
pub fn hash_bytes_bn254(message: &[u8]) -> Result<Fr, PoseidonError> {
    hash_bytes(&POSEIDON_BN254, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ByteHasher, BATCH_SIZE, BLOCK_SIZE, MAX_WIDTH, MIN_WIDTH};
    use ark_std::{str::FromStr, test_rng, vec, vec::Vec, UniformRand};

    const LOREM_SHORT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur.";
    const LOREM_FULL: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.";
    const LOREM_LONG: &str = include_str!("../../data/lorem_ipsum.txt");

    fn fr(s: &str) -> Fr {
        Fr::from_str(s).unwrap()
    }

    fn frs(range: impl Iterator<Item = u64>) -> Vec<Fr> {
        range.map(Fr::from).collect()
    }

    #[test]
    fn bundled_tables_cover_all_widths() {
        assert_eq!(
            POSEIDON_BN254.widths().collect::<Vec<_>>(),
            (MIN_WIDTH..=MAX_WIDTH).collect::<Vec<_>>()
        );
    }

    // same vectors as circomlib's poseidon tests
    #[test]
    fn circomlib_vectors() {
        assert_eq!(
            poseidon_bn254(&[Fr::from(1u64)]).unwrap(),
            fr("18586133768512220936620570745912940619677854269274689475585506675881198879027")
        );
        assert_eq!(
            poseidon_bn254(&frs(1..=2)).unwrap(),
            fr("7853200120776062878684798364095072458815029376092732009249414926327459813530")
        );
        assert_eq!(
            poseidon_bn254(&frs(1..=15)).unwrap(),
            fr("4203130618016961831408770638653325366880478848856764494148034853759773445968")
        );
        assert_eq!(
            poseidon_bn254(&frs(1..=16)).unwrap(),
            fr("9989051620750914585850546081941653841776809718687451684622678807385399211877")
        );
    }

    #[test]
    fn consistent_hash() {
        let rng = &mut test_rng();
        for n in 1..=16 {
            let input1: Vec<Fr> = (0..n).map(|_| Fr::rand(rng)).collect();
            let input2: Vec<Fr> = (0..n).map(|_| Fr::rand(rng)).collect();

            // same input get the same digest
            assert_eq!(
                poseidon_bn254(&input1).unwrap(),
                poseidon_bn254(&input1).unwrap()
            );
            // diff input get diff digest
            assert_ne!(
                poseidon_bn254(&input1).unwrap(),
                poseidon_bn254(&input2).unwrap()
            );
        }
    }

    #[test]
    fn width_sensitivity() {
        // appending a zero moves the call to the next width's tables
        let one = poseidon_bn254(&[Fr::from(1u64)]).unwrap();
        let one_zero = poseidon_bn254(&[Fr::from(1u64), Fr::from(0u64)]).unwrap();
        assert_ne!(one, one_zero);

        // width-3 tables driving a width-2 state are refused
        let wrong = POSEIDON_BN254.for_width(3).unwrap();
        let mut state = vec![Fr::from(0u64), Fr::from(1u64)];
        assert_eq!(
            Poseidon::permute_mut(wrong, &mut state),
            Err(PoseidonError::InvalidStateWidth {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn byte_hash_vectors() {
        let cases: [(&str, &str); 5] = [
            (
                "Hi!",
                "6486908659193054171558649664263707983061659923540223710222614175012877610915",
            ),
            (
                "hello world",
                "11737940537089741739483184487293110833220240024120497567098122983201085619560",
            ),
            (
                LOREM_SHORT,
                "10144556929532757039294574715605250702290216074218951544141159961486588626405",
            ),
            (
                LOREM_FULL,
                "1445580476521057652055149555982034416468130755980688389650598067065303157299",
            ),
            (
                LOREM_LONG,
                "6969573445741018147556384961043162031190431604736891492802062484813405400894",
            ),
        ];
        for (msg, expected) in cases {
            assert_eq!(
                hash_bytes_bn254(msg.as_bytes()).unwrap(),
                fr(expected),
                "message of {} bytes",
                msg.len()
            );
        }
    }

    #[test]
    fn empty_message() {
        let digest = hash_bytes_bn254(b"").unwrap();
        assert_eq!(digest, poseidon_bn254(&[Fr::from(0u64); 16]).unwrap());
        assert_eq!(
            digest,
            fr("6961025786505490270790487869888725702980364259855350215456397845563605340881")
        );
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn block(bytes: &[u8]) -> Fr {
        let mut padded = [0u8; BLOCK_SIZE];
        padded[..bytes.len()].copy_from_slice(bytes);
        <Fr as ark_ff::PrimeField>::from_be_bytes_mod_order(&padded)
    }

    #[test]
    fn single_block() {
        let msg = pattern(BLOCK_SIZE);
        let mut inputs = [Fr::from(0u64); BATCH_SIZE];
        inputs[0] = block(&msg);
        assert_eq!(
            hash_bytes_bn254(&msg).unwrap(),
            poseidon_bn254(&inputs).unwrap()
        );
        assert_eq!(
            hash_bytes_bn254(&msg).unwrap(),
            fr("20910491210499608218462586147676342696339942018108126251727286287127687677635")
        );
    }

    #[test]
    fn full_batch_carries_digest() {
        let msg = pattern(BLOCK_SIZE * BATCH_SIZE);
        let inputs: Vec<Fr> = msg.chunks(BLOCK_SIZE).map(block).collect();
        let intermediate = poseidon_bn254(&inputs).unwrap();

        let mut carried = [Fr::from(0u64); BATCH_SIZE];
        carried[0] = intermediate;
        let expected = poseidon_bn254(&carried).unwrap();

        assert_eq!(hash_bytes_bn254(&msg).unwrap(), expected);
        assert_eq!(
            expected,
            fr("17971666572100722147318146359588864432074572107409275749380694377197564950194")
        );
    }

    #[test]
    fn trailing_block_after_batch() {
        let msg = pattern(BLOCK_SIZE * BATCH_SIZE + 10);
        let (head, tail) = msg.split_at(BLOCK_SIZE * BATCH_SIZE);
        let inputs: Vec<Fr> = head.chunks(BLOCK_SIZE).map(block).collect();
        let intermediate = poseidon_bn254(&inputs).unwrap();

        let mut carried = [Fr::from(0u64); BATCH_SIZE];
        carried[0] = intermediate;
        // real bytes first, zero padding after them
        carried[1] = block(tail);
        let expected = poseidon_bn254(&carried).unwrap();

        assert_eq!(hash_bytes_bn254(&msg).unwrap(), expected);
        assert_eq!(
            expected,
            fr("11637485354906479851010795007484934434851818687508681128350794549148503641079")
        );
    }

    #[test]
    fn streaming_matches_one_shot() {
        let msg = LOREM_LONG.as_bytes();
        let expected = hash_bytes_bn254(msg).unwrap();
        for step in [1, 7, 30, 31, 32, 495, 496, 497, 4096] {
            let mut hasher = ByteHasher::new(&POSEIDON_BN254).unwrap();
            for chunk in msg.chunks(step) {
                hasher.update(chunk).unwrap();
            }
            assert_eq!(hasher.finalize().unwrap(), expected, "chunks of {}", step);
        }
    }

    #[test]
    fn determinism() {
        for msg in [&b""[..], &b"Hi!"[..], LOREM_FULL.as_bytes(), LOREM_LONG.as_bytes()] {
            assert_eq!(
                hash_bytes_bn254(msg).unwrap(),
                hash_bytes_bn254(msg).unwrap()
            );
        }
    }
}
