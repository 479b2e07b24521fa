// Copyright (c) 2024 Espresso Systems (espressosys.com)
// This file is part of the Jellyfish library.

// You should have received a copy of the MIT License
// along with the Jellyfish library. If not, see <https://mit-license.org/>.

//! Hashing of arbitrary byte strings into a single field element.
//!
//! The message is cut into 31-byte blocks, each read as a big-endian integer.
//! Blocks are collected into batches of 16 and every full batch is hashed
//! with the width-17 permutation; its digest becomes the first input of the
//! next batch, which then takes 15 more blocks. A short trailing block is
//! zero-padded after its bytes. Whatever sits in the batch at the end (a
//! carried digest, zeros, or a partial batch) is hashed once more to produce
//! the final digest, so an empty message hashes to `hash([0; 16])`.

use ark_ff::{BigInteger, PrimeField};
use ark_std::{end_timer, start_timer, vec::Vec};
use zeroize::Zeroize;

use crate::{Poseidon, PoseidonConstants, PoseidonError, PoseidonParams, MAX_INPUTS, MAX_WIDTH};

/// Number of message bytes packed into one field element.
pub const BLOCK_SIZE: usize = 31;
/// Number of field elements absorbed per permutation call.
pub const BATCH_SIZE: usize = MAX_INPUTS;

/// Incremental byte hasher.
///
/// Feeding a message through any sequence of [`ByteHasher::update`] calls
/// yields the same digest as [`hash_bytes`] on the concatenation.
#[derive(Clone, Debug)]
pub struct ByteHasher<'a, F: PrimeField> {
    constants: &'a PoseidonConstants<F>,
    batch: [F; BATCH_SIZE],
    // next free slot of `batch`, always below BATCH_SIZE
    cursor: usize,
    pending: [u8; BLOCK_SIZE],
    pending_len: usize,
}

impl<'a, F: PrimeField> ByteHasher<'a, F> {
    /// Start a new hash with the width-17 tables of `params`.
    pub fn new(params: &'a PoseidonParams<F>) -> Result<Self, PoseidonError> {
        // a 31-byte block must fit without reduction
        if F::MODULUS_BIT_SIZE <= 8 * BLOCK_SIZE as u32 {
            return Err(PoseidonError::FieldTooSmall(F::MODULUS_BIT_SIZE));
        }
        let constants = params.for_width(BATCH_SIZE + 1)?;
        Ok(Self {
            constants,
            batch: [F::zero(); BATCH_SIZE],
            cursor: 0,
            pending: [0u8; BLOCK_SIZE],
            pending_len: 0,
        })
    }

    /// Absorb more message bytes.
    pub fn update(&mut self, mut data: &[u8]) -> Result<(), PoseidonError> {
        if self.pending_len > 0 {
            let take = (BLOCK_SIZE - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];
            if self.pending_len < BLOCK_SIZE {
                return Ok(());
            }
            let block = self.pending;
            self.absorb_block(&block)?;
            self.pending.zeroize();
            self.pending_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in blocks.by_ref() {
            self.absorb_block(block)?;
        }
        let rest = blocks.remainder();
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
        Ok(())
    }

    /// Pad the trailing block, run the final permutation and return the
    /// digest.
    pub fn finalize(mut self) -> Result<F, PoseidonError> {
        if self.pending_len > 0 {
            // bytes first, zeros after
            self.pending[self.pending_len..].fill(0);
            self.batch[self.cursor] = F::from_be_bytes_mod_order(&self.pending);
        }
        let digest = self.permute_batch();
        self.zeroize();
        digest
    }

    fn absorb_block(&mut self, block: &[u8]) -> Result<(), PoseidonError> {
        self.batch[self.cursor] = F::from_be_bytes_mod_order(block);
        if self.cursor == BATCH_SIZE - 1 {
            let digest = self.permute_batch()?;
            self.batch = [F::zero(); BATCH_SIZE];
            self.batch[0] = digest;
            self.cursor = 1;
        } else {
            self.cursor += 1;
        }
        Ok(())
    }

    // `Poseidon::hash` on the current batch, without the registry lookup
    fn permute_batch(&self) -> Result<F, PoseidonError> {
        let mut state = [F::zero(); MAX_WIDTH];
        state[1..].copy_from_slice(&self.batch);
        Poseidon::permute_mut(self.constants, &mut state)?;
        let digest = state[0];
        state.zeroize();
        Ok(digest)
    }
}

impl<F: PrimeField> Zeroize for ByteHasher<'_, F> {
    fn zeroize(&mut self) {
        self.batch.zeroize();
        self.pending.zeroize();
        self.cursor = 0;
        self.pending_len = 0;
    }
}

/// Hash `message` into one field element.
pub fn hash_bytes<F: PrimeField>(
    params: &PoseidonParams<F>,
    message: &[u8],
) -> Result<F, PoseidonError> {
    let timer = start_timer!(|| ark_std::format!("Poseidon hash of {} bytes", message.len()));
    let mut hasher = ByteHasher::new(params)?;
    hasher.update(message)?;
    let digest = hasher.finalize();
    end_timer!(timer);
    digest
}

/// Hash several independent messages. Runs in parallel with the `parallel`
/// feature.
pub fn hash_bytes_batch<F, M>(
    params: &PoseidonParams<F>,
    messages: &[M],
) -> Result<Vec<F>, PoseidonError>
where
    F: PrimeField,
    M: AsRef<[u8]> + Sync,
{
    #[cfg(feature = "parallel")]
    use rayon::prelude::*;

    let timer = start_timer!(|| ark_std::format!("Poseidon hash of {} messages", messages.len()));
    let digests = parallelizable_slice_iter(messages)
        .map(|msg| hash_bytes(params, msg.as_ref()))
        .collect();
    end_timer!(timer);
    digests
}

#[cfg(feature = "parallel")]
fn parallelizable_slice_iter<T: Sync>(data: &[T]) -> rayon::slice::Iter<'_, T> {
    use rayon::iter::IntoParallelIterator;
    data.into_par_iter()
}

#[cfg(not(feature = "parallel"))]
fn parallelizable_slice_iter<T>(data: &[T]) -> ark_std::slice::Iter<'_, T> {
    data.iter()
}

/// Canonical big-endian encoding of a digest, `ceil(MODULUS_BIT_SIZE / 8)`
/// bytes long.
pub fn digest_to_bytes_be<F: PrimeField>(digest: &F) -> Vec<u8> {
    let len = (F::MODULUS_BIT_SIZE as usize + 7) / 8;
    let bytes = digest.into_bigint().to_bytes_be();
    bytes[bytes.len() - len..].to_vec()
}
