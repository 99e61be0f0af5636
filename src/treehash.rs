//! A generic multi-leaf tree-hashing driver: fans a single message stream
//! out to `fanout` independent leaf hash instances, then compresses their
//! digests through one more instance of the same hash family. This is a
//! **strict chain** (hash-list), not a binary tree: root compression
//! absorbs the concatenated leaf digests as one contiguous message, so the
//! output can be re-derived without the caller knowing the fan-out, as long
//! as fan-out is treated as part of the algorithm's identity.

use alloc::{vec, vec::Vec};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// Builds the 36-byte tree-parameter block each leaf absorbs before any
/// message bytes, binding its `node_offset` (leaf index) so that distinct
/// leaves never produce the same output for identical input.
fn tree_param_block(node_offset: u64, fanout: u32, leaf_block: u32) -> [u8; 36] {
    let mut block = [0u8; 36];
    block[0..8].copy_from_slice(&node_offset.to_le_bytes());
    block[8..12].copy_from_slice(&fanout.to_le_bytes());
    block[12..16].copy_from_slice(&leaf_block.to_le_bytes());
    block
}

/// A parallel tree-hash engine generic over any [`Hash`] implementor. Used
/// concretely for SHA3-256 and SHA3-1024; the generic bound means a future
/// Skein leaf could be plugged in without touching this driver.
pub struct ParallelTreeEngine<H> {
    leaves: Vec<H>,
    fanout: usize,
    leaf_block: usize,
    parallel_block_size: usize,
    buffer: Vec<u8>,
}

impl<H> ParallelTreeEngine<H>
where
    H: Hash + Default + Send + Sync,
{
    /// `fanout` must be a power of two, at most 64. `k` is the cache-aware
    /// multiple used to compute `parallel_block_size = fanout * leaf_block * k`
    /// and must be at least 8.
    pub fn new(fanout: usize, leaf_block: usize, k: usize) -> Result<Self> {
        if fanout == 0 || fanout > 64 || !fanout.is_power_of_two() {
            return Err(Error::InvalidParam { reason: "fanout must be a power of two, up to 64" });
        }
        if k < 8 {
            return Err(Error::InvalidParam { reason: "k must be at least 8" });
        }

        let mut leaves = Vec::with_capacity(fanout);
        for i in 0..fanout {
            let mut leaf = H::default();
            leaf.update(&tree_param_block(i as u64, fanout as u32, leaf_block as u32));
            leaves.push(leaf);
        }

        Ok(ParallelTreeEngine {
            leaves,
            fanout,
            leaf_block,
            parallel_block_size: fanout * leaf_block * k,
            buffer: Vec::new(),
        })
    }

    fn capacity(&self) -> usize {
        self.fanout * self.leaf_block
    }

    pub fn update(&mut self, mut input: &[u8]) {
        let capacity = self.capacity();

        // Top up a partial buffer to exactly one full fan-out block at a
        // time; looping handles the (rare) case where a previous call left
        // the buffer already at or past capacity.
        while !self.buffer.is_empty() && self.buffer.len() + input.len() >= capacity {
            let need = capacity - self.buffer.len();
            self.buffer.extend_from_slice(&input[..need]);
            input = &input[need..];
            self.absorb_full_buffer();
        }

        while input.len() >= self.parallel_block_size {
            self.absorb_parallel_block(&input[..self.parallel_block_size]);
            input = &input[self.parallel_block_size..];
        }

        // Drain any further whole fan-out blocks directly, so the buffer
        // never holds more than one capacity's worth between calls.
        while self.buffer.is_empty() && input.len() >= capacity {
            self.absorb_block(&input[..capacity]);
            input = &input[capacity..];
        }

        self.buffer.extend_from_slice(input);
    }

    fn absorb_full_buffer(&mut self) {
        let buffer = core::mem::take(&mut self.buffer);
        self.absorb_block(&buffer);
    }

    fn absorb_block(&mut self, block: &[u8]) {
        let leaf_block = self.leaf_block;
        dispatch(&mut self.leaves, |i, leaf| {
            leaf.update(&block[i * leaf_block..(i + 1) * leaf_block]);
        });
    }

    fn absorb_parallel_block(&mut self, block: &[u8]) {
        let fanout = self.fanout;
        let leaf_block = self.leaf_block;
        let k = block.len() / (fanout * leaf_block);
        dispatch(&mut self.leaves, |i, leaf| {
            for j in 0..k {
                let offset = (i + j * fanout) * leaf_block;
                leaf.update(&block[offset..offset + leaf_block]);
            }
        });
    }

    /// Zero-pads any buffered remainder, lets each leaf absorb the whole
    /// blocks it owns, finalizes every leaf, then compresses the
    /// concatenated leaf digests through a fresh sequential root instance.
    pub fn finalize(mut self, out: &mut [u8]) {
        let leaf_block = self.leaf_block;
        let fanout = self.fanout;

        if !self.buffer.is_empty() {
            let pad = (leaf_block - (self.buffer.len() % leaf_block)) % leaf_block;
            self.buffer.resize(self.buffer.len() + pad, 0);
            let nblocks = self.buffer.len() / leaf_block;
            for j in 0..nblocks {
                let i = j % fanout;
                let offset = j * leaf_block;
                self.leaves[i].update(&self.buffer[offset..offset + leaf_block]);
            }
        }

        let digest_size = self.leaves[0].digest_size();
        let mut concatenated = vec![0u8; digest_size * fanout];
        for (i, leaf) in self.leaves.iter_mut().enumerate() {
            leaf.finalize(&mut concatenated[i * digest_size..(i + 1) * digest_size]);
        }

        let mut root = H::default();
        root.update(&concatenated);
        root.finalize(out);
    }
}

#[cfg(feature = "parallel")]
fn dispatch<H, F>(leaves: &mut [H], f: F)
where
    H: Send,
    F: Fn(usize, &mut H) + Sync,
{
    use rayon::prelude::*;
    leaves.par_iter_mut().enumerate().for_each(|(i, leaf)| f(i, leaf));
}

#[cfg(not(feature = "parallel"))]
fn dispatch<H, F>(leaves: &mut [H], f: F)
where
    F: Fn(usize, &mut H),
{
    for (i, leaf) in leaves.iter_mut().enumerate() {
        f(i, leaf);
    }
}
