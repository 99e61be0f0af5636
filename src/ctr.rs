//! Parallel counter-mode keystream generation, driven by a [`BlockCipher`].
//! The counter is a big-endian 128-bit integer incremented once per
//! 16-byte block; large inputs are sharded across a rayon thread pool when
//! the `parallel` feature is enabled, falling back to a purely sequential
//! transform otherwise (or for the tail of a sharded input).

use crate::cipher::BlockCipher;
use crate::error::{Error, Result};

const BLOCK_SIZE: usize = 16;

/// CTR-mode state: the driving block cipher, the running counter, the
/// byte offset already consumed within the current counter block (so a
/// `transform` call can resume mid-block), and the parallel dispatch
/// parameters.
pub struct CtrMode<C: BlockCipher> {
    cipher: C,
    counter: [u8; 16],
    block_offset: usize,
    parallel_block_size: usize,
    max_degree: usize,
}

#[inline]
fn counter_add(counter: &[u8; 16], n: u64) -> [u8; 16] {
    let mut out = *counter;
    let mut carry = n;
    for byte in out.iter_mut().rev() {
        let sum = *byte as u64 + (carry & 0xff);
        *byte = sum as u8;
        carry = (carry >> 8) + (sum >> 8);
        if carry == 0 {
            break;
        }
    }
    out
}

impl<C: BlockCipher + Sync> CtrMode<C> {
    /// Default parallel block size: 8 KiB, a conservative cache-friendly
    /// chunk that keeps per-thread segments a multiple of the block size.
    pub const DEFAULT_PARALLEL_BLOCK_SIZE: usize = 8 * 1024;
    /// Default degree of parallelism. Must be even per §4.4.
    pub const DEFAULT_MAX_DEGREE: usize = 4;

    pub fn new(cipher: C, nonce: [u8; 16]) -> Result<Self> {
        Self::with_parallel_params(cipher, nonce, Self::DEFAULT_PARALLEL_BLOCK_SIZE, Self::DEFAULT_MAX_DEGREE)
    }

    pub fn with_parallel_params(
        cipher: C,
        nonce: [u8; 16],
        parallel_block_size: usize,
        max_degree: usize,
    ) -> Result<Self> {
        if max_degree == 0 || max_degree % 2 != 0 {
            return Err(Error::InvalidParam { reason: "max_degree must be even and nonzero" });
        }
        if parallel_block_size % (max_degree * BLOCK_SIZE) != 0 {
            return Err(Error::InvalidParam {
                reason: "parallel_block_size must be a multiple of max_degree * 16",
            });
        }
        Ok(CtrMode {
            cipher,
            counter: nonce,
            block_offset: 0,
            parallel_block_size,
            max_degree,
        })
    }

    /// Encrypts (equivalently, decrypts — CTR mode is its own inverse)
    /// `input` into `output`, resuming from wherever the previous call left
    /// the keystream (mid-block or not) so that splitting a message across
    /// calls never changes the output.
    pub fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        if input.len() != output.len() {
            return Err(Error::InvalidSize { reason: "input and output lengths must match" });
        }

        let mut processed = 0usize;

        #[cfg(feature = "parallel")]
        {
            // The parallel path only ever operates on whole, block-aligned
            // segments, so it can't be entered while mid-block; the
            // sequential path below resolves that first.
            if self.block_offset == 0 {
                while input.len() - processed >= self.parallel_block_size {
                    let base = self.counter;
                    self.transform_parallel_block(
                        base,
                        &input[processed..processed + self.parallel_block_size],
                        &mut output[processed..processed + self.parallel_block_size],
                    );
                    self.counter = counter_add(&base, (self.parallel_block_size / BLOCK_SIZE) as u64);
                    processed += self.parallel_block_size;
                }
            }
        }

        self.transform_sequential(&input[processed..], &mut output[processed..]);
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn transform_parallel_block(&self, base: [u8; 16], input: &[u8], output: &mut [u8]) {
        use rayon::prelude::*;

        let segment_bytes = self.parallel_block_size / self.max_degree;
        let segment_blocks = (segment_bytes / BLOCK_SIZE) as u64;

        output
            .par_chunks_mut(segment_bytes)
            .zip(input.par_chunks(segment_bytes))
            .enumerate()
            .for_each(|(i, (out_chunk, in_chunk))| {
                let local_counter = counter_add(&base, i as u64 * segment_blocks);
                self.keystream_xor(local_counter, in_chunk, out_chunk);
            });
    }

    /// Consumes `input` against the keystream starting at `self.counter`
    /// offset by `self.block_offset` bytes, leaving the counter parked on
    /// whichever block is still partially consumed (if any) so the next
    /// call picks up exactly where this one left off.
    fn transform_sequential(&mut self, input: &[u8], output: &mut [u8]) {
        if input.is_empty() {
            return;
        }

        let mut input = input;
        let mut output = output;

        if self.block_offset != 0 {
            let mut ks = [0u8; BLOCK_SIZE];
            self.cipher.encrypt_block(&self.counter, &mut ks);
            let avail = BLOCK_SIZE - self.block_offset;
            let take = avail.min(input.len());
            for i in 0..take {
                output[i] = input[i] ^ ks[self.block_offset + i];
            }
            self.block_offset += take;
            if self.block_offset == BLOCK_SIZE {
                self.block_offset = 0;
                self.counter = counter_add(&self.counter, 1);
            }
            input = &input[take..];
            output = &mut output[take..];
            if input.is_empty() {
                return;
            }
        }

        let full_blocks = input.len() / BLOCK_SIZE;
        let full_bytes = full_blocks * BLOCK_SIZE;
        let counter = self.counter;
        self.keystream_xor(counter, &input[..full_bytes], &mut output[..full_bytes]);
        self.counter = counter_add(&counter, full_blocks as u64);

        let rem = &input[full_bytes..];
        if !rem.is_empty() {
            let mut ks = [0u8; BLOCK_SIZE];
            self.cipher.encrypt_block(&self.counter, &mut ks);
            for (i, (pt, k)) in rem.iter().zip(ks.iter()).enumerate() {
                output[full_bytes + i] = pt ^ k;
            }
            self.block_offset = rem.len();
        }
    }

    /// XORs the keystream generated from `counter` (incrementing locally,
    /// without touching `self.counter`) against `input`, writing to `output`.
    fn keystream_xor(&self, mut counter: [u8; 16], input: &[u8], output: &mut [u8]) {
        let mut ks = [0u8; BLOCK_SIZE];
        for (in_chunk, out_chunk) in input.chunks(BLOCK_SIZE).zip(output.chunks_mut(BLOCK_SIZE)) {
            self.cipher.encrypt_block(&counter, &mut ks);
            for (o, (i, k)) in out_chunk.iter_mut().zip(in_chunk.iter().zip(ks.iter())) {
                *o = i ^ k;
            }
            counter = counter_add(&counter, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{Aes, Direction};
    use crate::key::SymmetricKey;

    fn cipher() -> Aes {
        let mut c = Aes::default();
        c.initialize(Direction::Encrypt, &SymmetricKey::new(vec![7u8; 32], vec![], vec![])).unwrap();
        c
    }

    #[test]
    fn counter_add_carries() {
        let mut c = [0u8; 16];
        c[15] = 0xff;
        let next = counter_add(&c, 1);
        assert_eq!(next[15], 0);
        assert_eq!(next[14], 1);
    }

    #[test]
    fn round_trips() {
        let nonce = [1u8; 16];
        let mut enc = CtrMode::new(cipher(), nonce).unwrap();
        let mut dec = CtrMode::new(cipher(), nonce).unwrap();

        let plaintext = (0..500u32).map(|i| i as u8).collect::<Vec<_>>();
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.transform(&plaintext, &mut ciphertext).unwrap();

        let mut recovered = vec![0u8; ciphertext.len()];
        dec.transform(&ciphertext, &mut recovered).unwrap();

        assert_eq!(plaintext, recovered);
    }

    #[test]
    fn position_additive() {
        let nonce = [2u8; 16];
        let plaintext = (0..10_000u32).map(|i| (i * 7) as u8).collect::<Vec<_>>();

        let mut whole = CtrMode::new(cipher(), nonce).unwrap();
        let mut out_whole = vec![0u8; plaintext.len()];
        whole.transform(&plaintext, &mut out_whole).unwrap();

        let split = plaintext.len() / 2 + 3;
        let mut parted = CtrMode::new(cipher(), nonce).unwrap();
        let mut out_parted = vec![0u8; plaintext.len()];
        parted.transform(&plaintext[..split], &mut out_parted[..split]).unwrap();
        parted.transform(&plaintext[split..], &mut out_parted[split..]).unwrap();

        assert_eq!(out_whole, out_parted);
    }
}
