//! The classical FIPS 202 sponge construction: pad, XOR into the rate
//! region, permute; extract rate bytes on the way out. Built directly on
//! [`crate::permutation::KeccakF1600`] rather than the duplex/Cyclist
//! framing the teacher crate used, since the specification calls for a
//! standard absorb-then-squeeze sponge (SHA-3/SHAKE/cSHAKE/KMAC), not a
//! duplex object.

use crate::permutation::{KeccakF1600, Permutation};

/// A Keccak sponge with a fixed rate (in bytes) and round count.
///
/// `RATE` must be a positive multiple of 8 and at most 168 (the largest
/// legal Keccak-_f_[1600] rate, corresponding to 128-bit security).
#[derive(Clone)]
pub struct Sponge<const RATE: usize, const ROUNDS: usize> {
    lanes: [u64; 25],
    offset: usize,
    squeezing: bool,
}

impl<const RATE: usize, const ROUNDS: usize> Default for Sponge<RATE, ROUNDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RATE: usize, const ROUNDS: usize> Sponge<RATE, ROUNDS> {
    pub fn new() -> Self {
        debug_assert!(RATE > 0 && RATE % 8 == 0 && RATE <= 168);
        Sponge {
            lanes: [0u64; 25],
            offset: 0,
            squeezing: false,
        }
    }

    #[inline(always)]
    fn permute(&mut self) {
        KeccakF1600::<ROUNDS>::permute(&mut self.lanes);
    }

    #[inline(always)]
    fn xor_byte(&mut self, byte: u8, pos: usize) {
        let lane = pos / 8;
        let shift = (pos % 8) * 8;
        self.lanes[lane] ^= (byte as u64) << shift;
    }

    #[inline(always)]
    fn read_byte(&self, pos: usize) -> u8 {
        let lane = pos / 8;
        let shift = (pos % 8) * 8;
        ((self.lanes[lane] >> shift) & 0xff) as u8
    }

    /// Absorbs `data` into the sponge, permuting whenever a full rate block
    /// has been accumulated. May be called any number of times before
    /// [`Self::finish_absorb`].
    pub fn absorb(&mut self, mut data: &[u8]) {
        debug_assert!(!self.squeezing, "cannot absorb after squeezing has started");
        while !data.is_empty() {
            let take = (RATE - self.offset).min(data.len());
            for (i, &b) in data[..take].iter().enumerate() {
                self.xor_byte(b, self.offset + i);
            }
            self.offset += take;
            data = &data[take..];
            if self.offset == RATE {
                self.permute();
                self.offset = 0;
            }
        }
    }

    /// Applies the domain-separated padding and transitions the sponge into
    /// squeezing mode. `domain` is XORed at the next free byte of the rate
    /// window; `0x80` is always XORed at byte `RATE - 1`.
    pub fn finish_absorb(&mut self, domain: u8) {
        debug_assert!(!self.squeezing);
        self.xor_byte(domain, self.offset);
        self.xor_byte(0x80, RATE - 1);
        self.permute();
        self.offset = 0;
        self.squeezing = true;
    }

    /// Fills `out` with squeezed bytes. Must be called after
    /// [`Self::finish_absorb`]; may be called repeatedly for streaming
    /// output.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        debug_assert!(self.squeezing, "must call finish_absorb before squeezing");
        let mut written = 0;
        while written < out.len() {
            if self.offset == RATE {
                self.permute();
                self.offset = 0;
            }
            let take = (RATE - self.offset).min(out.len() - written);
            for i in 0..take {
                out[written + i] = self.read_byte(self.offset + i);
            }
            self.offset += take;
            written += take;
        }
    }
}

/// `left_encode(n)`: the minimum-length big-endian encoding of `n`, prefixed
/// by its own byte length. Returns a fixed buffer and the number of
/// significant leading bytes.
pub(crate) fn left_encode(n: u64) -> ([u8; 9], usize) {
    let be = n.to_be_bytes();
    let mut start = 0;
    while start < 7 && be[start] == 0 {
        start += 1;
    }
    let len = 8 - start;
    let mut buf = [0u8; 9];
    buf[0] = len as u8;
    buf[1..1 + len].copy_from_slice(&be[start..]);
    (buf, 1 + len)
}

/// `right_encode(n)`: the symmetric twin of [`left_encode`], with the length
/// byte at the tail.
pub(crate) fn right_encode(n: u64) -> ([u8; 9], usize) {
    let be = n.to_be_bytes();
    let mut start = 0;
    while start < 7 && be[start] == 0 {
        start += 1;
    }
    let len = 8 - start;
    let mut buf = [0u8; 9];
    buf[..len].copy_from_slice(&be[start..]);
    buf[len] = len as u8;
    (buf, len + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_encode_zero() {
        let (buf, len) = left_encode(0);
        assert_eq!(&buf[..len], &[1, 0]);
    }

    #[test]
    fn left_encode_small() {
        let (buf, len) = left_encode(168);
        assert_eq!(&buf[..len], &[1, 168]);
    }

    #[test]
    fn right_encode_zero() {
        let (buf, len) = right_encode(0);
        assert_eq!(&buf[..len], &[0, 1]);
    }

    #[test]
    fn encode_round_trip_lengths() {
        for n in [0u64, 1, 255, 256, 65535, 65536, u64::MAX] {
            let (lbuf, llen) = left_encode(n);
            let (rbuf, rlen) = right_encode(n);
            assert_eq!(llen, rlen);
            assert_eq!(&lbuf[1..llen], &rbuf[..rlen - 1]);
        }
    }

    #[test]
    fn sha3_256_empty_message_kat() {
        // FIPS 202 SHA3-256("") test vector.
        let mut s = Sponge::<136, 24>::new();
        s.finish_absorb(0x06);
        let mut out = [0u8; 32];
        s.squeeze(&mut out);
        assert_eq!(
            out,
            [
                0xa7, 0xff, 0xc6, 0xf8, 0xbf, 0x1e, 0xd7, 0x66, 0x51, 0xc1, 0x47, 0x56, 0xa0, 0x61,
                0xd6, 0x62, 0xf5, 0x80, 0xff, 0x4d, 0xe4, 0x3b, 0x49, 0xfa, 0x82, 0xd8, 0x0a, 0x4b,
                0x80, 0xf8, 0x43, 0x4a,
            ]
        );
    }
}
