//! Fixed-output hashes and extendable-output functions built on the
//! [`crate::sponge::Sponge`]: SHA-3, SHAKE, and cSHAKE, at the four
//! (non-standard-but-CEX-native) security levels of 128/256/512/1024 bits.
//! The 1024-bit level uses the 48-round extended permutation; the other
//! three use the standard 24-round permutation.

use crate::sponge::{left_encode, Sponge};

/// Domain byte for fixed-output SHA-3.
const DOMAIN_SHA3: u8 = 0x06;
/// Domain byte for SHAKE (and cSHAKE when name/customization are both empty).
const DOMAIN_SHAKE: u8 = 0x1F;
/// Domain byte for cSHAKE with a non-empty name or customization string.
const DOMAIN_CSHAKE: u8 = 0x04;

/// A uniform hash interface, shared by SHA-3 and (in principle) any other
/// fixed-block-size hash a caller plugs into [`crate::treehash::ParallelTreeEngine`].
pub trait Hash {
    fn block_size(&self) -> usize;
    fn digest_size(&self) -> usize;
    fn update(&mut self, data: &[u8]);
    fn finalize(&mut self, out: &mut [u8]);
    fn compute(&mut self, data: &[u8], out: &mut [u8]) {
        self.update(data);
        self.finalize(out);
    }
    fn reset(&mut self);
}

/// SHA-3 at a fixed rate/round count, producing exactly `DIGEST` bytes.
#[derive(Clone)]
pub struct Sha3<const RATE: usize, const ROUNDS: usize, const DIGEST: usize> {
    sponge: Sponge<RATE, ROUNDS>,
    finished: bool,
}

impl<const RATE: usize, const ROUNDS: usize, const DIGEST: usize> Default
    for Sha3<RATE, ROUNDS, DIGEST>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const RATE: usize, const ROUNDS: usize, const DIGEST: usize> Sha3<RATE, ROUNDS, DIGEST> {
    pub fn new() -> Self {
        Sha3 {
            sponge: Sponge::new(),
            finished: false,
        }
    }
}

impl<const RATE: usize, const ROUNDS: usize, const DIGEST: usize> Hash
    for Sha3<RATE, ROUNDS, DIGEST>
{
    fn block_size(&self) -> usize {
        RATE
    }

    fn digest_size(&self) -> usize {
        DIGEST
    }

    fn update(&mut self, data: &[u8]) {
        debug_assert!(!self.finished);
        self.sponge.absorb(data);
    }

    fn finalize(&mut self, out: &mut [u8]) {
        debug_assert!(out.len() == DIGEST);
        if !self.finished {
            self.sponge.finish_absorb(DOMAIN_SHA3);
            self.finished = true;
        }
        self.sponge.squeeze(out);
    }

    fn reset(&mut self) {
        self.sponge = Sponge::new();
        self.finished = false;
    }
}

/// SHA3-256: 136-byte rate, 24-round permutation, 32-byte digest.
pub type Sha3_256 = Sha3<136, 24, 32>;
/// SHA3-512: 72-byte rate, 24-round permutation, 64-byte digest.
pub type Sha3_512 = Sha3<72, 24, 64>;
/// SHA3-1024: 64-byte rate, 48-round extended permutation, 128-byte digest.
pub type Sha3_1024 = Sha3<64, 48, 128>;

/// cSHAKE: SHAKE customized with a function name and a user string, both
/// absorbed via `bytepad(encode_string(name) || encode_string(custom), RATE)`
/// before the message. Degenerates to plain SHAKE (domain `0x1F`, no prefix)
/// when both `name` and `custom` are empty, per FIPS 202 §3.3.
#[derive(Clone)]
pub struct CShake<const RATE: usize, const ROUNDS: usize> {
    sponge: Sponge<RATE, ROUNDS>,
    plain_shake: bool,
    finished: bool,
}

impl<const RATE: usize, const ROUNDS: usize> CShake<RATE, ROUNDS> {
    pub fn new(name: &[u8], custom: &[u8]) -> Self {
        let mut sponge = Sponge::new();
        let plain_shake = name.is_empty() && custom.is_empty();
        if !plain_shake {
            let (w, wlen) = left_encode(RATE as u64);
            let mut total = wlen;
            sponge.absorb(&w[..wlen]);

            let (ln, lnlen) = left_encode((name.len() as u64) * 8);
            sponge.absorb(&ln[..lnlen]);
            sponge.absorb(name);
            total += lnlen + name.len();

            let (lc, lclen) = left_encode((custom.len() as u64) * 8);
            sponge.absorb(&lc[..lclen]);
            sponge.absorb(custom);
            total += lclen + custom.len();

            let pad = (RATE - (total % RATE)) % RATE;
            let zeros = [0u8; 168];
            sponge.absorb(&zeros[..pad]);
        }
        CShake {
            sponge,
            plain_shake,
            finished: false,
        }
    }

    pub fn absorb(&mut self, data: &[u8]) {
        debug_assert!(!self.finished);
        self.sponge.absorb(data);
    }

    pub fn squeeze(&mut self, out: &mut [u8]) {
        if !self.finished {
            let domain = if self.plain_shake { DOMAIN_SHAKE } else { DOMAIN_CSHAKE };
            self.sponge.finish_absorb(domain);
            self.finished = true;
        }
        self.sponge.squeeze(out);
    }
}

/// Plain SHAKE is cSHAKE with an empty name and customization string.
pub type Shake<const RATE: usize, const ROUNDS: usize> = CShake<RATE, ROUNDS>;

/// SHAKE128: 168-byte rate, 24-round permutation.
pub fn shake_128() -> Shake<168, 24> {
    Shake::new(&[], &[])
}
/// SHAKE256: 136-byte rate, 24-round permutation.
pub fn shake_256() -> Shake<136, 24> {
    Shake::new(&[], &[])
}
/// SHAKE512 (CEX extension): 72-byte rate, 24-round permutation.
pub fn shake_512() -> Shake<72, 24> {
    Shake::new(&[], &[])
}
/// SHAKE1024 (CEX extension): 64-byte rate, 48-round extended permutation.
pub fn shake_1024() -> Shake<64, 48> {
    Shake::new(&[], &[])
}

/// KMAC: a keyed MAC built on cSHAKE, per NIST SP 800-185 with the "KMAC"
/// function name.
#[derive(Clone)]
pub struct Kmac<const RATE: usize, const ROUNDS: usize> {
    cshake: CShake<RATE, ROUNDS>,
}

impl<const RATE: usize, const ROUNDS: usize> Kmac<RATE, ROUNDS> {
    pub fn new(key: &[u8], custom: &[u8]) -> Self {
        let mut cshake = CShake::new(b"KMAC", custom);
        // bytepad(encode_string(key), RATE): left_encode(RATE) || encode_string(key) || zero_pad
        let (w, wlen) = left_encode(RATE as u64);
        let mut total = wlen;
        cshake.absorb(&w[..wlen]);

        let (lk, lklen) = left_encode((key.len() as u64) * 8);
        cshake.absorb(&lk[..lklen]);
        cshake.absorb(key);
        total += lklen + key.len();

        let pad = (RATE - (total % RATE)) % RATE;
        let zeros = [0u8; 168];
        cshake.absorb(&zeros[..pad]);
        Kmac { cshake }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.cshake.absorb(data);
    }

    pub fn finalize(&mut self, out: &mut [u8]) {
        let (r, rlen) = crate::sponge::right_encode((out.len() as u64) * 8);
        self.cshake.absorb(&r[..rlen]);
        self.cshake.squeeze(out);
    }
}
