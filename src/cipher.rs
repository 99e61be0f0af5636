//! The block-cipher layer: consumed only through `encrypt_block` and its
//! key schedule, per §6. `Aes` is backed by the RustCrypto `aes` crate;
//! `Rhx` is a generalized-round Rijndael variant with an HKDF-derived key
//! schedule, needed because the 64- and 128-byte HBA key sizes fall outside
//! any crate's standard 128/192/256-bit AES key schedule.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use hkdf::Hkdf;
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::key::SymmetricKey;

/// The direction a block cipher (or the HBA construction as a whole) was
/// initialized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// A legal key size, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySize(pub usize);

/// A 128-bit block encryption primitive, used only via `encrypt_block`.
/// CTR mode needs nothing else: AES has no meaningful "decrypt_block" role
/// in counter mode, since the keystream is always generated by encryption.
pub trait BlockCipher {
    fn initialize(&mut self, direction: Direction, key: &SymmetricKey) -> Result<()>;
    fn encrypt_block(&self, input: &[u8; 16], output: &mut [u8; 16]);
    fn legal_key_sizes(&self) -> &'static [KeySize];
}

const AES_KEY_SIZES: [KeySize; 3] = [KeySize(16), KeySize(24), KeySize(32)];

enum AesState {
    Uninitialized,
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
}

/// AES (Rijndael with the standard 10/12/14-round schedule), keyed at
/// 128/192/256 bits.
pub struct Aes {
    state: AesState,
}

impl Default for Aes {
    fn default() -> Self {
        Aes { state: AesState::Uninitialized }
    }
}

impl BlockCipher for Aes {
    fn initialize(&mut self, _direction: Direction, key: &SymmetricKey) -> Result<()> {
        self.state = match key.key().len() {
            16 => AesState::Aes128(Box::new(Aes128::new_from_slice(key.key()).unwrap())),
            24 => AesState::Aes192(Box::new(Aes192::new_from_slice(key.key()).unwrap())),
            32 => AesState::Aes256(Box::new(Aes256::new_from_slice(key.key()).unwrap())),
            got => {
                return Err(Error::InvalidKeySize {
                    got,
                    legal: &[16, 24, 32],
                })
            }
        };
        Ok(())
    }

    fn encrypt_block(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        use aes::cipher::generic_array::GenericArray;
        match &self.state {
            AesState::Uninitialized => panic!("cipher not initialized"),
            AesState::Aes128(c) => {
                let mut block = GenericArray::clone_from_slice(input);
                c.encrypt_block(&mut block);
                output.copy_from_slice(&block);
            }
            AesState::Aes192(c) => {
                let mut block = GenericArray::clone_from_slice(input);
                c.encrypt_block(&mut block);
                output.copy_from_slice(&block);
            }
            AesState::Aes256(c) => {
                let mut block = GenericArray::clone_from_slice(input);
                c.encrypt_block(&mut block);
                output.copy_from_slice(&block);
            }
        }
    }

    fn legal_key_sizes(&self) -> &'static [KeySize] {
        &AES_KEY_SIZES
    }
}

const RHX_KEY_SIZES: [KeySize; 5] = [KeySize(16), KeySize(24), KeySize(32), KeySize(64), KeySize(128)];

const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

#[inline]
fn xtime(a: u8) -> u8 {
    (a << 1) ^ if a & 0x80 != 0 { 0x1b } else { 0 }
}

fn sub_bytes(state: &mut [u8; 16]) {
    for b in state.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

fn shift_rows(state: &mut [u8; 16]) {
    let src = *state;
    for c in 0..4 {
        for r in 0..4 {
            state[r + 4 * c] = src[r + 4 * ((c + r) % 4)];
        }
    }
}

fn mix_columns(state: &mut [u8; 16]) {
    for c in 0..4 {
        let a0 = state[4 * c];
        let a1 = state[4 * c + 1];
        let a2 = state[4 * c + 2];
        let a3 = state[4 * c + 3];
        state[4 * c] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
        state[4 * c + 1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
        state[4 * c + 2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
        state[4 * c + 3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
    }
}

fn add_round_key(state: &mut [u8; 16], round_key: &[u8]) {
    for (s, k) in state.iter_mut().zip(round_key) {
        *s ^= k;
    }
}

/// Number of Rijndael rounds RHX runs for a given key length, per the CEX
/// round-count table: 14 for the standard 128/192/256-bit keys, 22 and 38
/// for the 512- and 1024-bit extended keys RHX alone supports.
fn rounds_for_key_len(len: usize) -> Result<usize> {
    match len {
        16 | 24 | 32 => Ok(14),
        64 => Ok(22),
        128 => Ok(38),
        got => Err(Error::InvalidKeySize { got, legal: &[16, 24, 32, 64, 128] }),
    }
}

/// Derives `(rounds + 1) * 16` bytes of round-key material from `key` via
/// HKDF-Expand, rather than the classical recursive Rijndael key schedule
/// (which only generalizes to Nk in {4, 6, 8} — it has no definition for
/// 64- or 128-byte keys). The extract hash widens with the key: SHA-256
/// for the two standard-width keys, SHA-512 once the key itself is wider
/// than SHA-256's own block-level security margin.
fn expand_round_keys(key: &[u8], rounds: usize) -> Vec<u8> {
    let mut okm = vec![0u8; (rounds + 1) * 16];
    if key.len() <= 32 {
        let hk = Hkdf::<Sha256>::new(None, key);
        hk.expand(b"RHX round keys", &mut okm).expect("okm length fits HKDF-SHA256 output limit");
    } else {
        let hk = Hkdf::<Sha512>::new(None, key);
        hk.expand(b"RHX round keys", &mut okm).expect("okm length fits HKDF-SHA512 output limit");
    }
    okm
}

/// RHX: a generalized-round Rijndael variant keyed at 128/192/256/512/1024
/// bits. Round counts follow CEX's table (14/14/14/22/38); round keys are
/// derived by HKDF-Expand instead of Rijndael's own key schedule, which is
/// undefined past a 256-bit key. Only encryption is implemented — CTR mode
/// never needs the inverse cipher.
pub struct Rhx {
    round_keys: Vec<u8>,
    rounds: usize,
}

impl Default for Rhx {
    fn default() -> Self {
        Rhx { round_keys: Vec::new(), rounds: 0 }
    }
}

impl Drop for Rhx {
    fn drop(&mut self) {
        self.round_keys.zeroize();
    }
}

impl BlockCipher for Rhx {
    fn initialize(&mut self, _direction: Direction, key: &SymmetricKey) -> Result<()> {
        let rounds = rounds_for_key_len(key.key().len())?;
        self.round_keys = expand_round_keys(key.key(), rounds);
        self.rounds = rounds;
        Ok(())
    }

    fn encrypt_block(&self, input: &[u8; 16], output: &mut [u8; 16]) {
        if self.rounds == 0 {
            panic!("cipher not initialized");
        }
        let mut state = *input;
        add_round_key(&mut state, &self.round_keys[0..16]);
        for round in 1..self.rounds {
            sub_bytes(&mut state);
            shift_rows(&mut state);
            mix_columns(&mut state);
            add_round_key(&mut state, &self.round_keys[round * 16..round * 16 + 16]);
        }
        sub_bytes(&mut state);
        shift_rows(&mut state);
        add_round_key(&mut state, &self.round_keys[self.rounds * 16..self.rounds * 16 + 16]);
        *output = state;
    }

    fn legal_key_sizes(&self) -> &'static [KeySize] {
        &RHX_KEY_SIZES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes256_encrypts_deterministically() {
        let mut cipher = Aes::default();
        let key = SymmetricKey::new(vec![0u8; 32], vec![], vec![]);
        cipher.initialize(Direction::Encrypt, &key).unwrap();
        let input = [0u8; 16];
        let mut out1 = [0u8; 16];
        let mut out2 = [0u8; 16];
        cipher.encrypt_block(&input, &mut out1);
        cipher.encrypt_block(&input, &mut out2);
        assert_eq!(out1, out2);
        assert_ne!(out1, input);
    }

    #[test]
    fn rejects_bad_key_size() {
        let mut cipher = Aes::default();
        let key = SymmetricKey::new(vec![0u8; 20], vec![], vec![]);
        assert!(cipher.initialize(Direction::Encrypt, &key).is_err());
    }

    #[test]
    fn rhx_encrypts_deterministically_at_every_legal_key_size() {
        for &KeySize(len) in Rhx::default().legal_key_sizes() {
            let mut cipher = Rhx::default();
            let key = SymmetricKey::new(vec![0x5au8; len], vec![], vec![]);
            cipher.initialize(Direction::Encrypt, &key).unwrap();
            let input = [0u8; 16];
            let mut out1 = [0u8; 16];
            let mut out2 = [0u8; 16];
            cipher.encrypt_block(&input, &mut out1);
            cipher.encrypt_block(&input, &mut out2);
            assert_eq!(out1, out2);
            assert_ne!(out1, input);
        }
    }

    #[test]
    fn rhx_round_count_matches_key_size() {
        assert_eq!(rounds_for_key_len(16).unwrap(), 14);
        assert_eq!(rounds_for_key_len(24).unwrap(), 14);
        assert_eq!(rounds_for_key_len(32).unwrap(), 14);
        assert_eq!(rounds_for_key_len(64).unwrap(), 22);
        assert_eq!(rounds_for_key_len(128).unwrap(), 38);
        assert!(rounds_for_key_len(20).is_err());
    }

    #[test]
    fn rhx_differing_keys_yield_differing_ciphertext() {
        let mut a = Rhx::default();
        a.initialize(Direction::Encrypt, &SymmetricKey::new(vec![1u8; 64], vec![], vec![])).unwrap();
        let mut b = Rhx::default();
        b.initialize(Direction::Encrypt, &SymmetricKey::new(vec![2u8; 64], vec![], vec![])).unwrap();

        let input = [9u8; 16];
        let mut out_a = [0u8; 16];
        let mut out_b = [0u8; 16];
        a.encrypt_block(&input, &mut out_a);
        b.encrypt_block(&input, &mut out_b);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn rhx_rejects_bad_key_size() {
        let mut cipher = Rhx::default();
        let key = SymmetricKey::new(vec![0u8; 20], vec![], vec![]);
        assert!(cipher.initialize(Direction::Encrypt, &key).is_err());
    }
}
