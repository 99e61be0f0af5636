//! The HBA (Hash-Based Authenticated encryption) AEAD: an Encrypt-then-MAC
//! construction over [`crate::ctr::CtrMode`] and a pluggable [`Mac`],
//! deriving both its CTR key and its MAC key from a cSHAKE instance keyed on
//! the caller's master key, and rekeying the MAC at every `finalize`/`verify`
//! so that two messages under the same master key never reuse a MAC key.

use alloc::{vec, vec::Vec};

use crate::cipher::{BlockCipher, Direction};
use crate::ctr::CtrMode;
use crate::error::{Error, Result};
use crate::hash::CShake;
use crate::key::SymmetricKey;
use crate::mac::Mac;

/// Version tag folded into HBA's cSHAKE customization string on every
/// derivation. Fixed per library version; sixteen bytes exactly.
const OMEGA_INFO: &[u8; 16] = b"CHA version 1.0a";

/// The minimum tag length `finalize`/`verify` will accept.
const MIN_TAG_LEN: usize = 32;

#[derive(Clone, Copy)]
enum HbaMode {
    Shake256,
    Shake512,
    Shake1024,
}

impl HbaMode {
    fn from_key_len(len: usize) -> Result<Self> {
        match len {
            32 => Ok(HbaMode::Shake256),
            64 => Ok(HbaMode::Shake512),
            128 => Ok(HbaMode::Shake1024),
            got => Err(Error::InvalidKeySize { got, legal: &[32, 64, 128] }),
        }
    }
}

fn build_name(counter: u64, key_bits: u16, algo_name: &[u8]) -> Vec<u8> {
    let mut name = Vec::with_capacity(10 + algo_name.len());
    name.extend_from_slice(&counter.to_le_bytes());
    name.extend_from_slice(&key_bits.to_le_bytes());
    name.extend_from_slice(algo_name);
    name
}

/// Absorbs `absorb`, then squeezes `ctr_out` followed by `mac_out` from the
/// *same* running XOF state — the two squeezes must come from one instance,
/// not two independently-keyed ones, since the construction relies on the
/// sponge's streaming squeeze to derive both keys from a single absorption.
fn derive_keys(mode: HbaMode, name: &[u8], custom: &[u8], absorb: &[u8], ctr_out: &mut [u8], mac_out: &mut [u8]) {
    match mode {
        HbaMode::Shake256 => {
            let mut xof = CShake::<136, 24>::new(name, custom);
            xof.absorb(absorb);
            xof.squeeze(ctr_out);
            xof.squeeze(mac_out);
        }
        HbaMode::Shake512 => {
            let mut xof = CShake::<72, 24>::new(name, custom);
            xof.absorb(absorb);
            xof.squeeze(ctr_out);
            xof.squeeze(mac_out);
        }
        HbaMode::Shake1024 => {
            let mut xof = CShake::<64, 48>::new(name, custom);
            xof.absorb(absorb);
            xof.squeeze(ctr_out);
            xof.squeeze(mac_out);
        }
    }
}

fn derive_single(mode: HbaMode, name: &[u8], custom: &[u8], absorb: &[u8], out: &mut [u8]) {
    match mode {
        HbaMode::Shake256 => {
            let mut xof = CShake::<136, 24>::new(name, custom);
            xof.absorb(absorb);
            xof.squeeze(out);
        }
        HbaMode::Shake512 => {
            let mut xof = CShake::<72, 24>::new(name, custom);
            xof.absorb(absorb);
            xof.squeeze(out);
        }
        HbaMode::Shake1024 => {
            let mut xof = CShake::<64, 48>::new(name, custom);
            xof.absorb(absorb);
            xof.squeeze(out);
        }
    }
}

/// The HBA AEAD, generic over the block cipher driving CTR mode and the MAC
/// authenticating the ciphertext. `C::default()` must yield a fresh,
/// unkeyed cipher instance — `initialize` rekeys it on every call.
pub struct Hba<C, M> {
    ctr: Option<CtrMode<C>>,
    mac: M,
    mode: Option<HbaMode>,
    custom: Vec<u8>,
    key_bits: u16,
    algo_name: &'static [u8],
    mac_key: Vec<u8>,
    counter: u64,
    nonce_len: usize,
    associated_data: Vec<u8>,
    preserve_ad: bool,
    direction: Direction,
    initialized: bool,
    finalized: bool,
}

impl<C, M> Hba<C, M>
where
    C: BlockCipher + Default + Sync,
    M: Mac,
{
    /// `algo_name` feeds the cSHAKE name string as `"HBA-" + cipher name`,
    /// e.g. `b"HBA-AES"`.
    pub fn new(mac: M, algo_name: &'static [u8]) -> Self {
        Hba {
            ctr: None,
            mac,
            mode: None,
            custom: Vec::new(),
            key_bits: 0,
            algo_name,
            mac_key: Vec::new(),
            counter: 0,
            nonce_len: 0,
            associated_data: Vec::new(),
            preserve_ad: false,
            direction: Direction::Encrypt,
            initialized: false,
            finalized: false,
        }
    }

    /// When set, associated data set via [`Self::set_associated_data`]
    /// survives a `finalize`/`verify` call instead of being cleared.
    pub fn set_preserve_associated_data(&mut self, preserve: bool) {
        self.preserve_ad = preserve;
    }

    /// Derives the CTR and MAC keys from `key`, keys the block cipher and
    /// MAC, and absorbs the nonce into the MAC. Legal key lengths are 32,
    /// 64, or 128 bytes; the nonce must be exactly 16 bytes. May be called
    /// again on an already-initialized instance to reinitialize it.
    pub fn initialize(&mut self, direction: Direction, key: &SymmetricKey) -> Result<()> {
        if key.nonce().len() != 16 {
            return Err(Error::InvalidNonceSize { got: key.nonce().len() });
        }
        let mode = HbaMode::from_key_len(key.key().len())?;

        let mut custom = Vec::with_capacity(OMEGA_INFO.len() + key.info().len());
        custom.extend_from_slice(OMEGA_INFO);
        custom.extend_from_slice(key.info());

        let key_bits = (key.key().len() * 8) as u16;
        let name = build_name(1, key_bits, self.algo_name);

        let mac_key_len = self.mac.tag_size();
        let mut ctr_key = vec![0u8; key.key().len()];
        let mut mac_key = vec![0u8; mac_key_len];
        derive_keys(mode, &name, &custom, key.key(), &mut ctr_key, &mut mac_key);

        let mut cipher = C::default();
        let cipher_key = SymmetricKey::new(ctr_key, Vec::new(), Vec::new());
        cipher.initialize(direction, &cipher_key)?;

        let mut nonce_arr = [0u8; 16];
        nonce_arr.copy_from_slice(key.nonce());
        self.ctr = Some(CtrMode::new(cipher, nonce_arr)?);

        self.mac.initialize(&mac_key);
        self.mac.update(key.nonce());

        self.mode = Some(mode);
        self.custom = custom;
        self.key_bits = key_bits;
        self.mac_key = mac_key;
        self.nonce_len = key.nonce().len();
        self.counter = 1;
        self.direction = direction;
        self.associated_data.clear();
        self.initialized = true;
        self.finalized = false;
        tracing::debug!(key_bits, direction = ?direction, "hba initialized");
        Ok(())
    }

    /// Overwrites (does not append to) the associated data absorbed at the
    /// next `finalize`/`verify`. Legal only between `initialize` and the
    /// next `finalize`/`verify`.
    pub fn set_associated_data(&mut self, data: &[u8]) -> Result<()> {
        if !self.initialized || self.finalized {
            return Err(Error::IllegalOperation {
                reason: "set_associated_data requires an initialized, non-finalized instance",
            });
        }
        self.associated_data = data.to_vec();
        Ok(())
    }

    /// Encrypts or decrypts `input` into `output` (same length), advancing
    /// both the CTR counter and the MAC stream. Direction is fixed by the
    /// most recent `initialize` call.
    pub fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        if !self.initialized || self.finalized {
            return Err(Error::NotInitialized);
        }
        let ctr = self.ctr.as_mut().ok_or(Error::NotInitialized)?;
        match self.direction {
            Direction::Encrypt => {
                ctr.transform(input, output)?;
                self.mac.update(output);
            }
            Direction::Decrypt => {
                self.mac.update(input);
                ctr.transform(input, output)?;
            }
        }
        self.counter += input.len() as u64;
        Ok(())
    }

    fn finalize_internal(&mut self) -> Result<Vec<u8>> {
        if !self.initialized || self.finalized {
            return Err(Error::IllegalOperation {
                reason: "finalize/verify requires an initialized, non-finalized instance",
            });
        }

        if !self.associated_data.is_empty() {
            self.mac.update(&self.associated_data);
        }
        let ad_len = self.associated_data.len() as u64;
        if !self.preserve_ad {
            self.associated_data.clear();
        }

        let length_trailer = (self.counter + ad_len + self.nonce_len as u64).to_le_bytes();
        self.mac.update(&length_trailer);

        let mut tag = vec![0u8; self.mac.tag_size()];
        self.mac.finalize(&mut tag);

        let mode = self.mode.ok_or(Error::NotInitialized)?;
        let name = build_name(self.counter, self.key_bits, self.algo_name);
        let mut new_mac_key = vec![0u8; self.mac.tag_size()];
        derive_single(mode, &name, &self.custom, &self.mac_key, &mut new_mac_key);
        self.mac.initialize(&new_mac_key);
        self.mac_key = new_mac_key;

        self.finalized = true;
        tracing::debug!(counter = self.counter, "hba finalized and mac rekeyed");
        Ok(tag)
    }

    /// Writes `tag_out.len()` bytes of the authentication tag, which must
    /// satisfy `32 <= tag_out.len() <= mac.tag_size()`. Rekeys the MAC for
    /// the next message afterward.
    pub fn finalize(&mut self, tag_out: &mut [u8]) -> Result<()> {
        if tag_out.len() < MIN_TAG_LEN || tag_out.len() > self.mac.tag_size() {
            return Err(Error::InvalidSize { reason: "tag length out of range" });
        }
        let tag = self.finalize_internal()?;
        tag_out.copy_from_slice(&tag[..tag_out.len()]);
        Ok(())
    }

    /// Computes the tag exactly as `finalize` would, then compares it in
    /// constant time against `expected_tag[offset..offset + len]`. Rekeys
    /// the MAC regardless of outcome, matching `finalize`'s side effect.
    pub fn verify(&mut self, expected_tag: &[u8], offset: usize, len: usize) -> Result<()> {
        if len < MIN_TAG_LEN || len > self.mac.tag_size() {
            return Err(Error::InvalidSize { reason: "tag length out of range" });
        }
        let tag = self.finalize_internal()?;
        if constant_time_eq::constant_time_eq(&tag[..len], &expected_tag[offset..offset + len]) {
            Ok(())
        } else {
            tracing::warn!("hba authentication failure");
            Err(Error::AuthenticationFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{Aes, Rhx};
    use crate::mac::{HmacSha256, HmacSha512};

    fn key(key_bytes: usize) -> SymmetricKey {
        SymmetricKey::new(vec![0x5Au8; key_bytes], vec![0x11u8; 16], vec![])
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let plaintext = b"the quick brown fox jumps over the lazy dog".to_vec();

        let mut enc = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        enc.initialize(Direction::Encrypt, &key(32)).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.transform(&plaintext, &mut ciphertext).unwrap();
        let mut tag = [0u8; 32];
        enc.finalize(&mut tag).unwrap();

        let mut dec = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        dec.initialize(Direction::Decrypt, &key(32)).unwrap();
        let mut recovered = vec![0u8; ciphertext.len()];
        dec.transform(&ciphertext, &mut recovered).unwrap();
        dec.verify(&tag, 0, 32).unwrap();

        assert_eq!(plaintext, recovered);
    }

    #[test]
    fn tampered_ciphertext_fails_verification() {
        let plaintext = vec![0xABu8; 64];

        let mut enc = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        enc.initialize(Direction::Encrypt, &key(32)).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.transform(&plaintext, &mut ciphertext).unwrap();
        let mut tag = [0u8; 32];
        enc.finalize(&mut tag).unwrap();

        ciphertext[0] ^= 0x01;

        let mut dec = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        dec.initialize(Direction::Decrypt, &key(32)).unwrap();
        let mut recovered = vec![0u8; ciphertext.len()];
        dec.transform(&ciphertext, &mut recovered).unwrap();
        assert!(dec.verify(&tag, 0, 32).is_err());
    }

    #[test]
    fn associated_data_changes_tag() {
        let plaintext = vec![0x11u8; 32];

        let mut a = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        a.initialize(Direction::Encrypt, &key(32)).unwrap();
        a.set_associated_data(b"context-a").unwrap();
        let mut out_a = vec![0u8; plaintext.len()];
        a.transform(&plaintext, &mut out_a).unwrap();
        let mut tag_a = [0u8; 32];
        a.finalize(&mut tag_a).unwrap();

        let mut b = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        b.initialize(Direction::Encrypt, &key(32)).unwrap();
        b.set_associated_data(b"context-b").unwrap();
        let mut out_b = vec![0u8; plaintext.len()];
        b.transform(&plaintext, &mut out_b).unwrap();
        let mut tag_b = [0u8; 32];
        b.finalize(&mut tag_b).unwrap();

        assert_ne!(tag_a, tag_b);
    }

    #[test]
    fn rhx_512_hmac_sha512_round_trips_with_a_64_byte_key() {
        let plaintext = b"the quick brown fox jumps over the lazy dog".to_vec();

        let mut enc = Hba::<Rhx, HmacSha512>::new(HmacSha512::default(), b"HBA-RHX");
        enc.initialize(Direction::Encrypt, &key(64)).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.transform(&plaintext, &mut ciphertext).unwrap();
        let mut tag = [0u8; 32];
        enc.finalize(&mut tag).unwrap();

        let mut dec = Hba::<Rhx, HmacSha512>::new(HmacSha512::default(), b"HBA-RHX");
        dec.initialize(Direction::Decrypt, &key(64)).unwrap();
        let mut recovered = vec![0u8; ciphertext.len()];
        dec.transform(&ciphertext, &mut recovered).unwrap();
        dec.verify(&tag, 0, 32).unwrap();

        assert_eq!(plaintext, recovered);
    }

    #[test]
    fn rhx_1024_round_trips_with_a_128_byte_key() {
        let plaintext = vec![0x42u8; 200];

        let mut enc = Hba::<Rhx, HmacSha512>::new(HmacSha512::default(), b"HBA-RHX");
        enc.initialize(Direction::Encrypt, &key(128)).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.transform(&plaintext, &mut ciphertext).unwrap();
        let mut tag = [0u8; 32];
        enc.finalize(&mut tag).unwrap();

        let mut dec = Hba::<Rhx, HmacSha512>::new(HmacSha512::default(), b"HBA-RHX");
        dec.initialize(Direction::Decrypt, &key(128)).unwrap();
        let mut recovered = vec![0u8; ciphertext.len()];
        dec.transform(&ciphertext, &mut recovered).unwrap();
        dec.verify(&tag, 0, 32).unwrap();

        assert_eq!(plaintext, recovered);
    }

    #[test]
    fn rejects_bad_key_size() {
        let mut h = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        assert!(h.initialize(Direction::Encrypt, &key(20)).is_err());
    }

    #[test]
    fn rejects_short_tag() {
        let mut h = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        h.initialize(Direction::Encrypt, &key(32)).unwrap();
        let mut tag = [0u8; 16];
        assert!(h.finalize(&mut tag).is_err());
    }

    #[test]
    fn finalized_instance_rejects_further_transform() {
        let mut h = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        h.initialize(Direction::Encrypt, &key(32)).unwrap();
        let plaintext = vec![0x77u8; 32];
        let mut ciphertext = vec![0u8; plaintext.len()];
        h.transform(&plaintext, &mut ciphertext).unwrap();
        let mut tag1 = [0u8; 32];
        h.finalize(&mut tag1).unwrap();

        let mut out = vec![0u8; plaintext.len()];
        assert!(h.transform(&plaintext, &mut out).is_err());
    }

    #[test]
    fn reinitialize_after_finalize_allows_new_message() {
        let mut h = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
        h.initialize(Direction::Encrypt, &key(32)).unwrap();
        let plaintext = vec![0x77u8; 32];
        let mut ciphertext = vec![0u8; plaintext.len()];
        h.transform(&plaintext, &mut ciphertext).unwrap();
        let mut tag1 = [0u8; 32];
        h.finalize(&mut tag1).unwrap();

        h.initialize(Direction::Encrypt, &key(32)).unwrap();
        let mut ciphertext2 = vec![0u8; plaintext.len()];
        h.transform(&plaintext, &mut ciphertext2).unwrap();
        let mut tag2 = [0u8; 32];
        h.finalize(&mut tag2).unwrap();

        assert_eq!(ciphertext, ciphertext2);
        assert_eq!(tag1, tag2);
    }
}
