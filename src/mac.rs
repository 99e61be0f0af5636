//! Keyed MAC generators: HMAC-SHA2 and KMAC, behind one uniform trait so
//! [`crate::hba::Hba`] can be agnostic to which one it was constructed with.

use hmac::Mac as HmacMacTrait;
use sha2::{Sha256, Sha512};

use crate::hash::Kmac;

/// The uniform MAC interface HBA drives: initialize with a key, stream
/// bytes in, finalize into a tag of fixed size.
pub trait Mac {
    fn initialize(&mut self, key: &[u8]);
    fn update(&mut self, data: &[u8]);
    fn finalize(&mut self, tag_out: &mut [u8]);
    fn tag_size(&self) -> usize;
}

/// HMAC over a SHA-2 compression function. `inner` is `None` until
/// [`Mac::initialize`] has been called at least once.
#[derive(Clone)]
pub struct HmacSha2<D> {
    inner: Option<D>,
}

// A derived `Default` would require `D: Default`, which `hmac::Hmac<_>`
// does not implement; the field only ever holds `None` before initialize.
impl<D> Default for HmacSha2<D> {
    fn default() -> Self {
        HmacSha2 { inner: None }
    }
}

/// HMAC-SHA256, 32-byte tag.
pub type HmacSha256 = HmacSha2<hmac::Hmac<Sha256>>;
/// HMAC-SHA512, 64-byte tag.
pub type HmacSha512 = HmacSha2<hmac::Hmac<Sha512>>;

impl Mac for HmacSha256 {
    fn initialize(&mut self, key: &[u8]) {
        self.inner = Some(hmac::Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length"));
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.as_mut().expect("initialize must be called first").update(data);
    }

    fn finalize(&mut self, tag_out: &mut [u8]) {
        let mac = self.inner.take().expect("initialize must be called first");
        let tag = mac.finalize().into_bytes();
        tag_out.copy_from_slice(&tag[..tag_out.len()]);
    }

    fn tag_size(&self) -> usize {
        32
    }
}

impl Mac for HmacSha512 {
    fn initialize(&mut self, key: &[u8]) {
        self.inner = Some(hmac::Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length"));
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.as_mut().expect("initialize must be called first").update(data);
    }

    fn finalize(&mut self, tag_out: &mut [u8]) {
        let mac = self.inner.take().expect("initialize must be called first");
        let tag = mac.finalize().into_bytes();
        tag_out.copy_from_slice(&tag[..tag_out.len()]);
    }

    fn tag_size(&self) -> usize {
        64
    }
}

/// KMAC-R, as specified in `cshake`'s "KMAC" function name, producing a tag
/// equal to the security parameter: 32, 64, or 128 bytes.
pub struct KmacMac<const RATE: usize, const ROUNDS: usize, const TAG_LEN: usize> {
    inner: Option<Kmac<RATE, ROUNDS>>,
}

impl<const RATE: usize, const ROUNDS: usize, const TAG_LEN: usize> Default
    for KmacMac<RATE, ROUNDS, TAG_LEN>
{
    fn default() -> Self {
        KmacMac { inner: None }
    }
}

/// KMAC-256, 32-byte tag (136-byte rate, 24-round permutation).
pub type Kmac256Mac = KmacMac<136, 24, 32>;
/// KMAC-512, 64-byte tag (72-byte rate, 24-round permutation).
pub type Kmac512Mac = KmacMac<72, 24, 64>;
/// KMAC-1024, 128-byte tag (64-byte rate, 48-round extended permutation).
pub type Kmac1024Mac = KmacMac<64, 48, 128>;

impl<const RATE: usize, const ROUNDS: usize, const TAG_LEN: usize> Mac
    for KmacMac<RATE, ROUNDS, TAG_LEN>
{
    fn initialize(&mut self, key: &[u8]) {
        self.inner = Some(Kmac::new(key, &[]));
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.as_mut().expect("initialize must be called first").update(data);
    }

    fn finalize(&mut self, tag_out: &mut [u8]) {
        debug_assert_eq!(tag_out.len(), TAG_LEN);
        self.inner
            .as_mut()
            .expect("initialize must be called first")
            .finalize(tag_out);
    }

    fn tag_size(&self) -> usize {
        TAG_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha256_tag_size() {
        let mut m = HmacSha256::default();
        m.initialize(b"key");
        m.update(b"message");
        let mut tag = [0u8; 32];
        m.finalize(&mut tag);
        assert_eq!(m.tag_size(), 32);
    }

    #[test]
    fn kmac256_tag_size_and_determinism() {
        let mut a = Kmac256Mac::default();
        a.initialize(b"key");
        a.update(b"message");
        let mut ta = [0u8; 32];
        a.finalize(&mut ta);

        let mut b = Kmac256Mac::default();
        b.initialize(b"key");
        b.update(b"message");
        let mut tb = [0u8; 32];
        b.finalize(&mut tb);

        assert_eq!(ta, tb);
    }
}
