//! Opaque symmetric key-material container with a defined lifecycle: owner
//! zeroizes on drop, and may be constructed from raw bytes or serialized to
//! the binary layout in §6 of the specification.

use alloc::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};
use zeroize::Zeroize;

/// `{ key, nonce, info }`, all three optionally-empty byte sequences.
/// Zeroized on drop; never shared across owning objects.
#[derive(Clone)]
pub struct SymmetricKey {
    key: Vec<u8>,
    nonce: Vec<u8>,
    info: Vec<u8>,
}

impl SymmetricKey {
    pub fn new(key: Vec<u8>, nonce: Vec<u8>, info: Vec<u8>) -> Self {
        SymmetricKey { key, nonce, info }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn info(&self) -> &[u8] {
        &self.info
    }

    /// Serializes to `u16 key_len || u16 nonce_len || u16 info_len || key || nonce || info`,
    /// little-endian lengths.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.key.len() + self.nonce.len() + self.info.len());
        let mut len_buf = [0u8; 2];
        LittleEndian::write_u16(&mut len_buf, self.key.len() as u16);
        out.extend_from_slice(&len_buf);
        LittleEndian::write_u16(&mut len_buf, self.nonce.len() as u16);
        out.extend_from_slice(&len_buf);
        LittleEndian::write_u16(&mut len_buf, self.info.len() as u16);
        out.extend_from_slice(&len_buf);
        out.extend_from_slice(&self.key);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.info);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 6 {
            return None;
        }
        let key_len = LittleEndian::read_u16(&bytes[0..2]) as usize;
        let nonce_len = LittleEndian::read_u16(&bytes[2..4]) as usize;
        let info_len = LittleEndian::read_u16(&bytes[4..6]) as usize;
        let total = 6 + key_len + nonce_len + info_len;
        if bytes.len() < total {
            return None;
        }
        let key = bytes[6..6 + key_len].to_vec();
        let nonce = bytes[6 + key_len..6 + key_len + nonce_len].to_vec();
        let info = bytes[6 + key_len + nonce_len..total].to_vec();
        Some(SymmetricKey::new(key, nonce, info))
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.nonce.zeroize();
        self.info.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let k = SymmetricKey::new(vec![1, 2, 3], vec![4, 5], vec![]);
        let bytes = k.to_bytes();
        let k2 = SymmetricKey::from_bytes(&bytes).unwrap();
        assert_eq!(k.key(), k2.key());
        assert_eq!(k.nonce(), k2.nonce());
        assert_eq!(k.info(), k2.info());
    }

    #[test]
    fn zero_length_fields_permitted() {
        let k = SymmetricKey::new(vec![], vec![], vec![]);
        let bytes = k.to_bytes();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0]);
    }
}
