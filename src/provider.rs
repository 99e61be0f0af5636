//! Entropy sources for key generation. The trait is the ambient seam;
//! concrete algorithms (CJP/ECP/RDP/ACP/CSP-style jitter and hardware
//! providers) are out of scope here — this crate ships one implementor,
//! [`OsProvider`], backed by the operating system's CSPRNG.

use crate::error::Result;

/// A source of cryptographic randomness, consumed by key generators.
pub trait Provider {
    /// Fills `out` entirely with fresh random bytes.
    fn generate(&mut self, out: &mut [u8]);

    /// Fills `out[offset..offset + len]` with fresh random bytes, leaving
    /// the rest of `out` untouched.
    fn generate_range(&mut self, out: &mut [u8], offset: usize, len: usize);

    /// Reseeds the underlying generator, if it maintains explicit state.
    fn reset(&mut self);
}

/// The OS-backed default [`Provider`], built on `rand`'s thread-local
/// CSPRNG (itself seeded from `getrandom`). Available only with the `std`
/// feature: a no_std caller supplies its own [`Provider`].
#[cfg(feature = "std")]
pub struct OsProvider {
    rng: rand::rngs::StdRng,
}

#[cfg(feature = "std")]
impl OsProvider {
    pub fn new() -> Result<Self> {
        use rand::SeedableRng;
        Ok(OsProvider {
            rng: rand::rngs::StdRng::from_entropy(),
        })
    }
}

#[cfg(feature = "std")]
impl Default for OsProvider {
    fn default() -> Self {
        Self::new().expect("OS entropy source must be available")
    }
}

#[cfg(feature = "std")]
impl Provider for OsProvider {
    fn generate(&mut self, out: &mut [u8]) {
        use rand::RngCore;
        self.rng.fill_bytes(out);
    }

    fn generate_range(&mut self, out: &mut [u8], offset: usize, len: usize) {
        use rand::RngCore;
        self.rng.fill_bytes(&mut out[offset..offset + len]);
    }

    fn reset(&mut self) {
        use rand::SeedableRng;
        self.rng = rand::rngs::StdRng::from_entropy();
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn generate_fills_whole_buffer_and_varies() {
        let mut provider = OsProvider::new().unwrap();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        provider.generate(&mut a);
        provider.generate(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn generate_range_leaves_rest_untouched() {
        let mut provider = OsProvider::new().unwrap();
        let mut buf = [0xABu8; 16];
        provider.generate_range(&mut buf, 4, 8);
        assert_eq!(buf[0..4], [0xAB; 4]);
        assert_eq!(buf[12..16], [0xAB; 4]);
    }
}
