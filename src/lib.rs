#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cipher;
pub mod ctr;
pub mod error;
pub mod hash;
pub mod hba;
pub mod key;
pub mod mac;
pub mod permutation;
pub mod provider;
pub mod sponge;
pub mod treehash;

pub use cipher::{Aes, BlockCipher, Direction, Rhx};
pub use ctr::CtrMode;
pub use error::{Error, Result};
pub use hash::{CShake, Kmac, Shake, Sha3_256, Sha3_512, Sha3_1024};
pub use hba::Hba;
pub use key::SymmetricKey;
pub use mac::{HmacSha256, HmacSha512, Kmac256Mac, Kmac512Mac, Kmac1024Mac, Mac};
pub use permutation::{Keccak1600, Keccak1600Extended, KeccakF1600, Permutation};
pub use treehash::ParallelTreeEngine;

#[cfg(feature = "std")]
pub use provider::OsProvider;
pub use provider::Provider;
