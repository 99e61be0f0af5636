//! The error enum surfaced by every fallible operation in this crate.
//!
//! Grounded on the error kinds enumerated in the component design (§7): every
//! variant is a structured payload, never a free-form string, and no
//! operation retries internally — a caller always sees the first failure.

use core::fmt;

/// A structured error describing why a cryptographic operation failed.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key length is not in the algorithm's legal set.
    #[cfg_attr(feature = "std", error("invalid key size: got {got}, expected one of {legal:?}"))]
    InvalidKeySize { got: usize, legal: &'static [usize] },

    /// The nonce length is not the 16 bytes HBA requires.
    #[cfg_attr(feature = "std", error("invalid nonce size: got {got}, expected 16"))]
    InvalidNonceSize { got: usize },

    /// A configuration value (fan-out, parallel block size, degree) violates an invariant.
    #[cfg_attr(feature = "std", error("invalid parameter: {reason}"))]
    InvalidParam { reason: &'static str },

    /// A transform/finalize/verify call preceded `initialize`.
    #[cfg_attr(feature = "std", error("operation requires initialization first"))]
    NotInitialized,

    /// An operation was attempted in a state that forbids it.
    #[cfg_attr(feature = "std", error("illegal operation: {reason}"))]
    IllegalOperation { reason: &'static str },

    /// An output buffer or requested size is too small or out of range.
    #[cfg_attr(feature = "std", error("invalid size: {reason}"))]
    InvalidSize { reason: &'static str },

    /// Tag verification failed. No plaintext may be exposed by the caller.
    #[cfg_attr(feature = "std", error("authentication failed"))]
    AuthenticationFailure,

    /// A runtime feature required by the chosen primitive is unavailable.
    #[cfg_attr(feature = "std", error("not supported: {reason}"))]
    NotSupported { reason: &'static str },
}

#[cfg(not(feature = "std"))]
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeySize { got, legal } => {
                write!(f, "invalid key size: got {got}, expected one of {legal:?}")
            }
            Error::InvalidNonceSize { got } => write!(f, "invalid nonce size: got {got}, expected 16"),
            Error::InvalidParam { reason } => write!(f, "invalid parameter: {reason}"),
            Error::NotInitialized => write!(f, "operation requires initialization first"),
            Error::IllegalOperation { reason } => write!(f, "illegal operation: {reason}"),
            Error::InvalidSize { reason } => write!(f, "invalid size: {reason}"),
            Error::AuthenticationFailure => write!(f, "authentication failed"),
            Error::NotSupported { reason } => write!(f, "not supported: {reason}"),
        }
    }
}

/// A `Result` alias for this crate's fallible operations.
pub type Result<T> = core::result::Result<T, Error>;
