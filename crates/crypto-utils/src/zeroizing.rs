use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A fixed-size byte array that is zeroed when dropped.
///
/// Holds key material for exactly as long as a signing call needs it. The
/// `Debug` impl never prints the contents.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize>([u8; N]);

impl<const N: usize> SecretBytes<N> {
    /// Takes ownership of `bytes`. The caller's copy is not touched, so pass a
    /// temporary or zeroize the source afterwards.
    pub fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// Borrows the raw bytes.
    pub fn expose(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(<redacted>)")
    }
}
