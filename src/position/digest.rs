use sha2::{Digest as _, Sha256};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A 128-bit fingerprint of a position's canonical text.
///
/// Bits: the first 16 bytes of the SHA-256 of the text, read little-endian.
pub struct Digest(u128);

impl Digest
{
    /// The width of a digest when stored as bytes.
    pub const SIZE: usize = 16;

    /// Computes the digest of the given text.
    pub fn of(text: &str) -> Digest
    {
        let hash = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(&hash[.. Self::SIZE]);
        Digest(u128::from_le_bytes(bytes))
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE]
    {
        self.0.to_le_bytes()
    }
}

impl std::fmt::Display for Digest
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{:032x}", self.0)
    }
}
