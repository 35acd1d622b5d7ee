//! Digest type and the hash functions used to combine tree nodes

use sha2::digest::{consts::U32, Digest, OutputSizeUser};
use std::{fmt, ops::Deref};

pub use blake2::Blake2s256;
pub use sha2::Sha256;
pub use sha3::Sha3_256;

/// Domain separation tags
pub(crate) const MERKLE_HASH: &[u8] = b"MerkleHash";
pub(crate) const RECORD_HASH: &[u8] = b"MerkleRecord";

/// Separator placed between the left and right digest of a pair
pub(crate) const PAIR_SEPARATOR: &[u8] = b":";

/// Source of 32 byte digests for the tree.
///
/// Implemented for every RustCrypto hasher with a 256 bit output, so
/// `Sha256`, `Sha3_256` and `Blake2s256` can all back a tree.
pub trait DigestProvider {
    /// Hash the concatenation of `parts`
    fn hash_parts(parts: &[&[u8]]) -> MerkleHash;

    /// Hash two nodes on a merkle tree by concatenating the left and
    /// right digests around a separator. Order matters: swapping the
    /// arguments yields a different digest.
    fn hash_pair(left: &[u8], right: &[u8]) -> MerkleHash {
        Self::hash_parts(&[MERKLE_HASH, left, PAIR_SEPARATOR, right])
    }
}

impl<D> DigestProvider for D
where
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    fn hash_parts(parts: &[&[u8]]) -> MerkleHash {
        let mut hasher = D::new();
        for part in parts {
            hasher.update(part);
        }
        MerkleHash(hasher.finalize().into())
    }
}

/// Hash two digests with the default SHA-256 provider
pub fn hash_pair(left: &MerkleHash, right: &MerkleHash) -> MerkleHash {
    Sha256::hash_pair(left, right)
}

/// Container for Merkle Hashes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MerkleHash(pub [u8; 32]);

impl MerkleHash {
    /// Lowercase hex encoding of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Deref for MerkleHash {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for MerkleHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for MerkleHash {
    fn from(value: [u8; 32]) -> Self {
        MerkleHash(value)
    }
}

impl PartialEq<[u8; 32]> for MerkleHash {
    fn eq(&self, other: &[u8; 32]) -> bool {
        &self.0 == other
    }
}

impl fmt::Display for MerkleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
