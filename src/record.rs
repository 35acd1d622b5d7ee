//! Records committed to by the tree and their leaf digests

use crate::hash::{DigestProvider, MerkleHash, RECORD_HASH};
use std::fmt;

/// Number of fractional digits used when encoding a transfer amount
pub const AMOUNT_PRECISION: usize = 2;

/// A value that can be placed at the base layer of a tree.
///
/// The encoding must be a pure function of the record's fields: two
/// records with the same fields are indistinguishable to the tree.
pub trait Record {
    /// Canonical byte encoding hashed into the record's leaf digest
    fn canonical_bytes(&self) -> Vec<u8>;
}

/// A transfer of `amount` from `source` to `destination`
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub source: String,
    pub destination: String,
    pub amount: f64,
}

impl Transfer {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, amount: f64) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            amount,
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.source,
            self.destination,
            format_amount(self.amount)
        )
    }
}

impl Record for Transfer {
    /// `{len}:{source}:{len}:{destination}:{amount}` with byte lengths and the
    /// amount printed to [`AMOUNT_PRECISION`] digits.
    fn canonical_bytes(&self) -> Vec<u8> {
        format!(
            "{}:{}:{}:{}:{}",
            self.source.len(),
            self.source,
            self.destination.len(),
            self.destination,
            format_amount(self.amount)
        )
        .into_bytes()
    }
}

/// Print `amount` to [`AMOUNT_PRECISION`] digits. Values that round to zero
/// lose their sign so `-0.0`, `-0.001` and `0.0` encode alike.
fn format_amount(amount: f64) -> String {
    let formatted = format!("{:.*}", AMOUNT_PRECISION, amount);
    if let Some(unsigned) = formatted.strip_prefix('-') {
        if unsigned.bytes().all(|b| b == b'0' || b == b'.') {
            return unsigned.to_string();
        }
    }
    formatted
}

/// Compute the leaf digest of a record
pub fn hash_record<HF: DigestProvider, R: Record + ?Sized>(record: &R) -> MerkleHash {
    let encoded = record.canonical_bytes();
    HF::hash_parts(&[RECORD_HASH, encoded.as_slice()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Sha256, Sha3_256};
    use hex_literal::hex;

    #[test]
    fn test_canonical_encoding() {
        let transfer = Transfer::new("A", "B", 10.0);
        assert_eq!(transfer.canonical_bytes(), b"1:A:1:B:10.00".to_vec());

        let transfer = Transfer::new("alice", "bob", 2.675);
        assert_eq!(transfer.canonical_bytes(), b"5:alice:3:bob:2.67".to_vec());
    }

    #[test]
    fn test_display() {
        assert_eq!(Transfer::new("A", "B", 10.0).to_string(), "A -> B (10.00)");
        assert_eq!(Transfer::new("A", "B", -0.0).to_string(), "A -> B (0.00)");
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let first = Transfer::new("a:1", "b", 1.0);
        let second = Transfer::new("a", "1:b", 1.0);
        assert_ne!(first.canonical_bytes(), second.canonical_bytes());
        assert_ne!(
            hash_record::<Sha256, _>(&first),
            hash_record::<Sha256, _>(&second)
        );
    }

    #[test]
    fn test_hash_record_vectors() {
        assert_eq!(
            hash_record::<Sha256, _>(&Transfer::new("A", "B", 10.0)),
            hex!("91c183b4e1a12e8bd5cda31b6cca5f09f014327de6cc5d783c678b01af3028c1")
        );
        assert_eq!(
            hash_record::<Sha256, _>(&Transfer::new("E", "F", 30.0)),
            hex!("8582b5a5c192be89f31e4620a15044478e0ba0be93b3fb7f5cf474ea9497ca7f")
        );
    }

    #[test]
    fn test_hash_record_is_pure() {
        let transfer = Transfer::new("C", "D", 20.0);
        let copy = transfer.clone();
        assert_eq!(
            hash_record::<Sha256, _>(&transfer),
            hash_record::<Sha256, _>(&copy)
        );
        assert_ne!(
            hash_record::<Sha256, _>(&transfer),
            hash_record::<Sha3_256, _>(&transfer)
        );
    }

    #[test]
    fn test_signed_zero_amounts_encode_alike() {
        let zero = Transfer::new("A", "B", 0.0);
        let negative_zero = Transfer::new("A", "B", -0.0);
        let rounds_to_zero = Transfer::new("A", "B", -0.001);
        assert_eq!(zero, negative_zero);
        assert_eq!(zero.canonical_bytes(), b"1:A:1:B:0.00".to_vec());
        assert_eq!(negative_zero.canonical_bytes(), zero.canonical_bytes());
        assert_eq!(rounds_to_zero.canonical_bytes(), zero.canonical_bytes());
        assert_eq!(
            hash_record::<Sha256, _>(&negative_zero),
            hash_record::<Sha256, _>(&zero)
        );

        let negative = Transfer::new("A", "B", -0.01);
        assert_eq!(negative.canonical_bytes(), b"1:A:1:B:-0.01".to_vec());
        let negative = Transfer::new("A", "B", -10.5);
        assert_eq!(negative.canonical_bytes(), b"1:A:1:B:-10.50".to_vec());
    }

    #[test]
    fn test_amount_precision_pins_encoding() {
        let rounded = Transfer::new("A", "B", 10.001);
        let exact = Transfer::new("A", "B", 10.0);
        assert_eq!(
            hash_record::<Sha256, _>(&rounded),
            hash_record::<Sha256, _>(&exact)
        );
        let changed = Transfer::new("A", "B", 10.01);
        assert_ne!(
            hash_record::<Sha256, _>(&changed),
            hash_record::<Sha256, _>(&exact)
        );
    }
}
