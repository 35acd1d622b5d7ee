//! Merkle tree over an ordered list of transfers with membership
//! verification against the committed root

mod config;
mod error;
mod hash;
mod record;
mod tree;
mod verify;

pub use crate::{
    config::{TreeConfig, DEFAULT_MAX_DEPTH},
    error::Error,
    hash::{hash_pair, Blake2s256, DigestProvider, MerkleHash, Sha256, Sha3_256},
    record::{hash_record, Record, Transfer, AMOUNT_PRECISION},
    tree::{build_tree, Children, MerkleTree, NodeId, TreeNode},
    verify::{verify, verify_with_trace, LevelCheck, Outcome, VerificationTrace},
};
