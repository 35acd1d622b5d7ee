//! Membership verification.
//!
//! A record is verified by locating the leaf that committed to its build
//! time digest, recomputing that leaf from the record's current value and
//! then checking every stored digest on the path up to the root.

use crate::{
    hash::{DigestProvider, MerkleHash},
    record::{hash_record, Record},
    tree::{Children, MerkleTree, NodeId},
};
use log::{debug, trace, warn};

/// Result of checking one level on the path to the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCheck {
    /// 1 for the leaf holding the record, increasing towards the root
    pub level: usize,
    /// Node whose stored digest was checked
    pub node: NodeId,
    /// Digest stored in the node at build time
    pub expected: MerkleHash,
    /// Digest recomputed during verification
    pub computed: MerkleHash,
}

impl LevelCheck {
    pub fn passed(&self) -> bool {
        self.expected == self.computed
    }
}

/// Why a verification succeeded or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every level up to the root matched
    Verified,
    /// No record in the tree committed to the target digest
    NotFound,
    /// The recomputed digest differed from the stored one at `level`
    Tampered { level: usize },
    /// The record slice passed in has no record at `index`
    MissingRecord { index: usize },
    /// The path to the root is longer than the configured depth bound
    DepthExceeded,
}

/// Per level detail of a verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationTrace {
    pub outcome: Outcome,
    /// Index of the record the target digest was found at
    pub record_index: Option<usize>,
    pub levels: Vec<LevelCheck>,
}

impl VerificationTrace {
    fn new(outcome: Outcome, record_index: Option<usize>, levels: Vec<LevelCheck>) -> Self {
        Self {
            outcome,
            record_index,
            levels,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == Outcome::Verified
    }
}

impl<R: Record, HF: DigestProvider> MerkleTree<R, HF> {
    /// Check that the record committed as `target` is still unmodified in
    /// `records`
    pub fn verify(&self, records: &[R], target: &MerkleHash) -> bool {
        self.verify_with_trace(records, target).is_valid()
    }

    /// Same as [`MerkleTree::verify`] but reports every level checked
    pub fn verify_with_trace(&self, records: &[R], target: &MerkleHash) -> VerificationTrace {
        let (leaf, record_index) = match self.locate(target) {
            Some(found) => found,
            None => {
                debug!("record {} not found in tree", target);
                return VerificationTrace::new(Outcome::NotFound, None, Vec::new());
            }
        };
        trace!("record {} found at index {}", target, record_index);

        let record = match records.get(record_index) {
            Some(record) => record,
            None => {
                debug!(
                    "record index {} missing from {} supplied records",
                    record_index,
                    records.len()
                );
                return VerificationTrace::new(
                    Outcome::MissingRecord {
                        index: record_index,
                    },
                    Some(record_index),
                    Vec::new(),
                );
            }
        };

        // Level 1: recompute the leaf from the record's current value
        let current = hash_record::<HF, R>(record);
        let computed = match self.nodes[leaf].children {
            Children::Records(left, Some(right)) if left == record_index => {
                HF::hash_pair(&current, &self.record_digests[right])
            }
            Children::Records(left, Some(right)) if right == record_index => {
                HF::hash_pair(&self.record_digests[left], &current)
            }
            Children::Records(left, None) if left == record_index => current,
            other => panic!(
                "malformed tree: leaf {} does not hold record {}: {:?}",
                leaf, record_index, other
            ),
        };

        let mut levels = Vec::with_capacity(self.depth);
        let mut level = 1;
        if !self.check_level(&mut levels, level, leaf, computed) {
            return VerificationTrace::new(
                Outcome::Tampered { level },
                Some(record_index),
                levels,
            );
        }

        // Walk parent links to the root using stored digests
        let mut node = leaf;
        while let Some(parent) = self.nodes[node].parent {
            if level > self.config.max_depth {
                warn!(
                    "verification of {} stopped after {} levels",
                    target, self.config.max_depth
                );
                return VerificationTrace::new(Outcome::DepthExceeded, Some(record_index), levels);
            }
            level += 1;

            let computed = match self.nodes[parent].children {
                Children::Pair(left, right) if left == node => {
                    HF::hash_pair(&self.nodes[node].digest, &self.nodes[right].digest)
                }
                Children::Pair(left, right) if right == node => {
                    HF::hash_pair(&self.nodes[left].digest, &self.nodes[node].digest)
                }
                Children::Carry(child) if child == node => self.nodes[node].digest,
                other => panic!(
                    "malformed tree: node {} is not a child of {}: {:?}",
                    node, parent, other
                ),
            };

            if !self.check_level(&mut levels, level, parent, computed) {
                return VerificationTrace::new(
                    Outcome::Tampered { level },
                    Some(record_index),
                    levels,
                );
            }
            node = parent;
        }

        VerificationTrace::new(Outcome::Verified, Some(record_index), levels)
    }

    /// Depth first search, left first, for the leaf holding a record whose
    /// build time digest equals `target`
    fn locate(&self, target: &MerkleHash) -> Option<(NodeId, usize)> {
        let mut stack = vec![(self.root, 0usize)];
        let mut pruned = false;
        while let Some((id, depth)) = stack.pop() {
            if depth > self.config.max_depth {
                pruned = true;
                continue;
            }
            match self.nodes[id].children {
                Children::Pair(left, right) => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
                Children::Carry(child) => stack.push((child, depth + 1)),
                Children::Records(left, right) => {
                    if &self.record_digests[left] == target {
                        return Some((id, left));
                    }
                    if let Some(right) = right {
                        if &self.record_digests[right] == target {
                            return Some((id, right));
                        }
                    }
                }
            }
        }
        if pruned {
            warn!(
                "search for {} pruned below depth {}",
                target, self.config.max_depth
            );
        }
        None
    }

    fn check_level(
        &self,
        levels: &mut Vec<LevelCheck>,
        level: usize,
        node: NodeId,
        computed: MerkleHash,
    ) -> bool {
        let check = LevelCheck {
            level,
            node,
            expected: self.nodes[node].digest,
            computed,
        };
        let passed = check.passed();
        if passed {
            trace!("level {} verified: {}", level, check.expected);
        } else {
            debug!(
                "level {} mismatch at node {}: stored {}, computed {}",
                level, node, check.expected, check.computed
            );
        }
        levels.push(check);
        passed
    }
}

/// Check that the record committed as `target` is still unmodified in
/// `records`
pub fn verify<R: Record, HF: DigestProvider>(
    tree: &MerkleTree<R, HF>,
    records: &[R],
    target: &MerkleHash,
) -> bool {
    tree.verify(records, target)
}

/// Verify and return the per level trace
pub fn verify_with_trace<R: Record, HF: DigestProvider>(
    tree: &MerkleTree<R, HF>,
    records: &[R],
    target: &MerkleHash,
) -> VerificationTrace {
    tree.verify_with_trace(records, target)
}
