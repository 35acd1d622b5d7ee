//! Merkle Tree construction and traversal.
//!
//! Nodes are stored in an arena and addressed by [`NodeId`]. Every node
//! keeps the id of its parent so verification can walk from a leaf up to
//! the root without owning links in both directions.

use crate::{
    config::TreeConfig,
    error::Error,
    hash::{DigestProvider, MerkleHash, Sha256},
    record::{hash_record, Record},
};
use log::debug;
use std::{fmt, marker::PhantomData};

/// Index of a node in the tree's arena
pub type NodeId = usize;

/// What sits directly beneath a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Children {
    /// Two nodes of the layer below
    Pair(NodeId, NodeId),
    /// A node promoted unpaired from an odd sized layer
    Carry(NodeId),
    /// Base layer: indices of one or two records
    Records(usize, Option<usize>),
}

/// A single position in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub(crate) digest: MerkleHash,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Children,
}

impl TreeNode {
    fn new(digest: MerkleHash, children: Children) -> Self {
        Self {
            digest,
            parent: None,
            children,
        }
    }

    /// Digest committing to everything beneath this node
    pub fn digest(&self) -> &MerkleHash {
        &self.digest
    }

    /// Parent of this node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> Children {
        self.children
    }

    /// Whether this node sits on the base layer and summarizes records
    pub fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Records(..))
    }
}

/// Merkle Tree data structure.
///
/// The tree does not hold the records themselves. It keeps the digest of
/// each record as computed at build time; verification is handed the
/// caller's current records and compares them against those commitments.
pub struct MerkleTree<R: Record, HF: DigestProvider = Sha256> {
    _marker: PhantomData<(fn(&R), HF)>,
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) record_digests: Vec<MerkleHash>,
    pub(crate) record_leaves: Vec<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) depth: usize,
    pub(crate) config: TreeConfig,
}

impl<R: Record, HF: DigestProvider> MerkleTree<R, HF> {
    /// Build a tree over `records` with the default configuration
    pub fn build(records: &[R]) -> Result<Self, Error> {
        Self::build_with_config(records, TreeConfig::default())
    }

    /// Build a tree over `records`, pairing nodes left to right layer by
    /// layer until a single root remains
    pub fn build_with_config(records: &[R], config: TreeConfig) -> Result<Self, Error> {
        if records.len() < 2 {
            return Err(Error::InsufficientRecords(records.len()));
        }

        let record_digests: Vec<MerkleHash> = records.iter().map(hash_record::<HF, R>).collect();
        let mut nodes = Vec::with_capacity(2 * records.len());
        let mut record_leaves = vec![0; records.len()];

        // Base layer, an unpaired last record keeps its own digest
        let mut layer = Vec::with_capacity((records.len() + 1) / 2);
        for (pair_index, pair) in record_digests.chunks(2).enumerate() {
            let left = pair_index * 2;
            let id = nodes.len();
            let node = match pair {
                [left_digest, right_digest] => TreeNode::new(
                    HF::hash_pair(left_digest, right_digest),
                    Children::Records(left, Some(left + 1)),
                ),
                [single] => TreeNode::new(*single, Children::Records(left, None)),
                _ => unreachable!("chunks(2) yields one or two records"),
            };
            record_leaves[left] = id;
            if pair.len() == 2 {
                record_leaves[left + 1] = id;
            }
            nodes.push(node);
            layer.push(id);
        }

        let mut depth = 1;
        while layer.len() > 1 {
            let mut next = Vec::with_capacity((layer.len() + 1) / 2);
            for pair in layer.chunks(2) {
                let id = nodes.len();
                let node = match *pair {
                    [left, right] => {
                        nodes[left].parent = Some(id);
                        nodes[right].parent = Some(id);
                        TreeNode::new(
                            HF::hash_pair(&nodes[left].digest, &nodes[right].digest),
                            Children::Pair(left, right),
                        )
                    }
                    [single] => {
                        nodes[single].parent = Some(id);
                        TreeNode::new(nodes[single].digest, Children::Carry(single))
                    }
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                };
                nodes.push(node);
                next.push(id);
            }
            layer = next;
            depth += 1;
        }

        // Leaves must stay within reach of the bounded search
        if depth - 1 > config.max_depth {
            return Err(Error::ExceededMaxDepth(depth - 1, config.max_depth));
        }

        let root = layer[0];
        debug!(
            "built merkle tree over {} records: {} nodes, depth {}, root {}",
            records.len(),
            nodes.len(),
            depth,
            nodes[root].digest
        );

        Ok(Self {
            _marker: PhantomData,
            nodes,
            record_digests,
            record_leaves,
            root,
            depth,
            config,
        })
    }

    /// Get the merkle root of the tree
    pub fn root(&self) -> &MerkleHash {
        &self.nodes[self.root].digest
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Result<&TreeNode, Error> {
        self.nodes
            .get(id)
            .ok_or(Error::ExceededMaxIndex(id, self.nodes.len()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of records committed to by the tree
    pub fn len(&self) -> usize {
        self.record_digests.len()
    }

    /// Always false, a tree holds at least two records
    pub fn is_empty(&self) -> bool {
        self.record_digests.is_empty()
    }

    /// Number of node layers, the base layer included
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Digest of a record as computed when the tree was built
    pub fn record_digest(&self, index: usize) -> Result<&MerkleHash, Error> {
        self.record_digests
            .get(index)
            .ok_or(Error::ExceededMaxIndex(index, self.record_digests.len()))
    }

    /// Base layer node holding the record at `index`
    pub fn leaf_of(&self, index: usize) -> Result<NodeId, Error> {
        self.record_leaves
            .get(index)
            .copied()
            .ok_or(Error::ExceededMaxIndex(index, self.record_leaves.len()))
    }

    /// Visit every node depth first, left child before right, passing the
    /// node's id and its layer counted from the root at 0
    pub fn for_each_node<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &TreeNode, usize),
    {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            let node = &self.nodes[id];
            visit(id, node, level);
            match node.children {
                Children::Pair(left, right) => {
                    stack.push((right, level + 1));
                    stack.push((left, level + 1));
                }
                Children::Carry(child) => stack.push((child, level + 1)),
                Children::Records(..) => {}
            }
        }
    }

    /// Visit every record in input order with its build time digest
    pub fn for_each_leaf<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &MerkleHash),
    {
        self.for_each_node(|_, node, _| {
            if let Children::Records(left, right) = node.children {
                visit(left, &self.record_digests[left]);
                if let Some(right) = right {
                    visit(right, &self.record_digests[right]);
                }
            }
        });
    }
}

impl<R: Record, HF: DigestProvider> fmt::Debug for MerkleTree<R, HF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("root", &self.nodes[self.root].digest)
            .field("records", &self.record_digests.len())
            .field("nodes", &self.nodes.len())
            .field("depth", &self.depth)
            .finish()
    }
}

/// Build a SHA-256 tree over `records`
pub fn build_tree<R: Record>(records: &[R]) -> Result<MerkleTree<R>, Error> {
    MerkleTree::build(records)
}
