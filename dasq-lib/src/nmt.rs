use crate::{
    consts::{NMT_LEAF_PREFIX, NMT_NODE_PREFIX},
    eds::Axis,
    errors::DasqError,
    share::{Namespace, Share},
};
use serde::{Deserialize, Serialize};

/// Node of a namespaced Merkle tree: the BLAKE3 digest of a subtree, along with the smallest and largest namespace of the
/// leaves it covers. Leaves carrying `Namespace::PARITY` don't widen the maximum, unless the subtree is all parity.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NamespacedHash {
    min: Namespace,
    max: Namespace,
    digest: blake3::Hash,
}

impl NamespacedHash {
    pub fn min_namespace(&self) -> Namespace {
        self.min
    }

    pub fn max_namespace(&self) -> Namespace {
        self.max
    }

    pub fn digest(&self) -> blake3::Hash {
        self.digest
    }

    /// Whether `namespace` falls within the namespace range covered by this node.
    pub fn contains(&self, namespace: Namespace) -> bool {
        self.min <= namespace && namespace <= self.max
    }

    fn is_leaf_shaped(&self) -> bool {
        self.min == self.max
    }

    pub(crate) fn hasher_update(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.min.as_bytes()).update(self.max.as_bytes()).update(self.digest.as_bytes());
    }

    fn leaf(namespace: Namespace, data: &[u8]) -> Self {
        let digest = blake3::Hasher::new().update(&[NMT_LEAF_PREFIX]).update(namespace.as_bytes()).update(data).finalize();

        NamespacedHash {
            min: namespace,
            max: namespace,
            digest,
        }
    }

    fn parent(left: &NamespacedHash, right: &NamespacedHash) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[NMT_NODE_PREFIX]);
        left.hasher_update(&mut hasher);
        right.hasher_update(&mut hasher);

        let max = if left.min == Namespace::PARITY {
            Namespace::PARITY
        } else if right.min == Namespace::PARITY {
            left.max
        } else {
            left.max.max(right.max)
        };

        NamespacedHash {
            min: left.min.min(right.min),
            max,
            digest: hasher.finalize(),
        }
    }
}

/// Proof about a namespace's presence in a namespaced Merkle tree. Exactly one of three shapes, so that verification has to
/// handle each of them.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum NamespaceProof {
    /// Leaves `[start, end)` are all the leaves of the namespace; `nodes` are the roots of the subtrees around that range,
    /// in left to right order.
    Inclusion { start: usize, end: usize, nodes: Vec<NamespacedHash> },
    /// Leaves `start` and `start + 1` are adjacent, and the queried namespace sorts strictly between theirs.
    Absence {
        start: usize,
        left_boundary: NamespacedHash,
        right_boundary: NamespacedHash,
        nodes: Vec<NamespacedHash>,
    },
    /// The queried namespace is outside the namespace range of the root itself.
    OutsideRange,
}

impl NamespaceProof {
    pub fn is_inclusion(&self) -> bool {
        matches!(self, NamespaceProof::Inclusion { .. })
    }

    pub fn is_absence(&self) -> bool {
        !self.is_inclusion()
    }
}

/// Binary Merkle tree over namespace-sorted leaves, supporting inclusion proofs for the complete range of a namespace and
/// absence proofs for namespaces with no leaves. Splits follow RFC 6962, so any number of leaves is supported.
pub struct NamespaceMerkleTree {
    namespaces: Vec<Namespace>,
    leaves: Vec<NamespacedHash>,
    root: NamespacedHash,
}

impl NamespaceMerkleTree {
    /// Builds a tree over `(namespace, data)` leaf pairs.
    ///
    /// # Arguments
    ///
    /// * `leaves` - Leaves in tree order. Their namespaces must be non-decreasing.
    ///
    /// # Returns
    ///
    /// * `Result<Self, DasqError>` - The tree, `DasqError::NoLeavesToBuildTreeOn` if there are no leaves, or
    ///   `DasqError::UnsortedShares` with the index of the first out-of-order leaf.
    pub fn new<'a>(leaves: impl IntoIterator<Item = (Namespace, &'a [u8])>) -> Result<Self, DasqError> {
        let (namespaces, leaves): (Vec<Namespace>, Vec<NamespacedHash>) =
            leaves.into_iter().map(|(namespace, data)| (namespace, NamespacedHash::leaf(namespace, data))).unzip();

        if leaves.is_empty() {
            return Err(DasqError::NoLeavesToBuildTreeOn);
        }
        if let Some(idx) = namespaces.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(DasqError::UnsortedShares(idx + 1));
        }

        let root = Self::subtree_root(&leaves);
        Ok(NamespaceMerkleTree { namespaces, leaves, root })
    }

    /// Builds the tree of a full row or column of an extended square. Shares outside the original `original_width` wide
    /// quadrant are committed to under `Namespace::PARITY`.
    pub fn for_axis(axis: Axis, index: usize, shares: &[Share], original_width: usize) -> Result<Self, DasqError> {
        Self::new(shares.iter().enumerate().map(|(position, share)| {
            let (row, col) = axis.coordinate(index, position);
            let namespace = if row < original_width && col < original_width {
                share.namespace()
            } else {
                Namespace::PARITY
            };

            (namespace, share.as_bytes())
        }))
    }

    pub fn root(&self) -> NamespacedHash {
        self.root
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Generates a proof of inclusion for leaves `[start, end)`.
    pub fn prove_range(&self, start: usize, end: usize) -> Result<Vec<NamespacedHash>, DasqError> {
        if start >= end || end > self.leaves.len() {
            return Err(DasqError::InvalidLeafRange(start, end, self.leaves.len()));
        }

        Ok(self.range_proof_nodes(start, end))
    }

    /// Proves either that `namespace` occupies a contiguous range of leaves, and no leaf outside it, or that no leaf
    /// carries `namespace`.
    pub fn prove_namespace(&self, namespace: Namespace) -> NamespaceProof {
        if !self.root.contains(namespace) {
            return NamespaceProof::OutsideRange;
        }

        let start = self.namespaces.partition_point(|&ns| ns < namespace);
        let end = self.namespaces.partition_point(|&ns| ns <= namespace);

        if start < end {
            return NamespaceProof::Inclusion {
                start,
                end,
                nodes: self.range_proof_nodes(start, end),
            };
        }

        // root.min < namespace < root.max, so there's a smaller leaf before `start` and a larger one at it
        NamespaceProof::Absence {
            start: start - 1,
            left_boundary: self.leaves[start - 1],
            right_boundary: self.leaves[start],
            nodes: self.range_proof_nodes(start - 1, start + 1),
        }
    }

    /// Verifies a namespace proof against a trusted root.
    ///
    /// # Arguments
    ///
    /// * `root` - Root of the tree, taken from a trusted commitment.
    /// * `namespace` - The queried namespace.
    /// * `leaves` - Shares claimed to be all the shares of `namespace`. Must be empty for absence proofs.
    /// * `proof` - Proof returned by `prove_namespace`.
    /// * `num_leaves` - Number of leaves in the tree, which fixes its shape.
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if `proof` recomputes `root` and shows `leaves` to be complete, or shows `namespace` absent.
    pub fn verify_proof(root: &NamespacedHash, namespace: Namespace, leaves: &[Share], proof: &NamespaceProof, num_leaves: usize) -> bool {
        match proof {
            NamespaceProof::OutsideRange => leaves.is_empty() && !root.contains(namespace),
            NamespaceProof::Inclusion { start, end, nodes } => {
                if start >= end || *end > num_leaves || end - start != leaves.len() {
                    return false;
                }
                if leaves.iter().any(|share| share.namespace() != namespace) {
                    return false;
                }

                let hashes = leaves.iter().map(|share| NamespacedHash::leaf(namespace, share.as_bytes()));
                Self::recompute_root(num_leaves, *start, *end, hashes, nodes, Some(namespace)).is_some_and(|computed| computed == *root)
            }
            NamespaceProof::Absence {
                start,
                left_boundary,
                right_boundary,
                nodes,
            } => {
                if !leaves.is_empty() || start + 2 > num_leaves {
                    return false;
                }
                if !left_boundary.is_leaf_shaped() || !right_boundary.is_leaf_shaped() {
                    return false;
                }
                if !(left_boundary.max < namespace && namespace < right_boundary.min) {
                    return false;
                }

                let hashes = [*left_boundary, *right_boundary].into_iter();
                Self::recompute_root(num_leaves, *start, start + 2, hashes, nodes, None).is_some_and(|computed| computed == *root)
            }
        }
    }

    fn recompute_root(
        num_leaves: usize,
        start: usize,
        end: usize,
        mut leaves: impl Iterator<Item = NamespacedHash>,
        nodes: &[NamespacedHash],
        completeness: Option<Namespace>,
    ) -> Option<NamespacedHash> {
        let mut nodes = nodes.iter();
        let root = Self::recompute_subtree(0, num_leaves, start, end, &mut leaves, &mut nodes, completeness)?;

        if leaves.next().is_some() || nodes.next().is_some() {
            return None;
        }

        Some(root)
    }

    fn recompute_subtree<'a>(
        offset: usize,
        size: usize,
        start: usize,
        end: usize,
        leaves: &mut impl Iterator<Item = NamespacedHash>,
        nodes: &mut impl Iterator<Item = &'a NamespacedHash>,
        completeness: Option<Namespace>,
    ) -> Option<NamespacedHash> {
        if offset + size <= start || offset >= end {
            let node = *nodes.next()?;

            if let Some(namespace) = completeness {
                let leaks_left = offset + size <= start && node.max >= namespace;
                let leaks_right = offset >= end && node.min <= namespace;

                if leaks_left || leaks_right {
                    return None;
                }
            }

            return Some(node);
        }

        if size == 1 {
            return leaves.next();
        }

        let split = Self::split_point(size);
        let left = Self::recompute_subtree(offset, split, start, end, leaves, nodes, completeness)?;
        let right = Self::recompute_subtree(offset + split, size - split, start, end, leaves, nodes, completeness)?;

        Some(NamespacedHash::parent(&left, &right))
    }

    fn range_proof_nodes(&self, start: usize, end: usize) -> Vec<NamespacedHash> {
        let mut nodes = Vec::new();
        Self::collect_range_proof(&self.leaves, 0, start, end, &mut nodes);
        nodes
    }

    fn collect_range_proof(leaves: &[NamespacedHash], offset: usize, start: usize, end: usize, nodes: &mut Vec<NamespacedHash>) {
        if offset + leaves.len() <= start || offset >= end {
            nodes.push(Self::subtree_root(leaves));
            return;
        }
        if leaves.len() == 1 {
            return;
        }

        let split = Self::split_point(leaves.len());
        Self::collect_range_proof(&leaves[..split], offset, start, end, nodes);
        Self::collect_range_proof(&leaves[split..], offset + split, start, end, nodes);
    }

    fn subtree_root(leaves: &[NamespacedHash]) -> NamespacedHash {
        if leaves.len() == 1 {
            return leaves[0];
        }

        let split = Self::split_point(leaves.len());
        NamespacedHash::parent(&Self::subtree_root(&leaves[..split]), &Self::subtree_root(&leaves[split..]))
    }

    /// Largest power of two strictly smaller than `size`, which must be at least 2.
    fn split_point(size: usize) -> usize {
        1usize << (size - 1).ilog2()
    }
}
