use crate::{
    consts::DASQ_BINCODE_CONFIG,
    eds::{Axis, ExtendedDataSquare},
    errors::DasqError,
    nmt::{NamespaceMerkleTree, NamespacedHash},
    share::Share,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Commitment to an extended data square: one namespaced Merkle root per row and per column. Two headers are equal iff both
/// root sequences are equal element-wise.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DataAvailabilityHeader {
    row_roots: Vec<NamespacedHash>,
    column_roots: Vec<NamespacedHash>,
}

impl DataAvailabilityHeader {
    /// Builds a namespaced Merkle tree over every row and every column of `eds`, and collects their roots.
    pub fn from_eds(eds: &ExtendedDataSquare) -> Result<Self, DasqError> {
        let axis_roots = |axis: Axis| {
            (0..eds.width())
                .into_par_iter()
                .map(|index| Ok(NamespaceMerkleTree::for_axis(axis, index, &eds.axis(axis, index)?, eds.original_width())?.root()))
                .collect::<Result<Vec<NamespacedHash>, DasqError>>()
        };

        let (row_roots, column_roots) = rayon::join(|| axis_roots(Axis::Row), || axis_roots(Axis::Col));

        Ok(DataAvailabilityHeader {
            row_roots: row_roots?,
            column_roots: column_roots?,
        })
    }

    /// Header of no square at all. Nothing can ever be retrieved or sampled against it.
    pub fn empty() -> Self {
        DataAvailabilityHeader {
            row_roots: Vec::new(),
            column_roots: Vec::new(),
        }
    }

    /// Builds a header straight from root sequences, e.g. received from elsewhere.
    pub fn from_roots(row_roots: Vec<NamespacedHash>, column_roots: Vec<NamespacedHash>) -> Result<Self, DasqError> {
        if row_roots.len() != column_roots.len() || row_roots.len() % 2 != 0 {
            return Err(DasqError::DataAvailabilityHeaderDeserializationFailed(
                "number of row and column roots must be equal and even".to_string(),
            ));
        }

        Ok(DataAvailabilityHeader { row_roots, column_roots })
    }

    pub fn row_roots(&self) -> &[NamespacedHash] {
        &self.row_roots
    }

    pub fn column_roots(&self) -> &[NamespacedHash] {
        &self.column_roots
    }

    pub fn row_root(&self, index: usize) -> Option<&NamespacedHash> {
        self.row_roots.get(index)
    }

    pub fn column_root(&self, index: usize) -> Option<&NamespacedHash> {
        self.column_roots.get(index)
    }

    pub fn axis_root(&self, axis: Axis, index: usize) -> Option<&NamespacedHash> {
        match axis {
            Axis::Row => self.row_root(index),
            Axis::Col => self.column_root(index),
        }
    }

    /// Width of the extended square this header commits to; zero for the empty header.
    pub fn square_width(&self) -> usize {
        self.row_roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_roots.is_empty()
    }

    /// Identity of this header, used to key shares of its square in a content store.
    pub fn hash(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        self.row_roots.iter().chain(self.column_roots.iter()).for_each(|root| root.hasher_update(&mut hasher));
        hasher.finalize()
    }

    /// Checks that a full row or column of shares recomputes to the committed root.
    ///
    /// # Arguments
    ///
    /// * `axis` - Whether `shares` form a row or a column.
    /// * `index` - Index of the row or column.
    /// * `shares` - All `square_width` shares of it, in order.
    ///
    /// # Returns
    ///
    /// * `Result<(), DasqError>` - `DasqError::OutOfBounds` for an index past the square, `DasqError::ShareVerificationFailed`
    ///   if the recomputed root differs.
    pub fn verify_axis(&self, axis: Axis, index: usize, shares: &[Share]) -> Result<(), DasqError> {
        let width = self.square_width();
        let root = self.axis_root(axis, index).ok_or_else(|| {
            let (row, col) = axis.coordinate(index, 0);
            DasqError::OutOfBounds(row, col, width)
        })?;

        if shares.len() != width {
            return Err(DasqError::ShareVerificationFailed(axis, index));
        }

        let tree = NamespaceMerkleTree::for_axis(axis, index, shares, width / 2).map_err(|_| DasqError::ShareVerificationFailed(axis, index))?;
        if tree.root() != *root {
            return Err(DasqError::ShareVerificationFailed(axis, index));
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn clear_row_roots(&mut self) {
        self.row_roots.clear();
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DasqError> {
        bincode::serde::encode_to_vec(self, DASQ_BINCODE_CONFIG).map_err(|err| DasqError::DataAvailabilityHeaderSerializationFailed(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), DasqError> {
        match bincode::serde::decode_from_slice::<DataAvailabilityHeader, bincode::config::Configuration>(bytes, DASQ_BINCODE_CONFIG) {
            Ok((header, n)) => Ok((Self::from_roots(header.row_roots, header.column_roots)?, n)),
            Err(err) => Err(DasqError::DataAvailabilityHeaderDeserializationFailed(err.to_string())),
        }
    }
}
