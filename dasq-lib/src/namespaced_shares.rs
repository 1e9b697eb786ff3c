use crate::{
    consts::DASQ_BINCODE_CONFIG,
    dah::DataAvailabilityHeader,
    errors::DasqError,
    nmt::{NamespaceMerkleTree, NamespaceProof},
    share::{Namespace, Share},
};
use serde::{Deserialize, Serialize};

/// Shares of one namespace found in a single row of the original quadrant, along with a proof that they're all of them.
/// An empty `shares` goes with an absence proof, showing the row holds none of the namespace.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct RowNamespacedShares {
    pub row_index: usize,
    pub shares: Vec<Share>,
    pub proof: NamespaceProof,
}

impl RowNamespacedShares {
    /// Verifies this row's proof against its root in `dah`.
    pub fn verify(&self, dah: &DataAvailabilityHeader, namespace: Namespace) -> Result<(), DasqError> {
        let root = dah.row_root(self.row_index).ok_or(DasqError::OutOfBounds(self.row_index, 0, dah.square_width()))?;

        if NamespaceMerkleTree::verify_proof(root, namespace, &self.shares, &self.proof, dah.square_width()) {
            Ok(())
        } else {
            Err(DasqError::InvalidNamespaceProof(self.row_index))
        }
    }
}

/// All shares of a namespace in a square, as per-row groups in ascending row order.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct NamespacedShares {
    rows: Vec<RowNamespacedShares>,
}

impl NamespacedShares {
    pub fn new(rows: Vec<RowNamespacedShares>) -> Self {
        NamespacedShares { rows }
    }

    pub fn rows(&self) -> &[RowNamespacedShares] {
        &self.rows
    }

    /// All shares of every row, in row order.
    pub fn flatten(&self) -> Vec<Share> {
        self.rows.iter().flat_map(|row| row.shares.iter().cloned()).collect()
    }

    /// Whether any row actually holds shares of the namespace.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.shares.is_empty())
    }

    /// Checks these shares are exactly the shares of `namespace` committed to by `dah`: each row whose root's namespace range
    /// could hold `namespace` must be present, in order, with a valid proof, and no other row may appear.
    ///
    /// # Arguments
    ///
    /// * `dah` - Trusted commitment to the square.
    /// * `namespace` - Namespace the shares were retrieved for.
    ///
    /// # Returns
    ///
    /// * `Result<(), DasqError>` - `DasqError::MissingNamespaceRow` if a candidate row is missing or out of place,
    ///   `DasqError::InvalidNamespaceProof` if a row doesn't verify.
    pub fn verify(&self, dah: &DataAvailabilityHeader, namespace: Namespace) -> Result<(), DasqError> {
        let candidate_rows = candidate_rows(dah, namespace);

        if let Some(extra) = self.rows.get(candidate_rows.len()) {
            return Err(DasqError::InvalidNamespaceProof(extra.row_index));
        }

        candidate_rows.iter().enumerate().try_for_each(|(position, &row_index)| match self.rows.get(position) {
            Some(row) if row.row_index == row_index => row.verify(dah, namespace),
            _ => Err(DasqError::MissingNamespaceRow(row_index)),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DasqError> {
        bincode::serde::encode_to_vec(self, DASQ_BINCODE_CONFIG).map_err(|err| DasqError::NamespacedSharesSerializationFailed(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), DasqError> {
        bincode::serde::decode_from_slice::<NamespacedShares, bincode::config::Configuration>(bytes, DASQ_BINCODE_CONFIG)
            .map_err(|err| DasqError::NamespacedSharesDeserializationFailed(err.to_string()))
    }
}

/// Indices of rows whose root's namespace range could contain `namespace`, ascending.
pub(crate) fn candidate_rows(dah: &DataAvailabilityHeader, namespace: Namespace) -> Vec<usize> {
    dah.row_roots()
        .iter()
        .enumerate()
        .filter(|(_, root)| root.contains(namespace))
        .map(|(row_index, _)| row_index)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        dah::DataAvailabilityHeader,
        eds::{Axis, ExtendedDataSquare},
        errors::DasqError,
        namespaced_shares::{NamespacedShares, RowNamespacedShares, candidate_rows},
        nmt::NamespaceMerkleTree,
        share::{Namespace, tests::random_sorted_shares},
    };

    fn collect_from_eds(eds: &ExtendedDataSquare, dah: &DataAvailabilityHeader, namespace: Namespace) -> NamespacedShares {
        NamespacedShares::new(
            candidate_rows(dah, namespace)
                .into_iter()
                .map(|row_index| {
                    let row = eds.axis(Axis::Row, row_index).unwrap();
                    let tree = NamespaceMerkleTree::for_axis(Axis::Row, row_index, &row, eds.original_width()).unwrap();

                    RowNamespacedShares {
                        row_index,
                        shares: row.into_iter().filter(|share| share.namespace() == namespace).collect(),
                        proof: tree.prove_namespace(namespace),
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_verify_and_serialization() {
        let original = random_sorted_shares(16, &mut rand::rng());
        let eds = ExtendedDataSquare::new(original.clone()).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
        let namespace = original[9].namespace();

        let namespaced = collect_from_eds(&eds, &dah, namespace);
        assert_eq!(namespaced.verify(&dah, namespace), Ok(()));
        assert_eq!(namespaced.flatten(), vec![original[9].clone()]);

        let bytes = namespaced.to_bytes().expect("Must be able to serialize");
        let (decoded, n) = NamespacedShares::from_bytes(&bytes).expect("Must be able to deserialize");
        assert_eq!(n, bytes.len());
        assert_eq!(decoded.verify(&dah, namespace), Ok(()));
    }

    #[test]
    fn test_dropping_a_row_is_detected() {
        let mut original = random_sorted_shares(16, &mut rand::rng());
        let namespace = original[7].namespace();
        original[8] = crate::share::Share::from_payload(namespace, b"same namespace, next row", original[8].len()).unwrap();

        let eds = ExtendedDataSquare::new(original).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();

        let namespaced = collect_from_eds(&eds, &dah, namespace);
        assert_eq!(namespaced.flatten().len(), 2);
        assert_eq!(namespaced.verify(&dah, namespace), Ok(()));

        let truncated = NamespacedShares::new(namespaced.rows()[..1].to_vec());
        assert!(matches!(truncated.verify(&dah, namespace), Err(DasqError::MissingNamespaceRow(_))));
    }

    #[test]
    fn test_withholding_a_share_is_detected() {
        let mut original = random_sorted_shares(16, &mut rand::rng());
        let namespace = original[4].namespace();
        original[5] = crate::share::Share::from_payload(namespace, b"second", original[5].len()).unwrap();

        let eds = ExtendedDataSquare::new(original).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();

        let mut namespaced = collect_from_eds(&eds, &dah, namespace);
        assert_eq!(namespaced.rows().len(), 1);

        namespaced.rows[0].shares.pop();
        assert_eq!(namespaced.verify(&dah, namespace), Err(DasqError::InvalidNamespaceProof(1)));
    }
}
