use crate::{errors::DasqError, share::Share};
use reed_solomon_erasure::galois_8::ReedSolomon;

/// Systematic Reed-Solomon codec over GF(2^8), turning `k` original shares of a row or column into a `2k` long codeword,
/// any `k` shares of which are enough to recover the rest.
pub struct ReedSolomonCodec {
    original_width: usize,
    inner: ReedSolomon,
}

impl ReedSolomonCodec {
    /// Creates a codec for axes of `original_width` original shares, extended to twice that length.
    pub fn new(original_width: usize) -> Result<Self, DasqError> {
        let inner = ReedSolomon::new(original_width, original_width).map_err(|err| DasqError::ErasureCodingFailed(err.to_string()))?;

        Ok(ReedSolomonCodec { original_width, inner })
    }

    pub fn original_width(&self) -> usize {
        self.original_width
    }

    /// Computes parity shares for `original` shares of a single row or column.
    ///
    /// # Arguments
    ///
    /// * `original` - Exactly `original_width` equally sized shares.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<Share>, DasqError>` - The `original_width` parity shares, to be appended after the original ones.
    pub fn encode(&self, original: &[Share]) -> Result<Vec<Share>, DasqError> {
        if original.len() != self.original_width {
            return Err(DasqError::InvalidShareCount(original.len()));
        }

        let share_size = original[0].len();
        let mut shards = original.iter().map(|share| share.as_bytes().to_vec()).collect::<Vec<Vec<u8>>>();
        shards.resize(2 * self.original_width, vec![0u8; share_size]);

        self.inner.encode(&mut shards).map_err(|err| DasqError::ErasureCodingFailed(err.to_string()))?;

        shards.split_off(self.original_width).into_iter().map(Share::new).collect()
    }

    /// Fills in every missing share of a partially known `2 * original_width` long codeword.
    ///
    /// # Arguments
    ///
    /// * `axis` - Row or column where `None` marks a missing share. At least `original_width` entries must be present.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<Share>, DasqError>` - The complete codeword, or `DasqError::ErasureCodingFailed` if too few shares are
    ///   present or they're of uneven size.
    pub fn decode(&self, axis: Vec<Option<Share>>) -> Result<Vec<Share>, DasqError> {
        if axis.len() != 2 * self.original_width {
            return Err(DasqError::InvalidShareCount(axis.len()));
        }

        let mut shards = axis.into_iter().map(|share| share.map(Share::into_bytes)).collect::<Vec<Option<Vec<u8>>>>();
        self.inner.reconstruct(&mut shards).map_err(|err| DasqError::ErasureCodingFailed(err.to_string()))?;

        shards
            .into_iter()
            .map(|shard| shard.ok_or_else(|| DasqError::ErasureCodingFailed("shard left missing after reconstruction".to_string())).and_then(Share::new))
            .collect()
    }
}
