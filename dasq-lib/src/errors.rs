use crate::{consts::MAX_ORIGINAL_SQUARE_WIDTH, eds::Axis};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DasqError {
    #[error("invalid share count: {0}, expected a non-zero perfect square of equally sized shares")]
    InvalidShareCount(usize),
    #[error("invalid share size: {0}B")]
    InvalidShareSize(usize),
    #[error("shares are not sorted by namespace, first violation at index {0}")]
    UnsortedShares(usize),
    #[error("original square width {0} exceeds maximum {max}", max = MAX_ORIGINAL_SQUARE_WIDTH)]
    SquareTooLarge(usize),
    #[error("original share at index {0} carries the reserved parity namespace")]
    ParityNamespaceInOriginal(usize),
    #[error("coordinate ({0}, {1}) is out of bounds for square of width {2}")]
    OutOfBounds(usize, usize, usize),

    #[error("namespace not found")]
    NamespaceNotFound,
    #[error("recomputed data availability header does not match the expected one")]
    HeaderMismatch,
    #[error("share at ({0}, {1}) is unavailable")]
    ShareUnavailable(usize, usize),
    #[error("shares of {0:?} {1} do not match the committed root")]
    ShareVerificationFailed(Axis, usize),
    #[error("invalid namespace proof for row {0}")]
    InvalidNamespaceProof(usize),
    #[error("namespaced shares are missing row {0}")]
    MissingNamespaceRow(usize),
    #[error("data unavailable: {} of {sampled} samples failed, first failing coordinate {:?}", .failed.len(), .failed.first())]
    Unavailable { sampled: usize, failed: Vec<(usize, usize)> },

    #[error("share at ({0}, {1}) not found in store")]
    NotFound(usize, usize),
    #[error("share store failed: {0}")]
    StoreFailed(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("erasure coding failed: {0}")]
    ErasureCodingFailed(String),
    #[error("no leaf nodes to build namespaced merkle tree on")]
    NoLeavesToBuildTreeOn,
    #[error("invalid leaf range: [{0}, {1}) (num_leaves: {2})")]
    InvalidLeafRange(usize, usize, usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize data availability header: {0}")]
    DataAvailabilityHeaderSerializationFailed(String),
    #[error("failed to deserialize data availability header: {0}")]
    DataAvailabilityHeaderDeserializationFailed(String),
    #[error("failed to serialize namespaced shares: {0}")]
    NamespacedSharesSerializationFailed(String),
    #[error("failed to deserialize namespaced shares: {0}")]
    NamespacedSharesDeserializationFailed(String),
}

impl DasqError {
    /// Whether this error is a plain miss at one source, which another source may be able to serve.
    /// Verification failures, bounds violations and malformed input are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DasqError::NotFound(..) | DasqError::ShareUnavailable(..))
    }
}
