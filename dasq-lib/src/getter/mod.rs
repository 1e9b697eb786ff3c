mod cascade;
mod store;

pub use cascade::CascadeGetter;
pub use store::StoreGetter;

use crate::{
    context::Context, dah::DataAvailabilityHeader, eds::ExtendedDataSquare, errors::DasqError, namespaced_shares::NamespacedShares,
    share::Namespace,
};
use async_trait::async_trait;

/// Retrieval of data committed to by a `DataAvailabilityHeader`. Every implementation verifies what it returns against the
/// header, whatever the source: a local store, the network, or other getters it composes.
#[async_trait]
pub trait Getter: Send + Sync {
    /// Returns the share at `(row, col)` of the extended square.
    ///
    /// Fails with `DasqError::OutOfBounds` for coordinates outside the square, and `DasqError::ShareUnavailable` if no
    /// source yields a share which verifies.
    async fn get_share(&self, ctx: &Context, dah: &DataAvailabilityHeader, row: usize, col: usize) -> Result<crate::share::Share, DasqError>;

    /// Returns all shares of `namespace`, grouped by row in ascending order, with proofs.
    ///
    /// Fails with `DasqError::NamespaceNotFound` if the header has no rows, or none of its rows holds `namespace`.
    async fn get_shares_by_namespace(&self, ctx: &Context, dah: &DataAvailabilityHeader, namespace: Namespace) -> Result<NamespacedShares, DasqError>;

    /// Reconstructs the whole extended square, which is checked to recompute to `dah`.
    ///
    /// Fails with `DasqError::HeaderMismatch` when the square served doesn't match the commitment.
    async fn get_eds(&self, ctx: &Context, dah: &DataAvailabilityHeader) -> Result<ExtendedDataSquare, DasqError>;
}
