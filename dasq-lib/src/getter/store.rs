use crate::{
    codec::ReedSolomonCodec,
    config::StoreGetterConfig,
    context::Context,
    dah::DataAvailabilityHeader,
    eds::{Axis, ExtendedDataSquare},
    errors::DasqError,
    getter::Getter,
    namespaced_shares::{NamespacedShares, RowNamespacedShares, candidate_rows},
    nmt::{NamespaceMerkleTree, NamespaceProof},
    share::{Namespace, Share},
    store::{ShareKey, ShareStore},
};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, future::try_join_all, stream};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, warn};

/// Getter reading shares out of a local `ShareStore`. Whatever it returns was first verified against a full row or column
/// root of the header, decoding that row or column when the store holds only part of it.
pub struct StoreGetter<S> {
    store: Arc<S>,
    config: StoreGetterConfig,
}

impl<S: ShareStore> StoreGetter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, StoreGetterConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: StoreGetterConfig) -> Self {
        StoreGetter { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reads every cell of one row or column, `None` where the store has nothing.
    async fn fetch_line(&self, ctx: &Context, dah: &DataAvailabilityHeader, axis: Axis, index: usize) -> Result<Vec<Option<Share>>, DasqError> {
        let dah_hash = dah.hash();

        let fetches = (0..dah.square_width()).map(|position| {
            let (row, col) = axis.coordinate(index, position);
            let key = ShareKey { dah_hash, row, col };

            async move {
                match self.store.get(&key).await {
                    Ok(share) => Ok(Some(share)),
                    Err(DasqError::NotFound(..)) => Ok(None),
                    Err(err) => Err(err),
                }
            }
        });

        ctx.run(try_join_all(fetches)).await
    }

    /// Fetches one row or column, erasure decodes it if incomplete, and checks it against its root in `dah`.
    async fn recover_line(&self, ctx: &Context, dah: &DataAvailabilityHeader, axis: Axis, index: usize) -> Result<Vec<Share>, DasqError> {
        let width = dah.square_width();
        let cells = self.fetch_line(ctx, dah, axis, index).await?;
        let present = cells.iter().filter(|cell| cell.is_some()).count();

        let shares = if present == width {
            cells.into_iter().flatten().collect::<Vec<Share>>()
        } else if present >= width / 2 {
            debug!(?axis, index, present, "decoding incomplete line");
            ReedSolomonCodec::new(width / 2)?
                .decode(cells)
                .map_err(|_| DasqError::ShareVerificationFailed(axis, index))?
        } else {
            let missing = cells.iter().position(Option::is_none).unwrap_or_default();
            let (row, col) = axis.coordinate(index, missing);
            return Err(DasqError::ShareUnavailable(row, col));
        };

        dah.verify_axis(axis, index, &shares).inspect_err(|_| warn!(?axis, index, "stored line doesn't match its root"))?;
        Ok(shares)
    }
}

#[async_trait]
impl<S: ShareStore> Getter for StoreGetter<S> {
    #[tracing::instrument(skip_all, fields(row = row, col = col))]
    async fn get_share(&self, ctx: &Context, dah: &DataAvailabilityHeader, row: usize, col: usize) -> Result<Share, DasqError> {
        let width = dah.square_width();
        if row >= width || col >= width {
            return Err(DasqError::OutOfBounds(row, col, width));
        }

        match self.recover_line(ctx, dah, Axis::Row, row).await {
            Ok(shares) => Ok(shares[col].clone()),
            Err(err) if err.is_recoverable() => {
                debug!(row, col, "row unrecoverable, falling back to column");

                self.recover_line(ctx, dah, Axis::Col, col)
                    .await
                    .map(|shares| shares[row].clone())
                    .map_err(|err| if err.is_recoverable() { DasqError::ShareUnavailable(row, col) } else { err })
            }
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(skip_all, fields(namespace = ?namespace))]
    async fn get_shares_by_namespace(&self, ctx: &Context, dah: &DataAvailabilityHeader, namespace: Namespace) -> Result<NamespacedShares, DasqError> {
        if dah.is_empty() || namespace == Namespace::PARITY {
            return Err(DasqError::NamespaceNotFound);
        }

        let rows = candidate_rows(dah, namespace);
        if rows.is_empty() {
            return Err(DasqError::NamespaceNotFound);
        }

        let width = dah.square_width();
        let by_row = stream::iter(rows)
            .map(|row_index| async move {
                let shares = self.recover_line(ctx, dah, Axis::Row, row_index).await?;
                let tree = NamespaceMerkleTree::for_axis(Axis::Row, row_index, &shares, width / 2)?;

                let proof = tree.prove_namespace(namespace);
                let found = match &proof {
                    NamespaceProof::Inclusion { start, end, .. } => shares[*start..*end].to_vec(),
                    _ => Vec::new(),
                };

                Ok::<_, DasqError>((
                    row_index,
                    RowNamespacedShares {
                        row_index,
                        shares: found,
                        proof,
                    },
                ))
            })
            .buffer_unordered(self.config.max_concurrent_rows.max(1))
            .try_collect::<BTreeMap<usize, RowNamespacedShares>>()
            .await?;

        let namespaced = NamespacedShares::new(by_row.into_values().collect());
        if namespaced.is_empty() {
            return Err(DasqError::NamespaceNotFound);
        }

        debug!(rows = namespaced.rows().len(), shares = namespaced.flatten().len(), "retrieved namespace");
        Ok(namespaced)
    }

    #[tracing::instrument(skip_all, fields(width = dah.square_width()))]
    async fn get_eds(&self, ctx: &Context, dah: &DataAvailabilityHeader) -> Result<ExtendedDataSquare, DasqError> {
        let rows = stream::iter(0..dah.square_width())
            .map(|row| self.fetch_line(ctx, dah, Axis::Row, row))
            .buffered(self.config.max_concurrent_rows.max(1))
            .try_collect::<Vec<Vec<Option<Share>>>>()
            .await?;

        let cells = rows.into_iter().flatten().collect::<Vec<Option<Share>>>();
        let missing = cells.iter().filter(|cell| cell.is_none()).count();
        debug!(missing, "fetched extended data square");

        ExtendedDataSquare::repair(dah, cells)
    }
}
