use crate::{dah::DataAvailabilityHeader, eds::ExtendedDataSquare, errors::DasqError, share::Share};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Address of a single share in a content store: the identity of the header committing to its square, and its coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShareKey {
    pub dah_hash: blake3::Hash,
    pub row: usize,
    pub col: usize,
}

impl ShareKey {
    pub fn new(dah: &DataAvailabilityHeader, row: usize, col: usize) -> Self {
        ShareKey {
            dah_hash: dah.hash(),
            row,
            col,
        }
    }
}

/// Key-addressed store of raw shares, which getters read from. Shares it returns are untrusted until verified against the
/// header. Implementations synchronize themselves.
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Returns the share stored under `key`, or `DasqError::NotFound`.
    async fn get(&self, key: &ShareKey) -> Result<Share, DasqError>;

    async fn put(&self, key: ShareKey, share: Share) -> Result<(), DasqError>;
}

/// Writes every share of `eds` to `store`, keyed under `dah`.
pub async fn put_eds<S: ShareStore + ?Sized>(store: &S, dah: &DataAvailabilityHeader, eds: &ExtendedDataSquare) -> Result<(), DasqError> {
    let dah_hash = dah.hash();
    let width = eds.width();

    for (idx, share) in eds.shares().iter().enumerate() {
        let key = ShareKey {
            dah_hash,
            row: idx / width,
            col: idx % width,
        };
        store.put(key, share.clone()).await?;
    }

    debug!(width, dah = %dah_hash, "stored extended data square");
    Ok(())
}

/// Share store kept in process memory.
#[derive(Default)]
pub struct InMemoryShareStore {
    shares: RwLock<HashMap<ShareKey, Share>>,
}

impl InMemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the share under `key`, returning it if there was one.
    pub async fn remove(&self, key: &ShareKey) -> Option<Share> {
        self.shares.write().await.remove(key)
    }

    pub async fn len(&self) -> usize {
        self.shares.read().await.len()
    }
}

#[async_trait]
impl ShareStore for InMemoryShareStore {
    async fn get(&self, key: &ShareKey) -> Result<Share, DasqError> {
        self.shares.read().await.get(key).cloned().ok_or(DasqError::NotFound(key.row, key.col))
    }

    async fn put(&self, key: ShareKey, share: Share) -> Result<(), DasqError> {
        self.shares.write().await.insert(key, share);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        dah::DataAvailabilityHeader,
        eds::ExtendedDataSquare,
        errors::DasqError,
        share::tests::random_sorted_shares,
        store::{InMemoryShareStore, ShareKey, ShareStore, put_eds},
    };

    #[tokio::test]
    async fn test_put_eds_and_get() {
        let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
        let store = InMemoryShareStore::new();

        put_eds(&store, &dah, &eds).await.expect("Must be able to store EDS");
        assert_eq!(store.len().await, 16);

        let key = ShareKey::new(&dah, 3, 1);
        assert_eq!(&store.get(&key).await.unwrap(), eds.share(3, 1).unwrap());

        store.remove(&key).await;
        assert_eq!(store.get(&key).await, Err(DasqError::NotFound(3, 1)));

        // Same coordinate under another header is a different key
        let other = ShareKey::new(&DataAvailabilityHeader::empty(), 0, 0);
        assert_eq!(store.get(&other).await, Err(DasqError::NotFound(0, 0)));
    }
}
