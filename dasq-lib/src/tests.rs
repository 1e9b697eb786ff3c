use crate::{
    Availability, CascadeConfig, CascadeGetter, Context, DataAvailabilityHeader, ExtendedDataSquare, FullAvailability, Getter, InMemoryShareStore,
    LightAvailability, Namespace, SamplerConfig, Share, ShareKey, ShareStore, StoreGetter, errors::DasqError,
    share::tests::{random_namespace, random_sorted_shares},
};
use async_trait::async_trait;
use rand::Rng;
use std::{sync::Arc, time::Duration};

/// Shares of `eds` for which `keep` holds, stored under `dah`.
async fn store_cells(eds: &ExtendedDataSquare, dah: &DataAvailabilityHeader, keep: impl Fn(usize, usize) -> bool) -> Arc<InMemoryShareStore> {
    let store = Arc::new(InMemoryShareStore::new());
    let width = eds.width();

    for row in 0..width {
        for col in (0..width).filter(|&col| keep(row, col)) {
            store.put(ShareKey::new(dah, row, col), eds.share(row, col).unwrap().clone()).await.unwrap();
        }
    }

    store
}

fn with_namespace(share: &Share, namespace: Namespace) -> Share {
    let mut bytes = share.as_bytes().to_vec();
    bytes[..namespace.as_bytes().len()].copy_from_slice(namespace.as_bytes());
    Share::new(bytes).unwrap()
}

fn tampered(share: &Share) -> Share {
    let mut bytes = share.as_bytes().to_vec();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    Share::new(bytes).unwrap()
}

/// Store which never answers.
struct StalledStore;

#[async_trait]
impl ShareStore for StalledStore {
    async fn get(&self, _: &ShareKey) -> Result<Share, DasqError> {
        std::future::pending().await
    }

    async fn put(&self, _: ShareKey, _: Share) -> Result<(), DasqError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_get_share_returns_verified_share_at_every_coordinate() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(16, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let getter = StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await);
    let ctx = Context::background();

    for row in 0..eds.width() {
        for col in 0..eds.width() {
            let share = getter.get_share(&ctx, &dah, row, col).await.expect("Must be able to get share");
            assert_eq!(&share, eds.share(row, col).unwrap());
        }
    }
}

#[tokio::test]
async fn prop_test_get_eds_reproduces_dah() {
    const NUM_TEST_ITERATIONS: usize = 10;

    let mut rng = rand::rng();

    for _ in 0..NUM_TEST_ITERATIONS {
        let k = 1usize << rng.random_range(0..=3);
        let eds = ExtendedDataSquare::new(random_sorted_shares(k * k, &mut rng)).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();

        // Every row keeps a random half of its shares
        let kept = (0..2 * k)
            .map(|_| rand::seq::index::sample(&mut rng, 2 * k, k).into_vec())
            .collect::<Vec<Vec<usize>>>();
        let getter = StoreGetter::new(store_cells(&eds, &dah, |row, col| kept[row].contains(&col)).await);

        let repaired = getter.get_eds(&Context::background(), &dah).await.expect("Must be able to reconstruct square");
        assert_eq!(repaired, eds);
        assert_eq!(DataAvailabilityHeader::from_eds(&repaired).unwrap(), dah);
    }
}

#[tokio::test]
async fn test_get_eds_detects_corrupted_store() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let store = store_cells(&eds, &dah, |_, _| true).await;

    store.put(ShareKey::new(&dah, 3, 2), tampered(eds.share(3, 2).unwrap())).await.unwrap();

    let getter = StoreGetter::new(store);
    assert_eq!(getter.get_eds(&Context::background(), &dah).await, Err(DasqError::HeaderMismatch));
}

#[tokio::test]
async fn test_get_eds_detects_share_of_wrong_size() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let store = store_cells(&eds, &dah, |_, _| true).await;

    let short = Share::new(eds.share(1, 1).unwrap().as_bytes()[..100].to_vec()).unwrap();
    store.put(ShareKey::new(&dah, 1, 1), short).await.unwrap();

    let getter = StoreGetter::new(store);
    assert_eq!(getter.get_eds(&Context::background(), &dah).await, Err(DasqError::HeaderMismatch));
}

#[tokio::test]
async fn prop_test_get_shares_by_namespace_returns_every_matching_share() {
    const NUM_TEST_ITERATIONS: usize = 10;

    let mut rng = rand::rng();

    for _ in 0..NUM_TEST_ITERATIONS {
        let mut original = random_sorted_shares(64, &mut rng);

        let start = rng.random_range(0..original.len());
        let count = rng.random_range(1..=(original.len() - start).min(12));
        let namespace = original[start].namespace();
        original[start..start + count].iter_mut().for_each(|share| *share = with_namespace(share, namespace));

        let eds = ExtendedDataSquare::new(original.clone()).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
        let getter = StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await);
        let ctx = Context::background();

        let namespaced = getter.get_shares_by_namespace(&ctx, &dah, namespace).await.expect("Must find namespace");
        let found = namespaced.flatten();

        assert_eq!(found.len(), count);
        assert!(found.iter().all(|share| share.namespace() == namespace));
        assert_eq!(found, original[start..start + count].to_vec());
        assert_eq!(namespaced.verify(&dah, namespace), Ok(()));

        let absent = loop {
            let candidate = random_namespace(&mut rng);
            if original.iter().all(|share| share.namespace() != candidate) {
                break candidate;
            }
        };
        assert_eq!(getter.get_shares_by_namespace(&ctx, &dah, absent).await, Err(DasqError::NamespaceNotFound));
    }
}

#[tokio::test]
async fn test_namespace_spanning_shares_of_one_row_and_of_two_rows() {
    let ctx = Context::background();

    for (first, second, rows) in [(2, 3, vec![0]), (7, 8, vec![1, 2])] {
        let mut original = random_sorted_shares(16, &mut rand::rng());
        let namespace = original[first].namespace();
        original[second] = with_namespace(&original[second], namespace);

        let eds = ExtendedDataSquare::new(original.clone()).unwrap();
        let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
        let getter = StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await);

        let namespaced = getter.get_shares_by_namespace(&ctx, &dah, namespace).await.expect("Must find namespace");

        assert_eq!(namespaced.flatten(), vec![original[first].clone(), original[second].clone()]);
        assert_eq!(namespaced.rows().iter().map(|row| row.row_index).collect::<Vec<usize>>(), rows);
        assert!(namespaced.rows().iter().all(|row| row.proof.is_inclusion()));
        assert!(namespaced.rows().iter().all(|row| row.verify(&dah, namespace).is_ok()));
    }
}

#[tokio::test]
async fn test_namespace_filling_two_whole_rows() {
    let mut original = random_sorted_shares(16, &mut rand::rng());
    let namespace = original[8].namespace();
    original[8..].iter_mut().for_each(|share| *share = with_namespace(share, namespace));

    let eds = ExtendedDataSquare::new(original.clone()).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let getter = StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await);

    let namespaced = getter
        .get_shares_by_namespace(&Context::background(), &dah, namespace)
        .await
        .expect("Must find namespace");

    assert_eq!(namespaced.rows().iter().map(|row| row.row_index).collect::<Vec<usize>>(), vec![2, 3]);
    assert_eq!(namespaced.flatten(), original[8..].to_vec());
    assert_eq!(namespaced.verify(&dah, namespace), Ok(()));
}

#[tokio::test]
async fn test_header_without_row_roots() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
    let mut dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let namespace = eds.share(0, 0).unwrap().namespace();

    let getter = Arc::new(StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await));
    dah.clear_row_roots();

    let ctx = Context::background().with_timeout(Duration::from_secs(5));
    assert_eq!(getter.get_shares_by_namespace(&ctx, &dah, namespace).await, Err(DasqError::NamespaceNotFound));

    let sampler = LightAvailability::new(getter);
    assert!(matches!(sampler.shares_available(&ctx, &dah).await, Err(DasqError::Unavailable { sampled: 0, .. })));
}

#[tokio::test]
async fn test_parity_namespace_is_never_found() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let getter = StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await);

    assert_eq!(
        getter.get_shares_by_namespace(&Context::background(), &dah, Namespace::PARITY).await,
        Err(DasqError::NamespaceNotFound)
    );
}

#[tokio::test]
async fn test_tampered_share_is_never_returned() {
    let original = random_sorted_shares(16, &mut rand::rng());
    let eds = ExtendedDataSquare::new(original.clone()).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let store = store_cells(&eds, &dah, |_, _| true).await;

    store.put(ShareKey::new(&dah, 1, 2), tampered(eds.share(1, 2).unwrap())).await.unwrap();

    let getter = StoreGetter::new(store);
    let ctx = Context::background();

    assert_eq!(
        getter.get_share(&ctx, &dah, 1, 2).await,
        Err(DasqError::ShareVerificationFailed(crate::Axis::Row, 1))
    );
    assert_eq!(
        getter.get_shares_by_namespace(&ctx, &dah, original[6].namespace()).await,
        Err(DasqError::ShareVerificationFailed(crate::Axis::Row, 1))
    );

    // Shares of other rows are still served
    assert_eq!(&getter.get_share(&ctx, &dah, 2, 2).await.unwrap(), eds.share(2, 2).unwrap());
}

#[tokio::test]
async fn test_complete_square_is_available() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(64, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let getter = Arc::new(StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await));
    let ctx = Context::background();

    assert_eq!(LightAvailability::new(getter.clone()).shares_available(&ctx, &dah).await, Ok(()));
    assert_eq!(FullAvailability::new(getter).shares_available(&ctx, &dah).await, Ok(()));
}

#[tokio::test]
async fn prop_test_unrecoverable_square_is_unavailable() {
    const NUM_TEST_ITERATIONS: usize = 10;
    const K: usize = 8;

    let eds = ExtendedDataSquare::new(random_sorted_shares(K * K, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();

    // Only a (k-1) x (k-1) corner is left, no row or column can be decoded
    let getter = Arc::new(StoreGetter::new(store_cells(&eds, &dah, |row, col| row < K - 1 && col < K - 1).await));
    let sampler = LightAvailability::new(getter.clone());
    let ctx = Context::background();

    for _ in 0..NUM_TEST_ITERATIONS {
        match sampler.shares_available(&ctx, &dah).await {
            Err(DasqError::Unavailable { sampled, failed }) => {
                // Even the kept shares can't be verified, as neither their row nor their column can be recovered
                assert_eq!(sampled, 16);
                assert_eq!(failed.len(), 16);
            }
            res => panic!("Didn't expect to encounter: {:?}", res),
        }
    }

    assert!(matches!(
        FullAvailability::new(getter).shares_available(&ctx, &dah).await,
        Err(DasqError::Unavailable { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_store_cannot_block_sampling() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let getter = Arc::new(StoreGetter::new(Arc::new(StalledStore)));

    let sampler = LightAvailability::with_config(
        getter.clone(),
        SamplerConfig {
            sample_count: 8,
            max_concurrency: 2,
            sample_timeout: Duration::from_millis(50),
        },
    )
    .unwrap();

    match sampler.shares_available(&Context::background(), &dah).await {
        Err(DasqError::Unavailable { sampled, failed }) => {
            assert_eq!(sampled, 8);
            assert_eq!(failed.len(), 8);
        }
        res => panic!("Didn't expect to encounter: {:?}", res),
    }

    // Parent deadline cuts sampling short even though samples could wait much longer
    let sampler = LightAvailability::new(getter);
    let ctx = Context::background().with_timeout(Duration::from_millis(100));

    match sampler.shares_available(&ctx, &dah).await {
        Err(DasqError::Unavailable { failed, .. }) => assert_eq!(failed.len(), 16),
        res => panic!("Didn't expect to encounter: {:?}", res),
    }
}

#[tokio::test]
async fn test_cancelled_context_stops_sampling() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(4, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let sampler = LightAvailability::new(Arc::new(StoreGetter::new(Arc::new(StalledStore))));

    let ctx = Context::background();
    ctx.cancel();

    assert!(matches!(sampler.shares_available(&ctx, &dah).await, Err(DasqError::Unavailable { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_cascade_falls_through_misses_and_stops_at_corruption() {
    let eds = ExtendedDataSquare::new(random_sorted_shares(16, &mut rand::rng())).unwrap();
    let dah = DataAvailabilityHeader::from_eds(&eds).unwrap();
    let ctx = Context::background();

    let empty: Arc<dyn Getter> = Arc::new(StoreGetter::new(Arc::new(InMemoryShareStore::new())));
    let complete: Arc<dyn Getter> = Arc::new(StoreGetter::new(store_cells(&eds, &dah, |_, _| true).await));

    let corrupted_store = store_cells(&eds, &dah, |_, _| true).await;
    corrupted_store.put(ShareKey::new(&dah, 0, 0), tampered(eds.share(0, 0).unwrap())).await.unwrap();
    let corrupted: Arc<dyn Getter> = Arc::new(StoreGetter::new(corrupted_store));

    assert!(matches!(CascadeGetter::new(vec![]), Err(DasqError::InvalidConfig(_))));

    let cascade = CascadeGetter::new(vec![empty.clone(), complete.clone()]).unwrap();
    assert_eq!(&cascade.get_share(&ctx, &dah, 0, 0).await.unwrap(), eds.share(0, 0).unwrap());
    assert_eq!(cascade.get_eds(&ctx, &dah).await.unwrap(), eds);

    let cascade = CascadeGetter::new(vec![corrupted, complete]).unwrap();
    assert_eq!(
        cascade.get_share(&ctx, &dah, 0, 0).await,
        Err(DasqError::ShareVerificationFailed(crate::Axis::Row, 0))
    );

    let config = CascadeConfig {
        attempts: 3,
        backoff: Duration::from_secs(1),
    };
    let cascade = CascadeGetter::with_config(vec![empty.clone(), empty], config).unwrap();
    assert_eq!(cascade.get_share(&ctx, &dah, 5, 6).await, Err(DasqError::ShareUnavailable(5, 6)));
}
