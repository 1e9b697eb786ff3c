//! # DASQ-lib: Data Availability SQuare Library
//!
//! `dasq-lib` lays out namespaced data as a square of fixed size shares, extends it two dimensionally with Reed-Solomon
//! erasure coding, and commits to it with one namespaced Merkle tree per row and per column. On top of that commitment,
//! the `DataAvailabilityHeader`, it provides verified retrieval of single shares, of all shares of a namespace and of
//! the whole square, along with the random sampling protocol a light node runs to convince itself that a square is
//! available without downloading it.
//!
//! ## How to Use
//!
//! ### 1. Extend a Square and Compute its Header
//!
//! The original square is `k x k` shares, sorted by namespace in row-major order. Extending it yields
//! a `2k x 2k` square, whose header commits to every share of it.
//!
//! ```rust
//! use dasq_lib::{DataAvailabilityHeader, ExtendedDataSquare, Namespace, SHARE_SIZE, Share};
//!
//! let original = (0..16u8)
//!     .map(|i| Share::from_payload(Namespace::new([0, 0, 0, 0, 0, 0, 0, i]), b"hello", SHARE_SIZE))
//!     .collect::<Result<Vec<Share>, _>>()
//!     .expect("Failed to build shares");
//!
//! let eds = ExtendedDataSquare::new(original).expect("Failed to extend square");
//! let dah = DataAvailabilityHeader::from_eds(&eds).expect("Failed to compute header");
//!
//! assert_eq!(eds.width(), 8);
//! assert_eq!(dah.square_width(), 8);
//! ```
//!
//! ### 2. Retrieve and Sample Against the Header
//!
//! Getters fetch shares from some source and verify them against the header before handing them out. A light node then
//! samples a handful of random coordinates through a getter, and deems the square available iff all of them come back.
//!
//! ```rust
//! use dasq_lib::{
//!     Availability, Context, DataAvailabilityHeader, ExtendedDataSquare, Getter, InMemoryShareStore, LightAvailability, Namespace,
//!     SHARE_SIZE, Share, StoreGetter, put_eds,
//! };
//! use std::sync::Arc;
//!
//! let runtime = tokio::runtime::Builder::new_multi_thread().enable_time().build().expect("Failed to build runtime");
//! runtime.block_on(async {
//!     let namespace = Namespace::new([0, 0, 0, 0, 0, 0, 0, 42]);
//!     let original = (0..4)
//!         .map(|_| Share::from_payload(namespace, b"hello", SHARE_SIZE))
//!         .collect::<Result<Vec<Share>, _>>()
//!         .expect("Failed to build shares");
//!
//!     let eds = ExtendedDataSquare::new(original).expect("Failed to extend square");
//!     let dah = DataAvailabilityHeader::from_eds(&eds).expect("Failed to compute header");
//!
//!     let store = Arc::new(InMemoryShareStore::new());
//!     put_eds(store.as_ref(), &dah, &eds).await.expect("Failed to store square");
//!
//!     let getter = Arc::new(StoreGetter::new(store));
//!     let ctx = Context::background();
//!
//!     let namespaced = getter.get_shares_by_namespace(&ctx, &dah, namespace).await.expect("Failed to get namespace");
//!     assert_eq!(namespaced.flatten().len(), 4);
//!     assert!(namespaced.verify(&dah, namespace).is_ok());
//!
//!     let sampler = LightAvailability::new(getter);
//!     assert!(sampler.shares_available(&ctx, &dah).await.is_ok());
//! });
//! ```

mod availability;
mod codec;
mod config;
mod consts;
mod context;
mod dah;
mod eds;
mod errors;
mod getter;
mod namespaced_shares;
mod nmt;
mod share;
mod store;

#[cfg(test)]
mod tests;

pub use availability::{Availability, FullAvailability, LightAvailability, SamplingState};
pub use config::{CascadeConfig, SamplerConfig, StoreGetterConfig};
pub use consts::{MAX_ORIGINAL_SQUARE_WIDTH, NAMESPACE_SIZE, SHARE_SIZE};
pub use context::Context;
pub use dah::DataAvailabilityHeader;
pub use eds::{Axis, ExtendedDataSquare};
pub use errors::DasqError;
pub use getter::{CascadeGetter, Getter, StoreGetter};
pub use namespaced_shares::{NamespacedShares, RowNamespacedShares};
pub use nmt::{NamespaceMerkleTree, NamespaceProof, NamespacedHash};
pub use share::{Namespace, Share};
pub use store::{InMemoryShareStore, ShareKey, ShareStore, put_eds};
