use std::time::Duration;

/// Fixed configuration for `bincode` serialization and deserialization.
pub const DASQ_BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Byte length of the namespace identifier prefixing every share.
pub const NAMESPACE_SIZE: usize = 8;

/// Default byte length of a share, namespace included.
pub const SHARE_SIZE: usize = 512;

/// Largest supported width of the original (non-extended) square. The extended square is twice as
/// wide, and a Reed-Solomon codeword over GF(2^8) can't have more than 256 shards.
pub const MAX_ORIGINAL_SQUARE_WIDTH: usize = 128;

/// Number of random coordinates a light node samples per header, unless configured otherwise.
pub const DEFAULT_SAMPLE_COUNT: usize = 16;

/// Default upper bound on simultaneously in-flight samples or row fetches.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Default time budget for a single sample.
pub const DEFAULT_SAMPLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Domain separation prefix for NMT leaf digests.
pub(crate) const NMT_LEAF_PREFIX: u8 = 0x00;

/// Domain separation prefix for NMT inner node digests.
pub(crate) const NMT_NODE_PREFIX: u8 = 0x01;
