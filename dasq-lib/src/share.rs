use crate::{consts::NAMESPACE_SIZE, errors::DasqError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-length tag prefixing every share, used to group and selectively retrieve application data.
/// Namespaces are ordered lexicographically by their bytes.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace([u8; NAMESPACE_SIZE]);

impl Namespace {
    /// Assigned to every leaf outside the original quadrant, when building row and column trees.
    pub const PARITY: Namespace = Namespace([0xff; NAMESPACE_SIZE]);

    /// Namespace of shares padding an incomplete original square.
    pub const TAIL_PADDING: Namespace = {
        let mut bytes = [0xff; NAMESPACE_SIZE];
        bytes[NAMESPACE_SIZE - 1] = 0xfe;
        Namespace(bytes)
    };

    pub const fn new(bytes: [u8; NAMESPACE_SIZE]) -> Self {
        Namespace(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, DasqError> {
        let bytes: [u8; NAMESPACE_SIZE] = bytes.try_into().map_err(|_| DasqError::InvalidShareSize(bytes.len()))?;
        Ok(Namespace(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace(")?;
        self.0.iter().try_for_each(|byte| write!(f, "{:02x}", byte))?;
        write!(f, ")")
    }
}

/// Fixed-size unit of block data, whose first `NAMESPACE_SIZE` bytes are its namespace.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Share(Vec<u8>);

impl Share {
    /// Wraps raw bytes as a share.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Namespace followed by payload.
    ///
    /// # Returns
    ///
    /// * `Result<Self, DasqError>` - `DasqError::InvalidShareSize` if `bytes` doesn't carry anything beyond a namespace.
    pub fn new(bytes: Vec<u8>) -> Result<Self, DasqError> {
        if bytes.len() <= NAMESPACE_SIZE {
            return Err(DasqError::InvalidShareSize(bytes.len()));
        }

        Ok(Share(bytes))
    }

    /// Builds a share of exactly `share_size` bytes, zero padding `payload` on the right.
    pub fn from_payload(namespace: Namespace, payload: &[u8], share_size: usize) -> Result<Self, DasqError> {
        if share_size <= NAMESPACE_SIZE || NAMESPACE_SIZE + payload.len() > share_size {
            return Err(DasqError::InvalidShareSize(NAMESPACE_SIZE + payload.len()));
        }

        let mut bytes = Vec::with_capacity(share_size);
        bytes.extend_from_slice(namespace.as_bytes());
        bytes.extend_from_slice(payload);
        bytes.resize(share_size, 0);

        Ok(Share(bytes))
    }

    /// A share carrying no data, used to fill the original square up to a full `k x k`.
    pub fn tail_padding(share_size: usize) -> Result<Self, DasqError> {
        Self::from_payload(Namespace::TAIL_PADDING, &[], share_size)
    }

    pub fn namespace(&self) -> Namespace {
        let mut bytes = [0u8; NAMESPACE_SIZE];
        bytes.copy_from_slice(&self.0[..NAMESPACE_SIZE]);
        Namespace(bytes)
    }

    pub fn payload(&self) -> &[u8] {
        &self.0[NAMESPACE_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Share {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share").field("namespace", &self.namespace()).field("len", &self.len()).finish()
    }
}
