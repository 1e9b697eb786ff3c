use crate::{
    codec::ReedSolomonCodec, consts::MAX_ORIGINAL_SQUARE_WIDTH, dah::DataAvailabilityHeader, errors::DasqError,
    share::{Namespace, Share},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Direction of a line of shares in the square.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Col,
}

impl Axis {
    /// Coordinate `(row, col)` of the share at `position` along the line `index` of this axis.
    pub fn coordinate(self, index: usize, position: usize) -> (usize, usize) {
        match self {
            Axis::Row => (index, position),
            Axis::Col => (position, index),
        }
    }
}

/// Square matrix of `2k x 2k` shares. The top-left `k x k` quadrant holds the original data, the rest is Reed-Solomon parity
/// such that every row and every column is recoverable from any `k` of its `2k` shares.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendedDataSquare {
    width: usize,
    shares: Vec<Share>,
}

impl ExtendedDataSquare {
    /// Arranges `k^2` original shares, sorted by namespace, into a `k x k` square and erasure-extends every row and then
    /// every column to a `2k x 2k` square.
    ///
    /// # Arguments
    ///
    /// * `original` - Row-major original shares, sorted by namespace, all of the same size.
    ///
    /// # Returns
    ///
    /// * `Result<Self, DasqError>` - The extended square, or
    ///   - `DasqError::InvalidShareCount` if the count is not a non-zero perfect square, or share sizes differ.
    ///   - `DasqError::SquareTooLarge` if `k` exceeds `MAX_ORIGINAL_SQUARE_WIDTH`.
    ///   - `DasqError::UnsortedShares` if the shares are not sorted by namespace.
    ///   - `DasqError::ParityNamespaceInOriginal` if an original share claims the parity namespace.
    pub fn new(original: Vec<Share>) -> Result<Self, DasqError> {
        let count = original.len();
        let original_width = count.isqrt();

        if count == 0 || original_width * original_width != count {
            return Err(DasqError::InvalidShareCount(count));
        }
        if original.iter().any(|share| share.len() != original[0].len()) {
            return Err(DasqError::InvalidShareCount(count));
        }
        if original_width > MAX_ORIGINAL_SQUARE_WIDTH {
            return Err(DasqError::SquareTooLarge(original_width));
        }
        if let Some(idx) = original.iter().position(|share| share.namespace() == Namespace::PARITY) {
            return Err(DasqError::ParityNamespaceInOriginal(idx));
        }
        if let Some(idx) = original.windows(2).position(|pair| pair[0].namespace() > pair[1].namespace()) {
            return Err(DasqError::UnsortedShares(idx + 1));
        }

        let codec = ReedSolomonCodec::new(original_width)?;
        let width = 2 * original_width;

        let top_half = original
            .par_chunks(original_width)
            .map(|row| {
                let mut extended = row.to_vec();
                extended.extend(codec.encode(row)?);
                Ok(extended)
            })
            .collect::<Result<Vec<Vec<Share>>, DasqError>>()?;

        let column_parity = (0..width)
            .into_par_iter()
            .map(|col| codec.encode(&top_half.iter().map(|row| row[col].clone()).collect::<Vec<Share>>()))
            .collect::<Result<Vec<Vec<Share>>, DasqError>>()?;

        let mut shares = top_half.into_iter().flatten().collect::<Vec<Share>>();
        shares.extend((0..original_width).flat_map(|row| column_parity.iter().map(move |parity| parity[row].clone())));

        debug!(original_width, width, "extended data square");
        Ok(ExtendedDataSquare { width, shares })
    }

    /// Imports an already extended square of `width x width` row-major shares. Consistency with some commitment is to be
    /// checked by recomputing its `DataAvailabilityHeader`.
    pub fn from_shares(width: usize, shares: Vec<Share>) -> Result<Self, DasqError> {
        if width == 0 || width % 2 != 0 || shares.len() != width * width {
            return Err(DasqError::InvalidShareCount(shares.len()));
        }
        if shares.iter().any(|share| share.len() != shares[0].len()) {
            return Err(DasqError::InvalidShareCount(shares.len()));
        }

        Ok(ExtendedDataSquare { width, shares })
    }

    /// Reconstructs the full square committed to by `dah` from a partially known one, by repeatedly decoding every row and
    /// column which has at least half of its shares, until nothing is missing.
    ///
    /// # Arguments
    ///
    /// * `dah` - Commitment the reconstructed square must match.
    /// * `cells` - Row-major `width x width` shares, `None` where unknown.
    ///
    /// # Returns
    ///
    /// * `Result<Self, DasqError>` - The full square, or
    ///   - `DasqError::ShareUnavailable` with the first still missing coordinate, if decoding got stuck.
    ///   - `DasqError::HeaderMismatch` if the known shares differ in size, or the decoded square doesn't match `dah`.
    pub fn repair(dah: &DataAvailabilityHeader, mut cells: Vec<Option<Share>>) -> Result<Self, DasqError> {
        let width = dah.square_width();
        if width == 0 || width % 2 != 0 || cells.len() != width * width {
            return Err(DasqError::InvalidShareCount(cells.len()));
        }

        // A committed square has equally sized shares, so no mix of sizes can ever match `dah`
        let mut known = cells.iter().flatten();
        if let Some(first) = known.next() {
            if known.any(|share| share.len() != first.len()) {
                return Err(DasqError::HeaderMismatch);
            }
        }

        let codec = ReedSolomonCodec::new(width / 2)?;
        let mut round = 0;

        while let Some(missing) = cells.iter().position(Option::is_none) {
            let decoded = [Axis::Row, Axis::Col]
                .into_iter()
                .flat_map(|axis| (0..width).map(move |index| (axis, index)))
                .collect::<Vec<(Axis, usize)>>()
                .into_par_iter()
                .filter_map(|(axis, index)| {
                    let line = (0..width).map(|pos| Self::cell_index(width, axis, index, pos)).collect::<Vec<usize>>();
                    let present = line.iter().filter(|&&idx| cells[idx].is_some()).count();

                    if present == width || present < width / 2 {
                        return None;
                    }

                    let partial = line.iter().map(|&idx| cells[idx].clone()).collect::<Vec<Option<Share>>>();
                    Some(codec.decode(partial).map(|shares| (line, shares)))
                })
                .collect::<Result<Vec<(Vec<usize>, Vec<Share>)>, DasqError>>()?;

            if decoded.is_empty() {
                return Err(DasqError::ShareUnavailable(missing / width, missing % width));
            }

            debug!(round, decoded_lines = decoded.len(), "repairing extended data square");
            decoded.into_iter().for_each(|(line, shares)| {
                line.into_iter().zip(shares).for_each(|(idx, share)| {
                    cells[idx].get_or_insert(share);
                })
            });

            round += 1;
        }

        let shares = cells.into_iter().flatten().collect::<Vec<Share>>();
        let eds = Self::from_shares(width, shares)?;

        if DataAvailabilityHeader::from_eds(&eds)? != *dah {
            return Err(DasqError::HeaderMismatch);
        }

        Ok(eds)
    }

    /// Number of shares along one side of the extended square, `2k`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of shares along one side of the original quadrant, `k`.
    pub fn original_width(&self) -> usize {
        self.width / 2
    }

    pub fn share(&self, row: usize, col: usize) -> Result<&Share, DasqError> {
        if row >= self.width || col >= self.width {
            return Err(DasqError::OutOfBounds(row, col, self.width));
        }

        Ok(&self.shares[row * self.width + col])
    }

    pub fn row(&self, index: usize) -> Result<&[Share], DasqError> {
        if index >= self.width {
            return Err(DasqError::OutOfBounds(index, 0, self.width));
        }

        Ok(&self.shares[index * self.width..(index + 1) * self.width])
    }

    pub fn column(&self, index: usize) -> Result<Vec<Share>, DasqError> {
        if index >= self.width {
            return Err(DasqError::OutOfBounds(0, index, self.width));
        }

        Ok((0..self.width).map(|row| self.shares[row * self.width + index].clone()).collect())
    }

    pub fn axis(&self, axis: Axis, index: usize) -> Result<Vec<Share>, DasqError> {
        match axis {
            Axis::Row => self.row(index).map(<[Share]>::to_vec),
            Axis::Col => self.column(index),
        }
    }

    /// Row-major shares of the original `k x k` quadrant.
    pub fn original_shares(&self) -> Vec<Share> {
        let original_width = self.original_width();

        (0..original_width)
            .flat_map(|row| self.shares[row * self.width..row * self.width + original_width].iter().cloned())
            .collect()
    }

    /// All `width x width` shares, row-major.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    fn cell_index(width: usize, axis: Axis, index: usize, position: usize) -> usize {
        let (row, col) = axis.coordinate(index, position);
        row * width + col
    }
}
