//! Range encodings for lists of identifiers.
//!
//! Two unrelated encodings live here:
//!
//! - fixed-width range entries, used by TCF strings to list vendors, each entry holding one or
//!   two 16-bit identifiers;
//! - Fibonacci delta ranges, used by the GPP header to list section identifiers, where each
//!   entry is an offset from the previous one.
//!
use crate::core::{DataReader, IdSet, ReadError};
use num_iter::range_inclusive;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Upper bound on the number of identifiers a single Fibonacci range may expand to.
pub const MAX_RANGE_IDS: usize = 1 << 16;

/// A contiguous span of identifiers, bounds included.
///
/// A single identifier is represented by a range whose start and end are equal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RangeEntry {
    start_id: u16,
    end_id: u16,
}

impl RangeEntry {
    /// Creates a range from its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::InvalidRange`] if `start_id` is greater than `end_id`.
    pub fn new(start_id: u16, end_id: u16) -> Result<Self, ReadError> {
        if start_id > end_id {
            return Err(ReadError::InvalidRange {
                start: start_id,
                end: end_id,
            });
        }
        Ok(Self { start_id, end_id })
    }

    pub fn single(id: u16) -> Self {
        Self {
            start_id: id,
            end_id: id,
        }
    }

    pub fn start_id(&self) -> u16 {
        self.start_id
    }

    pub fn end_id(&self) -> u16 {
        self.end_id
    }

    pub fn is_single(&self) -> bool {
        self.start_id == self.end_id
    }

    pub fn contains(&self, id: u16) -> bool {
        (self.start_id..=self.end_id).contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u16> + use<> {
        range_inclusive(self.start_id, self.end_id)
    }
}

/// A list of vendors, either as a bit field or as a list of ranges.
///
/// The encoding is chosen by whoever produced the string, so both forms must be
/// handled by consumers. Use [`VendorSet::contains`] to query membership independently of the
/// encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum VendorSet {
    BitField { max_vendor_id: u16, ids: IdSet },
    Ranges {
        max_vendor_id: u16,
        entries: Vec<RangeEntry>,
    },
}

/// An empty bit field.
impl Default for VendorSet {
    fn default() -> Self {
        Self::BitField {
            max_vendor_id: 0,
            ids: IdSet::new(),
        }
    }
}

impl VendorSet {
    pub fn max_vendor_id(&self) -> u16 {
        match self {
            Self::BitField { max_vendor_id, .. } | Self::Ranges { max_vendor_id, .. } => {
                *max_vendor_id
            }
        }
    }

    pub fn is_range_encoded(&self) -> bool {
        matches!(self, Self::Ranges { .. })
    }

    pub fn contains(&self, id: u16) -> bool {
        match self {
            Self::BitField { ids, .. } => ids.contains(&id),
            Self::Ranges { entries, .. } => entries.iter().any(|e| e.contains(id)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::BitField { ids, .. } => ids.is_empty(),
            Self::Ranges { entries, .. } => entries.is_empty(),
        }
    }

    /// Every identifier in the set, ranges expanded.
    pub fn ids(&self) -> IdSet {
        match self {
            Self::BitField { ids, .. } => ids.clone(),
            Self::Ranges { entries, .. } => entries.iter().flat_map(RangeEntry::ids).collect(),
        }
    }
}

fn to_id(value: u64) -> Result<u16, ReadError> {
    u16::try_from(value).map_err(|_| ReadError::ValueOverflow { value })
}

impl DataReader<'_> {
    /// Reads `count` fixed-width range entries.
    pub fn read_range_entries(&mut self, count: u16) -> Result<Vec<RangeEntry>, ReadError> {
        let mut entries = Vec::with_capacity(count.into());

        for _ in 0..count {
            let is_range = self.read_bool()?;
            let start = self.read_fixed_integer(16)?;
            let entry = if is_range {
                let end = self.read_fixed_integer(16)?;
                RangeEntry::new(start, end)?
            } else {
                RangeEntry::single(start)
            };
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Reads a 12-bit entry count followed by that many range entries.
    pub fn read_counted_range_entries(&mut self) -> Result<Vec<RangeEntry>, ReadError> {
        let count = self.read_fixed_integer(12)?;
        self.read_range_entries(count)
    }

    /// Reads a vendor list: its maximum identifier, its encoding type, and then either a bit
    /// field or a list of ranges.
    pub fn read_vendor_set(&mut self) -> Result<VendorSet, ReadError> {
        let max_vendor_id = self.read_fixed_integer(16)?;
        let is_range = self.read_bool()?;

        Ok(if is_range {
            VendorSet::Ranges {
                max_vendor_id,
                entries: self.read_counted_range_entries()?,
            }
        } else {
            VendorSet::BitField {
                max_vendor_id,
                ids: self.read_boolean_set(max_vendor_id)?,
            }
        })
    }

    /// Reads a Fibonacci delta range and expands it into individual identifiers.
    ///
    /// Each entry starts at an offset from the start of the previous entry. Groups carry an
    /// additional length and expand to `length + 1` consecutive identifiers.
    pub fn read_fibonacci_range(&mut self) -> Result<Vec<u16>, ReadError> {
        let count = self.read_fixed_integer::<u16>(12)?;
        let mut ids = vec![];
        let mut last = 0u64;

        for _ in 0..count {
            let is_group = self.read_bool()?;
            let offset = self.read_fibonacci_integer()?;
            let start = last
                .checked_add(offset)
                .ok_or(ReadError::ValueOverflow { value: offset })?;
            let start_id = to_id(start)?;

            let end_id = if is_group {
                let group_length = self.read_fibonacci_integer()?;
                to_id(start.saturating_add(group_length))?
            } else {
                start_id
            };

            if ids.len() + usize::from(end_id - start_id) >= MAX_RANGE_IDS {
                return Err(ReadError::RangeTooLarge {
                    limit: MAX_RANGE_IDS,
                });
            }
            ids.extend(range_inclusive(start_id, end_id));
            last = start;
        }

        Ok(ids)
    }
}
