//! City grid topology and zone typing.
//!
//! The city is an `N×N` grid of zones addressed by a single id:
//!
//! ```text
//! row = id / N        col = id % N
//! ```
//!
//! Every zone gets exactly one [`ZoneType`] from a fixed priority rule, first
//! match wins:
//!
//! | Priority | Type          | Cells                                             |
//! |----------|---------------|---------------------------------------------------|
//! | 1        | `Airport`     | the four corners                                  |
//! | 2        | `Business`    | central 2×2 block, rows/cols `N/2-1` and `N/2`    |
//! | 3        | `Coastal`     | the two eastern-most columns (`col >= N-2`)       |
//! | 4        | `Residential` | everything else                                   |
//!
//! For the default `N = 10` this puts business at 44/45/54/55, airports at
//! 0/9/90/99 and the coast along columns 8 and 9.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ValidationError, ValidationResult, ZoneId};

// ── ZoneType ──────────────────────────────────────────────────────────────────

/// Land-use classification of a zone.  Drives both generation and features.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Business,
    Coastal,
    Airport,
    Residential,
}

impl ZoneType {
    /// All variants in one-hot column order.
    pub const ALL: [ZoneType; 4] = [
        ZoneType::Business,
        ZoneType::Coastal,
        ZoneType::Airport,
        ZoneType::Residential,
    ];

    /// Position of this variant in [`ZoneType::ALL`].
    #[inline]
    pub fn ordinal(self) -> usize {
        match self {
            ZoneType::Business    => 0,
            ZoneType::Coastal     => 1,
            ZoneType::Airport     => 2,
            ZoneType::Residential => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneType::Business    => "business",
            ZoneType::Coastal     => "coastal",
            ZoneType::Airport     => "airport",
            ZoneType::Residential => "residential",
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Zone ──────────────────────────────────────────────────────────────────────

/// One cell of the grid, as reported by the zone listing.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Zone {
    pub id:  ZoneId,
    pub row: u16,
    pub col: u16,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
}

// ── CityGrid ──────────────────────────────────────────────────────────────────

/// Static `N×N` topology.  Holds only the dimension; everything else is
/// computed on demand, so the grid is `Copy` and trivially shareable.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CityGrid {
    size: u16,
}

impl CityGrid {
    /// Largest dimension whose zone ids still fit in a `u16`.
    pub const MAX_SIZE: u16 = 255;

    /// Build a grid of `size × size` zones.
    ///
    /// # Panics
    /// Panics if `size` is 0 or above [`CityGrid::MAX_SIZE`].  Sizes coming
    /// from configuration are range-checked before they get here.
    pub fn new(size: u16) -> Self {
        assert!(
            (1..=Self::MAX_SIZE).contains(&size),
            "grid size {size} outside 1..={}",
            Self::MAX_SIZE
        );
        Self { size }
    }

    #[inline]
    pub fn size(&self) -> u16 {
        self.size
    }

    #[inline]
    pub fn zone_count(&self) -> usize {
        self.size as usize * self.size as usize
    }

    /// Longest possible trip: corner to opposite corner.
    #[inline]
    pub fn max_distance(&self) -> u32 {
        2 * (self.size as u32 - 1)
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Check a raw (possibly negative) id coming from outside the process.
    pub fn check(&self, raw: i64) -> ValidationResult<ZoneId> {
        if raw < 0 || raw as u64 >= self.zone_count() as u64 {
            return Err(ValidationError::ZoneOutOfRange {
                id:         raw,
                zone_count: self.zone_count(),
            });
        }
        Ok(ZoneId(raw as u16))
    }

    #[inline]
    fn ensure(&self, id: ZoneId) -> ValidationResult<()> {
        self.check(id.0 as i64).map(|_| ())
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// Row/col coordinates of `id`.
    pub fn coords(&self, id: ZoneId) -> ValidationResult<(u16, u16)> {
        self.ensure(id)?;
        Ok((id.0 / self.size, id.0 % self.size))
    }

    pub fn zone(&self, id: ZoneId) -> ValidationResult<Zone> {
        let (row, col) = self.coords(id)?;
        Ok(Zone { id, row, col, zone_type: self.classify(row, col) })
    }

    pub fn zone_type(&self, id: ZoneId) -> ValidationResult<ZoneType> {
        self.zone(id).map(|z| z.zone_type)
    }

    /// Manhattan distance in grid steps.  No diagonal shortcut.
    pub fn distance(&self, a: ZoneId, b: ZoneId) -> ValidationResult<u32> {
        let (ra, ca) = self.coords(a)?;
        let (rb, cb) = self.coords(b)?;
        Ok(ra.abs_diff(rb) as u32 + ca.abs_diff(cb) as u32)
    }

    /// Every zone in ascending id order.
    pub fn zones(&self) -> impl Iterator<Item = Zone> + '_ {
        (0..self.zone_count()).map(move |i| {
            let id = ZoneId(i as u16);
            let (row, col) = (id.0 / self.size, id.0 % self.size);
            Zone { id, row, col, zone_type: self.classify(row, col) }
        })
    }

    // ── Classification ────────────────────────────────────────────────────

    fn classify(&self, row: u16, col: u16) -> ZoneType {
        let last = self.size - 1;
        let is_edge_row = row == 0 || row == last;
        let is_edge_col = col == 0 || col == last;
        if is_edge_row && is_edge_col {
            return ZoneType::Airport;
        }

        let mid = self.size / 2;
        let lo = mid.saturating_sub(1);
        if (lo..=mid).contains(&row) && (lo..=mid).contains(&col) {
            return ZoneType::Business;
        }

        if col + 2 >= self.size {
            return ZoneType::Coastal;
        }

        ZoneType::Residential
    }
}

impl Default for CityGrid {
    fn default() -> Self {
        CityGrid::new(10)
    }
}
