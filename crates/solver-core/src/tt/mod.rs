//! Transposition tables.
//!
//! The memoization store for the search: a flat associative array keyed
//! by position code, with single-probe replacement and 32-bit packed
//! entries. All operations are safe to call from many threads at once.

pub mod cached;
pub mod entry;
pub mod mem;
pub mod result;

pub use cached::CachedTable;
pub use entry::PARTIAL_KEY_BITS;
pub use mem::MemTable;
pub use result::TpResult;

use anyhow::Result;
use std::path::Path;

/// An entry displaced by a single-probe insertion, reconstructed to its
/// full position code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spill {
    pub code: u64,
    pub kind: TpResult,
}

/// Common surface of the table variants (in-memory and chained).
pub trait Table: Sync {
    /// Stored result for `code`, or `None` on an empty slot or a
    /// collision with a different code.
    fn probe(&self, code: u64) -> TpResult;

    /// Deposits a result. Bound kinds merge with an existing entry for
    /// the same code; exact kinds overwrite unconditionally; an occupant
    /// with a different code is silently dropped.
    fn add(&self, code: u64, kind: TpResult);

    /// Like [`Table::add`], but hands back the displaced entry when the
    /// slot held a different code.
    fn add_with_spill(&self, code: u64, kind: TpResult) -> Option<Spill>;

    fn is_empty_slot(&self, code: u64) -> bool;

    /// Sampled estimate of the number of occupied slots. Telemetry
    /// only.
    fn size(&self) -> usize;

    fn capacity(&self) -> usize;

    fn save(&self, path: &Path) -> Result<()>;

    fn load(&self, path: &Path) -> Result<()>;
}

/// Whether a table of `capacity` slots can address a code space of
/// `code_end` codes without overflowing the stored partial key.
pub fn key_fits(capacity: usize, code_end: u64) -> bool {
    capacity > 0 && (code_end.saturating_sub(1) / capacity as u64) >> PARTIAL_KEY_BITS == 0
}
