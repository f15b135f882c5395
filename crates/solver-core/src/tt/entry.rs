//! Bit-packed table entry.
//!
//! One slot is a single `u32` word: the quotient of the position code by
//! the table capacity in the high 29 bits, the result kind in the low 3.
//! Keeping the whole entry in one atomic word is what makes lock-free
//! slot access possible; the layout is packed manually rather than with
//! bitfields so it is identical on every target.

use super::result::TpResult;

/// Width of the stored partial key. Together with the capacity this
/// bounds the code space: `capacity << PARTIAL_KEY_BITS` must cover it.
pub const PARTIAL_KEY_BITS: u32 = 29;

const KIND_BITS: u32 = 3;
const KIND_MASK: u32 = (1 << KIND_BITS) - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry(u32);

impl Entry {
    pub const EMPTY: Entry = Entry(0);

    #[inline]
    pub fn new(partial_key: u64, kind: TpResult) -> Self {
        assert!(
            partial_key >> PARTIAL_KEY_BITS == 0,
            "partial key {partial_key} exceeds {PARTIAL_KEY_BITS} bits: table capacity too small for the code space"
        );
        Entry(((partial_key as u32) << KIND_BITS) | kind.bits())
    }

    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Entry(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn kind(self) -> TpResult {
        TpResult::from_bits(self.0 & KIND_MASK)
    }

    #[inline]
    pub fn partial_key(self) -> u64 {
        (self.0 >> KIND_BITS) as u64
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.kind() == TpResult::None
    }
}
